// SPDX-License-Identifier: AGPL-3.0-only
//! Events emitted by the Panhandle contracts.
//!
//! Contracts buffer events while an invocation runs; the runtime drains the
//! buffer on commit and drops it on rollback.

use panhandle_core::{u128_str, Address};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ContractEvent {
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    OperatorTransferred {
        previous_operator: Address,
        new_operator: Address,
    },
    TransferTaxRateUpdated {
        operator: Address,
        previous_rate: u16,
        new_rate: u16,
    },
    BurnRateUpdated {
        operator: Address,
        previous_rate: u16,
        new_rate: u16,
    },
    MaxTransferAmountRateUpdated {
        operator: Address,
        previous_rate: u16,
        new_rate: u16,
    },
    ExcludedFromAntiWhaleUpdated {
        account: Address,
        excluded: bool,
    },
    SwapAndLiquifyEnabledUpdated {
        operator: Address,
        enabled: bool,
    },
    MinAmountToLiquifyUpdated {
        operator: Address,
        #[serde(with = "u128_str")]
        previous_amount: u128,
        #[serde(with = "u128_str")]
        new_amount: u128,
    },
    SwapRouterUpdated {
        operator: Address,
        router: Address,
    },
    /// Referral registry: operator allow-list changed
    OperatorUpdated {
        operator: Address,
        status: bool,
    },
    ReferralRecorded {
        user: Address,
        referrer: Address,
    },
    ReferralCommissionRecorded {
        referrer: Address,
        #[serde(with = "u128_str")]
        commission: u128,
    },
    Unlocked {
        token: Address,
        recipient: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
}

/// An event as committed to the runtime's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub contract: Address,
    /// Index of the invocation that produced the event
    pub call_index: u64,
    pub event: ContractEvent,
}

/// Per-contract buffer of uncommitted events.
#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    pending: Vec<ContractEvent>,
}

impl EventBuffer {
    pub fn emit(&mut self, event: ContractEvent) {
        self.pending.push(event);
    }

    pub fn take(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[ContractEvent] {
        &self.pending
    }
}

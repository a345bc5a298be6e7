// SPDX-License-Identifier: AGPL-3.0-only
//! # Referral Registry
//!
//! Records who referred whom and how much commission each referrer has
//! earned. Only allow-listed operators may write; the owner manages the list.
//!
//! Invalid referrals (zero addresses, self-referral, already-referred user)
//! are silent no-ops so callers never have to pre-check.

use crate::bep20::hash_len;
use crate::events::{ContractEvent, EventBuffer};
use panhandle_core::{
    u128_str, Address, ContractError, ContractResult, OperatorSet, Ownable,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReferralAction {
    RecordReferral {
        user: Address,
        referrer: Address,
    },
    RecordReferralCommission {
        referrer: Address,
        #[serde(with = "u128_str")]
        commission: u128,
    },
    UpdateOperator {
        operator: Address,
        status: bool,
    },
    TransferOwnership {
        new_owner: Address,
    },
    RenounceOwnership,
}

#[derive(Debug, Clone)]
pub struct PanhandleReferral {
    ownable: Ownable,
    operators: OperatorSet,
    /// user → referrer (write-once)
    referrers: BTreeMap<Address, Address>,
    referrals_count: BTreeMap<Address, u64>,
    total_referral_commissions: BTreeMap<Address, u128>,
    events: EventBuffer,
}

impl PanhandleReferral {
    pub fn new(owner: Address) -> Self {
        Self {
            ownable: Ownable::new(owner),
            operators: OperatorSet::new(),
            referrers: BTreeMap::new(),
            referrals_count: BTreeMap::new(),
            total_referral_commissions: BTreeMap::new(),
            events: EventBuffer::default(),
        }
    }

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub fn operators(&self, account: &Address) -> bool {
        self.operators.is_operator(account)
    }

    /// Zero address when `user` has no referrer.
    pub fn referrer_of(&self, user: &Address) -> Address {
        self.referrers.get(user).copied().unwrap_or(Address::ZERO)
    }

    pub fn referrals_count(&self, referrer: &Address) -> u64 {
        self.referrals_count.get(referrer).copied().unwrap_or(0)
    }

    pub fn total_referral_commissions(&self, referrer: &Address) -> u128 {
        self.total_referral_commissions
            .get(referrer)
            .copied()
            .unwrap_or(0)
    }

    pub fn record_referral(
        &mut self,
        caller: &Address,
        user: Address,
        referrer: Address,
    ) -> ContractResult<()> {
        self.operators.only_operator(caller)?;
        if user.is_zero()
            || referrer.is_zero()
            || user == referrer
            || self.referrers.contains_key(&user)
        {
            log::debug!("referral {} <- {} ignored", user, referrer);
            return Ok(());
        }
        let count = self
            .referrals_count(&referrer)
            .checked_add(1)
            .ok_or_else(|| ContractError::Overflow("referral count overflows u64".to_string()))?;

        self.referrers.insert(user, referrer);
        self.referrals_count.insert(referrer, count);
        self.events
            .emit(ContractEvent::ReferralRecorded { user, referrer });
        Ok(())
    }

    pub fn record_referral_commission(
        &mut self,
        caller: &Address,
        referrer: Address,
        commission: u128,
    ) -> ContractResult<()> {
        self.operators.only_operator(caller)?;
        if referrer.is_zero() || commission == 0 {
            return Ok(());
        }
        let total = self
            .total_referral_commissions(&referrer)
            .checked_add(commission)
            .ok_or_else(|| {
                ContractError::Overflow(format!(
                    "commission total of {} overflows u128",
                    referrer
                ))
            })?;

        self.total_referral_commissions.insert(referrer, total);
        self.events.emit(ContractEvent::ReferralCommissionRecorded {
            referrer,
            commission,
        });
        Ok(())
    }

    pub fn update_operator(&mut self, caller: &Address, operator: Address, status: bool) -> ContractResult<()> {
        self.ownable.only_owner(caller)?;
        self.operators.set(operator, status);
        self.events
            .emit(ContractEvent::OperatorUpdated { operator, status });
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> ContractResult<()> {
        let previous_owner = self.ownable.transfer_ownership(caller, new_owner)?;
        self.events.emit(ContractEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    pub fn renounce_ownership(&mut self, caller: &Address) -> ContractResult<()> {
        let previous_owner = self.ownable.renounce_ownership(caller)?;
        self.events.emit(ContractEvent::OwnershipTransferred {
            previous_owner,
            new_owner: Address::ZERO,
        });
        Ok(())
    }

    pub fn execute(&mut self, caller: &Address, action: ReferralAction) -> ContractResult<()> {
        match action {
            ReferralAction::RecordReferral { user, referrer } => {
                self.record_referral(caller, user, referrer)
            }
            ReferralAction::RecordReferralCommission {
                referrer,
                commission,
            } => self.record_referral_commission(caller, referrer, commission),
            ReferralAction::UpdateOperator { operator, status } => {
                self.update_operator(caller, operator, status)
            }
            ReferralAction::TransferOwnership { new_owner } => {
                self.transfer_ownership(caller, new_owner)
            }
            ReferralAction::RenounceOwnership => self.renounce_ownership(caller),
        }
    }

    pub fn take_events(&mut self) -> Vec<ContractEvent> {
        self.events.take()
    }

    pub(crate) fn digest_into(&self, hasher: &mut blake3::Hasher) {
        hasher.update(self.owner().as_bytes());
        hash_len(hasher, self.operators.len());
        for operator in self.operators.iter() {
            hasher.update(operator.as_bytes());
        }
        hash_len(hasher, self.referrers.len());
        for (user, referrer) in &self.referrers {
            hasher.update(user.as_bytes());
            hasher.update(referrer.as_bytes());
        }
        hash_len(hasher, self.referrals_count.len());
        for (referrer, count) in &self.referrals_count {
            hasher.update(referrer.as_bytes());
            hasher.update(&count.to_le_bytes());
        }
        hash_len(hasher, self.total_referral_commissions.len());
        for (referrer, total) in &self.total_referral_commissions {
            hasher.update(referrer.as_bytes());
            hasher.update(&total.to_le_bytes());
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-only
//! # Locker
//!
//! Holds whatever fungible tokens are sent to its address. The only way out
//! is an owner-invoked `unlock`, which sweeps the locker's entire balance of
//! one token to a recipient. There is no partial unlock.

use crate::bep20::Fungible;
use crate::events::{ContractEvent, EventBuffer};
use panhandle_core::{Address, ContractResult, Ownable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LockerAction {
    Unlock { token: Address, recipient: Address },
    TransferOwnership { new_owner: Address },
    RenounceOwnership,
}

#[derive(Debug, Clone)]
pub struct PanhandleLocker {
    address: Address,
    ownable: Ownable,
    events: EventBuffer,
}

impl PanhandleLocker {
    pub fn new(owner: Address, address: Address) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            events: EventBuffer::default(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    /// Send the locker's whole balance of `token` to `recipient`.
    /// Errors raised by the token are returned unchanged. Returns the amount moved.
    pub fn unlock(
        &mut self,
        caller: &Address,
        token: &mut dyn Fungible,
        recipient: &Address,
    ) -> ContractResult<u128> {
        self.ownable.only_owner(caller)?;
        let amount = token.balance_of(&self.address);
        token.transfer(&self.address, recipient, amount)?;
        log::info!(
            "locker {} released {} of token {} to {}",
            self.address,
            amount,
            token.address(),
            recipient
        );
        self.events.emit(ContractEvent::Unlocked {
            token: token.address(),
            recipient: *recipient,
            amount,
        });
        Ok(amount)
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

    pub fn take_events(&mut self) -> Vec<ContractEvent> {
        self.events.take()
    }

    pub(crate) fn digest_into(&self, hasher: &mut blake3::Hasher) {
        hasher.update(self.owner().as_bytes());
    }
}

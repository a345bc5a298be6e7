// SPDX-License-Identifier: AGPL-3.0-only
//! # BEP20 Ledger
//!
//! Plain fungible-token bookkeeping shared by every token in this crate:
//! balances, allowances, total supply and metadata.
//!
//! Every mutating method validates all of its preconditions before writing,
//! so a failed call leaves the ledger untouched.

use crate::events::{ContractEvent, EventBuffer};
use panhandle_core::{u128_str, Address, ContractError, ContractResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ERR_TRANSFER_FROM_ZERO: &str = "BEP20: transfer from the zero address";
pub const ERR_TRANSFER_TO_ZERO: &str = "BEP20: transfer to the zero address";
pub const ERR_EXCEEDS_BALANCE: &str = "BEP20: transfer amount exceeds balance";
pub const ERR_EXCEEDS_ALLOWANCE: &str = "BEP20: transfer amount exceeds allowance";
pub const ERR_APPROVE_FROM_ZERO: &str = "BEP20: approve from the zero address";
pub const ERR_APPROVE_TO_ZERO: &str = "BEP20: approve to the zero address";
pub const ERR_ALLOWANCE_BELOW_ZERO: &str = "BEP20: decreased allowance below zero";
pub const ERR_MINT_TO_ZERO: &str = "BEP20: mint to the zero address";

/// A token other contracts can hold and move.
pub trait Fungible {
    /// The token contract's own address.
    fn address(&self) -> Address;

    fn balance_of(&self, account: &Address) -> u128;

    /// Move `amount` from `caller` to `to` under the token's own transfer rules.
    fn transfer(&mut self, caller: &Address, to: &Address, amount: u128) -> ContractResult<()>;
}

/// Calls every BEP20 token accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Bep20Action {
    Transfer {
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    Approve {
        spender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    TransferFrom {
        from: Address,
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    IncreaseAllowance {
        spender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    DecreaseAllowance {
        spender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
}

#[derive(Debug, Clone)]
pub struct Bep20Ledger {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: u128,
    /// BTreeMap for deterministic iteration (state digests)
    balances: BTreeMap<Address, u128>,
    /// owner → spender → allowance
    allowances: BTreeMap<Address, BTreeMap<Address, u128>>,
    pub(crate) events: EventBuffer,
}

impl Bep20Ledger {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply: 0,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            events: EventBuffer::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all balances; equals `total_supply` at all times.
    pub fn sum_of_balances(&self) -> u128 {
        self.balances.values().fold(0u128, |acc, b| acc.saturating_add(*b))
    }

    /// Create `amount` new tokens at `to`.
    pub fn mint(&mut self, to: &Address, amount: u128) -> ContractResult<()> {
        if to.is_zero() {
            return Err(ContractError::InvalidArgument(ERR_MINT_TO_ZERO.to_string()));
        }
        let supply = self.total_supply.checked_add(amount).ok_or_else(|| {
            ContractError::Overflow(format!(
                "mint of {} overflows total supply {}",
                amount, self.total_supply
            ))
        })?;
        // balance <= total_supply, so this cannot fail once the supply check passed
        let balance = self.balance_of(to).checked_add(amount).ok_or_else(|| {
            ContractError::Overflow(format!("mint of {} overflows balance of {}", amount, to))
        })?;

        self.total_supply = supply;
        self.balances.insert(*to, balance);
        self.events.emit(ContractEvent::Transfer {
            from: Address::ZERO,
            to: *to,
            amount,
        });
        Ok(())
    }

    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> ContractResult<()> {
        self.move_balances(from, &[(*to, amount)])
    }

    /// Debit `from` by the sum of `credits` and credit every entry, as one
    /// step. Emits a `Transfer` event per credit, in order.
    pub fn move_balances(&mut self, from: &Address, credits: &[(Address, u128)]) -> ContractResult<()> {
        if from.is_zero() {
            return Err(ContractError::InvalidArgument(
                ERR_TRANSFER_FROM_ZERO.to_string(),
            ));
        }
        let mut total: u128 = 0;
        for (to, amount) in credits {
            if to.is_zero() {
                return Err(ContractError::InvalidArgument(
                    ERR_TRANSFER_TO_ZERO.to_string(),
                ));
            }
            total = total.checked_add(*amount).ok_or_else(|| {
                ContractError::Overflow("transfer total overflows u128".to_string())
            })?;
        }
        let from_balance = self.balance_of(from);
        if from_balance < total {
            return Err(ContractError::InsufficientBalance(
                ERR_EXCEEDS_BALANCE.to_string(),
            ));
        }

        // Stage new balances so that `from` may also appear among the credits
        let mut staged: BTreeMap<Address, u128> = BTreeMap::new();
        staged.insert(*from, from_balance - total);
        for (to, amount) in credits {
            let current = staged
                .get(to)
                .copied()
                .unwrap_or_else(|| self.balance_of(to));
            let updated = current.checked_add(*amount).ok_or_else(|| {
                ContractError::Overflow(format!("credit of {} overflows balance of {}", amount, to))
            })?;
            staged.insert(*to, updated);
        }

        self.balances.extend(staged);
        for (to, amount) in credits {
            self.events.emit(ContractEvent::Transfer {
                from: *from,
                to: *to,
                amount: *amount,
            });
        }
        Ok(())
    }

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> ContractResult<()> {
        if owner.is_zero() {
            return Err(ContractError::InvalidArgument(
                ERR_APPROVE_FROM_ZERO.to_string(),
            ));
        }
        if spender.is_zero() {
            return Err(ContractError::InvalidArgument(
                ERR_APPROVE_TO_ZERO.to_string(),
            ));
        }
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
        self.events.emit(ContractEvent::Approval {
            owner: *owner,
            spender: *spender,
            amount,
        });
        Ok(())
    }

    pub fn increase_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        added: u128,
    ) -> ContractResult<()> {
        let updated = self
            .allowance(owner, spender)
            .checked_add(added)
            .ok_or_else(|| ContractError::Overflow("allowance overflows u128".to_string()))?;
        self.approve(owner, spender, updated)
    }

    pub fn decrease_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        subtracted: u128,
    ) -> ContractResult<()> {
        let updated = self
            .allowance(owner, spender)
            .checked_sub(subtracted)
            .ok_or_else(|| {
                ContractError::InsufficientAllowance(ERR_ALLOWANCE_BELOW_ZERO.to_string())
            })?;
        self.approve(owner, spender, updated)
    }

    /// Allowance left after `spender` moves `amount` of `owner`'s tokens.
    /// Does not write anything.
    pub fn remaining_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> ContractResult<u128> {
        self.allowance(owner, spender)
            .checked_sub(amount)
            .ok_or_else(|| ContractError::InsufficientAllowance(ERR_EXCEEDS_ALLOWANCE.to_string()))
    }

    /// Set the allowance without emitting `Approval` (allowance spend).
    pub(crate) fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
    }

    /// `transfer_from` for tokens without transfer rules.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> ContractResult<()> {
        let remaining = self.remaining_allowance(from, spender, amount)?;
        self.transfer(from, to, amount)?;
        self.set_allowance(from, spender, remaining);
        Ok(())
    }

    /// Feed balances and allowances into a state digest.
    pub(crate) fn digest_into(&self, hasher: &mut blake3::Hasher) {
        hasher.update(&self.total_supply.to_le_bytes());
        hash_len(hasher, self.balances.len());
        for (account, balance) in &self.balances {
            hasher.update(account.as_bytes());
            hasher.update(&balance.to_le_bytes());
        }
        hash_len(hasher, self.allowances.len());
        for (owner, spenders) in &self.allowances {
            hasher.update(owner.as_bytes());
            hash_len(hasher, spenders.len());
            for (spender, amount) in spenders {
                hasher.update(spender.as_bytes());
                hasher.update(&amount.to_le_bytes());
            }
        }
    }
}

/// Length prefix for a collection in a state digest.
pub(crate) fn hash_len(hasher: &mut blake3::Hasher, len: usize) {
    hasher.update(&(len as u64).to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use panhandle_core::ErrorKind;

    fn addr(label: &str) -> Address {
        Address::from_seed(label)
    }

    fn funded(amount: u128) -> Bep20Ledger {
        let mut ledger = Bep20Ledger::new("Test", "TST", 18);
        ledger.mint(&addr("alice"), amount).unwrap();
        ledger
    }

    #[test]
    fn test_mint_increases_supply() {
        let ledger = funded(1_000);
        assert_eq!(ledger.total_supply(), 1_000);
        assert_eq!(ledger.balance_of(&addr("alice")), 1_000);
        assert_eq!(ledger.sum_of_balances(), 1_000);
    }

    #[test]
    fn test_mint_overflow_leaves_state() {
        let mut ledger = funded(u128::MAX);
        let err = ledger.mint(&addr("bob"), 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert_eq!(ledger.total_supply(), u128::MAX);
        assert_eq!(ledger.balance_of(&addr("bob")), 0);
    }

    #[test]
    fn test_mint_to_zero() {
        let mut ledger = funded(1);
        assert_eq!(
            ledger.mint(&Address::ZERO, 1).unwrap_err().reason(),
            ERR_MINT_TO_ZERO
        );
    }

    #[test]
    fn test_transfer_and_insufficient() {
        let mut ledger = funded(1_000);
        ledger.transfer(&addr("alice"), &addr("bob"), 400).unwrap();
        assert_eq!(ledger.balance_of(&addr("alice")), 600);
        assert_eq!(ledger.balance_of(&addr("bob")), 400);

        let err = ledger.transfer(&addr("alice"), &addr("bob"), 601).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        assert_eq!(ledger.balance_of(&addr("alice")), 600);
    }

    #[test]
    fn test_transfer_zero_addresses() {
        let mut ledger = funded(1_000);
        assert_eq!(
            ledger.transfer(&addr("alice"), &Address::ZERO, 1).unwrap_err().reason(),
            ERR_TRANSFER_TO_ZERO
        );
        assert_eq!(
            ledger.transfer(&Address::ZERO, &addr("bob"), 0).unwrap_err().reason(),
            ERR_TRANSFER_FROM_ZERO
        );
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let mut ledger = funded(1_000);
        ledger.transfer(&addr("alice"), &addr("alice"), 300).unwrap();
        assert_eq!(ledger.balance_of(&addr("alice")), 1_000);
    }

    #[test]
    fn test_move_balances_split() {
        let mut ledger = funded(1_000);
        ledger.events.take();
        ledger
            .move_balances(
                &addr("alice"),
                &[(Address::BURN, 10), (addr("pool"), 40), (addr("bob"), 950)],
            )
            .unwrap();
        assert_eq!(ledger.balance_of(&addr("alice")), 0);
        assert_eq!(ledger.balance_of(&Address::BURN), 10);
        assert_eq!(ledger.balance_of(&addr("pool")), 40);
        assert_eq!(ledger.balance_of(&addr("bob")), 950);
        assert_eq!(ledger.events.take().len(), 3);
        assert_eq!(ledger.sum_of_balances(), ledger.total_supply());
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let mut ledger = funded(1_000);
        ledger.approve(&addr("alice"), &addr("carol"), 500).unwrap();
        ledger
            .transfer_from(&addr("carol"), &addr("alice"), &addr("bob"), 200)
            .unwrap();
        assert_eq!(ledger.allowance(&addr("alice"), &addr("carol")), 300);

        let err = ledger
            .transfer_from(&addr("carol"), &addr("alice"), &addr("bob"), 301)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientAllowance);
        assert_eq!(ledger.balance_of(&addr("bob")), 200);
    }

    #[test]
    fn test_transfer_from_failed_move_keeps_allowance() {
        let mut ledger = funded(100);
        ledger.approve(&addr("alice"), &addr("carol"), 500).unwrap();
        assert!(ledger
            .transfer_from(&addr("carol"), &addr("alice"), &addr("bob"), 200)
            .is_err());
        assert_eq!(ledger.allowance(&addr("alice"), &addr("carol")), 500);
    }

    #[test]
    fn test_allowance_adjustments() {
        let mut ledger = funded(1);
        ledger.increase_allowance(&addr("alice"), &addr("carol"), 10).unwrap();
        ledger.increase_allowance(&addr("alice"), &addr("carol"), 5).unwrap();
        assert_eq!(ledger.allowance(&addr("alice"), &addr("carol")), 15);
        ledger.decrease_allowance(&addr("alice"), &addr("carol"), 15).unwrap();
        assert_eq!(ledger.allowance(&addr("alice"), &addr("carol")), 0);
        assert_eq!(
            ledger
                .decrease_allowance(&addr("alice"), &addr("carol"), 1)
                .unwrap_err()
                .reason(),
            ERR_ALLOWANCE_BELOW_ZERO
        );
        assert_eq!(
            ledger.approve(&addr("alice"), &Address::ZERO, 1).unwrap_err().reason(),
            ERR_APPROVE_TO_ZERO
        );
    }
}

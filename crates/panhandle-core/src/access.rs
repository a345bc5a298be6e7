// SPDX-License-Identifier: AGPL-3.0-only
//! # Access Control
//!
//! Two independent roles guard contract operations:
//! - **owner** ([`Ownable`]): set at construction, transferable only by the
//!   current owner. Guards minting and role management.
//! - **operator**: either a single transferable address ([`OperatorRole`],
//!   used by the token) or an owner-managed allow-list ([`OperatorSet`],
//!   used by the referral registry). Guards day-to-day tuning.
//!
//! Guards are explicit calls at the top of each state-changing operation;
//! they never mutate anything on failure.

use crate::address::Address;
use crate::error::{ContractError, ContractResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ERR_NOT_OWNER: &str = "Ownable: caller is not the owner";
pub const ERR_NEW_OWNER_ZERO: &str = "Ownable: new owner is the zero address";
/// Reason used by the single-operator role
pub const ERR_NOT_OPERATOR: &str = "operator: caller is not the operator";
/// Reason used by the operator allow-list
pub const ERR_NOT_LISTED_OPERATOR: &str = "Operator: caller is not the operator";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn only_owner(&self, caller: &Address) -> ContractResult<()> {
        if *caller != self.owner {
            return Err(ContractError::Unauthorized(ERR_NOT_OWNER.to_string()));
        }
        Ok(())
    }

    /// Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> ContractResult<Address> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(ContractError::InvalidArgument(
                ERR_NEW_OWNER_ZERO.to_string(),
            ));
        }
        let previous = std::mem::replace(&mut self.owner, new_owner);
        log::debug!("ownership transferred {} -> {}", previous, new_owner);
        Ok(previous)
    }

    /// Owner becomes the zero address; owner-only operations become unreachable.
    pub fn renounce_ownership(&mut self, caller: &Address) -> ContractResult<Address> {
        self.only_owner(caller)?;
        let previous = std::mem::replace(&mut self.owner, Address::ZERO);
        log::debug!("ownership renounced by {}", previous);
        Ok(previous)
    }
}

/// Single operator address, initialised to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorRole {
    operator: Address,
    /// Reason reported when the new operator is the zero address
    zero_reason: String,
}

impl OperatorRole {
    pub fn new(operator: Address, zero_reason: impl Into<String>) -> Self {
        Self {
            operator,
            zero_reason: zero_reason.into(),
        }
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    pub fn only_operator(&self, caller: &Address) -> ContractResult<()> {
        if *caller != self.operator {
            return Err(ContractError::Unauthorized(ERR_NOT_OPERATOR.to_string()));
        }
        Ok(())
    }

    /// Only the current operator may hand the role over. Returns the previous operator.
    pub fn transfer_operator(
        &mut self,
        caller: &Address,
        new_operator: Address,
    ) -> ContractResult<Address> {
        self.only_operator(caller)?;
        if new_operator.is_zero() {
            return Err(ContractError::InvalidArgument(self.zero_reason.clone()));
        }
        let previous = std::mem::replace(&mut self.operator, new_operator);
        log::debug!("operator transferred {} -> {}", previous, new_operator);
        Ok(previous)
    }
}

/// Owner-controlled allow-list of operators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSet {
    operators: BTreeSet<Address>,
}

impl OperatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_operator(&self, account: &Address) -> bool {
        self.operators.contains(account)
    }

    pub fn only_operator(&self, caller: &Address) -> ContractResult<()> {
        if !self.is_operator(caller) {
            return Err(ContractError::Unauthorized(
                ERR_NOT_LISTED_OPERATOR.to_string(),
            ));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.operators.iter()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Ownership is checked by the caller of this method.
    pub fn set(&mut self, account: Address, status: bool) {
        if status {
            self.operators.insert(account);
        } else {
            self.operators.remove(&account);
        }
    }
}

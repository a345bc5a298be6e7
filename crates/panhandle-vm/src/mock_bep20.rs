// SPDX-License-Identifier: AGPL-3.0-only
//! Plain BEP20 token with a fixed supply minted to its creator.
//! Stands in for LP tokens and other external tokens held by the locker.

use crate::bep20::{Bep20Action, Bep20Ledger, Fungible};
use crate::events::ContractEvent;
use panhandle_core::{Address, ContractResult};

#[derive(Debug, Clone)]
pub struct MockBep20 {
    address: Address,
    ledger: Bep20Ledger,
}

impl MockBep20 {
    pub fn new(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        supply: u128,
        creator: &Address,
    ) -> ContractResult<Self> {
        let mut ledger = Bep20Ledger::new(name, symbol, 18);
        ledger.mint(creator, supply)?;
        Ok(Self { address, ledger })
    }

    pub fn ledger(&self) -> &Bep20Ledger {
        &self.ledger
    }

    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: u128) -> ContractResult<()> {
        self.ledger.approve(caller, spender, amount)
    }

    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> ContractResult<()> {
        self.ledger.transfer_from(caller, from, to, amount)
    }

    pub fn execute(&mut self, caller: &Address, action: Bep20Action) -> ContractResult<()> {
        match action {
            Bep20Action::Transfer { to, amount } => self.ledger.transfer(caller, &to, amount),
            Bep20Action::Approve { spender, amount } => self.approve(caller, &spender, amount),
            Bep20Action::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, &from, &to, amount)
            }
            Bep20Action::IncreaseAllowance { spender, amount } => {
                self.ledger.increase_allowance(caller, &spender, amount)
            }
            Bep20Action::DecreaseAllowance { spender, amount } => {
                self.ledger.decrease_allowance(caller, &spender, amount)
            }
        }
    }

    pub fn take_events(&mut self) -> Vec<ContractEvent> {
        self.ledger.events.take()
    }

    pub(crate) fn digest_into(&self, hasher: &mut blake3::Hasher) {
        self.ledger.digest_into(hasher);
    }
}

impl Fungible for MockBep20 {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.ledger.balance_of(account)
    }

    fn transfer(&mut self, caller: &Address, to: &Address, amount: u128) -> ContractResult<()> {
        self.ledger.transfer(caller, to, amount)
    }
}

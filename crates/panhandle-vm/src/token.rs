// SPDX-License-Identifier: AGPL-3.0-only
//! # PANHANDLE Token
//!
//! BEP20 token with transfer tax, burn and anti-whale rate limiting.
//!
//! ## Transfer rules
//! ```text
//!   amount ──┬── excluded party or tax rate 0 ──────────────▶ recipient (amount)
//!            │
//!            └── taxed ── tax  = amount × transferTaxRate / 10_000
//!                         burn = tax × burnRate / 100         ──▶ 0x…dEaD
//!                         liq  = tax − burn                   ──▶ token contract
//!                         send = amount − tax                 ──▶ recipient
//! ```
//! A transfer where neither party is excluded from anti-whale must not move
//! more than `totalSupply × maxTransferAmountRate / 10_000`.
//!
//! ## Roles
//! - owner: `mint`, ownership transfer
//! - operator (starts as owner): rates, exclusions, swap settings, operator transfer

use crate::bep20::{hash_len, Bep20Action, Bep20Ledger, Fungible};
use crate::events::ContractEvent;
use panhandle_core::config::{
    check_burn_rate, check_max_transfer_amount_rate, check_transfer_tax_rate,
};
use panhandle_core::math::{bps_of, split_transfer, TaxSplit};
use panhandle_core::{
    u128_str, Address, ContractError, ContractResult, OperatorRole, Ownable, TokenConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ERR_ANTI_WHALE: &str =
    "PANHANDLE::antiWhale: Transfer amount exceeds the maxTransferAmount";
pub const ERR_OPERATOR_ZERO: &str =
    "PANHANDLE::transferOperator: new operator is the zero address";

/// State-changing calls accepted by the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TokenAction {
    Mint {
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
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
    UpdateTransferTaxRate {
        rate: u16,
    },
    UpdateBurnRate {
        rate: u16,
    },
    UpdateMaxTransferAmountRate {
        rate: u16,
    },
    SetExcludedFromAntiWhale {
        account: Address,
        excluded: bool,
    },
    UpdateSwapAndLiquifyEnabled {
        enabled: bool,
    },
    UpdateMinAmountToLiquify {
        #[serde(with = "u128_str")]
        amount: u128,
    },
    UpdateSwapRouter {
        router: Address,
    },
    TransferOperator {
        new_operator: Address,
    },
    TransferOwnership {
        new_owner: Address,
    },
    RenounceOwnership,
}

impl From<Bep20Action> for TokenAction {
    fn from(action: Bep20Action) -> Self {
        match action {
            Bep20Action::Transfer { to, amount } => TokenAction::Transfer { to, amount },
            Bep20Action::Approve { spender, amount } => TokenAction::Approve { spender, amount },
            Bep20Action::TransferFrom { from, to, amount } => {
                TokenAction::TransferFrom { from, to, amount }
            }
            Bep20Action::IncreaseAllowance { spender, amount } => {
                TokenAction::IncreaseAllowance { spender, amount }
            }
            Bep20Action::DecreaseAllowance { spender, amount } => {
                TokenAction::DecreaseAllowance { spender, amount }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PanhandleToken {
    address: Address,
    ledger: Bep20Ledger,
    ownable: Ownable,
    operator: OperatorRole,
    /// Basis points of each transfer (max 1000)
    transfer_tax_rate: u16,
    /// Percent of the tax that is burned (max 100)
    burn_rate: u16,
    /// Basis points of total supply per transfer (max 50)
    max_transfer_amount_rate: u16,
    excluded_from_anti_whale: BTreeSet<Address>,
    swap_and_liquify_enabled: bool,
    min_amount_to_liquify: u128,
    swap_router: Address,
}

impl PanhandleToken {
    /// Deploy the token at `address` with `owner` as both owner and operator.
    pub fn new(config: &TokenConfig, owner: Address, address: Address) -> ContractResult<Self> {
        config.validate()?;
        if owner.is_zero() {
            return Err(ContractError::InvalidArgument(
                "PANHANDLE: owner is the zero address".to_string(),
            ));
        }

        let excluded_from_anti_whale: BTreeSet<Address> =
            [owner, Address::ZERO, Address::BURN, address].into_iter().collect();

        Ok(Self {
            address,
            ledger: Bep20Ledger::new(config.name.clone(), config.symbol.clone(), config.decimals),
            ownable: Ownable::new(owner),
            operator: OperatorRole::new(owner, ERR_OPERATOR_ZERO),
            transfer_tax_rate: config.transfer_tax_rate,
            burn_rate: config.burn_rate,
            max_transfer_amount_rate: config.max_transfer_amount_rate,
            excluded_from_anti_whale,
            swap_and_liquify_enabled: config.swap_and_liquify_enabled,
            min_amount_to_liquify: config.min_amount_to_liquify,
            swap_router: Address::ZERO,
        })
    }

    // ── Read-only accessors ──

    pub fn ledger(&self) -> &Bep20Ledger {
        &self.ledger
    }

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub fn operator(&self) -> Address {
        self.operator.operator()
    }

    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.ledger.allowance(owner, spender)
    }

    pub fn transfer_tax_rate(&self) -> u16 {
        self.transfer_tax_rate
    }

    pub fn burn_rate(&self) -> u16 {
        self.burn_rate
    }

    pub fn max_transfer_amount_rate(&self) -> u16 {
        self.max_transfer_amount_rate
    }

    /// `floor(totalSupply × maxTransferAmountRate / 10_000)`
    pub fn max_transfer_amount(&self) -> u128 {
        // rate <= 50 bps, so the result is always below total supply
        bps_of(self.total_supply(), self.max_transfer_amount_rate as u128).unwrap_or(u128::MAX)
    }

    pub fn is_excluded_from_anti_whale(&self, account: &Address) -> bool {
        self.excluded_from_anti_whale.contains(account)
    }

    pub fn swap_and_liquify_enabled(&self) -> bool {
        self.swap_and_liquify_enabled
    }

    pub fn min_amount_to_liquify(&self) -> u128 {
        self.min_amount_to_liquify
    }

    /// Zero until an operator sets a router.
    pub fn swap_router(&self) -> Address {
        self.swap_router
    }

    /// Tokens sent to the burn sink so far.
    pub fn burned(&self) -> u128 {
        self.ledger.balance_of(&Address::BURN)
    }

    /// Split that a transfer of `amount` from `sender` to `recipient` would apply.
    pub fn preview_transfer(
        &self,
        sender: &Address,
        recipient: &Address,
        amount: u128,
    ) -> ContractResult<TaxSplit> {
        let exempt = self.is_excluded_from_anti_whale(sender)
            || self.is_excluded_from_anti_whale(recipient);
        if exempt || self.transfer_tax_rate == 0 {
            return Ok(TaxSplit::untaxed(amount));
        }
        split_transfer(amount, self.transfer_tax_rate, self.burn_rate)
    }

    // ── Owner ──

    pub fn mint(&mut self, caller: &Address, to: &Address, amount: u128) -> ContractResult<()> {
        self.ownable.only_owner(caller)?;
        self.ledger.mint(to, amount)?;
        log::debug!("minted {} to {} (supply {})", amount, to, self.total_supply());
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> ContractResult<()> {
        let previous_owner = self.ownable.transfer_ownership(caller, new_owner)?;
        self.ledger.events.emit(ContractEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    pub fn renounce_ownership(&mut self, caller: &Address) -> ContractResult<()> {
        let previous_owner = self.ownable.renounce_ownership(caller)?;
        self.ledger.events.emit(ContractEvent::OwnershipTransferred {
            previous_owner,
            new_owner: Address::ZERO,
        });
        Ok(())
    }

    // ── Transfers ──

    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: u128) -> ContractResult<()> {
        self.transfer_internal(caller, to, amount)
    }

    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: u128) -> ContractResult<()> {
        self.ledger.approve(caller, spender, amount)
    }

    /// Allowance is only spent if the transfer itself succeeds.
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> ContractResult<()> {
        let remaining = self.ledger.remaining_allowance(from, caller, amount)?;
        self.transfer_internal(from, to, amount)?;
        self.ledger.set_allowance(from, caller, remaining);
        Ok(())
    }

    fn transfer_internal(
        &mut self,
        sender: &Address,
        recipient: &Address,
        amount: u128,
    ) -> ContractResult<()> {
        self.check_anti_whale(sender, recipient, amount)?;
        let split = self.preview_transfer(sender, recipient, amount)?;
        if !split.is_taxed() {
            return self.ledger.transfer(sender, recipient, amount);
        }
        log::debug!(
            "taxed transfer {} -> {}: amount={} burn={} liquidity={} send={}",
            sender,
            recipient,
            amount,
            split.burn,
            split.liquidity,
            split.send
        );
        self.ledger.move_balances(
            sender,
            &[
                (Address::BURN, split.burn),
                (self.address, split.liquidity),
                (*recipient, split.send),
            ],
        )
    }

    fn check_anti_whale(&self, sender: &Address, recipient: &Address, amount: u128) -> ContractResult<()> {
        if self.is_excluded_from_anti_whale(sender) || self.is_excluded_from_anti_whale(recipient) {
            return Ok(());
        }
        if amount > self.max_transfer_amount() {
            return Err(ContractError::ExceedsLimit(ERR_ANTI_WHALE.to_string()));
        }
        Ok(())
    }

    // ── Operator ──

    pub fn update_transfer_tax_rate(&mut self, caller: &Address, rate: u16) -> ContractResult<()> {
        self.operator.only_operator(caller)?;
        check_transfer_tax_rate(rate)?;
        let previous_rate = std::mem::replace(&mut self.transfer_tax_rate, rate);
        self.ledger.events.emit(ContractEvent::TransferTaxRateUpdated {
            operator: *caller,
            previous_rate,
            new_rate: rate,
        });
        Ok(())
    }

    pub fn update_burn_rate(&mut self, caller: &Address, rate: u16) -> ContractResult<()> {
        self.operator.only_operator(caller)?;
        check_burn_rate(rate)?;
        let previous_rate = std::mem::replace(&mut self.burn_rate, rate);
        self.ledger.events.emit(ContractEvent::BurnRateUpdated {
            operator: *caller,
            previous_rate,
            new_rate: rate,
        });
        Ok(())
    }

    pub fn update_max_transfer_amount_rate(&mut self, caller: &Address, rate: u16) -> ContractResult<()> {
        self.operator.only_operator(caller)?;
        check_max_transfer_amount_rate(rate)?;
        let previous_rate = std::mem::replace(&mut self.max_transfer_amount_rate, rate);
        self.ledger
            .events
            .emit(ContractEvent::MaxTransferAmountRateUpdated {
                operator: *caller,
                previous_rate,
                new_rate: rate,
            });
        Ok(())
    }

    pub fn set_excluded_from_anti_whale(
        &mut self,
        caller: &Address,
        account: Address,
        excluded: bool,
    ) -> ContractResult<()> {
        self.operator.only_operator(caller)?;
        if excluded {
            self.excluded_from_anti_whale.insert(account);
        } else {
            self.excluded_from_anti_whale.remove(&account);
        }
        self.ledger
            .events
            .emit(ContractEvent::ExcludedFromAntiWhaleUpdated { account, excluded });
        Ok(())
    }

    pub fn update_swap_and_liquify_enabled(&mut self, caller: &Address, enabled: bool) -> ContractResult<()> {
        self.operator.only_operator(caller)?;
        self.swap_and_liquify_enabled = enabled;
        self.ledger
            .events
            .emit(ContractEvent::SwapAndLiquifyEnabledUpdated {
                operator: *caller,
                enabled,
            });
        Ok(())
    }

    pub fn update_min_amount_to_liquify(&mut self, caller: &Address, amount: u128) -> ContractResult<()> {
        self.operator.only_operator(caller)?;
        let previous_amount = std::mem::replace(&mut self.min_amount_to_liquify, amount);
        self.ledger.events.emit(ContractEvent::MinAmountToLiquifyUpdated {
            operator: *caller,
            previous_amount,
            new_amount: amount,
        });
        Ok(())
    }

    /// Stores the router address only; liquidity conversion is not performed.
    pub fn update_swap_router(&mut self, caller: &Address, router: Address) -> ContractResult<()> {
        self.operator.only_operator(caller)?;
        self.swap_router = router;
        self.ledger.events.emit(ContractEvent::SwapRouterUpdated {
            operator: *caller,
            router,
        });
        Ok(())
    }

    pub fn transfer_operator(&mut self, caller: &Address, new_operator: Address) -> ContractResult<()> {
        let previous_operator = self.operator.transfer_operator(caller, new_operator)?;
        self.ledger.events.emit(ContractEvent::OperatorTransferred {
            previous_operator,
            new_operator,
        });
        Ok(())
    }

    /// Dispatch a decoded call.
    pub fn execute(&mut self, caller: &Address, action: TokenAction) -> ContractResult<()> {
        match action {
            TokenAction::Mint { to, amount } => self.mint(caller, &to, amount),
            TokenAction::Transfer { to, amount } => self.transfer(caller, &to, amount),
            TokenAction::Approve { spender, amount } => self.approve(caller, &spender, amount),
            TokenAction::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, &from, &to, amount)
            }
            TokenAction::IncreaseAllowance { spender, amount } => {
                self.ledger.increase_allowance(caller, &spender, amount)
            }
            TokenAction::DecreaseAllowance { spender, amount } => {
                self.ledger.decrease_allowance(caller, &spender, amount)
            }
            TokenAction::UpdateTransferTaxRate { rate } => self.update_transfer_tax_rate(caller, rate),
            TokenAction::UpdateBurnRate { rate } => self.update_burn_rate(caller, rate),
            TokenAction::UpdateMaxTransferAmountRate { rate } => {
                self.update_max_transfer_amount_rate(caller, rate)
            }
            TokenAction::SetExcludedFromAntiWhale { account, excluded } => {
                self.set_excluded_from_anti_whale(caller, account, excluded)
            }
            TokenAction::UpdateSwapAndLiquifyEnabled { enabled } => {
                self.update_swap_and_liquify_enabled(caller, enabled)
            }
            TokenAction::UpdateMinAmountToLiquify { amount } => {
                self.update_min_amount_to_liquify(caller, amount)
            }
            TokenAction::UpdateSwapRouter { router } => self.update_swap_router(caller, router),
            TokenAction::TransferOperator { new_operator } => {
                self.transfer_operator(caller, new_operator)
            }
            TokenAction::TransferOwnership { new_owner } => self.transfer_ownership(caller, new_owner),
            TokenAction::RenounceOwnership => self.renounce_ownership(caller),
        }
    }

    pub fn take_events(&mut self) -> Vec<ContractEvent> {
        self.ledger.events.take()
    }

    pub(crate) fn digest_into(&self, hasher: &mut blake3::Hasher) {
        self.ledger.digest_into(hasher);
        hasher.update(self.owner().as_bytes());
        hasher.update(self.operator().as_bytes());
        hasher.update(&self.transfer_tax_rate.to_le_bytes());
        hasher.update(&self.burn_rate.to_le_bytes());
        hasher.update(&self.max_transfer_amount_rate.to_le_bytes());
        hash_len(hasher, self.excluded_from_anti_whale.len());
        for account in &self.excluded_from_anti_whale {
            hasher.update(account.as_bytes());
        }
        hasher.update(&[self.swap_and_liquify_enabled as u8]);
        hasher.update(&self.min_amount_to_liquify.to_le_bytes());
        hasher.update(self.swap_router.as_bytes());
    }
}

impl Fungible for PanhandleToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.ledger.balance_of(account)
    }

    fn transfer(&mut self, caller: &Address, to: &Address, amount: u128) -> ContractResult<()> {
        self.transfer_internal(caller, to, amount)
    }
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────

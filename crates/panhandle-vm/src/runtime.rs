// SPDX-License-Identifier: AGPL-3.0-only
//! # Runtime
//!
//! In-process execution environment hosting every deployed contract.
//!
//! Each `execute` runs against a snapshot of the contract table. On error
//! the snapshot is restored and the pending events are dropped, so a failed
//! invocation leaves no trace. On success the events are appended to the
//! runtime's log tagged with the emitting contract and the call index.

use crate::bep20::{Bep20Action, Bep20Ledger, Fungible};
use crate::events::{ContractEvent, LoggedEvent};
use crate::locker::{LockerAction, PanhandleLocker};
use crate::mock_bep20::MockBep20;
use crate::referral::{PanhandleReferral, ReferralAction};
use crate::token::{PanhandleToken, TokenAction};
use panhandle_core::{Address, ContractError, TokenConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    Token,
    Referral,
    Locker,
    MockBep20,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContractKind::Token => "token",
            ContractKind::Referral => "referral",
            ContractKind::Locker => "locker",
            ContractKind::MockBep20 => "mock_bep20",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum VmError {
    #[error("no contract deployed at {0}")]
    UnknownContract(Address),
    #[error("{kind} contract at {contract} does not accept {action} actions")]
    ActionMismatch {
        contract: Address,
        kind: ContractKind,
        action: &'static str,
    },
    #[error("{kind} contract does not answer {query}")]
    UnsupportedQuery { kind: ContractKind, query: String },
    #[error("contract at {0} is not a fungible token")]
    NotFungible(Address),
    #[error("malformed call: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl VmError {
    /// Revert reason for contract failures, the full message otherwise.
    pub fn reason(&self) -> String {
        match self {
            VmError::Contract(e) => e.reason().to_string(),
            other => other.to_string(),
        }
    }
}

/// A deployed contract instance.
#[derive(Debug, Clone)]
pub enum Contract {
    Token(PanhandleToken),
    Referral(PanhandleReferral),
    Locker(PanhandleLocker),
    MockBep20(MockBep20),
}

impl Contract {
    pub fn kind(&self) -> ContractKind {
        match self {
            Contract::Token(_) => ContractKind::Token,
            Contract::Referral(_) => ContractKind::Referral,
            Contract::Locker(_) => ContractKind::Locker,
            Contract::MockBep20(_) => ContractKind::MockBep20,
        }
    }

    fn ledger(&self) -> Option<&Bep20Ledger> {
        match self {
            Contract::Token(t) => Some(t.ledger()),
            Contract::MockBep20(m) => Some(m.ledger()),
            _ => None,
        }
    }

    fn as_fungible_mut(&mut self) -> Option<&mut dyn Fungible> {
        match self {
            Contract::Token(t) => Some(t),
            Contract::MockBep20(m) => Some(m),
            _ => None,
        }
    }

    fn take_events(&mut self) -> Vec<ContractEvent> {
        match self {
            Contract::Token(t) => t.take_events(),
            Contract::Referral(r) => r.take_events(),
            Contract::Locker(l) => l.take_events(),
            Contract::MockBep20(m) => m.take_events(),
        }
    }

    fn digest_into(&self, hasher: &mut blake3::Hasher) {
        match self {
            Contract::Token(t) => t.digest_into(hasher),
            Contract::Referral(r) => r.digest_into(hasher),
            Contract::Locker(l) => l.digest_into(hasher),
            Contract::MockBep20(m) => m.digest_into(hasher),
        }
    }
}

/// A state-changing call, keyed by the contract family it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Token(TokenAction),
    Referral(ReferralAction),
    Locker(LockerAction),
    /// Plain BEP20 calls, accepted by the token and the mock BEP20
    Bep20(Bep20Action),
}

impl Action {
    fn family(&self) -> &'static str {
        match self {
            Action::Token(_) => "token",
            Action::Referral(_) => "referral",
            Action::Locker(_) => "locker",
            Action::Bep20(_) => "bep20",
        }
    }
}

/// Read-only accessors. Answers are rendered as decimal integers, lowercase
/// `0x` addresses or `true`/`false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Query {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    BalanceOf { account: Address },
    Allowance { owner: Address, spender: Address },
    Owner,
    Operator,
    TransferTaxRate,
    BurnRate,
    MaxTransferAmountRate,
    MaxTransferAmount,
    IsExcludedFromAntiWhale { account: Address },
    SwapAndLiquifyEnabled,
    MinAmountToLiquify,
    SwapRouter,
    Burned,
    Operators { account: Address },
    ReferrerOf { user: Address },
    ReferralsCount { referrer: Address },
    TotalReferralCommissions { referrer: Address },
}

/// Execution environment holding every deployed contract.
#[derive(Debug, Default)]
pub struct Runtime {
    contracts: BTreeMap<Address, Contract>,
    /// Deployments made by each address, feeds contract address derivation
    nonce: BTreeMap<Address, u64>,
    events: Vec<LoggedEvent>,
    call_count: u64,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Deployment ──

    pub fn deploy_token(&mut self, owner: &Address, config: &TokenConfig) -> Result<Address, VmError> {
        let address = self.next_address(owner);
        let token = PanhandleToken::new(config, *owner, address)?;
        self.install(owner, address, Contract::Token(token));
        Ok(address)
    }

    pub fn deploy_referral(&mut self, owner: &Address) -> Result<Address, VmError> {
        let address = self.next_address(owner);
        self.install(owner, address, Contract::Referral(PanhandleReferral::new(*owner)));
        Ok(address)
    }

    pub fn deploy_locker(&mut self, owner: &Address) -> Result<Address, VmError> {
        let address = self.next_address(owner);
        self.install(owner, address, Contract::Locker(PanhandleLocker::new(*owner, address)));
        Ok(address)
    }

    /// Fixed-supply BEP20 with the whole supply minted to `creator`.
    pub fn deploy_mock_bep20(
        &mut self,
        creator: &Address,
        name: &str,
        symbol: &str,
        supply: u128,
    ) -> Result<Address, VmError> {
        let address = self.next_address(creator);
        let mock = MockBep20::new(address, name, symbol, supply, creator)?;
        self.install(creator, address, Contract::MockBep20(mock));
        Ok(address)
    }

    /// Address the next deployment by `deployer` will receive.
    fn next_address(&self, deployer: &Address) -> Address {
        let nonce = self.nonce.get(deployer).copied().unwrap_or(0);
        Address::for_contract(deployer, nonce)
    }

    fn install(&mut self, deployer: &Address, address: Address, contract: Contract) {
        log::info!("{} deployed {} contract at {}", deployer, contract.kind(), address);
        *self.nonce.entry(*deployer).or_insert(0) += 1;
        self.contracts.insert(address, contract);
        self.commit(&[address]);
    }

    // ── Execution ──

    /// Run one invocation. Either every effect is applied or none is.
    pub fn execute(&mut self, caller: &Address, contract: &Address, action: Action) -> Result<(), VmError> {
        let snapshot = self.contracts.clone();
        match self.dispatch(caller, contract, action) {
            Ok(touched) => {
                self.commit(&touched);
                Ok(())
            }
            Err(e) => {
                log::warn!("call from {} to {} reverted: {}", caller, contract, e);
                self.contracts = snapshot;
                Err(e)
            }
        }
    }

    /// Decode a JSON call for whatever contract lives at `contract`.
    pub fn decode_action(&self, contract: &Address, call: serde_json::Value) -> Result<Action, VmError> {
        Ok(match self.contract(contract)? {
            Contract::Token(_) => Action::Token(serde_json::from_value(call)?),
            Contract::Referral(_) => Action::Referral(serde_json::from_value(call)?),
            Contract::Locker(_) => Action::Locker(serde_json::from_value(call)?),
            Contract::MockBep20(_) => Action::Bep20(serde_json::from_value(call)?),
        })
    }

    /// Returns the contracts whose events must be committed, in emission order.
    fn dispatch(&mut self, caller: &Address, contract: &Address, action: Action) -> Result<Vec<Address>, VmError> {
        if let Action::Locker(LockerAction::Unlock { token, recipient }) = action {
            return self.unlock(caller, contract, token, recipient);
        }

        let target = self
            .contracts
            .get_mut(contract)
            .ok_or(VmError::UnknownContract(*contract))?;
        match (target, action) {
            (Contract::Token(t), Action::Token(a)) => t.execute(caller, a)?,
            (Contract::Token(t), Action::Bep20(a)) => t.execute(caller, a.into())?,
            (Contract::MockBep20(m), Action::Bep20(a)) => m.execute(caller, a)?,
            (Contract::Referral(r), Action::Referral(a)) => r.execute(caller, a)?,
            (Contract::Locker(l), Action::Locker(LockerAction::TransferOwnership { new_owner })) => {
                l.transfer_ownership(caller, new_owner)?
            }
            (Contract::Locker(l), Action::Locker(LockerAction::RenounceOwnership)) => {
                l.renounce_ownership(caller)?
            }
            (target, action) => {
                return Err(VmError::ActionMismatch {
                    contract: *contract,
                    kind: target.kind(),
                    action: action.family(),
                })
            }
        }
        Ok(vec![*contract])
    }

    fn unlock(
        &mut self,
        caller: &Address,
        locker: &Address,
        token: Address,
        recipient: Address,
    ) -> Result<Vec<Address>, VmError> {
        match self.contracts.get(locker) {
            Some(Contract::Locker(_)) => {}
            Some(other) => {
                return Err(VmError::ActionMismatch {
                    contract: *locker,
                    kind: other.kind(),
                    action: "locker",
                })
            }
            None => return Err(VmError::UnknownContract(*locker)),
        }

        // Take the token out of the table so both contracts can be borrowed mutably.
        let mut held = self
            .contracts
            .remove(&token)
            .ok_or(VmError::UnknownContract(token))?;
        let result = match (self.contracts.get_mut(locker), held.as_fungible_mut()) {
            (Some(Contract::Locker(l)), Some(fungible)) => l
                .unlock(caller, fungible, &recipient)
                .map_err(VmError::from),
            // includes token == locker, where the table no longer holds the locker
            _ => Err(VmError::NotFungible(token)),
        };
        self.contracts.insert(token, held);
        result.map(|_| vec![token, *locker])
    }

    fn commit(&mut self, touched: &[Address]) {
        let call_index = self.call_count;
        self.call_count += 1;
        for address in touched {
            if let Some(contract) = self.contracts.get_mut(address) {
                for event in contract.take_events() {
                    log::debug!("#{} {} {:?}", call_index, address, event);
                    self.events.push(LoggedEvent {
                        contract: *address,
                        call_index,
                        event,
                    });
                }
            }
        }
    }

    // ── Queries ──

    pub fn query(&self, contract: &Address, query: &Query) -> Result<String, VmError> {
        let target = self.contract(contract)?;

        if let Some(ledger) = target.ledger() {
            let answer = match query {
                Query::Name => Some(ledger.name().to_string()),
                Query::Symbol => Some(ledger.symbol().to_string()),
                Query::Decimals => Some(ledger.decimals().to_string()),
                Query::TotalSupply => Some(ledger.total_supply().to_string()),
                Query::BalanceOf { account } => Some(ledger.balance_of(account).to_string()),
                Query::Allowance { owner, spender } => Some(ledger.allowance(owner, spender).to_string()),
                _ => None,
            };
            if let Some(answer) = answer {
                return Ok(answer);
            }
        }

        let answer = match (target, query) {
            (Contract::Token(t), Query::Owner) => t.owner().to_string(),
            (Contract::Token(t), Query::Operator) => t.operator().to_string(),
            (Contract::Token(t), Query::TransferTaxRate) => t.transfer_tax_rate().to_string(),
            (Contract::Token(t), Query::BurnRate) => t.burn_rate().to_string(),
            (Contract::Token(t), Query::MaxTransferAmountRate) => t.max_transfer_amount_rate().to_string(),
            (Contract::Token(t), Query::MaxTransferAmount) => t.max_transfer_amount().to_string(),
            (Contract::Token(t), Query::IsExcludedFromAntiWhale { account }) => {
                t.is_excluded_from_anti_whale(account).to_string()
            }
            (Contract::Token(t), Query::SwapAndLiquifyEnabled) => t.swap_and_liquify_enabled().to_string(),
            (Contract::Token(t), Query::MinAmountToLiquify) => t.min_amount_to_liquify().to_string(),
            (Contract::Token(t), Query::SwapRouter) => t.swap_router().to_string(),
            (Contract::Token(t), Query::Burned) => t.burned().to_string(),
            (Contract::Referral(r), Query::Owner) => r.owner().to_string(),
            (Contract::Referral(r), Query::Operators { account }) => r.operators(account).to_string(),
            (Contract::Referral(r), Query::ReferrerOf { user }) => r.referrer_of(user).to_string(),
            (Contract::Referral(r), Query::ReferralsCount { referrer }) => {
                r.referrals_count(referrer).to_string()
            }
            (Contract::Referral(r), Query::TotalReferralCommissions { referrer }) => {
                r.total_referral_commissions(referrer).to_string()
            }
            (Contract::Locker(l), Query::Owner) => l.owner().to_string(),
            (target, query) => {
                return Err(VmError::UnsupportedQuery {
                    kind: target.kind(),
                    query: format!("{:?}", query),
                })
            }
        };
        Ok(answer)
    }

    // ── Inspection ──

    pub fn contract(&self, address: &Address) -> Result<&Contract, VmError> {
        self.contracts
            .get(address)
            .ok_or(VmError::UnknownContract(*address))
    }

    pub fn token(&self, address: &Address) -> Option<&PanhandleToken> {
        match self.contracts.get(address) {
            Some(Contract::Token(t)) => Some(t),
            _ => None,
        }
    }

    pub fn referral(&self, address: &Address) -> Option<&PanhandleReferral> {
        match self.contracts.get(address) {
            Some(Contract::Referral(r)) => Some(r),
            _ => None,
        }
    }

    pub fn locker(&self, address: &Address) -> Option<&PanhandleLocker> {
        match self.contracts.get(address) {
            Some(Contract::Locker(l)) => Some(l),
            _ => None,
        }
    }

    pub fn mock_bep20(&self, address: &Address) -> Option<&MockBep20> {
        match self.contracts.get(address) {
            Some(Contract::MockBep20(m)) => Some(m),
            _ => None,
        }
    }

    /// Deployed contracts in address order.
    pub fn contracts(&self) -> impl Iterator<Item = (&Address, ContractKind)> {
        self.contracts.iter().map(|(a, c)| (a, c.kind()))
    }

    /// Committed events in emission order.
    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    /// Committed invocations, deployments included.
    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    /// blake3 over every contract's state, hex encoded.
    pub fn state_digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (address, contract) in &self.contracts {
            hasher.update(address.as_bytes());
            hasher.update(contract.kind().to_string().as_bytes());
            contract.digest_into(&mut hasher);
        }
        hex::encode(hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ERR_ANTI_WHALE;
    use panhandle_core::access::ERR_NOT_OWNER;

    fn addr(label: &str) -> Address {
        Address::from_seed(label)
    }

    fn runtime_with_token() -> (Runtime, Address) {
        let mut rt = Runtime::new();
        let token = rt.deploy_token(&addr("owner"), &TokenConfig::default()).unwrap();
        (rt, token)
    }

    #[test]
    fn test_deploy_addresses_are_distinct() {
        let mut rt = Runtime::new();
        let owner = addr("owner");
        let a = rt.deploy_referral(&owner).unwrap();
        let b = rt.deploy_referral(&owner).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, Address::for_contract(&owner, 0));
        assert_eq!(b, Address::for_contract(&owner, 1));
        assert_eq!(rt.contracts().count(), 2);
    }

    #[test]
    fn test_failed_call_rolls_back() {
        let (mut rt, token) = runtime_with_token();
        let (owner, alice, bob) = (addr("owner"), addr("alice"), addr("bob"));
        for who in [alice, bob] {
            rt.execute(&owner, &token, Action::Token(TokenAction::Mint { to: who, amount: 10_000 }))
                .unwrap();
        }
        let before = rt.state_digest();
        let events_before = rt.events().len();

        let err = rt
            .execute(&alice, &token, Action::Token(TokenAction::Transfer { to: bob, amount: 101 }))
            .unwrap_err();
        assert_eq!(err.reason(), ERR_ANTI_WHALE);
        assert_eq!(rt.state_digest(), before);
        assert_eq!(rt.events().len(), events_before);

        rt.execute(&alice, &token, Action::Token(TokenAction::Transfer { to: bob, amount: 100 }))
            .unwrap();
        assert_ne!(rt.state_digest(), before);
        assert_eq!(rt.query(&token, &Query::BalanceOf { account: bob }).unwrap(), "10095");
    }

    #[test]
    fn test_events_logged_with_call_index() {
        let (mut rt, token) = runtime_with_token();
        let owner = addr("owner");
        rt.execute(&owner, &token, Action::Token(TokenAction::Mint { to: owner, amount: 5 }))
            .unwrap();
        let last = rt.events().last().unwrap();
        assert_eq!(last.contract, token);
        assert_eq!(last.call_index, rt.call_count() - 1);
        assert_eq!(
            last.event,
            ContractEvent::Transfer { from: Address::ZERO, to: owner, amount: 5 }
        );
    }

    #[test]
    fn test_action_mismatch() {
        let mut rt = Runtime::new();
        let referral = rt.deploy_referral(&addr("owner")).unwrap();
        let err = rt
            .execute(
                &addr("owner"),
                &referral,
                Action::Bep20(Bep20Action::Transfer { to: addr("bob"), amount: 1 }),
            )
            .unwrap_err();
        assert!(matches!(err, VmError::ActionMismatch { kind: ContractKind::Referral, .. }));
    }

    #[test]
    fn test_unknown_contract() {
        let mut rt = Runtime::new();
        let err = rt
            .execute(&addr("a"), &addr("nowhere"), Action::Locker(LockerAction::RenounceOwnership))
            .unwrap_err();
        assert!(matches!(err, VmError::UnknownContract(_)));
        assert!(rt.query(&addr("nowhere"), &Query::Owner).is_err());
    }

    #[test]
    fn test_unlock_through_runtime() {
        let mut rt = Runtime::new();
        let owner = addr("owner");
        let lp = rt.deploy_mock_bep20(&owner, "LPToken", "LP1", 1_000_000).unwrap();
        let locker = rt.deploy_locker(&owner).unwrap();
        rt.execute(&owner, &lp, Action::Bep20(Bep20Action::Transfer { to: locker, amount: 2_000 }))
            .unwrap();

        let unlock = |recipient| Action::Locker(LockerAction::Unlock { token: lp, recipient });
        let err = rt.execute(&addr("bob"), &locker, unlock(addr("bob"))).unwrap_err();
        assert_eq!(err.reason(), ERR_NOT_OWNER);
        assert_eq!(rt.query(&lp, &Query::BalanceOf { account: locker }).unwrap(), "2000");

        rt.execute(&owner, &locker, unlock(addr("carol"))).unwrap();
        assert_eq!(rt.query(&lp, &Query::BalanceOf { account: addr("carol") }).unwrap(), "2000");
        assert_eq!(rt.query(&lp, &Query::BalanceOf { account: locker }).unwrap(), "0");

        let tail: Vec<_> = rt.events().iter().rev().take(2).map(|e| e.contract).collect();
        assert_eq!(tail, vec![locker, lp]);
    }

    #[test]
    fn test_unlock_unknown_or_non_fungible_token() {
        let mut rt = Runtime::new();
        let owner = addr("owner");
        let locker = rt.deploy_locker(&owner).unwrap();
        let referral = rt.deploy_referral(&owner).unwrap();
        let before = rt.state_digest();

        let err = rt
            .execute(&owner, &locker, Action::Locker(LockerAction::Unlock { token: addr("x"), recipient: owner }))
            .unwrap_err();
        assert!(matches!(err, VmError::UnknownContract(_)));

        let err = rt
            .execute(&owner, &locker, Action::Locker(LockerAction::Unlock { token: referral, recipient: owner }))
            .unwrap_err();
        assert!(matches!(err, VmError::NotFungible(_)));

        let err = rt
            .execute(&owner, &locker, Action::Locker(LockerAction::Unlock { token: locker, recipient: owner }))
            .unwrap_err();
        assert!(matches!(err, VmError::NotFungible(_)));
        assert_eq!(rt.state_digest(), before);
        assert!(rt.locker(&locker).is_some());
    }

    #[test]
    fn test_query_rendering() {
        let (rt, token) = runtime_with_token();
        assert_eq!(rt.query(&token, &Query::Owner).unwrap(), addr("owner").to_string());
        assert_eq!(rt.query(&token, &Query::SwapAndLiquifyEnabled).unwrap(), "false");
        assert_eq!(rt.query(&token, &Query::MinAmountToLiquify).unwrap(), "500000000000000000000");
        assert_eq!(rt.query(&token, &Query::Decimals).unwrap(), "18");
        assert_eq!(
            rt.query(&token, &Query::IsExcludedFromAntiWhale { account: token }).unwrap(),
            "true"
        );
        let err = rt.query(&token, &Query::ReferralsCount { referrer: addr("x") }).unwrap_err();
        assert!(matches!(err, VmError::UnsupportedQuery { kind: ContractKind::Token, .. }));
    }

    #[test]
    fn test_decode_action_by_contract_kind() {
        let (rt, token) = runtime_with_token();
        let call = serde_json::json!({ "action": "update_burn_rate", "rate": 30 });
        assert_eq!(
            rt.decode_action(&token, call).unwrap(),
            Action::Token(TokenAction::UpdateBurnRate { rate: 30 })
        );
        let bad = serde_json::json!({ "action": "record_referral" });
        assert!(matches!(rt.decode_action(&token, bad), Err(VmError::Decode(_))));
    }

    #[test]
    fn test_bep20_action_on_token_applies_tax() {
        let (mut rt, token) = runtime_with_token();
        let (owner, alice, bob) = (addr("owner"), addr("alice"), addr("bob"));
        rt.execute(&owner, &token, Action::Token(TokenAction::Mint { to: alice, amount: 10_000_000 }))
            .unwrap();
        rt.execute(&alice, &token, Action::Bep20(Bep20Action::Transfer { to: bob, amount: 12_345 }))
            .unwrap();
        assert_eq!(rt.query(&token, &Query::BalanceOf { account: bob }).unwrap(), "11728");
        assert_eq!(rt.query(&token, &Query::Burned).unwrap(), "123");
    }
}

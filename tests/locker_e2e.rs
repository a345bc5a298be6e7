// ============================================================================
// E2E LOCKER TEST
// ============================================================================
//
// Test Scenarios:
//   1. Only the owner can unlock; unlock sweeps the whole balance
//   2. Locking PANHANDLE tokens: the locker is not anti-whale excluded, so
//      the unlock is capped and taxed like any other transfer
//   3. Ownership transfer moves the unlock right
//
// Run:
//   cargo test --test locker_e2e
//
// ============================================================================

use panhandle_core::{Address, TokenConfig};
use panhandle_vm::{
    Action, Bep20Action, ContractEvent, LockerAction, Query, Runtime, TokenAction,
};

fn who(label: &str) -> Address {
    Address::from_seed(label)
}

fn balance(rt: &Runtime, token: &Address, account: Address) -> String {
    rt.query(token, &Query::BalanceOf { account }).unwrap()
}

fn unlock(token: Address, recipient: Address) -> Action {
    Action::Locker(LockerAction::Unlock { token, recipient })
}

// ============================================================================
// TEST 1: OWNER-ONLY SWEEP
// ============================================================================
#[test]
fn test_only_owner() {
    let mut rt = Runtime::new();
    let owner = who("owner");
    let lp1 = rt.deploy_mock_bep20(&owner, "LPToken", "LP1", 1_000_000).unwrap();
    let locker = rt.deploy_locker(&owner).unwrap();
    assert_eq!(rt.query(&locker, &Query::Owner).unwrap(), owner.to_string());

    rt.execute(&owner, &lp1, Action::Bep20(Bep20Action::Transfer { to: locker, amount: 2_000 }))
        .unwrap();
    assert_eq!(balance(&rt, &lp1, locker), "2000");

    let err = rt.execute(&who("bob"), &locker, unlock(lp1, who("bob"))).unwrap_err();
    assert_eq!(err.reason(), "Ownable: caller is not the owner");

    rt.execute(&owner, &locker, unlock(lp1, who("carol"))).unwrap();
    assert_eq!(balance(&rt, &lp1, who("carol")), "2000");
    assert_eq!(balance(&rt, &lp1, locker), "0");

    let last = rt.events().last().unwrap();
    assert_eq!(last.contract, locker);
    assert_eq!(
        last.event,
        ContractEvent::Unlocked { token: lp1, recipient: who("carol"), amount: 2_000 }
    );
}

#[test]
fn test_unlock_to_zero_reverts() {
    let mut rt = Runtime::new();
    let owner = who("owner");
    let lp1 = rt.deploy_mock_bep20(&owner, "LPToken", "LP1", 1_000).unwrap();
    let locker = rt.deploy_locker(&owner).unwrap();
    rt.execute(&owner, &lp1, Action::Bep20(Bep20Action::Transfer { to: locker, amount: 10 }))
        .unwrap();

    let err = rt.execute(&owner, &locker, unlock(lp1, Address::ZERO)).unwrap_err();
    assert_eq!(err.reason(), "BEP20: transfer to the zero address");
    assert_eq!(balance(&rt, &lp1, locker), "10");
}

// ============================================================================
// TEST 2: LOCKING THE PANHANDLE TOKEN
// ============================================================================
#[test]
fn test_locked_panhandle_unlock_is_taxed_and_capped() {
    let mut rt = Runtime::new();
    let owner = who("owner");
    let token = rt.deploy_token(&owner, &TokenConfig::default()).unwrap();
    let locker = rt.deploy_locker(&owner).unwrap();
    rt.execute(&owner, &token, Action::Token(TokenAction::Mint { to: owner, amount: 1_000_000 }))
        .unwrap();
    // owner is excluded, so locking is untaxed and uncapped
    rt.execute(&owner, &token, Action::Token(TokenAction::Transfer { to: locker, amount: 10_000 }))
        .unwrap();
    assert_eq!(balance(&rt, &token, locker), "10000");

    // cap is 5000 and neither the locker nor carol is excluded
    let err = rt.execute(&owner, &locker, unlock(token, who("carol"))).unwrap_err();
    assert_eq!(
        err.reason(),
        "PANHANDLE::antiWhale: Transfer amount exceeds the maxTransferAmount"
    );
    assert_eq!(balance(&rt, &token, locker), "10000");

    rt.execute(
        &owner,
        &token,
        Action::Token(TokenAction::SetExcludedFromAntiWhale { account: locker, excluded: true }),
    )
    .unwrap();
    rt.execute(&owner, &locker, unlock(token, who("carol"))).unwrap();
    // excluded sender also skips the tax
    assert_eq!(balance(&rt, &token, who("carol")), "10000");
    assert_eq!(balance(&rt, &token, locker), "0");
}

// ============================================================================
// TEST 3: OWNERSHIP
// ============================================================================
#[test]
fn test_transfer_ownership_moves_unlock_right() {
    let mut rt = Runtime::new();
    let owner = who("owner");
    let lp1 = rt.deploy_mock_bep20(&owner, "LPToken", "LP1", 100).unwrap();
    let locker = rt.deploy_locker(&owner).unwrap();
    rt.execute(&owner, &lp1, Action::Bep20(Bep20Action::Transfer { to: locker, amount: 100 }))
        .unwrap();

    rt.execute(
        &owner,
        &locker,
        Action::Locker(LockerAction::TransferOwnership { new_owner: who("dao") }),
    )
    .unwrap();
    assert!(rt.execute(&owner, &locker, unlock(lp1, owner)).is_err());
    rt.execute(&who("dao"), &locker, unlock(lp1, who("dao"))).unwrap();
    assert_eq!(balance(&rt, &lp1, who("dao")), "100");
}

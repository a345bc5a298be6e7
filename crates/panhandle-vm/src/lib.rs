// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PANHANDLE - CONTRACT RUNTIME
//
// In-process contracts and the environment that executes them.
// - PANHANDLE token: BEP20 with transfer tax, burn and anti-whale cap
// - Referral registry with operator allow-list
// - Locker holding fungible tokens until the owner unlocks them
// - Snapshot/rollback runtime with an ordered event log
// - JSON scenario runner for scripted end-to-end checks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// BEP20 ledger and the Fungible seam used for cross-contract transfers
pub mod bep20;
pub mod events;
pub mod locker;
// Fixed-supply BEP20 standing in for LP tokens
pub mod mock_bep20;
pub mod referral;
pub mod runtime;
pub mod scenario;
pub mod token;

pub use bep20::{Bep20Action, Bep20Ledger, Fungible};
pub use events::{ContractEvent, LoggedEvent};
pub use locker::{LockerAction, PanhandleLocker};
pub use mock_bep20::MockBep20;
pub use referral::{PanhandleReferral, ReferralAction};
pub use runtime::{Action, Contract, ContractKind, Query, Runtime, VmError};
pub use scenario::{run_scenario, Scenario, ScenarioError, ScenarioReport, StepOutcome};
pub use token::{PanhandleToken, TokenAction};

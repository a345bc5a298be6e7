// SPDX-License-Identifier: AGPL-3.0-only
//! # Scenario Runner
//!
//! Drives a [`Runtime`] from a JSON script of deploy, call and assert steps.
//!
//! ```json
//! { "name": "transfer",
//!   "steps": [
//!     { "step": "deploy", "contract": "token", "as": "token", "from": "@owner" },
//!     { "step": "call", "from": "@owner", "to": "@token",
//!       "action": { "action": "mint", "to": "@alice", "amount": "10000000" } },
//!     { "step": "assert", "contract": "@token",
//!       "query": { "query": "balance_of", "account": "@alice" }, "equals": "10000000" } ] }
//! ```
//!
//! Any string starting with `@` is a label. It names a contract bound by a
//! deploy step's `as`, or else an account derived from the label text.
//! `@zero` and `@burn` are the zero and burn addresses.

use crate::runtime::{ContractKind, Query, Runtime, VmError};
use panhandle_core::{u128_str, Address, TokenConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Deploy {
        contract: ContractKind,
        #[serde(rename = "as")]
        label: String,
        from: String,
        /// Token only; defaults apply to missing fields
        #[serde(default)]
        config: Option<TokenConfig>,
        /// Mock BEP20 only
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        symbol: Option<String>,
        #[serde(default, with = "u128_str")]
        supply: u128,
    },
    Call {
        from: String,
        to: String,
        action: Value,
        /// Revert reason the call must fail with
        #[serde(default)]
        expect_error: Option<String>,
    },
    Assert {
        contract: String,
        query: Value,
        equals: Value,
    },
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum StepOutcome {
    Passed,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub description: String,
    pub outcome: StepOutcome,
}

/// Outcome of one scenario. Steps after the first failure are not run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub total_steps: usize,
    pub steps: Vec<StepReport>,
    pub state_digest: String,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.steps.len() == self.total_steps
            && self.steps.iter().all(|s| s.outcome == StepOutcome::Passed)
    }

    pub fn failure(&self) -> Option<&StepReport> {
        self.steps
            .iter()
            .find(|s| matches!(s.outcome, StepOutcome::Failed(_)))
    }
}

/// Label table for one run.
#[derive(Debug, Default)]
struct Labels {
    contracts: BTreeMap<String, Address>,
}

impl Labels {
    fn resolve(&self, text: &str) -> Result<Address, String> {
        match text.strip_prefix('@') {
            Some("zero") => Ok(Address::ZERO),
            Some("burn") => Ok(Address::BURN),
            Some(label) => Ok(self
                .contracts
                .get(label)
                .copied()
                .unwrap_or_else(|| Address::from_seed(label))),
            None => Address::parse(text).map_err(|e| e.to_string()),
        }
    }

    /// Replace every `@label` string inside `value` with its address.
    fn substitute(&self, value: Value) -> Result<Value, String> {
        Ok(match value {
            Value::String(s) if s.starts_with('@') => Value::String(self.resolve(&s)?.to_string()),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|v| self.substitute(v))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| Ok((k, self.substitute(v)?)))
                    .collect::<Result<_, String>>()?,
            ),
            other => other,
        })
    }

    fn bind(&mut self, label: &str, address: Address) -> Result<(), String> {
        if label == "zero" || label == "burn" {
            return Err(format!("label @{} is reserved", label));
        }
        if self.contracts.insert(label.to_string(), address).is_some() {
            return Err(format!("label @{} is already bound", label));
        }
        Ok(())
    }
}

/// Run `scenario` on a fresh runtime.
pub fn run_scenario(scenario: &Scenario) -> ScenarioReport {
    let mut runtime = Runtime::new();
    let mut labels = Labels::default();
    let mut steps = Vec::with_capacity(scenario.steps.len());

    for (index, step) in scenario.steps.iter().enumerate() {
        let description = describe(step);
        let outcome = match run_step(&mut runtime, &mut labels, step) {
            Ok(()) => {
                log::debug!("[{}] step {} passed: {}", scenario.name, index, description);
                StepOutcome::Passed
            }
            Err(reason) => {
                log::warn!("[{}] step {} failed: {}: {}", scenario.name, index, description, reason);
                StepOutcome::Failed(reason)
            }
        };
        let failed = outcome != StepOutcome::Passed;
        steps.push(StepReport {
            index,
            description,
            outcome,
        });
        if failed {
            break;
        }
    }

    ScenarioReport {
        name: scenario.name.clone(),
        total_steps: scenario.steps.len(),
        steps,
        state_digest: runtime.state_digest(),
    }
}

fn run_step(runtime: &mut Runtime, labels: &mut Labels, step: &Step) -> Result<(), String> {
    match step {
        Step::Deploy {
            contract,
            label,
            from,
            config,
            name,
            symbol,
            supply,
        } => {
            let deployer = labels.resolve(from)?;
            let address = match contract {
                ContractKind::Token => {
                    let config = config.clone().unwrap_or_default();
                    runtime.deploy_token(&deployer, &config)
                }
                ContractKind::Referral => runtime.deploy_referral(&deployer),
                ContractKind::Locker => runtime.deploy_locker(&deployer),
                ContractKind::MockBep20 => runtime.deploy_mock_bep20(
                    &deployer,
                    name.as_deref().unwrap_or(label),
                    symbol.as_deref().unwrap_or(label),
                    *supply,
                ),
            }
            .map_err(|e| e.to_string())?;
            labels.bind(label, address)
        }
        Step::Call {
            from,
            to,
            action,
            expect_error,
        } => {
            let caller = labels.resolve(from)?;
            let target = labels.resolve(to)?;
            let call = labels.substitute(action.clone())?;
            let result = runtime
                .decode_action(&target, call)
                .and_then(|action| runtime.execute(&caller, &target, action));
            check_call(result, expect_error.as_deref())
        }
        Step::Assert {
            contract,
            query,
            equals,
        } => {
            let target = labels.resolve(contract)?;
            let query: Query = serde_json::from_value(labels.substitute(query.clone())?)
                .map_err(|e| format!("malformed query: {}", e))?;
            let expected = match labels.substitute(equals.clone())? {
                // addresses render as lowercase hex
                Value::String(s) if s.starts_with("0x") => s.to_lowercase(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            let actual = runtime.query(&target, &query).map_err(|e| e.to_string())?;
            if actual != expected {
                return Err(format!("expected {}, got {}", expected, actual));
            }
            Ok(())
        }
    }
}

fn check_call(result: Result<(), VmError>, expect_error: Option<&str>) -> Result<(), String> {
    match (result, expect_error) {
        (Ok(()), None) => Ok(()),
        (Ok(()), Some(expected)) => Err(format!("expected revert \"{}\", call succeeded", expected)),
        (Err(e), None) => Err(e.reason()),
        (Err(e), Some(expected)) if e.reason() == expected => Ok(()),
        (Err(e), Some(expected)) => Err(format!(
            "expected revert \"{}\", got \"{}\"",
            expected,
            e.reason()
        )),
    }
}

fn describe(step: &Step) -> String {
    let field = |value: &Value, key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string()
    };
    match step {
        Step::Deploy {
            contract, label, from, ..
        } => format!("deploy {} as @{} from {}", contract, label, from),
        Step::Call {
            from, to, action, ..
        } => format!("{} calls {}.{}", from, to, field(action, "action")),
        Step::Assert {
            contract, query, ..
        } => format!("assert {}.{}", contract, field(query, "query")),
    }
}

// SPDX-License-Identifier: AGPL-3.0-only
use crate::error::{ContractError, ContractResult};
use crate::{u128_str, ONE_TOKEN};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Ceiling for `transfer_tax_rate` (10% in bps)
pub const MAXIMUM_TRANSFER_TAX_RATE: u16 = 1_000;
/// Ceiling for `burn_rate` (100% of the tax)
pub const MAXIMUM_BURN_RATE: u16 = 100;
/// Ceiling for `max_transfer_amount_rate` (0.5% of total supply in bps)
pub const MAXIMUM_MAX_TRANSFER_AMOUNT_RATE: u16 = 50;

pub const ERR_TRANSFER_TAX_RATE: &str =
    "PANHANDLE::updateTransferTaxRate: Transfer tax rate must not exceed the maximum rate.";
pub const ERR_BURN_RATE: &str =
    "PANHANDLE::updateBurnRate: Burn rate must not exceed the maximum rate.";
pub const ERR_MAX_TRANSFER_AMOUNT_RATE: &str =
    "PANHANDLE::updateMaxTransferAmountRate: Max transfer amount rate must not exceed the maximum rate.";

/// Deployment parameters of the taxed token.
///
/// ```toml
/// name = "PANHANDLE Token"
/// symbol = "PANHANDLE"
/// decimals = 18
/// transfer_tax_rate = 500
/// burn_rate = 20
/// max_transfer_amount_rate = 50
/// swap_and_liquify_enabled = false
/// min_amount_to_liquify = "500000000000000000000"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Basis points of each transfer taken as tax
    pub transfer_tax_rate: u16,
    /// Percent of the tax that is burned; the rest is escrowed for liquidity
    pub burn_rate: u16,
    /// Basis points of total supply a single transfer may move
    pub max_transfer_amount_rate: u16,
    pub swap_and_liquify_enabled: bool,
    #[serde(with = "u128_str")]
    pub min_amount_to_liquify: u128,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "PANHANDLE Token".to_string(),
            symbol: "PANHANDLE".to_string(),
            decimals: 18,
            transfer_tax_rate: 500,
            burn_rate: 20,
            max_transfer_amount_rate: 50,
            swap_and_liquify_enabled: false,
            min_amount_to_liquify: 500 * ONE_TOKEN,
        }
    }
}

impl TokenConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: TokenConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load token config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save token config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Override rates from `PANHANDLE_TRANSFER_TAX_RATE`, `PANHANDLE_BURN_RATE`
    /// and `PANHANDLE_MAX_TRANSFER_AMOUNT_RATE` when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Ok(v) = std::env::var("PANHANDLE_TRANSFER_TAX_RATE") {
            self.transfer_tax_rate = v.parse()?;
        }
        if let Ok(v) = std::env::var("PANHANDLE_BURN_RATE") {
            self.burn_rate = v.parse()?;
        }
        if let Ok(v) = std::env::var("PANHANDLE_MAX_TRANSFER_AMOUNT_RATE") {
            self.max_transfer_amount_rate = v.parse()?;
        }
        Ok(())
    }

    /// Validate configuration against the same ceilings the setters enforce.
    pub fn validate(&self) -> ContractResult<()> {
        if self.name.is_empty() {
            return Err(ContractError::InvalidArgument(
                "name cannot be empty".to_string(),
            ));
        }
        if self.symbol.is_empty() {
            return Err(ContractError::InvalidArgument(
                "symbol cannot be empty".to_string(),
            ));
        }
        if self.decimals > 18 {
            return Err(ContractError::InvalidArgument(
                "decimals must be 0-18".to_string(),
            ));
        }
        check_transfer_tax_rate(self.transfer_tax_rate)?;
        check_burn_rate(self.burn_rate)?;
        check_max_transfer_amount_rate(self.max_transfer_amount_rate)?;
        Ok(())
    }
}

pub fn check_transfer_tax_rate(rate: u16) -> ContractResult<()> {
    if rate > MAXIMUM_TRANSFER_TAX_RATE {
        return Err(ContractError::ExceedsLimit(ERR_TRANSFER_TAX_RATE.to_string()));
    }
    Ok(())
}

pub fn check_burn_rate(rate: u16) -> ContractResult<()> {
    if rate > MAXIMUM_BURN_RATE {
        return Err(ContractError::ExceedsLimit(ERR_BURN_RATE.to_string()));
    }
    Ok(())
}

pub fn check_max_transfer_amount_rate(rate: u16) -> ContractResult<()> {
    if rate > MAXIMUM_MAX_TRANSFER_AMOUNT_RATE {
        return Err(ContractError::ExceedsLimit(
            ERR_MAX_TRANSFER_AMOUNT_RATE.to_string(),
        ));
    }
    Ok(())
}

use crate::{print_info, print_success, ConfigCommands};
use colored::*;
use panhandle_core::math::split_transfer;
use panhandle_core::TokenConfig;
use std::path::Path;

pub fn handle(action: ConfigCommands) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigCommands::Check { file } => check(&file)?,
        ConfigCommands::Init { file, force } => init(&file, force)?,
    }
    Ok(())
}

/// Load, apply environment overrides and validate.
fn load(path: &Path) -> Result<TokenConfig, Box<dyn std::error::Error>> {
    let mut config = TokenConfig::load_from_file(path)?;
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

fn check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load(path)?;
    print_success(&format!("{} is valid", path.display()));
    println!("  {:<26} {} ({})", "token", config.name, config.symbol);
    println!("  {:<26} {}", "decimals", config.decimals);
    println!("  {:<26} {} bps", "transfer_tax_rate", config.transfer_tax_rate);
    println!("  {:<26} {}%", "burn_rate", config.burn_rate);
    println!(
        "  {:<26} {} bps",
        "max_transfer_amount_rate", config.max_transfer_amount_rate
    );
    println!(
        "  {:<26} {}",
        "swap_and_liquify_enabled", config.swap_and_liquify_enabled
    );
    println!("  {:<26} {}", "min_amount_to_liquify", config.min_amount_to_liquify);
    Ok(())
}

fn init(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }
    TokenConfig::default().save_to_file(path)?;
    print_success(&format!("wrote default config to {}", path.display()));
    Ok(())
}

pub fn split(amount: &str, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let amount: u128 = amount
        .parse()
        .map_err(|e| format!("invalid amount '{}': {}", amount, e))?;
    let config = match config {
        Some(path) => load(path)?,
        None => TokenConfig::default(),
    };
    let split = split_transfer(amount, config.transfer_tax_rate, config.burn_rate)?;
    print_info(&format!(
        "transfer of {} at {} bps tax, {}% burn",
        amount, config.transfer_tax_rate, config.burn_rate
    ));
    println!("  {:<10} {}", "tax", split.tax);
    println!("  {:<10} {}", "burn".red(), split.burn);
    println!("  {:<10} {}", "liquidity".cyan(), split.liquidity);
    println!("  {:<10} {}", "recipient".green(), split.send);
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PANHANDLE CLI - Scenario runner and token configuration tool
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "panhandle")]
#[command(about = "Panhandle token toolkit - run scenarios, check configs", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run JSON scenarios against a fresh runtime each
    Run {
        /// Scenario files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Token configuration files
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show how a transfer would be split under a configuration
    Split {
        /// Amount in atomic units
        amount: String,

        /// Token config (defaults apply when omitted)
        #[arg(short, long, env = "PANHANDLE_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Validate a config file, environment overrides included
    Check {
        file: PathBuf,
    },

    /// Write a config file with default values
    Init {
        file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    commands::logger::init(cli.verbose)?;

    match cli.command {
        Commands::Run { files, json } => commands::run::handle(&files, json)?,
        Commands::Config { action } => commands::config::handle(action)?,
        Commands::Split { amount, config } => commands::config::split(&amount, config.as_deref())?,
    }

    Ok(())
}

fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

// ─────────────────────────────────────────────────────────────────
// UNIT TESTS
// ─────────────────────────────────────────────────────────────────

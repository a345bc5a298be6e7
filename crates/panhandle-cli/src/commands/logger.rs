//! `env_logger` backend for the `log` facade.

use log::LevelFilter;

/// Overrides the `-v` level with a filter spec, e.g. `panhandle_vm=trace`.
pub const LOG_ENV: &str = "PANHANDLE_LOG";

/// Warnings and errors by default; each `-v` adds one level.
pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn builder(verbose: u8) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(verbose))
        .parse_env(LOG_ENV)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr);
    builder
}

pub fn init(verbose: u8) -> Result<(), log::SetLoggerError> {
    builder(verbose).try_init()
}

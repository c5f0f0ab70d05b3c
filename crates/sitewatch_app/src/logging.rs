//! Logging for the sitewatch binary.
//!
//! Report rows go to stdout; log lines go to `./sitewatch.log` so the table
//! stays readable. `SITEWATCH_LOG` accepts a `LevelFilter` name to raise the
//! verbosity and the word `term` to mirror the log to the terminal, comma
//! separated.

use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILE: &str = "./sitewatch.log";
const ENV_VAR: &str = "SITEWATCH_LOG";

/// Initialize logging; called once at startup.
///
/// An unwritable log file downgrades to terminal-only logging rather than
/// failing the run.
pub fn initialize() {
    let (level, mirror_to_term) = read_env();
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    match File::create(Path::new(LOG_FILE)) {
        Ok(file) => loggers.push(WriteLogger::new(level, config.clone(), file)),
        Err(err) => {
            eprintln!("Warning: cannot create {LOG_FILE}: {err}");
        }
    }
    if mirror_to_term || loggers.is_empty() {
        loggers.push(TermLogger::new(
            level,
            config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }

    let _ = CombinedLogger::init(loggers);
}

fn read_env() -> (LevelFilter, bool) {
    let raw = match std::env::var(ENV_VAR) {
        Ok(raw) => raw,
        Err(_) => return (LevelFilter::Info, false),
    };

    let mut level = LevelFilter::Info;
    let mut mirror = false;
    for part in raw.split(',') {
        let part = part.trim();
        if part.eq_ignore_ascii_case("term") {
            mirror = true;
        } else if let Ok(parsed) = LevelFilter::from_str(part) {
            level = parsed;
        }
    }
    (level, mirror)
}

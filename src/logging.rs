// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Process-wide tracing setup: console plus a log file

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{Result, SortError};

/// Pick the filter directive from the CLI verbosity flags
pub fn level_filter(trace: bool, verbose: bool, quiet: bool) -> &'static str {
    if trace {
        "trace"
    } else if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Install the global subscriber. The log file, when given, is truncated on
/// every start.
///
/// Must be called once, from `main`, before anything logs.
pub fn init(filter: &str, log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                SortError::Config(format!("Failed to open log file {:?}: {}", path, e))
            })?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| SortError::Config(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_precedence() {
        assert_eq!(level_filter(false, false, false), "info");
        assert_eq!(level_filter(false, false, true), "warn");
        assert_eq!(level_filter(false, true, true), "debug");
        assert_eq!(level_filter(true, true, true), "trace");
    }

    #[test]
    fn test_unopenable_log_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("server.log");
        assert!(matches!(init("info", Some(path.as_path())), Err(SortError::Config(_))));
    }
}

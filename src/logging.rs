// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; applications that want them
//! printed call [`init_logging`] once at startup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Install a global subscriber for the configured level and format.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `false` if a
/// global subscriber was already installed, in which case nothing changes.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(fmt::layer().pretty().with_target(true))
            .try_init()
    };
    result.is_ok()
}

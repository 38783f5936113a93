//! Tracing setup for the CLI and embedding applications.
//!
//! Per-frame detail in the engine is logged at `trace`, registration and
//! conflicts at `debug`, adaptive governor changes at `info`.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Crates whose level `--verbose` raises to `debug`.
const OXBOARD_TARGETS: [&str; 4] = [
    "oxboard_common",
    "oxboard_gesture_core",
    "oxboard_gesture_model",
    "oxboard_gestures",
];

/// Filter directives for a logging config, optionally raising Oxboard
/// crates to `debug`.
pub fn filter_directives(config: &LoggingConfig, verbose: bool) -> String {
    let mut directives = config.level.trim().to_string();
    if directives.is_empty() {
        directives.push_str("info");
    }
    if verbose {
        for target in OXBOARD_TARGETS {
            directives.push_str(&format!(",{target}=debug"));
        }
    }
    directives
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured directives. Returns `false` if a
/// subscriber was already installed, which leaves the first one in place.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config, verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .try_init()
            .is_ok()
    };
    if installed {
        tracing::debug!(json = config.json, verbose, "Logging initialized");
    }
    installed
}

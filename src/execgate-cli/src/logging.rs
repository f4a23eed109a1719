//! Logging setup.
//!
//! Logs go to stderr only; stdout belongs to the gated command.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level`/`GATE_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Installs the global subscriber.
///
/// Precedence: explicit directive, then `RUST_LOG`, then
/// [`DEFAULT_LOG_FILTER`]. An unparsable directive falls through to the
/// next source. Calling this more than once is a no-op.
pub fn init_logging(directive: Option<&str>) {
    let filter = directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

//! `tracing` subscriber setup for the `board` binary.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// Install the global subscriber, writing to stderr so command output on
/// stdout stays clean. `RUST_LOG` wins over `[log].filter`.
pub fn init(config: Option<&Config>) {
    let fallback = config.map(|c| c.log.filter.as_str()).unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {}", e);
    }
}

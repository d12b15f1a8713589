use std::io;
use tracing_subscriber::{fmt, EnvFilter};

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Compact stdout logging; `RUST_LOG` wins over the default filter.
/// Stdout keeps output visible in environments that hide stderr.
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(env_filter("info,tower_http=info,axum=info"))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// JSON structured logging for machine consumers, written to stdout for
/// consistent container log collection. `RUST_LOG` wins over the `info`
/// default.
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(env_filter("info"))
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Pick the output format from `LOG_FORMAT` (`json`, anything else means
/// the compact default). Safe to call more than once; later calls no-op.
pub fn init_logging_from_env() {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => init_logging_json(),
        _ => init_logging_default(),
    }
}

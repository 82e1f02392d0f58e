//! Tracing subscriber setup.

use cipher_vault_core::config::{LogLevel, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used for the `cipher_vault*` targets: `-v` is debug, `-vv` and
/// above is trace, otherwise the configured level.
pub fn effective_level(verbose: u8, configured: LogLevel) -> LogLevel {
    match verbose {
        0 => configured,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cipher_vault={}", level.as_str())))
}

/// Plain stderr subscriber for the time before the config is loaded, so
/// warnings about the config file itself are not lost.
pub fn bootstrap(verbose: u8) -> impl tracing::Subscriber + Send + Sync {
    let level = effective_level(verbose, LoggingConfig::default().level);
    tracing_subscriber::registry()
        .with(filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
}

/// Install the global subscriber. `RUST_LOG` overrides everything.
pub fn init(verbose: u8, config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(filter(effective_level(verbose, config.level)));
    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

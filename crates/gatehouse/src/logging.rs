//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{ConfigError, LogConfig, LogFormat};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter`. Fails if the filter
/// does not parse or a global subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<(), ConfigError> {
    let filter = build_filter(config)?;
    let subscriber = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Compact => subscriber
            .with(fmt::layer().compact().with_target(true))
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(fmt::layer().pretty().with_target(true).with_line_number(true))
            .try_init(),
    }
    .map_err(|e| ConfigError::Subscriber(e.to_string()))
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter, ConfigError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| ConfigError::LogFilter(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        let config = LogConfig {
            filter: "info,gatehouse_session=debug".into(),
            ..LogConfig::default()
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_init_tracing_second_call_fails() {
        // Another test in this binary may have installed one already, so
        // only the second of our own calls is guaranteed to fail.
        let config = LogConfig::default();
        let _ = init_tracing(&config);
        assert!(matches!(
            init_tracing(&config),
            Err(ConfigError::Subscriber(_))
        ));
    }
}

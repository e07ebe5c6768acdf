use std::sync::Once;

/// Logger configuration.
///
/// Filters follow the `env_logger` syntax (e.g. "info",
/// "tessera_engine=debug,wgpu=warn"). Precedence: `env_filter`, then `RUST_LOG`,
/// then `default_filter`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_filter: String,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_filter: String::from("info"),
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Uses `filter` unless `RUST_LOG` is set.
    pub fn with_default_filter(filter: impl Into<String>) -> Self {
        Self { default_filter: filter.into(), ..Self::default() }
    }
}

static INIT: Once = Once::new();

fn resolve_filter(configured: Option<String>, env: Option<String>, default: String) -> String {
    configured.or(env).unwrap_or(default)
}

/// Initializes the global logger once.
///
/// Idempotent; later calls are ignored. Call early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(
            config.env_filter,
            std::env::var("RUST_LOG").ok(),
            config.default_filter,
        );

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized ({filter})");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins_over_env() {
        let default = || String::from("info");
        let f = resolve_filter(Some("wgpu=warn".into()), Some("debug".into()), default());
        assert_eq!(f, "wgpu=warn");
        assert_eq!(resolve_filter(None, Some("debug".into()), default()), "debug");
        assert_eq!(resolve_filter(None, None, default()), "info");
    }
}

use tracing::Level;

/// Logging setup of a binary. Start from [`Config::default`] and adjust it
/// with the builder methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Filter directives with the syntax documented at
    /// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    pub env_filter: String,
    /// Events at this level or more severe go to stderr, the rest to stdout.
    /// `None` means [`Level::ERROR`].
    pub stderr_threshold: Option<Level>,
    pub use_json_format: bool,
}

impl Config {
    pub fn with_json_format(mut self) -> Self {
        self.use_json_format = true;
        self
    }

    pub fn with_env_filter(mut self, env_filter: &str) -> Self {
        self.env_filter = env_filter.to_string();
        self
    }

    pub fn with_stderr_threshold(mut self, stderr_threshold: Level) -> Self {
        self.stderr_threshold = Some(stderr_threshold);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_filter: "info".to_string(),
            stderr_threshold: None,
            use_json_format: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = Config::default()
            .with_env_filter("warn,deploy_contracts=debug")
            .with_stderr_threshold(Level::WARN)
            .with_json_format();

        assert_eq!(config.env_filter, "warn,deploy_contracts=debug");
        assert_eq!(config.stderr_threshold, Some(Level::WARN));
        assert!(config.use_json_format);
    }
}

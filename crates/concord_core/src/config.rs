//! Process-start configuration read from the environment.

use serde::{Deserialize, Serialize};

/// Enables per-rank `<rank>.out` output files when truthy
pub const REDIRECT_ENV: &str = "USE_PROC_FILES";

/// Tracing filter directive
pub const LOG_FILTER_ENV: &str = "CONCORD_LOG";

/// Log output format, `pretty` or `json`
pub const LOG_FORMAT_ENV: &str = "CONCORD_LOG_FORMAT";

const DEFAULT_LOG_FILTER: &str = "concord=info";

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to `Pretty`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Startup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcordConfig {
    /// Redirect stdout/stderr to `<rank>.out` before anything else runs
    pub redirect_streams: bool,
    /// Tracing filter directive
    pub log_filter: String,
    /// Log line format
    pub log_format: LogFormat,
    /// Install the global tracing subscriber during startup
    pub install_subscriber: bool,
}

impl ConcordConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            redirect_streams: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::Pretty,
            install_subscriber: true,
        }
    }

    /// Read the config from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the config through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();
        if let Some(value) = lookup(REDIRECT_ENV) {
            config.redirect_streams = is_truthy(&value);
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            config.log_format = LogFormat::parse(&format);
        }
        config
    }

    /// Set stream redirection
    #[must_use]
    pub fn with_redirect_streams(mut self, enabled: bool) -> Self {
        self.redirect_streams = enabled;
        self
    }

    /// Set log filter
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Set log format
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Skip installing the global subscriber
    #[must_use]
    pub fn without_subscriber(mut self) -> Self {
        self.install_subscriber = false;
        self
    }
}

impl Default for ConcordConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Boolean-ish flag: any non-empty value except `0`, `false`, `no`, `off`
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    !["0", "false", "no", "off"]
        .iter()
        .any(|falsy| value.eq_ignore_ascii_case(falsy))
}

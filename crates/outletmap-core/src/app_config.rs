#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Log filter used when `OUTLETMAP_LOG_LEVEL` is unset.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Test => "warn",
            Environment::Production => "info",
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the map client.
///
/// Every field has a default; see `load_app_config` for the variable names.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Backend origin without a trailing slash, e.g. `https://api.example.com`.
    pub api_base_url: String,
    pub log_level: String,
    /// Applies to the outlet and catchment JSON requests.
    pub request_timeout_secs: u64,
    /// Maximum silence between two chat chunks (and before the first one).
    pub chat_idle_timeout_secs: u64,
    pub user_agent: String,
}

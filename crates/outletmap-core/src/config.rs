use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_API_BASE_URL: &str =
    "https://sound-inez-syahrilshahiran-98f14f14.koyeb.app";

/// Load client configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load client configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function, so tests can
/// feed a `HashMap` instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("OUTLETMAP_ENV", "development"))?;
    let api_base_url = parse_base_url(
        "OUTLETMAP_API_BASE_URL",
        &or_default("OUTLETMAP_API_BASE_URL", DEFAULT_API_BASE_URL),
    )?;
    let log_level = or_default("OUTLETMAP_LOG_LEVEL", env.default_log_level());
    let request_timeout_secs = parse_u64("OUTLETMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let chat_idle_timeout_secs = parse_u64("OUTLETMAP_CHAT_IDLE_TIMEOUT_SECS", "60")?;
    let user_agent = or_default("OUTLETMAP_USER_AGENT", "outletmap/0.1 (map-client)");

    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "OUTLETMAP_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    if chat_idle_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "OUTLETMAP_CHAT_IDLE_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        api_base_url,
        log_level,
        request_timeout_secs,
        chat_idle_timeout_secs,
        user_agent,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "OUTLETMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Accepts an absolute `http`/`https` origin and strips trailing slashes.
///
/// `source` names the variable or flag the value came from, for the error.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if `raw` has no http(s) scheme or no host.
pub fn parse_base_url(source: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));

    match host {
        Some(h) if !h.is_empty() && !h.starts_with('/') => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidEnvVar {
            var: source.to_string(),
            reason: format!("'{raw}' is not an absolute http(s) URL"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let tomtom_api_key = require("TOMTOM_API_KEY")?;
    let tomtom_base_url = or_default("TOMTOM_BASE_URL", "https://api.tomtom.com");

    let env = parse_environment(&or_default("EVSCOUT_ENV", "development"));
    let bind_addr = parse_addr("EVSCOUT_BIND_ADDR", "0.0.0.0:8002")?;
    let log_level = or_default("EVSCOUT_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("EVSCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let poll_max_wait_secs = parse_u64("EVSCOUT_POLL_MAX_WAIT_SECS", "120")?;
    let poll_interval_ms = parse_u64("EVSCOUT_POLL_INTERVAL_MS", "2000")?;
    let poll_status_timeout_secs = parse_u64("EVSCOUT_POLL_STATUS_TIMEOUT_SECS", "10")?;
    let poll_backoff_ms = parse_u64("EVSCOUT_POLL_BACKOFF_MS", "1000")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        tomtom_api_key,
        tomtom_base_url,
        request_timeout_secs,
        poll_max_wait_secs,
        poll_interval_ms,
        poll_status_timeout_secs,
        poll_backoff_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
/// `ROADWATCH_API_KEYS` counts as missing outside development when it holds no
/// non-blank key.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_meters = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(
                var,
                format!("must be a positive number of meters, got {value}"),
            ));
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("ROADWATCH_ENV", "development"))?;

    let bind_addr = parse_addr("ROADWATCH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("ROADWATCH_LOG_LEVEL", "info");
    let network_path = PathBuf::from(or_default(
        "ROADWATCH_NETWORK_PATH",
        "./config/network.yaml",
    ));

    let db_max_connections = parse_u32("ROADWATCH_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ROADWATCH_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ROADWATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let search_radius_meters = parse_meters("ROADWATCH_SEARCH_RADIUS_METERS", "10000")?;
    let buffer_meters = parse_meters("ROADWATCH_BUFFER_METERS", "50")?;

    let api_keys = parse_api_keys(&or_default("ROADWATCH_API_KEYS", ""));
    if api_keys.is_empty() && env != Environment::Development {
        return Err(ConfigError::MissingEnvVar("ROADWATCH_API_KEYS".to_string()));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        network_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        search_radius_meters,
        buffer_meters,
        api_keys,
    })
}

/// Split a comma-separated key list, dropping blanks and duplicates.
fn parse_api_keys(raw: &str) -> Vec<String> {
    let mut keys: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ROADWATCH_ENV".to_string(),
            reason: format!("expected development, test or production, got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

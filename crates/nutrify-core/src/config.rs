use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_OFF_HOST: &str = "https://world.openfoodfacts.org";
pub const DEFAULT_USER_AGENT: &str = "nutrify/0.1 (food-information)";

/// Load application configuration from environment variables.
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

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Core parsing/validation logic, decoupled from the process environment so
/// it can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_host = |var: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, DEFAULT_OFF_HOST);
        parse_base_url(&raw).map_err(|reason| invalid(var, reason))
    };

    let env = parse_environment(&or_default("NUTRIFY_ENV", "development"))?;
    let bind_addr = parse_addr("NUTRIFY_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("NUTRIFY_LOG_LEVEL", "info");

    let api_host = parse_host("NUTRIFY_API_HOST")?;
    let web_host = parse_host("NUTRIFY_WEB_HOST")?;

    let request_timeout_secs = parse_u64("NUTRIFY_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "NUTRIFY_REQUEST_TIMEOUT_SECS",
            "must be at least 1 second".to_string(),
        ));
    }
    let user_agent = or_default("NUTRIFY_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("NUTRIFY_MAX_RETRIES", "0")?;
    let retry_backoff_base_secs = parse_u64("NUTRIFY_RETRY_BACKOFF_BASE_SECS", "1")?;
    let max_upload_bytes = parse_usize("NUTRIFY_MAX_UPLOAD_BYTES", "10485760")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        api_host,
        web_host,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        max_upload_bytes,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NUTRIFY_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Validates an absolute `http(s)` base URL and strips any trailing slash.
fn parse_base_url(raw: &str) -> Result<String, String> {
    let parsed = url::Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme \"{}\"", parsed.scheme()));
    }
    if parsed.host_str().is_none() {
        return Err("URL has no host".to_string());
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

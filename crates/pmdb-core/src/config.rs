use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_CATALOG_BASE_URL: &str = "https://www.penguinmagic.com/p";

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
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
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());

    let env = parse_environment(&or_default("PMDB_ENV", "development"));
    let log_level = or_default("PMDB_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("PMDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PMDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PMDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let catalog_base_url = or_default("PMDB_CATALOG_BASE_URL", DEFAULT_CATALOG_BASE_URL);
    if !(catalog_base_url.starts_with("http://") || catalog_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "PMDB_CATALOG_BASE_URL".to_string(),
            reason: format!("expected an absolute http(s) URL, got \"{catalog_base_url}\""),
        });
    }

    let scraper_request_timeout_secs = parse_u64("PMDB_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("PMDB_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_inter_request_delay_ms = parse_u64("PMDB_SCRAPER_INTER_REQUEST_DELAY_MS", "1500")?;
    let scraper_max_retries = parse_u32("PMDB_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_delay_secs = parse_u64("PMDB_SCRAPER_RETRY_DELAY_SECS", "3")?;
    let scraper_batch_size = parse_usize("PMDB_SCRAPER_BATCH_SIZE", "50")?;
    let scraper_batch_pause_secs = parse_u64("PMDB_SCRAPER_BATCH_PAUSE_SECS", "60")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        catalog_base_url: catalog_base_url.trim_end_matches('/').to_string(),
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_delay_secs,
        scraper_batch_size,
        scraper_batch_pause_secs,
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

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

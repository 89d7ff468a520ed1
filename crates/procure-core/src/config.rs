use crate::app_config::{AppConfig, DEFAULT_BROWSER_USER_AGENT};
use crate::ConfigError;

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
/// Every variable has a default, so an empty environment yields a usable
/// config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

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

    let log_level = or_default("PROCURE_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "PROCURE_SOURCES_PATH",
        "./config/sources.yaml",
    ));
    let output_dir = PathBuf::from(or_default("PROCURE_OUTPUT_DIR", "data"));

    let scraper_request_timeout_secs = parse_u64("PROCURE_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("PROCURE_SCRAPER_USER_AGENT", DEFAULT_BROWSER_USER_AGENT);
    let scraper_max_concurrent_sources =
        parse_usize("PROCURE_SCRAPER_MAX_CONCURRENT_SOURCES", "4")?;
    let scraper_max_retries = parse_u32("PROCURE_SCRAPER_MAX_RETRIES", "0")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("PROCURE_SCRAPER_RETRY_BACKOFF_BASE_SECS", "2")?;
    let scraper_source_deadline_secs = parse_u64("PROCURE_SCRAPER_SOURCE_DEADLINE_SECS", "45")?;
    let run_timeout_secs = parse_u64("PROCURE_RUN_TIMEOUT_SECS", "120")?;

    if scraper_max_concurrent_sources == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PROCURE_SCRAPER_MAX_CONCURRENT_SOURCES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        log_level,
        sources_path,
        output_dir,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_concurrent_sources,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        scraper_source_deadline_secs,
        run_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

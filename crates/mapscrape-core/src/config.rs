use crate::app_config::{AppConfig, Environment};
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
/// Decoupled from the real environment so tests can drive it with a
/// `HashMap` lookup instead of `set_var`/`remove_var`.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let parse_flag = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false, got \"{raw}\""))
            }),
            Err(_) => Ok(default),
        }
    };

    let env = parse_environment(&or_default("MAPSCRAPE_ENV", "development"))?;
    let log_level = or_default("MAPSCRAPE_LOG_LEVEL", "info");
    let headless = parse_flag("MAPSCRAPE_HEADLESS", true)?;
    let chrome_path = lookup("MAPSCRAPE_CHROME_PATH").ok().map(PathBuf::from);
    let selectors_path = lookup("MAPSCRAPE_SELECTORS_PATH").ok().map(PathBuf::from);
    let output_dir = PathBuf::from(or_default("MAPSCRAPE_OUTPUT_DIR", "."));

    let target_count = parse_usize("MAPSCRAPE_TARGET_COUNT", "50")?;
    if target_count == 0 {
        return Err(invalid(
            "MAPSCRAPE_TARGET_COUNT",
            "must be at least 1".to_string(),
        ));
    }
    let enrich_details = parse_flag("MAPSCRAPE_ENRICH_DETAILS", true)?;

    let max_scroll_attempts = parse_u32("MAPSCRAPE_MAX_SCROLL_ATTEMPTS", "100")?;
    let max_iterations = parse_u32("MAPSCRAPE_MAX_ITERATIONS", "500")?;
    let nudge_after = parse_usize("MAPSCRAPE_NUDGE_AFTER", "10")?;

    let root_wait_secs = parse_u64("MAPSCRAPE_ROOT_WAIT_SECS", "15")?;
    let settle_ms = parse_u64("MAPSCRAPE_SETTLE_MS", "4000")?;
    let short_pause_ms = parse_u64("MAPSCRAPE_SHORT_PAUSE_MS", "1000")?;
    let long_pause_ms = parse_u64("MAPSCRAPE_LONG_PAUSE_MS", "2000")?;
    let detail_pause_ms = parse_u64("MAPSCRAPE_DETAIL_PAUSE_MS", "1000")?;

    Ok(AppConfig {
        env,
        log_level,
        headless,
        chrome_path,
        selectors_path,
        output_dir,
        target_count,
        enrich_details,
        max_scroll_attempts,
        max_iterations,
        nudge_after,
        root_wait_secs,
        settle_ms,
        short_pause_ms,
        long_pause_ms,
        detail_pause_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MAPSCRAPE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

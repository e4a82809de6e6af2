//! Configuration validation.
//!
//! Validates all config fields before a run starts.

use crate::domain::config::Provider;
use crate::domain::error::ScreenerError;
use crate::ports::config_port::ConfigPort;

pub const MAX_CONCURRENCY: i64 = 64;
pub const MAX_RATIO_DECIMALS: i64 = 10;

pub fn validate_screener_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_market_caps(config)?;
    validate_concurrency(config)?;
    validate_run_timeout(config)?;
    validate_output(config)?;
    Ok(())
}

pub fn validate_source_config(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    validate_provider(config)?;
    validate_timeout(config)?;
    validate_retries(config)?;
    Ok(())
}

/// Parse an optional non-negative amount from `[section] key`.
pub fn parse_amount(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, ScreenerError> {
    match config.get_opt_double(section, key) {
        None => Ok(None),
        Some(Ok(v)) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        Some(Ok(_)) => Err(invalid(section, key, "must be a non-negative number")),
        Some(Err(e)) => Err(invalid(section, key, &format!("not a number ({e})"))),
    }
}

/// Parse an optional integer from `[section] key`. Blank counts as unset.
pub fn parse_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<i64>, ScreenerError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|e| invalid(section, key, &format!("not an integer ({e})")))
}

fn validate_market_caps(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let min = parse_amount(config, "screen", "min_market_cap")?;
    let max = parse_amount(config, "screen", "max_market_cap")?;
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(invalid(
                "screen",
                "min_market_cap",
                "min_market_cap must not exceed max_market_cap",
            ));
        }
    }
    Ok(())
}

fn validate_concurrency(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let value = parse_int(config, "screen", "concurrency")?.unwrap_or(1);
    if !(1..=MAX_CONCURRENCY).contains(&value) {
        return Err(invalid(
            "screen",
            "concurrency",
            &format!("concurrency must be between 1 and {MAX_CONCURRENCY}"),
        ));
    }
    Ok(())
}

fn validate_run_timeout(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if let Some(value) = parse_int(config, "screen", "run_timeout_secs")? {
        if value <= 0 {
            return Err(invalid(
                "screen",
                "run_timeout_secs",
                "run_timeout_secs must be a positive integer",
            ));
        }
    }
    Ok(())
}

fn validate_output(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if let Some(prefix) = config.get_string("output", "prefix") {
        if prefix.trim().is_empty() || prefix.contains(['/', '\\']) {
            return Err(invalid(
                "output",
                "prefix",
                "prefix must be a non-empty file name fragment",
            ));
        }
    }
    let decimals = parse_int(config, "output", "ratio_decimals")?.unwrap_or(3);
    if !(0..=MAX_RATIO_DECIMALS).contains(&decimals) {
        return Err(invalid(
            "output",
            "ratio_decimals",
            &format!("ratio_decimals must be between 0 and {MAX_RATIO_DECIMALS}"),
        ));
    }
    Ok(())
}

fn validate_provider(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    if let Some(p) = config.get_string("source", "provider") {
        p.parse::<Provider>()
            .map_err(|e| invalid("source", "provider", &e))?;
    }
    Ok(())
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let value = parse_int(config, "source", "timeout_secs")?.unwrap_or(10);
    if value <= 0 {
        return Err(invalid(
            "source",
            "timeout_secs",
            "timeout_secs must be positive",
        ));
    }
    Ok(())
}

fn validate_retries(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let retries = parse_int(config, "source", "max_retries")?.unwrap_or(2);
    if !(0..=10).contains(&retries) {
        return Err(invalid(
            "source",
            "max_retries",
            "max_retries must be between 0 and 10",
        ));
    }
    let base = parse_int(config, "source", "retry_base_ms")?.unwrap_or(500);
    if base < 0 {
        return Err(invalid(
            "source",
            "retry_base_ms",
            "retry_base_ms must be non-negative",
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> ScreenerError {
    ScreenerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

//! Configuration validation.
//!
//! Validates all config fields before a backtest runs, so that a bad value
//! is reported with its section and key instead of surfacing mid-run.

use crate::domain::backtest::RunMode;
use crate::domain::error::TradesimError;
use crate::domain::strategy::StrategyKind;
use crate::domain::timeframe::Timeframe;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    validate_data_dir(config)?;
    validate_ticker(config)?;
    validate_risk_free_rate(config)?;
    validate_lookback(config)?;
    validate_parsed::<Timeframe>(config, "backtest", "timeframe")?;
    validate_parsed::<RunMode>(config, "backtest", "mode")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    validate_parsed::<StrategyKind>(config, "strategy", "kind")?;
    validate_period(config, "fast")?;
    validate_period(config, "slow")?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TradesimError {
    TradesimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    config.require_string("data", "dir").map(|_| ())
}

fn validate_ticker(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    config.require_string("backtest", "ticker").map(|_| ())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    if let Some(value) = parse_present::<f64>(config, "backtest", "risk_free_rate")? {
        if !(0.0..1.0).contains(&value) {
            return Err(invalid(
                "backtest",
                "risk_free_rate",
                "risk_free_rate must be between 0 and 1",
            ));
        }
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    if let Some(value) = parse_present::<i64>(config, "backtest", "lookback")? {
        if value < 1 {
            return Err(invalid("backtest", "lookback", "lookback must be at least 1"));
        }
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort, key: &str) -> Result<(), TradesimError> {
    if let Some(value) = parse_present::<i64>(config, "strategy", key)? {
        if value < 1 {
            return Err(invalid(
                "strategy",
                key,
                format!("{} must be at least 1", key),
            ));
        }
    }
    Ok(())
}

/// Numeric value of a present key. The port falls back to defaults on
/// malformed numbers, so the raw string is checked here.
fn parse_present<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, TradesimError>
where
    T: std::str::FromStr,
{
    match config.get_string(section, key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("'{}' is not a number", raw.trim()))),
        None => Ok(None),
    }
}

/// An absent key is fine (the default applies); a present one must parse.
fn validate_parsed<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), TradesimError>
where
    T: std::str::FromStr<Err = TradesimError>,
{
    match config.get_string(section, key) {
        Some(raw) => raw
            .parse::<T>()
            .map(|_| ())
            .map_err(|e| invalid(section, key, e.to_string())),
        None => Ok(()),
    }
}

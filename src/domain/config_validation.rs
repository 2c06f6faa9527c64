//! Configuration validation.
//!
//! Validates config fields before any symbol is loaded.

use crate::domain::error::MacrossError;
use crate::ports::config_port::ConfigPort;

/// Window keys in `[backtest]`, each paired with its reference default.
pub const WINDOW_KEYS: [(&str, i64); 8] = [
    ("buy_fast", 50),
    ("buy_slow", 500),
    ("sell_fast", 20),
    ("sell_slow", 200),
    ("close_buy_fast", 10),
    ("close_buy_slow", 20),
    ("close_sell_fast", 5),
    ("close_sell_slow", 10),
];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    validate_quantity(config)?;
    validate_jobs(config)?;
    validate_windows(config)?;
    validate_symbols(config)?;
    Ok(())
}

/// Integer value of `[section] key`, or `default` when absent.
/// A present value that is not a whole number is an error.
fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, MacrossError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| MacrossError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("{:?} is not a whole number", raw.trim()),
            }),
    }
}

fn validate_quantity(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    let value = read_int(config, "backtest", "quantity", 100)?;
    if value < 1 || value > u32::MAX as i64 {
        return Err(MacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "quantity".to_string(),
            reason: "quantity must be a positive whole number".to_string(),
        });
    }
    Ok(())
}

fn validate_jobs(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    let value = read_int(config, "backtest", "jobs", 0)?;
    if value < 0 {
        return Err(MacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "jobs".to_string(),
            reason: "jobs must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    for (key, default) in WINDOW_KEYS {
        if read_int(config, "backtest", key, default)? < 1 {
            return Err(MacrossError::ConfigInvalid {
                section: "backtest".to_string(),
                key: key.to_string(),
                reason: format!("{} must be at least 1", key),
            });
        }
    }
    Ok(())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), MacrossError> {
    match config.get_string("data", "symbols") {
        Some(s) if s.split(',').any(|t| t.trim().is_empty()) => {
            Err(MacrossError::ConfigInvalid {
                section: "data".to_string(),
                key: "symbols".to_string(),
                reason: "empty entry in symbol list".to_string(),
            })
        }
        _ => Ok(()),
    }
}

//! Protocol parameter configuration for emberchain
//!
//! All consensus constants live in one immutable value that is loaded
//! once and injected into the components that need it. Keeping them out
//! of ambient globals keeps the arithmetic functions pure and testable
//! with non-default parameters.

use crate::error::{ChainError, Result};
use crate::fees::GasSchedule;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Protocol-wide constants governing gas-limit elasticity and intrinsic
/// gas pricing. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProtocolParams {
    /// Absolute floor for any block gas limit.
    #[serde(default = "default_gas_limit_minimum")]
    pub gas_limit_minimum: u64,
    /// Absolute ceiling for any block gas limit.
    #[serde(default = "default_gas_limit_maximum")]
    pub gas_limit_maximum: u64,
    /// Divisor producing the per-block adjustment boundary range.
    #[serde(default = "default_gas_limit_adjustment_factor")]
    pub gas_limit_adjustment_factor: u64,
    /// Divisor of the exponential-moving-average decay term.
    #[serde(default = "default_gas_limit_ema_denominator")]
    pub gas_limit_ema_denominator: u64,
    /// Numerator of the usage-based increase term.
    #[serde(default = "default_gas_limit_usage_numerator")]
    pub gas_limit_usage_numerator: u64,
    /// Denominator of the usage-based increase term.
    #[serde(default = "default_gas_limit_usage_denominator")]
    pub gas_limit_usage_denominator: u64,
    /// Intrinsic gas cost constants.
    #[serde(default)]
    pub gas_schedule: GasSchedule,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        ProtocolParams {
            gas_limit_minimum: default_gas_limit_minimum(),
            gas_limit_maximum: default_gas_limit_maximum(),
            gas_limit_adjustment_factor: default_gas_limit_adjustment_factor(),
            gas_limit_ema_denominator: default_gas_limit_ema_denominator(),
            gas_limit_usage_numerator: default_gas_limit_usage_numerator(),
            gas_limit_usage_denominator: default_gas_limit_usage_denominator(),
            gas_schedule: GasSchedule::default(),
        }
    }
}

impl ProtocolParams {
    /// Parse parameters from TOML, filling absent keys with defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let params: ProtocolParams = toml::from_str(raw)
            .map_err(|e| ChainError::InvalidArgument(format!("Invalid params file: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    /// Reject parameter sets whose arithmetic would be meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.gas_limit_minimum == 0 {
            return Err(ChainError::InvalidArgument(
                "gas_limit_minimum must be positive".to_string(),
            ));
        }
        if self.gas_limit_minimum > self.gas_limit_maximum {
            return Err(ChainError::InvalidArgument(format!(
                "gas_limit_minimum {} exceeds gas_limit_maximum {}",
                self.gas_limit_minimum, self.gas_limit_maximum
            )));
        }
        if self.gas_limit_adjustment_factor == 0
            || self.gas_limit_ema_denominator == 0
            || self.gas_limit_usage_denominator == 0
        {
            return Err(ChainError::InvalidArgument(
                "adjustment factor and denominators must be nonzero".to_string(),
            ));
        }
        // Limits at the floor must still produce a nonzero boundary range
        // and a nonzero decay, or the elasticity bounds invert.
        if self.gas_limit_minimum < self.gas_limit_adjustment_factor
            || self.gas_limit_minimum < self.gas_limit_ema_denominator
        {
            return Err(ChainError::InvalidArgument(format!(
                "gas_limit_minimum {} must be at least the adjustment factor {} \
                 and the EMA denominator {}",
                self.gas_limit_minimum,
                self.gas_limit_adjustment_factor,
                self.gas_limit_ema_denominator
            )));
        }
        Ok(())
    }
}

fn default_gas_limit_minimum() -> u64 {
    5_000
}

fn default_gas_limit_maximum() -> u64 {
    // 2^63 - 1: leaves headroom for the bounds arithmetic in u64.
    9_223_372_036_854_775_807
}

fn default_gas_limit_adjustment_factor() -> u64 {
    1_024
}

fn default_gas_limit_ema_denominator() -> u64 {
    1_024
}

fn default_gas_limit_usage_numerator() -> u64 {
    3
}

fn default_gas_limit_usage_denominator() -> u64 {
    2
}

/// Load parameters from `params.toml` in the working directory, falling
/// back to the built-in defaults when the file is absent.
pub fn load_config() -> Result<ProtocolParams> {
    load_config_from("params.toml")
}

/// Load parameters from a specific file path.
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<ProtocolParams> {
    let raw = fs::read_to_string(path).unwrap_or_default();
    if raw.is_empty() {
        // Sane defaults when the params file is absent
        let params = ProtocolParams::default();
        params.validate()?;
        return Ok(params);
    }
    ProtocolParams::from_toml_str(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = ProtocolParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.gas_limit_minimum, 5_000);
        assert_eq!(params.gas_limit_ema_denominator, 1_024);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let params = ProtocolParams::from_toml_str("gas_limit_minimum = 10000\n").unwrap();
        assert_eq!(params.gas_limit_minimum, 10_000);
        assert_eq!(params.gas_limit_adjustment_factor, 1_024);
        assert_eq!(params.gas_schedule, GasSchedule::default());
    }

    #[test]
    fn test_schedule_table_overrides() {
        let raw = "[gas_schedule]\nbase_tx = 500\n";
        let params = ProtocolParams::from_toml_str(raw).unwrap();
        assert_eq!(params.gas_schedule.base_tx, 500);
        assert_eq!(params.gas_schedule.per_zero_byte, 4);
    }

    #[test]
    fn test_rejects_inverted_limits() {
        let raw = "gas_limit_minimum = 100\ngas_limit_maximum = 50\n";
        let result = ProtocolParams::from_toml_str(raw);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("exceeds"));
    }

    #[test]
    fn test_rejects_zero_denominator() {
        let raw = "gas_limit_ema_denominator = 0\n";
        let result = ProtocolParams::from_toml_str(raw);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_minimum_below_adjustment_factor() {
        // A floor below the divisor degrades the boundary range to zero
        // for limits near the floor, inverting the bounds.
        let result = ProtocolParams::from_toml_str("gas_limit_minimum = 100\n");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("must be at least the adjustment factor"));
    }

    #[test]
    fn test_rejects_minimum_below_ema_denominator() {
        let raw = "gas_limit_minimum = 2000\n\
                   gas_limit_adjustment_factor = 1000\n\
                   gas_limit_ema_denominator = 4096\n";
        let result = ProtocolParams::from_toml_str(raw);
        assert!(result.is_err());
    }

    #[test]
    fn test_minimum_equal_to_divisors_accepted() {
        let raw = "gas_limit_minimum = 1024\n";
        let params = ProtocolParams::from_toml_str(raw).unwrap();
        assert_eq!(params.gas_limit_minimum, 1_024);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let params = load_config_from("definitely/not/a/real/path.toml").unwrap();
        assert_eq!(params, ProtocolParams::default());
    }

    #[test]
    fn test_default_path_load_without_file() {
        // No params.toml in the crate root: the defaults apply.
        let params = load_config().unwrap();
        assert_eq!(params, ProtocolParams::default());
    }
}

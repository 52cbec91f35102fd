//! Audit configuration
//!
//! Read once at startup from the environment. The audit core takes an
//! `AuditConfig` value and never reads the environment itself.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::nutrition::DEFAULT_CALORIE_TOLERANCE;

pub const ENV_CALORIE_TOLERANCE: &str = "FLC_CALORIE_TOLERANCE";
pub const ENV_RULES_PATH: &str = "FLC_RULES_PATH";
pub const ENV_DECLARE_PROTEIN_DV: &str = "FLC_DECLARE_PROTEIN_DV";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} must be between 0 and 1 (exclusive), got {value}")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be true or false, got '{value}'")]
    NotABool { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditConfig {
    /// Fraction of the Atwater estimate a declared calorie count may differ by
    pub calorie_tolerance: f64,
    /// Substitute rule table; the embedded US FDA table when unset
    pub rules_path: Option<PathBuf>,
    /// Show protein %DV on the regenerated panel
    pub declare_protein_percent: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            calorie_tolerance: DEFAULT_CALORIE_TOLERANCE,
            rules_path: None,
            declare_protein_percent: false,
        }
    }
}

impl AuditConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from a variable lookup; unset or blank variables keep their defaults
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(value) = get(ENV_CALORIE_TOLERANCE) {
            config.calorie_tolerance = parse_tolerance(&value)?;
        }
        if let Some(value) = get(ENV_RULES_PATH) {
            config.rules_path = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_DECLARE_PROTEIN_DV) {
            config.declare_protein_percent = parse_bool(ENV_DECLARE_PROTEIN_DV, &value)?;
        }
        Ok(config)
    }

    pub fn with_calorie_tolerance(mut self, tolerance: f64) -> Result<Self, ConfigError> {
        check_tolerance(tolerance)?;
        self.calorie_tolerance = tolerance;
        Ok(self)
    }

    pub fn with_protein_percent(mut self, declare: bool) -> Self {
        self.declare_protein_percent = declare;
        self
    }
}

fn check_tolerance(value: f64) -> Result<f64, ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            name: ENV_CALORIE_TOLERANCE,
            value,
        })
    }
}

/// "0.15" or "15%"
fn parse_tolerance(value: &str) -> Result<f64, ConfigError> {
    let not_a_number = || ConfigError::NotANumber {
        name: ENV_CALORIE_TOLERANCE,
        value: value.to_string(),
    };
    let parsed = match value.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().map_err(|_| not_a_number())? / 100.0,
        None => value.parse::<f64>().map_err(|_| not_a_number())?,
    };
    check_tolerance(parsed)
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::NotABool {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AuditConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AuditConfig::from_vars(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c, AuditConfig::default());
        assert_eq!(c.calorie_tolerance, 0.15);
    }

    #[test]
    fn test_reads_variables() {
        let c = config(&[
            (ENV_CALORIE_TOLERANCE, "20%"),
            (ENV_RULES_PATH, "/etc/flc/rules.json"),
            (ENV_DECLARE_PROTEIN_DV, "yes"),
        ])
        .unwrap();
        assert!((c.calorie_tolerance - 0.2).abs() < 1e-12);
        assert_eq!(c.rules_path, Some(PathBuf::from("/etc/flc/rules.json")));
        assert!(c.declare_protein_percent);

        assert_eq!(config(&[(ENV_CALORIE_TOLERANCE, "0.1")]).unwrap().calorie_tolerance, 0.1);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            config(&[(ENV_CALORIE_TOLERANCE, "abc")]),
            Err(ConfigError::NotANumber { .. })
        ));
        assert!(matches!(
            config(&[(ENV_CALORIE_TOLERANCE, "1.5")]),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            config(&[(ENV_CALORIE_TOLERANCE, "0")]),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            config(&[(ENV_DECLARE_PROTEIN_DV, "maybe")]),
            Err(ConfigError::NotABool { .. })
        ));
    }

    #[test]
    fn test_blank_is_unset() {
        assert_eq!(config(&[(ENV_RULES_PATH, "  ")]).unwrap().rules_path, None);
    }
}

//! Lenient parsing of extracted nutrient amounts
//!
//! Extraction output is unreliable: numbers arrive as JSON numbers, as
//! strings with units ("12g"), with decimal commas ("1,5"), or as "<1g".
//! Failures are typed so the caller can clamp to zero and record a warning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::units::parse_numeral;

/// Why an extracted amount could not be used as-is
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountError {
    #[error("no value was extracted")]
    Empty,

    #[error("'{0}' is not a number")]
    Unparseable(String),

    #[error("negative amount {0}")]
    Negative(f64),

    #[error("amount is not a finite number")]
    NotFinite,
}

/// An amount as it arrives from the extraction collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    /// Anything else (bool, list, object); always unparseable
    Other(serde_json::Value),
}

impl RawAmount {
    /// Parse into a non-negative finite amount
    pub fn parse(&self) -> Result<f64, AmountError> {
        match self {
            RawAmount::Number(n) => check_amount(*n),
            RawAmount::Text(s) => parse_amount(s),
            RawAmount::Other(v) => Err(AmountError::Unparseable(v.to_string())),
        }
    }
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        RawAmount::Number(value)
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

fn check_amount(value: f64) -> Result<f64, AmountError> {
    if !value.is_finite() {
        Err(AmountError::NotFinite)
    } else if value < 0.0 {
        Err(AmountError::Negative(value))
    } else {
        Ok(value)
    }
}

/// Parse an amount string such as "12", "12 g", "1,5mg", "<1g" or "less than 5 mg".
///
/// A "less than n" amount is taken as n / 2, so "<1g" reads as 0.5.
pub fn parse_amount(raw: &str) -> Result<f64, AmountError> {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() || lower == "null" || lower == "n/a" || lower == "-" {
        return Err(AmountError::Empty);
    }

    let (less_than, rest) = if let Some(rest) = lower.strip_prefix('<') {
        (true, rest.trim_start())
    } else if let Some(rest) = lower.strip_prefix("less than") {
        (true, rest.trim_start())
    } else {
        (false, lower.as_str())
    };

    let negative = rest.starts_with('-');
    let digits = rest.trim_start_matches('-').trim_start();
    let numeral: String = digits
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let numeral = numeral.trim_end_matches(['.', ',']);

    let value = parse_numeral(numeral).ok_or_else(|| AmountError::Unparseable(raw.trim().to_string()))?;
    let value = if negative { -value } else { value };
    let value = check_amount(value)?;

    Ok(if less_than { value / 2.0 } else { value })
}

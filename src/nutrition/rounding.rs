//! Display rounding rules
//!
//! Each nutrient category has an ordered list of bands. The first band whose
//! bound admits the amount decides the step: collapse to zero, a fixed
//! value, or the nearest multiple of an increment. The bands are data so a
//! different regulation can be loaded without touching this code.

use serde::{Deserialize, Serialize};

use super::amount::parse_amount;

/// Rounding category a nutrient belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingCategory {
    /// Calories
    Energy,
    /// Total, saturated and trans fat
    Fat,
    Cholesterol,
    Sodium,
    /// Total carbohydrate, fiber, total/added sugars, sugar alcohols
    Carbohydrate,
    Protein,
    /// Vitamin D, calcium, iron, potassium
    Micronutrient,
}

impl RoundingCategory {
    pub const ALL: [RoundingCategory; 7] = [
        RoundingCategory::Energy,
        RoundingCategory::Fat,
        RoundingCategory::Cholesterol,
        RoundingCategory::Sodium,
        RoundingCategory::Carbohydrate,
        RoundingCategory::Protein,
        RoundingCategory::Micronutrient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingCategory::Energy => "energy",
            RoundingCategory::Fat => "fat",
            RoundingCategory::Cholesterol => "cholesterol",
            RoundingCategory::Sodium => "sodium",
            RoundingCategory::Carbohydrate => "carbohydrate",
            RoundingCategory::Protein => "protein",
            RoundingCategory::Micronutrient => "micronutrient",
        }
    }
}

/// What a band does to an amount that falls inside it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingStep {
    /// Declare as zero
    Zero,
    /// Declare a fixed value regardless of the amount
    Fixed(f64),
    /// Round to the nearest multiple of the increment
    Nearest(f64),
}

/// One band of a rounding table.
///
/// `below` is an exclusive upper bound, `up_to` an inclusive one. A band with
/// neither bound catches everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundingBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<f64>,
    pub step: RoundingStep,
}

impl RoundingBand {
    fn admits(&self, amount: f64) -> bool {
        self.below.map_or(true, |b| amount < b) && self.up_to.map_or(true, |u| amount <= u)
    }

    fn is_unbounded(&self) -> bool {
        self.below.is_none() && self.up_to.is_none()
    }
}

/// Per-category rounding bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundingTable {
    pub energy: Vec<RoundingBand>,
    pub fat: Vec<RoundingBand>,
    pub cholesterol: Vec<RoundingBand>,
    pub sodium: Vec<RoundingBand>,
    pub carbohydrate: Vec<RoundingBand>,
    pub protein: Vec<RoundingBand>,
    pub micronutrient: Vec<RoundingBand>,
}

impl RoundingTable {
    pub fn bands(&self, category: RoundingCategory) -> &[RoundingBand] {
        match category {
            RoundingCategory::Energy => &self.energy,
            RoundingCategory::Fat => &self.fat,
            RoundingCategory::Cholesterol => &self.cholesterol,
            RoundingCategory::Sodium => &self.sodium,
            RoundingCategory::Carbohydrate => &self.carbohydrate,
            RoundingCategory::Protein => &self.protein,
            RoundingCategory::Micronutrient => &self.micronutrient,
        }
    }

    /// Check that every category ends in a catch-all band and that every
    /// increment is positive
    pub fn validate(&self) -> Result<(), String> {
        for category in RoundingCategory::ALL {
            let bands = self.bands(category);
            match bands.last() {
                None => return Err(format!("rounding category '{}' has no bands", category.as_str())),
                Some(last) if !last.is_unbounded() => {
                    return Err(format!(
                        "rounding category '{}' must end with a band without bounds",
                        category.as_str()
                    ))
                }
                _ => {}
            }
            for band in bands {
                if let RoundingStep::Nearest(step) = band.step {
                    if !(step > 0.0) {
                        return Err(format!(
                            "rounding category '{}' has a non-positive increment {}",
                            category.as_str(),
                            step
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Rounded numeric value for an amount.
    ///
    /// Negative and non-finite amounts round to zero. Halves round away from
    /// zero.
    pub fn rounded_value(&self, amount: f64, category: RoundingCategory) -> f64 {
        if !amount.is_finite() || amount < 0.0 {
            return 0.0;
        }
        let Some(band) = self.bands(category).iter().find(|b| b.admits(amount)) else {
            return 0.0;
        };
        match band.step {
            RoundingStep::Zero => 0.0,
            RoundingStep::Fixed(value) => value,
            RoundingStep::Nearest(step) => (amount / step).round() * step,
        }
    }

    /// Regulator-mandated display string for an amount ("0", "2.5", "140")
    pub fn display(&self, amount: f64, category: RoundingCategory) -> String {
        format_display(self.rounded_value(amount, category))
    }

    /// Display string for raw extracted text.
    ///
    /// Unparseable text displays as "0": callers must read a "0" here as
    /// possibly unknown, not necessarily absent.
    pub fn display_raw(&self, raw: &str, category: RoundingCategory) -> String {
        match parse_amount(raw) {
            Ok(amount) => self.display(amount, category),
            Err(err) => {
                tracing::debug!(raw, %err, "unparseable amount rounds to 0");
                "0".to_string()
            }
        }
    }
}

/// Render a rounded value without a trailing ".0"
pub fn format_display(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        return format!("{}", value.round() as i64);
    }
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    fn table() -> &'static RoundingTable {
        &RuleSet::us_fda().rounding
    }

    #[test]
    fn test_energy_bands() {
        let t = table();
        assert_eq!(t.display(4.9, RoundingCategory::Energy), "0");
        assert_eq!(t.display(5.0, RoundingCategory::Energy), "5");
        assert_eq!(t.display(47.0, RoundingCategory::Energy), "45");
        assert_eq!(t.display(50.0, RoundingCategory::Energy), "50");
        assert_eq!(t.display(54.0, RoundingCategory::Energy), "50");
        assert_eq!(t.display(236.0, RoundingCategory::Energy), "240");
    }

    #[test]
    fn test_fat_bands() {
        let t = table();
        assert_eq!(t.display(0.49999, RoundingCategory::Fat), "0");
        assert_eq!(t.display(0.5, RoundingCategory::Fat), "0.5");
        assert_eq!(t.display(2.3, RoundingCategory::Fat), "2.5");
        assert_eq!(t.display(3.9, RoundingCategory::Fat), "4");
        assert_eq!(t.display(4.9, RoundingCategory::Fat), "5");
        assert_eq!(t.display(5.4, RoundingCategory::Fat), "5");
        assert_eq!(t.display(12.6, RoundingCategory::Fat), "13");
    }

    #[test]
    fn test_cholesterol_bands() {
        let t = table();
        assert_eq!(t.display(1.9, RoundingCategory::Cholesterol), "0");
        assert_eq!(t.display(2.0, RoundingCategory::Cholesterol), "5");
        assert_eq!(t.display(5.0, RoundingCategory::Cholesterol), "5");
        assert_eq!(t.display(8.0, RoundingCategory::Cholesterol), "10");
        assert_eq!(t.display(31.0, RoundingCategory::Cholesterol), "30");
    }

    #[test]
    fn test_sodium_bands() {
        let t = table();
        assert_eq!(t.display(2.0, RoundingCategory::Sodium), "0");
        assert_eq!(t.display(3.5, RoundingCategory::Sodium), "0");
        assert_eq!(t.display(5.0, RoundingCategory::Sodium), "5");
        assert_eq!(t.display(137.0, RoundingCategory::Sodium), "135");
        assert_eq!(t.display(140.0, RoundingCategory::Sodium), "140");
        assert_eq!(t.display(142.0, RoundingCategory::Sodium), "140");
        assert_eq!(t.display(146.0, RoundingCategory::Sodium), "150");
    }

    #[test]
    fn test_carbohydrate_protein_micronutrient_bands() {
        let t = table();
        assert_eq!(t.display(0.4, RoundingCategory::Carbohydrate), "0");
        assert_eq!(t.display(0.5, RoundingCategory::Carbohydrate), "1");
        assert_eq!(t.display(22.4, RoundingCategory::Carbohydrate), "22");
        assert_eq!(t.display(7.5, RoundingCategory::Protein), "8");
        assert_eq!(t.display(0.3, RoundingCategory::Micronutrient), "0");
        assert_eq!(t.display(2.6, RoundingCategory::Micronutrient), "3");
    }

    #[test]
    fn test_fail_safe_inputs() {
        let t = table();
        assert_eq!(t.display(-4.0, RoundingCategory::Sodium), "0");
        assert_eq!(t.display(f64::NAN, RoundingCategory::Energy), "0");
        assert_eq!(t.display_raw("not a number", RoundingCategory::Fat), "0");
        assert_eq!(t.display_raw("2.3g", RoundingCategory::Fat), "2.5");
    }

    #[test]
    fn test_validate_rejects_open_ended_table() {
        let mut t = table().clone();
        t.sodium.pop();
        assert!(t.validate().is_err());
        t.sodium.clear();
        assert!(t.validate().is_err());
        assert!(table().validate().is_ok());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format_display(0.0), "0");
        assert_eq!(format_display(2.5), "2.5");
        assert_eq!(format_display(140.0), "140");
    }
}

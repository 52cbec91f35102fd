//! Percent of daily reference value (%DV)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Nutrient;

/// Daily reference values keyed by nutrient, in each nutrient's canonical unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceIntakeTable {
    values: BTreeMap<Nutrient, f64>,
}

impl ReferenceIntakeTable {
    pub fn new(values: BTreeMap<Nutrient, f64>) -> Self {
        Self { values }
    }

    /// Reference value for a nutrient, if it carries one
    pub fn reference_value(&self, nutrient: Nutrient) -> Option<f64> {
        self.values.get(&nutrient).copied()
    }

    pub fn nutrients(&self) -> impl Iterator<Item = Nutrient> + '_ {
        self.values.keys().copied()
    }

    /// `round(amount / reference * 100)`.
    ///
    /// Nutrients without a reference value, zero or invalid references, and
    /// negative or non-finite amounts all yield 0.
    pub fn percent(&self, nutrient: Nutrient, amount: f64) -> u32 {
        let Some(reference) = self.reference_value(nutrient) else {
            return 0;
        };
        if !(reference > 0.0) || !amount.is_finite() || amount <= 0.0 {
            return 0;
        }
        let percent = (amount / reference * 100.0).round();
        if percent >= u32::MAX as f64 {
            u32::MAX
        } else {
            percent as u32
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (nutrient, value) in &self.values {
            if !value.is_finite() || *value < 0.0 {
                return Err(format!(
                    "reference value for '{}' must be a non-negative number, got {}",
                    nutrient.key(),
                    value
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    fn table() -> &'static ReferenceIntakeTable {
        &RuleSet::us_fda().reference_intakes
    }

    #[test]
    fn test_twelve_reference_values() {
        assert_eq!(table().nutrients().count(), 12);
        assert_eq!(table().reference_value(Nutrient::Sodium), Some(2300.0));
        assert_eq!(table().reference_value(Nutrient::TransFat), None);
    }

    #[test]
    fn test_percent() {
        assert_eq!(table().percent(Nutrient::TotalFat, 8.0), 10);
        assert_eq!(table().percent(Nutrient::Sodium, 230.0), 10);
        assert_eq!(table().percent(Nutrient::AddedSugars, 12.0), 24);
        assert_eq!(table().percent(Nutrient::VitaminD, 2.0), 10);
        assert_eq!(table().percent(Nutrient::Potassium, 470.0), 10);
    }

    #[test]
    fn test_nutrients_without_reference() {
        assert_eq!(table().percent(Nutrient::TransFat, 3.0), 0);
        assert_eq!(table().percent(Nutrient::TotalSugars, 20.0), 0);
        assert_eq!(table().percent(Nutrient::Calories, 200.0), 0);
    }

    #[test]
    fn test_zero_reference_is_not_a_fault() {
        let mut values = BTreeMap::new();
        values.insert(Nutrient::Iron, 0.0);
        let t = ReferenceIntakeTable::new(values);
        assert_eq!(t.percent(Nutrient::Iron, 5.0), 0);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(table().percent(Nutrient::Sodium, -10.0), 0);
        assert_eq!(table().percent(Nutrient::Sodium, f64::INFINITY), 0);
    }
}

//! Serving size conversion
//!
//! Turns a metric serving ("30g", "240 mL") into a household measure with the
//! metric amount kept in parentheses: "2 tbsp (30g)". The metric numeral is
//! always carried through exactly as written.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rounding::format_display;
use super::units::{find_measures, metric_symbol, UnitCategory, UnitSystem, G_PER_OZ, ML_PER_CUP, ML_PER_FL_OZ};

/// How the household measure was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSource {
    /// Curated package-size table
    Lookup,
    /// Magnitude thresholds
    Computed,
    /// Input already had a household term and a metric parenthetical
    AlreadyHousehold,
    /// Nothing parseable; wrapped as "1 serving (...)"
    Fallback,
}

/// A serving declaration and its household-measure rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingDeclaration {
    /// Serving text as extracted
    pub original: String,
    /// Parsed metric magnitude, when the text starts with one
    pub magnitude: Option<f64>,
    /// Metric unit symbol ("g", "mL", ...)
    pub unit: Option<String>,
    /// Household measure followed by the metric parenthetical
    pub household: String,
    pub source: ConversionSource,
}

/// Curated conversions for common package sizes, keyed by the lowercase
/// metric text without spaces ("30g", "240ml")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServingLookup {
    entries: BTreeMap<String, String>,
}

/// Lookup key for serving text: lowercase, whitespace removed
pub fn lookup_key(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl ServingLookup {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn get(&self, text: &str) -> Option<&str> {
        self.entries.get(&lookup_key(text)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry must restate its key's metric numeral inside a parenthetical
    pub fn validate(&self) -> Result<(), String> {
        for (key, household) in &self.entries {
            let Some(measure) = find_measures(key).into_iter().next() else {
                return Err(format!("serving lookup key '{}' has no metric amount", key));
            };
            let Some(open) = household.find('(') else {
                return Err(format!("serving lookup entry for '{}' has no metric parenthetical", key));
            };
            if !household[open..].contains(&measure.numeral) {
                return Err(format!(
                    "serving lookup entry '{}' drops the metric amount {}",
                    household, measure.numeral
                ));
            }
        }
        Ok(())
    }
}

fn one_decimal(value: f64) -> String {
    format_display((value * 10.0).round() / 10.0)
}

fn cups(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let fractions = [(0.25, "1/4"), (0.33, "1/3"), (0.5, "1/2"), (0.67, "2/3"), (0.75, "3/4")];
    fractions
        .iter()
        .find(|(f, _)| (rounded - f).abs() < 0.005)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| format_display(rounded))
}

fn household_for_grams(grams: f64) -> String {
    if grams <= 15.0 {
        "1 tbsp".to_string()
    } else if grams <= 30.0 {
        "2 tbsp".to_string()
    } else if grams <= 100.0 {
        "1/4 cup".to_string()
    } else {
        format!("{} oz", one_decimal(grams / G_PER_OZ))
    }
}

fn household_for_ml(ml: f64) -> String {
    if ml <= 15.0 {
        "1 tbsp".to_string()
    } else if ml <= 120.0 {
        format!("{} cup", cups(ml / ML_PER_CUP))
    } else {
        format!("{} fl oz", one_decimal(ml / ML_PER_FL_OZ))
    }
}

/// Convert serving text into a household measure with the metric amount kept
pub fn convert_serving(text: &str, lookup: &ServingLookup) -> ServingDeclaration {
    let original = text.trim();
    let measures = find_measures(original);
    let leading_metric = measures
        .first()
        .filter(|m| m.start == 0 && m.system == UnitSystem::Metric);

    let magnitude = leading_metric.map(|m| m.value);
    let unit = leading_metric.and_then(|m| metric_symbol(&m.unit)).map(str::to_string);

    if let Some(household) = lookup.get(original) {
        return ServingDeclaration {
            original: original.to_string(),
            magnitude,
            unit,
            household: household.to_string(),
            source: ConversionSource::Lookup,
        };
    }

    if let Some(measure) = leading_metric {
        let symbol = metric_symbol(&measure.unit).unwrap_or("");
        let metric = format!("{}{}", measure.numeral, symbol);
        let household = match measure.category {
            Some(UnitCategory::Weight) => measure.grams().map(household_for_grams),
            Some(UnitCategory::Volume) => measure.milliliters().map(household_for_ml),
            Some(UnitCategory::Count) | None => None,
        };
        if let Some(household) = household {
            return ServingDeclaration {
                original: original.to_string(),
                magnitude,
                unit,
                household: format!("{} ({})", household, metric),
                source: ConversionSource::Computed,
            };
        }
    }

    let has_household = measures.first().map(|m| m.system == UnitSystem::Household).unwrap_or(false);
    let has_metric_parenthetical = measures.iter().any(|m| {
        m.system == UnitSystem::Metric && original[..m.start].contains('(')
    });
    if has_household && has_metric_parenthetical {
        return ServingDeclaration {
            original: original.to_string(),
            magnitude: None,
            unit: None,
            household: original.to_string(),
            source: ConversionSource::AlreadyHousehold,
        };
    }

    tracing::warn!(serving = original, "Serving size not recognized, wrapping as '1 serving'");
    ServingDeclaration {
        original: original.to_string(),
        magnitude: None,
        unit: None,
        household: format!("1 serving ({})", original),
        source: ConversionSource::Fallback,
    }
}

/// Unit families found in a net quantity statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetQuantityUnits {
    pub customary: bool,
    pub metric: bool,
}

/// Scan a net quantity statement ("NET WT 12 OZ (340g)") for both unit families
pub fn net_quantity_units(text: &str) -> NetQuantityUnits {
    find_measures(text)
        .iter()
        .fold(NetQuantityUnits::default(), |mut found, m| {
            match m.system {
                UnitSystem::Customary => found.customary = true,
                UnitSystem::Metric => found.metric = true,
                UnitSystem::Household => {}
            }
            found
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    fn convert(text: &str) -> ServingDeclaration {
        convert_serving(text, &RuleSet::us_fda().serving_lookup)
    }

    #[test]
    fn test_lookup_hits() {
        let s = convert("30g");
        assert_eq!(s.household, "2 tbsp (30g)");
        assert_eq!(s.source, ConversionSource::Lookup);
        assert_eq!(s.magnitude, Some(30.0));
        assert_eq!(s.unit.as_deref(), Some("g"));

        assert_eq!(convert("240 mL").household, "1 cup (240mL)");
        assert_eq!(convert("355ml").household, "12 fl oz (355mL)");
    }

    #[test]
    fn test_computed_mass() {
        assert_eq!(convert("12g").household, "1 tbsp (12g)");
        assert_eq!(convert("25g").household, "2 tbsp (25g)");
        assert_eq!(convert("40g").household, "1/4 cup (40g)");
        assert_eq!(convert("340g").household, "12 oz (340g)");
        assert_eq!(convert("30.5 g").household, "1/4 cup (30.5g)");
    }

    #[test]
    fn test_computed_volume() {
        assert_eq!(convert("10ml").household, "1 tbsp (10mL)");
        assert_eq!(convert("60 ml").household, "1/4 cup (60mL)");
        assert_eq!(convert("100ml").household, "0.42 cup (100mL)");
        assert_eq!(convert("330ml").household, "11.2 fl oz (330mL)");
        assert_eq!(convert("1.5 L").household, "50.7 fl oz (1.5L)");
    }

    #[test]
    fn test_already_household_passes_through() {
        let s = convert("2 tbsp (30g)");
        assert_eq!(s.household, "2 tbsp (30g)");
        assert_eq!(s.source, ConversionSource::AlreadyHousehold);
    }

    #[test]
    fn test_fallback_keeps_original() {
        let s = convert("one bar");
        assert_eq!(s.household, "1 serving (one bar)");
        assert_eq!(s.source, ConversionSource::Fallback);
        assert_eq!(convert("3 pieces").household, "1 serving (3 pieces)");
    }

    #[test]
    fn test_embedded_lookup_is_metric_preserving() {
        assert!(RuleSet::us_fda().serving_lookup.validate().is_ok());

        let mut entries = BTreeMap::new();
        entries.insert("30g".to_string(), "2 tbsp".to_string());
        assert!(ServingLookup::new(entries).validate().is_err());
    }

    #[test]
    fn test_net_quantity_units() {
        let both = net_quantity_units("NET WT 12 OZ (340g)");
        assert!(both.customary && both.metric);

        let metric_only = net_quantity_units("Net Wt. 340 g");
        assert!(!metric_only.customary && metric_only.metric);

        let fluid = net_quantity_units("12 fl oz (355 mL)");
        assert!(fluid.customary && fluid.metric);

        assert_eq!(net_quantity_units("one bag"), NetQuantityUnits::default());
    }
}

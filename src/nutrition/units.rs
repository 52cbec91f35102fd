//! Unit types and conversion constants
//!
//! Recognizes the measurement units that appear in serving declarations and
//! net quantity statements, and scans free text for `<number> <unit>` pairs.

use serde::{Deserialize, Serialize};

/// Category of a measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    /// Weight/mass units (g, oz, lb, kg)
    Weight,
    /// Volume units (ml, tbsp, cup, etc.)
    Volume,
    /// Count/discrete units (piece, slice, bar)
    Count,
}

/// Which family of units a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// g, mg, kg, mL, cL, L
    Metric,
    /// oz, lb, fl oz, pt, qt, gal
    Customary,
    /// tbsp, tsp, cup, piece, slice, ...
    Household,
}

// ============================================================================
// Labeling Conversion Constants
// ============================================================================

/// Grams per ounce as used for label declarations
pub const G_PER_OZ: f64 = 28.35;
/// Grams per pound
pub const G_PER_LB: f64 = 453.6;
/// Grams per milligram
pub const G_PER_MG: f64 = 0.001;
/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;

/// Milliliters per teaspoon (labeling value)
pub const ML_PER_TSP: f64 = 5.0;
/// Milliliters per tablespoon (labeling value)
pub const ML_PER_TBSP: f64 = 15.0;
/// Milliliters per fluid ounce as used for label declarations
pub const ML_PER_FL_OZ: f64 = 29.57;
/// Milliliters per cup (labeling value)
pub const ML_PER_CUP: f64 = 240.0;
/// Milliliters per centiliter
pub const ML_PER_CL: f64 = 10.0;
/// Milliliters per liter
pub const ML_PER_LITER: f64 = 1000.0;
/// Milliliters per pint (US)
pub const ML_PER_PINT: f64 = 473.176;
/// Milliliters per quart (US)
pub const ML_PER_QUART: f64 = 946.353;
/// Milliliters per gallon (US)
pub const ML_PER_GALLON: f64 = 3785.41;

// ============================================================================
// Unit Recognition
// ============================================================================

/// Lowercase a unit and drop dots and whitespace, so "Fl. Oz." becomes "floz"
pub fn normalize_unit(unit: &str) -> String {
    unit.chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Get the conversion factor to grams for a weight unit
pub fn grams_per_unit(unit: &str) -> Option<f64> {
    match normalize_unit(unit).as_str() {
        "g" | "gr" | "gram" | "grams" | "gramme" | "grammes" => Some(1.0),
        "mg" | "milligram" | "milligrams" => Some(G_PER_MG),
        "kg" | "kilogram" | "kilograms" => Some(G_PER_KG),
        "oz" | "ounce" | "ounces" => Some(G_PER_OZ),
        "lb" | "lbs" | "pound" | "pounds" => Some(G_PER_LB),
        _ => None,
    }
}

/// Get the conversion factor to milliliters for a volume unit
pub fn ml_per_unit(unit: &str) -> Option<f64> {
    match normalize_unit(unit).as_str() {
        "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Some(1.0),
        "cl" | "centiliter" | "centiliters" | "centilitre" | "centilitres" => Some(ML_PER_CL),
        "l" | "lt" | "liter" | "liters" | "litre" | "litres" => Some(ML_PER_LITER),
        "tsp" | "teaspoon" | "teaspoons" => Some(ML_PER_TSP),
        "tbsp" | "tablespoon" | "tablespoons" => Some(ML_PER_TBSP),
        "floz" | "fluidounce" | "fluidounces" => Some(ML_PER_FL_OZ),
        "cup" | "cups" => Some(ML_PER_CUP),
        "pt" | "pint" | "pints" => Some(ML_PER_PINT),
        "qt" | "quart" | "quarts" => Some(ML_PER_QUART),
        "gal" | "gallon" | "gallons" => Some(ML_PER_GALLON),
        _ => None,
    }
}

/// Count-style household units (no conversion factor)
fn is_count_unit(normalized: &str) -> bool {
    matches!(
        normalized,
        "piece" | "pieces" | "pc" | "pcs" | "slice" | "slices" | "bar" | "bars" | "cookie"
            | "cookies" | "cracker" | "crackers" | "container" | "package" | "bottle" | "can"
            | "pouch" | "packet" | "stick" | "sticks" | "each"
    )
}

/// Determine the category of a unit string
pub fn categorize_unit(unit: &str) -> Option<UnitCategory> {
    if grams_per_unit(unit).is_some() {
        return Some(UnitCategory::Weight);
    }
    if ml_per_unit(unit).is_some() {
        return Some(UnitCategory::Volume);
    }
    if is_count_unit(&normalize_unit(unit)) {
        return Some(UnitCategory::Count);
    }
    None
}

/// Determine which unit family a unit belongs to
pub fn unit_system(unit: &str) -> Option<UnitSystem> {
    let normalized = normalize_unit(unit);
    match normalized.as_str() {
        "g" | "gr" | "gram" | "grams" | "gramme" | "grammes" | "mg" | "milligram"
        | "milligrams" | "kg" | "kilogram" | "kilograms" | "ml" | "milliliter"
        | "milliliters" | "millilitre" | "millilitres" | "cl" | "centiliter" | "centiliters"
        | "centilitre" | "centilitres" | "l" | "lt" | "liter" | "liters" | "litre" | "litres" => {
            Some(UnitSystem::Metric)
        }
        "oz" | "ounce" | "ounces" | "lb" | "lbs" | "pound" | "pounds" | "floz"
        | "fluidounce" | "fluidounces" | "pt" | "pint" | "pints" | "qt" | "quart" | "quarts"
        | "gal" | "gallon" | "gallons" => Some(UnitSystem::Customary),
        "tsp" | "teaspoon" | "teaspoons" | "tbsp" | "tablespoon" | "tablespoons" | "cup"
        | "cups" => Some(UnitSystem::Household),
        other if is_count_unit(other) => Some(UnitSystem::Household),
        _ => None,
    }
}

/// Label symbol for a metric unit ("g", "mg", "kg", "mL", "cL", "L")
pub fn metric_symbol(unit: &str) -> Option<&'static str> {
    if unit_system(unit) != Some(UnitSystem::Metric) {
        return None;
    }
    match grams_per_unit(unit) {
        Some(f) if f == 1.0 => return Some("g"),
        Some(f) if f == G_PER_MG => return Some("mg"),
        Some(f) if f == G_PER_KG => return Some("kg"),
        _ => {}
    }
    match ml_per_unit(unit) {
        Some(f) if f == 1.0 => Some("mL"),
        Some(f) if f == ML_PER_CL => Some("cL"),
        Some(f) if f == ML_PER_LITER => Some("L"),
        _ => None,
    }
}

// ============================================================================
// Measure Scanning
// ============================================================================

/// A `<number> <unit>` pair found in free text
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    /// Parsed magnitude
    pub value: f64,
    /// The numeral exactly as written (e.g. "30", "1,5")
    pub numeral: String,
    /// The unit as written, trimmed of trailing dots
    pub unit: String,
    pub system: UnitSystem,
    pub category: Option<UnitCategory>,
    /// Byte offset of the numeral in the scanned text
    pub start: usize,
}

impl Measure {
    /// Magnitude in grams, for weight units
    pub fn grams(&self) -> Option<f64> {
        grams_per_unit(&self.unit).map(|f| self.value * f)
    }

    /// Magnitude in milliliters, for volume units
    pub fn milliliters(&self) -> Option<f64> {
        ml_per_unit(&self.unit).map(|f| self.value * f)
    }
}

/// Parse a numeral that may use a decimal comma ("1,5") or a thousands
/// separator ("1,200")
pub fn parse_numeral(numeral: &str) -> Option<f64> {
    let cleaned = match numeral.find(',') {
        Some(pos) if !numeral.contains('.') => {
            let lead = &numeral[..pos];
            let thousands = !lead.is_empty()
                && lead.len() <= 3
                && !lead.starts_with('0')
                && numeral[pos + 1..]
                    .split(',')
                    .all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()));
            if thousands {
                numeral.replace(',', "")
            } else {
                numeral.replacen(',', ".", 1)
            }
        }
        Some(_) => numeral.replace(',', ""),
        None => numeral.to_string(),
    };
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Find every recognized `<number> <unit>` pair in the text, in order.
///
/// Numbers glued to a preceding letter (E-numbers such as "E965") are skipped.
pub fn find_measures(text: &str) -> Vec<Measure> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |idx: usize| chars.get(idx).map(|(b, _)| *b).unwrap_or(text.len());
    let mut measures = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];
        let glued = i > 0 && chars[i - 1].1.is_alphanumeric();
        if !c.is_ascii_digit() || glued {
            i += 1;
            continue;
        }

        // Numeral: digits with embedded '.' or ',' between digits
        let mut j = i;
        while j < chars.len() {
            let ch = chars[j].1;
            let separator_then_digit = (ch == '.' || ch == ',')
                && chars.get(j + 1).map(|(_, n)| n.is_ascii_digit()).unwrap_or(false);
            if ch.is_ascii_digit() || separator_then_digit {
                j += 1;
            } else {
                break;
            }
        }
        let numeral = &text[start..byte_at(j)];

        // Unit: letters and dots after optional whitespace
        let mut k = j;
        while k < chars.len() && chars[k].1.is_whitespace() {
            k += 1;
        }
        let unit_start = k;
        while k < chars.len() && (chars[k].1.is_alphabetic() || chars[k].1 == '.') {
            k += 1;
        }
        let mut unit_end = k;

        // Two-word units: "fl oz", "fl. oz"
        let first_word = normalize_unit(&text[byte_at(unit_start)..byte_at(unit_end)]);
        if first_word == "fl" || first_word == "fluid" {
            let mut m = k;
            while m < chars.len() && chars[m].1.is_whitespace() {
                m += 1;
            }
            let second_start = m;
            while m < chars.len() && (chars[m].1.is_alphabetic() || chars[m].1 == '.') {
                m += 1;
            }
            let second = normalize_unit(&text[byte_at(second_start)..byte_at(m)]);
            if matches!(second.as_str(), "oz" | "ounce" | "ounces") {
                unit_end = m;
            }
        }

        let unit = text[byte_at(unit_start)..byte_at(unit_end)]
            .trim_end_matches('.')
            .to_string();

        match (unit_system(&unit), parse_numeral(numeral)) {
            (Some(system), Some(value)) if !unit.is_empty() => {
                measures.push(Measure {
                    value,
                    numeral: numeral.to_string(),
                    category: categorize_unit(&unit),
                    unit,
                    system,
                    start,
                });
                i = unit_end;
            }
            _ => i = j,
        }
    }

    measures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_weight_units() {
        assert_eq!(categorize_unit("g"), Some(UnitCategory::Weight));
        assert_eq!(categorize_unit("gram"), Some(UnitCategory::Weight));
        assert_eq!(categorize_unit("oz"), Some(UnitCategory::Weight));
        assert_eq!(categorize_unit("lb"), Some(UnitCategory::Weight));
        assert_eq!(categorize_unit("kg"), Some(UnitCategory::Weight));
    }

    #[test]
    fn test_categorize_volume_units() {
        assert_eq!(categorize_unit("mL"), Some(UnitCategory::Volume));
        assert_eq!(categorize_unit("tbsp"), Some(UnitCategory::Volume));
        assert_eq!(categorize_unit("Fl. Oz."), Some(UnitCategory::Volume));
        assert_eq!(categorize_unit("L"), Some(UnitCategory::Volume));
    }

    #[test]
    fn test_categorize_count_and_unknown() {
        assert_eq!(categorize_unit("piece"), Some(UnitCategory::Count));
        assert_eq!(categorize_unit("scoop"), None);
    }

    #[test]
    fn test_unit_system() {
        assert_eq!(unit_system("g"), Some(UnitSystem::Metric));
        assert_eq!(unit_system("mL"), Some(UnitSystem::Metric));
        assert_eq!(unit_system("OZ"), Some(UnitSystem::Customary));
        assert_eq!(unit_system("fl oz"), Some(UnitSystem::Customary));
        assert_eq!(unit_system("cup"), Some(UnitSystem::Household));
        assert_eq!(unit_system("servings"), None);
    }

    #[test]
    fn test_metric_symbol() {
        assert_eq!(metric_symbol("grams"), Some("g"));
        assert_eq!(metric_symbol("ml"), Some("mL"));
        assert_eq!(metric_symbol("Litre"), Some("L"));
        assert_eq!(metric_symbol("oz"), None);
    }

    #[test]
    fn test_parse_numeral() {
        assert_eq!(parse_numeral("30"), Some(30.0));
        assert_eq!(parse_numeral("1,5"), Some(1.5));
        assert_eq!(parse_numeral("1,200"), Some(1200.0));
        assert_eq!(parse_numeral("2.5"), Some(2.5));
        assert_eq!(parse_numeral("0,125"), Some(0.125));
        assert_eq!(parse_numeral("1,250,000"), Some(1_250_000.0));
        assert_eq!(parse_numeral("1250,5"), Some(1250.5));
    }

    #[test]
    fn test_find_measures_net_quantity() {
        let found = find_measures("NET WT 12 OZ (340g)");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].system, UnitSystem::Customary);
        assert_eq!(found[0].numeral, "12");
        assert_eq!(found[1].system, UnitSystem::Metric);
        assert_eq!(found[1].unit, "g");
        assert_eq!(found[1].value, 340.0);
    }

    #[test]
    fn test_find_measures_fluid_ounces() {
        let found = find_measures("16.9 FL. OZ. (500 mL)");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].system, UnitSystem::Customary);
        assert!((found[0].milliliters().unwrap() - 16.9 * ML_PER_FL_OZ).abs() < 1e-9);
        assert_eq!(found[1].numeral, "500");
    }

    #[test]
    fn test_find_measures_skips_e_numbers_and_plain_numbers() {
        assert!(find_measures("sweetener E965, 3 eggs").is_empty());
        assert!(find_measures("About 8 servings").is_empty());
    }

    #[test]
    fn test_measure_category_picks_conversion() {
        let found = find_measures("30 g, 240 mL, 2 pieces");
        let categories: Vec<_> = found.iter().map(|m| m.category).collect();
        assert_eq!(
            categories,
            vec![Some(UnitCategory::Weight), Some(UnitCategory::Volume), Some(UnitCategory::Count)]
        );
    }

    #[test]
    fn test_measure_conversions() {
        let found = find_measures("1.5kg");
        assert_eq!(found[0].grams(), Some(1500.0));
        assert_eq!(found[0].milliliters(), None);
    }
}

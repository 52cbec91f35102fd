//! Nutrient identifiers and the per-audit nutrient record

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::nutrition::RoundingCategory;

/// Canonical unit a nutrient amount is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientUnit {
    Kcal,
    G,
    Mg,
    Mcg,
}

impl NutrientUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            NutrientUnit::Kcal => "",
            NutrientUnit::G => "g",
            NutrientUnit::Mg => "mg",
            NutrientUnit::Mcg => "mcg",
        }
    }

    pub fn field_suffix(&self) -> &'static str {
        match self {
            NutrientUnit::Kcal => "",
            NutrientUnit::G => "_g",
            NutrientUnit::Mg => "_mg",
            NutrientUnit::Mcg => "_mcg",
        }
    }
}

/// Nutrient identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    TotalFat,
    SaturatedFat,
    TransFat,
    Cholesterol,
    Sodium,
    #[serde(rename = "total_carb")]
    TotalCarbohydrate,
    #[serde(rename = "fiber")]
    DietaryFiber,
    TotalSugars,
    AddedSugars,
    SugarAlcohols,
    Protein,
    VitaminD,
    Calcium,
    Iron,
    Potassium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 16] = [
        Nutrient::Calories,
        Nutrient::TotalFat,
        Nutrient::SaturatedFat,
        Nutrient::TransFat,
        Nutrient::Cholesterol,
        Nutrient::Sodium,
        Nutrient::TotalCarbohydrate,
        Nutrient::DietaryFiber,
        Nutrient::TotalSugars,
        Nutrient::AddedSugars,
        Nutrient::SugarAlcohols,
        Nutrient::Protein,
        Nutrient::VitaminD,
        Nutrient::Calcium,
        Nutrient::Iron,
        Nutrient::Potassium,
    ];

    /// Identifier used in rule tables ("total_fat", "total_carb")
    pub fn key(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::TotalFat => "total_fat",
            Nutrient::SaturatedFat => "saturated_fat",
            Nutrient::TransFat => "trans_fat",
            Nutrient::Cholesterol => "cholesterol",
            Nutrient::Sodium => "sodium",
            Nutrient::TotalCarbohydrate => "total_carb",
            Nutrient::DietaryFiber => "fiber",
            Nutrient::TotalSugars => "total_sugars",
            Nutrient::AddedSugars => "added_sugars",
            Nutrient::SugarAlcohols => "sugar_alcohols",
            Nutrient::Protein => "protein",
            Nutrient::VitaminD => "vitamin_d",
            Nutrient::Calcium => "calcium",
            Nutrient::Iron => "iron",
            Nutrient::Potassium => "potassium",
        }
    }

    /// Extraction field name, unit suffixed ("sodium_mg")
    pub fn field_name(&self) -> String {
        format!("{}{}", self.key(), self.unit().field_suffix())
    }

    /// Name as printed on a nutrition panel
    pub fn display_name(&self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::TotalFat => "Total Fat",
            Nutrient::SaturatedFat => "Saturated Fat",
            Nutrient::TransFat => "Trans Fat",
            Nutrient::Cholesterol => "Cholesterol",
            Nutrient::Sodium => "Sodium",
            Nutrient::TotalCarbohydrate => "Total Carbohydrate",
            Nutrient::DietaryFiber => "Dietary Fiber",
            Nutrient::TotalSugars => "Total Sugars",
            Nutrient::AddedSugars => "Added Sugars",
            Nutrient::SugarAlcohols => "Sugar Alcohol",
            Nutrient::Protein => "Protein",
            Nutrient::VitaminD => "Vitamin D",
            Nutrient::Calcium => "Calcium",
            Nutrient::Iron => "Iron",
            Nutrient::Potassium => "Potassium",
        }
    }

    pub fn unit(&self) -> NutrientUnit {
        match self {
            Nutrient::Calories => NutrientUnit::Kcal,
            Nutrient::Cholesterol
            | Nutrient::Sodium
            | Nutrient::Calcium
            | Nutrient::Iron
            | Nutrient::Potassium => NutrientUnit::Mg,
            Nutrient::VitaminD => NutrientUnit::Mcg,
            _ => NutrientUnit::G,
        }
    }

    pub fn rounding_category(&self) -> RoundingCategory {
        match self {
            Nutrient::Calories => RoundingCategory::Energy,
            Nutrient::TotalFat | Nutrient::SaturatedFat | Nutrient::TransFat => RoundingCategory::Fat,
            Nutrient::Cholesterol => RoundingCategory::Cholesterol,
            Nutrient::Sodium => RoundingCategory::Sodium,
            Nutrient::TotalCarbohydrate
            | Nutrient::DietaryFiber
            | Nutrient::TotalSugars
            | Nutrient::AddedSugars
            | Nutrient::SugarAlcohols => RoundingCategory::Carbohydrate,
            Nutrient::Protein => RoundingCategory::Protein,
            Nutrient::VitaminD | Nutrient::Calcium | Nutrient::Iron | Nutrient::Potassium => {
                RoundingCategory::Micronutrient
            }
        }
    }

    /// Lenient lookup by table key, field name or printed name
    /// ("total_fat", "total_fat_g", "Total Fat", "Incl. Added Sugars")
    pub fn from_key(s: &str) -> Option<Self> {
        let mut key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        while key.contains("__") {
            key = key.replace("__", "_");
        }
        let key = key.trim_matches('_');
        let key = key
            .strip_prefix("incl_")
            .or_else(|| key.strip_prefix("includes_"))
            .unwrap_or(key);
        let key = ["_mcg", "_mg", "_g"]
            .iter()
            .find_map(|suffix| key.strip_suffix(suffix))
            .unwrap_or(key);

        let found = match key {
            "calories" | "energy" | "kcal" => Nutrient::Calories,
            "total_fat" | "fat" => Nutrient::TotalFat,
            "saturated_fat" | "sat_fat" => Nutrient::SaturatedFat,
            "trans_fat" => Nutrient::TransFat,
            "cholesterol" => Nutrient::Cholesterol,
            "sodium" => Nutrient::Sodium,
            "total_carb" | "total_carbs" | "total_carbohydrate" | "total_carbohydrates"
            | "carbohydrate" | "carbohydrates" | "carbs" => Nutrient::TotalCarbohydrate,
            "fiber" | "dietary_fiber" | "fibre" | "dietary_fibre" => Nutrient::DietaryFiber,
            "total_sugars" | "sugars" | "total_sugar" => Nutrient::TotalSugars,
            "added_sugars" | "added_sugar" => Nutrient::AddedSugars,
            "sugar_alcohols" | "sugar_alcohol" | "polyols" => Nutrient::SugarAlcohols,
            "protein" => Nutrient::Protein,
            "vitamin_d" | "vit_d" => Nutrient::VitaminD,
            "calcium" => Nutrient::Calcium,
            "iron" => Nutrient::Iron,
            "potassium" => Nutrient::Potassium,
            _ => return None,
        };
        Some(found)
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Nutrient amounts for one audit, in canonical units.
///
/// Absent nutrients read as 0; `is_declared` tells a declared zero apart
/// from a defaulted one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutrientRecord {
    amounts: BTreeMap<Nutrient, f64>,
    declared: BTreeSet<Nutrient>,
}

impl NutrientRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from declared amounts; negative or non-finite amounts clamp to 0
    pub fn from_amounts<I: IntoIterator<Item = (Nutrient, f64)>>(amounts: I) -> Self {
        let mut record = Self::new();
        for (nutrient, amount) in amounts {
            record.set(nutrient, amount);
        }
        record
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.amounts.get(&nutrient).copied().unwrap_or(0.0)
    }

    pub fn is_declared(&self, nutrient: Nutrient) -> bool {
        self.declared.contains(&nutrient)
    }

    pub fn declared(&self) -> impl Iterator<Item = Nutrient> + '_ {
        self.declared.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    pub(crate) fn set(&mut self, nutrient: Nutrient, amount: f64) {
        let amount = if amount.is_finite() && amount > 0.0 { amount } else { 0.0 };
        self.amounts.insert(nutrient, amount);
        self.declared.insert(nutrient);
    }

    /// Zero a nutrient the extraction reported, keeping it declared
    pub(crate) fn clear(&mut self, nutrient: Nutrient) {
        self.set(nutrient, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_variants() {
        assert_eq!(Nutrient::from_key("total_fat"), Some(Nutrient::TotalFat));
        assert_eq!(Nutrient::from_key("total_fat_g"), Some(Nutrient::TotalFat));
        assert_eq!(Nutrient::from_key("Total Fat"), Some(Nutrient::TotalFat));
        assert_eq!(Nutrient::from_key("Incl. Added Sugars"), Some(Nutrient::AddedSugars));
        assert_eq!(Nutrient::from_key("Vitamin D (mcg)"), Some(Nutrient::VitaminD));
        assert_eq!(Nutrient::from_key("sodium_mg"), Some(Nutrient::Sodium));
        assert_eq!(Nutrient::from_key("serving_size"), None);
    }

    #[test]
    fn test_keys_round_trip() {
        for nutrient in Nutrient::ALL {
            assert_eq!(Nutrient::from_key(nutrient.key()), Some(nutrient));
            assert_eq!(Nutrient::from_key(&nutrient.field_name()), Some(nutrient));
            assert_eq!(Nutrient::from_key(nutrient.display_name()), Some(nutrient));
        }
    }

    #[test]
    fn test_serde_names_match_keys() {
        for nutrient in Nutrient::ALL {
            let json = serde_json::to_string(&nutrient).unwrap();
            assert_eq!(json, format!("\"{}\"", nutrient.key()));
        }
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Nutrient::Calories.field_name(), "calories");
        assert_eq!(Nutrient::Sodium.field_name(), "sodium_mg");
        assert_eq!(Nutrient::VitaminD.field_name(), "vitamin_d_mcg");
        assert_eq!(Nutrient::TotalCarbohydrate.field_name(), "total_carb_g");
    }

    #[test]
    fn test_record_defaults_and_clamps() {
        let record = NutrientRecord::from_amounts([(Nutrient::Sodium, -5.0), (Nutrient::Protein, 3.0)]);
        assert_eq!(record.get(Nutrient::Sodium), 0.0);
        assert!(record.is_declared(Nutrient::Sodium));
        assert_eq!(record.get(Nutrient::Protein), 3.0);
        assert_eq!(record.get(Nutrient::Iron), 0.0);
        assert!(!record.is_declared(Nutrient::Iron));
    }
}

//! Extracted label record
//!
//! The extraction collaborator returns a loosely typed field map. Every field
//! here is independently optional; text fields take any JSON scalar and
//! nutrient amounts take numbers or strings. Nothing in this module fails
//! on a missing or malformed field.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::nutrient::{Nutrient, NutrientRecord};
use crate::nutrition::{AmountError, RawAmount};

/// A defaulted or suspicious input value. Never a compliance issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityWarning {
    pub field: String,
    pub message: String,
}

impl DataQualityWarning {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn scalar_text(value: Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(scalar_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Object(_) => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_text))
}

/// A list, or a comma / newline separated string
fn lenient_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<String> = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) => s
            .split([',', '\n', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => return Ok(None),
    };
    Ok((!items.is_empty()).then_some(items))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "present" => Some(true),
            "false" | "no" | "n" | "0" | "absent" | "missing" => Some(false),
            _ => None,
        },
        _ => None,
    };
    Ok(flag)
}

/// Alternate extractor keys and the field they stand for
const FIELD_ALIASES: [(&str, &str); 3] = [
    ("total_carbohydrate_g", "total_carb_g"),
    ("dietary_fiber_g", "fiber_g"),
    ("distributor_statement", "importer_statement"),
];

/// Label fields as returned by the extraction step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedLabel {
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub net_quantity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub serving_size_original: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub serving_size_metric: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub servings_per_container: Option<String>,

    #[serde(default)]
    pub calories: Option<RawAmount>,
    #[serde(default)]
    pub total_fat_g: Option<RawAmount>,
    #[serde(default)]
    pub saturated_fat_g: Option<RawAmount>,
    #[serde(default)]
    pub trans_fat_g: Option<RawAmount>,
    #[serde(default)]
    pub cholesterol_mg: Option<RawAmount>,
    #[serde(default)]
    pub sodium_mg: Option<RawAmount>,
    #[serde(default)]
    pub total_carb_g: Option<RawAmount>,
    #[serde(default)]
    pub fiber_g: Option<RawAmount>,
    #[serde(default)]
    pub total_sugars_g: Option<RawAmount>,
    #[serde(default)]
    pub added_sugars_g: Option<RawAmount>,
    #[serde(default)]
    pub sugar_alcohols_g: Option<RawAmount>,
    #[serde(default)]
    pub protein_g: Option<RawAmount>,
    #[serde(default)]
    pub vitamin_d_mcg: Option<RawAmount>,
    #[serde(default)]
    pub calcium_mg: Option<RawAmount>,
    #[serde(default)]
    pub iron_mg: Option<RawAmount>,
    #[serde(default)]
    pub potassium_mg: Option<RawAmount>,

    /// Nutrient names as printed on the panel, top to bottom
    #[serde(default, deserialize_with = "lenient_list")]
    pub nutrient_order: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub nutrition_panel_present: Option<bool>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub ingredients: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ingredients_translated: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub allergen_statement: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub manufacturer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub manufacturer_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub country_of_origin: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub importer_statement: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub primary_language: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub secondary_language: Option<String>,
}

impl ExtractedLabel {
    /// Build from any JSON value. Non-objects give an empty record.
    pub fn from_value(value: Value) -> Self {
        Self::read(value).0
    }

    /// Build from any JSON value, reporting what had to be dropped or
    /// defaulted on the way.
    ///
    /// Alternate keys fold into their canonical field; when both are present
    /// the canonical value wins.
    pub fn read(value: Value) -> (Self, Vec<DataQualityWarning>) {
        let Value::Object(mut fields) = value else {
            let warning = DataQualityWarning::new("record", "extraction output is not a JSON object; audited as empty");
            return (Self::default(), vec![warning]);
        };

        let mut warnings = Vec::new();
        for (alias, canonical) in FIELD_ALIASES {
            let Some(aliased) = fields.remove(alias) else {
                continue;
            };
            match fields.get(canonical) {
                None | Some(Value::Null) => {
                    fields.insert(canonical.to_string(), aliased);
                }
                Some(existing) if aliased.is_null() || *existing == aliased => {}
                Some(_) => warnings.push(DataQualityWarning::new(
                    alias,
                    format!("conflicts with '{}'; the '{}' value is used", canonical, canonical),
                )),
            }
        }

        match serde_json::from_value(Value::Object(fields)) {
            Ok(label) => (label, warnings),
            Err(err) => {
                tracing::warn!(%err, "extracted record did not deserialize, auditing an empty record");
                warnings.push(DataQualityWarning::new(
                    "record",
                    format!("extracted record could not be read ({}); audited as empty", err),
                ));
                (Self::default(), warnings)
            }
        }
    }

    /// Raw extracted amount for a nutrient
    pub fn amount(&self, nutrient: Nutrient) -> Option<&RawAmount> {
        match nutrient {
            Nutrient::Calories => self.calories.as_ref(),
            Nutrient::TotalFat => self.total_fat_g.as_ref(),
            Nutrient::SaturatedFat => self.saturated_fat_g.as_ref(),
            Nutrient::TransFat => self.trans_fat_g.as_ref(),
            Nutrient::Cholesterol => self.cholesterol_mg.as_ref(),
            Nutrient::Sodium => self.sodium_mg.as_ref(),
            Nutrient::TotalCarbohydrate => self.total_carb_g.as_ref(),
            Nutrient::DietaryFiber => self.fiber_g.as_ref(),
            Nutrient::TotalSugars => self.total_sugars_g.as_ref(),
            Nutrient::AddedSugars => self.added_sugars_g.as_ref(),
            Nutrient::SugarAlcohols => self.sugar_alcohols_g.as_ref(),
            Nutrient::Protein => self.protein_g.as_ref(),
            Nutrient::VitaminD => self.vitamin_d_mcg.as_ref(),
            Nutrient::Calcium => self.calcium_mg.as_ref(),
            Nutrient::Iron => self.iron_mg.as_ref(),
            Nutrient::Potassium => self.potassium_mg.as_ref(),
        }
    }

    /// Ingredient text for scanning, original first then translation
    pub fn ingredient_text(&self) -> Option<String> {
        match (&self.ingredients, &self.ingredients_translated) {
            (Some(a), Some(b)) if a != b => Some(format!("{}\n{}", a, b)),
            (Some(a), _) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        }
    }

    /// Serving text to convert: the metric field when present
    pub fn serving_text(&self) -> Option<&str> {
        self.serving_size_metric
            .as_deref()
            .or(self.serving_size_original.as_deref())
    }

    /// Parse every nutrient amount.
    ///
    /// Missing mandatory nutrients, unparseable and negative amounts each
    /// give one warning. Unusable amounts count as a declared 0; missing
    /// ones stay undeclared.
    pub fn nutrient_record(&self, mandatory: &[Nutrient]) -> (NutrientRecord, Vec<DataQualityWarning>) {
        let mut record = NutrientRecord::new();
        let mut warnings = Vec::new();

        for nutrient in Nutrient::ALL {
            let field = nutrient.field_name();
            let parsed = match self.amount(nutrient) {
                None => Err(AmountError::Empty),
                Some(raw) => raw.parse(),
            };
            match parsed {
                Ok(amount) => record.set(nutrient, amount),
                Err(AmountError::Empty) => {
                    if mandatory.contains(&nutrient) {
                        tracing::warn!(field = %field, "nutrient not extracted, treated as 0");
                        warnings.push(DataQualityWarning::new(field, "not extracted; treated as 0"));
                    }
                }
                Err(err) => {
                    tracing::warn!(field = %field, %err, "unusable nutrient amount clamped to 0");
                    warnings.push(DataQualityWarning::new(field, format!("{}; treated as 0", err)));
                    record.set(nutrient, 0.0);
                }
            }
        }

        let added = record.get(Nutrient::AddedSugars);
        let total = record.get(Nutrient::TotalSugars);
        if record.is_declared(Nutrient::TotalSugars) && added > total {
            warnings.push(DataQualityWarning::new(
                Nutrient::AddedSugars.field_name(),
                format!("added sugars ({}g) exceed total sugars ({}g)", added, total),
            ));
        }

        (record, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_fields() {
        let label = ExtractedLabel::from_value(json!({
            "product_name": "  Oat Bar ",
            "net_quantity": 12,
            "total_fat_g": "2.3g",
            "sodium_mg": 140,
            "total_carbohydrate_g": "22",
            "dietary_fiber_g": null,
            "ingredients": ["oats", "honey"],
            "nutrient_order": "Calories, Total Fat, Sodium",
            "nutrition_panel_present": "yes",
            "distributor_statement": "Imported by X",
            "manufacturer_address": {"street": "1 Main"},
            "unexpected": true
        }));

        assert_eq!(label.product_name.as_deref(), Some("Oat Bar"));
        assert_eq!(label.net_quantity.as_deref(), Some("12"));
        assert_eq!(label.total_carb_g, Some(RawAmount::Text("22".into())));
        assert_eq!(label.fiber_g, None);
        assert_eq!(label.ingredients.as_deref(), Some("oats, honey"));
        assert_eq!(label.nutrient_order.as_ref().map(Vec::len), Some(3));
        assert_eq!(label.nutrition_panel_present, Some(true));
        assert_eq!(label.importer_statement.as_deref(), Some("Imported by X"));
        assert_eq!(label.manufacturer_address, None);
    }

    #[test]
    fn test_blank_text_is_absent() {
        let label: ExtractedLabel = serde_json::from_value(json!({"product_name": "   "})).unwrap();
        assert_eq!(label.product_name, None);
    }

    #[test]
    fn test_from_value_non_object() {
        assert_eq!(ExtractedLabel::from_value(json!([1, 2])), ExtractedLabel::default());
        assert_eq!(ExtractedLabel::from_value(Value::Null), ExtractedLabel::default());
    }

    #[test]
    fn test_read_non_object_warns() {
        let (label, warnings) = ExtractedLabel::read(json!("Oat Bar"));
        assert_eq!(label, ExtractedLabel::default());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "record");
    }

    #[test]
    fn test_read_field_and_alternate_key_together() {
        let (label, warnings) = ExtractedLabel::read(json!({
            "product_name": "Oat Bar",
            "total_carb_g": 19,
            "total_carbohydrate_g": 19,
            "fiber_g": null,
            "dietary_fiber_g": "3g",
            "importer_statement": "Imported by A",
            "distributor_statement": "Distributed by B"
        }));

        assert_eq!(label.product_name.as_deref(), Some("Oat Bar"));
        assert_eq!(label.total_carb_g, Some(RawAmount::Number(19.0)));
        assert_eq!(label.fiber_g, Some(RawAmount::Text("3g".into())));
        assert_eq!(label.importer_statement.as_deref(), Some("Imported by A"));
        assert_eq!(warnings, vec![DataQualityWarning::new(
            "distributor_statement",
            "conflicts with 'importer_statement'; the 'importer_statement' value is used",
        )]);
    }

    #[test]
    fn test_nutrient_record_warnings() {
        let label: ExtractedLabel = serde_json::from_value(json!({
            "calories": 120,
            "total_fat_g": "abc",
            "sodium_mg": -3,
            "total_sugars_g": 4,
            "added_sugars_g": 6,
            "protein_g": "<1g"
        }))
        .unwrap();
        let mandatory = [Nutrient::Calories, Nutrient::TotalFat, Nutrient::Sodium, Nutrient::Iron];
        let (record, warnings) = label.nutrient_record(&mandatory);

        assert_eq!(record.get(Nutrient::Calories), 120.0);
        assert_eq!(record.get(Nutrient::TotalFat), 0.0);
        assert!(record.is_declared(Nutrient::TotalFat));
        assert_eq!(record.get(Nutrient::Sodium), 0.0);
        assert_eq!(record.get(Nutrient::Protein), 0.5);
        assert!(!record.is_declared(Nutrient::Iron));

        let fields: Vec<&str> = warnings.iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, vec!["total_fat_g", "sodium_mg", "iron_mg", "added_sugars_g"]);
    }

    #[test]
    fn test_ingredient_text_merges_translation() {
        let label = ExtractedLabel {
            ingredients: Some("harina de trigo".into()),
            ingredients_translated: Some("wheat flour".into()),
            ..Default::default()
        };
        assert_eq!(label.ingredient_text().as_deref(), Some("harina de trigo\nwheat flour"));
    }
}

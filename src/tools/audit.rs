//! Label Audit MCP Tools
//!
//! Tools for auditing extracted labels and for running single rules.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::audit::{Auditor, NutritionPanel};
use crate::ingredients::{AllergenCategory, AllergenMatches, SweetenerOutcome};
use crate::models::{ComplianceReport, ExtractedLabel, Nutrient, NutrientRecord};
use crate::nutrition::{self, CalorieCheck, RawAmount, RoundingCategory, ServingDeclaration};

/// Response for audit_label
#[derive(Debug, Serialize)]
pub struct AuditLabelResponse {
    pub audited_at: String,
    pub report: ComplianceReport,
}

/// Response for regenerate_panel
#[derive(Debug, Serialize)]
pub struct RegeneratePanelResponse {
    pub panel: NutritionPanel,
    /// Plain-text rendering of the panel
    pub text: String,
}

/// Response for round_nutrient
#[derive(Debug, Serialize)]
pub struct RoundNutrientResponse {
    pub nutrient: Nutrient,
    pub category: RoundingCategory,
    pub display: String,
    pub unit: &'static str,
    /// Set when the amount could not be read and "0" was returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Response for percent_daily_value
#[derive(Debug, Serialize)]
pub struct PercentDailyValueResponse {
    pub nutrient: Nutrient,
    /// None for nutrients without a reference intake
    pub percent: Option<u32>,
    pub reference_value: Option<f64>,
}

/// Response for detect_allergens
#[derive(Debug, Serialize)]
pub struct DetectAllergensResponse {
    pub detected: AllergenMatches,
    pub undeclared: Vec<AllergenCategory>,
}

/// Response for classify_sweeteners
#[derive(Debug, Serialize)]
pub struct ClassifySweetenersResponse {
    pub outcome: SweetenerOutcome,
    pub added_sugars_g: f64,
    pub sugar_alcohols_g: f64,
    pub corrections_applied: Vec<String>,
}

fn parse_nutrient(name: &str) -> Result<Nutrient, String> {
    Nutrient::from_key(name).ok_or_else(|| format!("Unknown nutrient '{}'", name))
}

/// Audit an extracted label. A JSON string is treated as raw extractor output.
pub fn audit_label(auditor: &Auditor, label: Value) -> Result<AuditLabelResponse, String> {
    let report = match label {
        Value::String(text) => auditor.audit_json(&text),
        other => auditor.audit_value(other),
    };
    Ok(AuditLabelResponse {
        audited_at: Utc::now().to_rfc3339(),
        report,
    })
}

pub fn regenerate_panel(auditor: &Auditor, label: Value) -> Result<RegeneratePanelResponse, String> {
    if !label.is_object() {
        return Err("label must be a JSON object of extracted fields".to_string());
    }
    let panel = auditor.regenerate_panel(&ExtractedLabel::from_value(label));
    let text = panel.to_string();
    Ok(RegeneratePanelResponse { panel, text })
}

pub fn round_nutrient(auditor: &Auditor, nutrient: &str, amount: RawAmount) -> Result<RoundNutrientResponse, String> {
    let nutrient = parse_nutrient(nutrient)?;
    let category = nutrient.rounding_category();
    let (value, warning) = match amount.parse() {
        Ok(value) => (value, None),
        Err(err) => (0.0, Some(format!("{}; rounded as 0, which may mean unknown", err))),
    };
    Ok(RoundNutrientResponse {
        nutrient,
        category,
        display: auditor.rules().rounding.display(value, category),
        unit: nutrient.unit().symbol(),
        warning,
    })
}

pub fn percent_daily_value(auditor: &Auditor, nutrient: &str, amount: f64) -> Result<PercentDailyValueResponse, String> {
    let nutrient = parse_nutrient(nutrient)?;
    let table = &auditor.rules().reference_intakes;
    let reference_value = table.reference_value(nutrient);
    Ok(PercentDailyValueResponse {
        nutrient,
        percent: reference_value.map(|_| table.percent(nutrient, amount)),
        reference_value,
    })
}

pub fn convert_serving_size(auditor: &Auditor, serving: &str) -> Result<ServingDeclaration, String> {
    if serving.trim().is_empty() {
        return Err("serving size text is empty".to_string());
    }
    Ok(nutrition::convert_serving(serving, &auditor.rules().serving_lookup))
}

pub fn check_calories(
    auditor: &Auditor,
    total_fat_g: f64,
    total_carb_g: f64,
    protein_g: f64,
    calories: f64,
    tolerance: Option<f64>,
) -> Result<CalorieCheck, String> {
    let tolerance = tolerance.unwrap_or(auditor.config().calorie_tolerance);
    if !(tolerance > 0.0 && tolerance < 1.0) {
        return Err(format!("tolerance must be between 0 and 1, got {}", tolerance));
    }
    Ok(nutrition::check_calories(total_fat_g, total_carb_g, protein_g, calories, tolerance))
}

pub fn detect_allergens(
    auditor: &Auditor,
    ingredients: &str,
    allergen_statement: Option<&str>,
) -> Result<DetectAllergensResponse, String> {
    let table = &auditor.rules().allergens;
    let detected = table.detect(ingredients);
    let undeclared = table.undeclared(&detected, allergen_statement.unwrap_or_default());
    Ok(DetectAllergensResponse { detected, undeclared })
}

pub fn classify_sweeteners(
    auditor: &Auditor,
    ingredients: &str,
    added_sugars_g: f64,
    sugar_alcohols_g: Option<f64>,
) -> Result<ClassifySweetenersResponse, String> {
    let mut record = NutrientRecord::from_amounts([(Nutrient::AddedSugars, added_sugars_g)]);
    if let Some(amount) = sugar_alcohols_g {
        record.set(Nutrient::SugarAlcohols, amount);
    }
    let mut corrections_applied = Vec::new();
    let outcome = auditor
        .rules()
        .sweeteners
        .classify(ingredients, &mut record, &mut corrections_applied);
    Ok(ClassifySweetenersResponse {
        outcome,
        added_sugars_g: record.get(Nutrient::AddedSugars),
        sugar_alcohols_g: record.get(Nutrient::SugarAlcohols),
        corrections_applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportStatus;
    use serde_json::json;

    #[test]
    fn test_audit_label_accepts_raw_text() {
        let auditor = Auditor::us_fda();
        let response = audit_label(&auditor, json!("```json\n{\"product_name\": \"Tea\"}\n```")).unwrap();
        assert_eq!(response.report.status(), ReportStatus::MajorRevision);
        assert!(response.report.passed().iter().any(|i| i.description.contains("Tea")));
        assert!(chrono::DateTime::parse_from_rfc3339(&response.audited_at).is_ok());
    }

    #[test]
    fn test_regenerate_panel_requires_object() {
        let auditor = Auditor::us_fda();
        assert!(regenerate_panel(&auditor, json!([1])).is_err());
        let response = regenerate_panel(&auditor, json!({"calories": 236, "sodium_mg": "142mg"})).unwrap();
        assert!(response.text.contains("Sodium 140mg"));
        assert!(response.text.contains("Calories 240"));
    }

    #[test]
    fn test_round_nutrient() {
        let auditor = Auditor::us_fda();
        let r = round_nutrient(&auditor, "trans_fat_g", RawAmount::from(0.49999)).unwrap();
        assert_eq!(r.display, "0");
        assert_eq!(r.unit, "g");

        let r = round_nutrient(&auditor, "Sodium", RawAmount::from("142 mg")).unwrap();
        assert_eq!(r.display, "140");
        assert!(r.warning.is_none());

        let r = round_nutrient(&auditor, "sodium", RawAmount::from("n/a")).unwrap();
        assert_eq!(r.display, "0");
        assert!(r.warning.is_some());

        assert!(round_nutrient(&auditor, "zinc", RawAmount::from(1.0)).is_err());
    }

    #[test]
    fn test_percent_daily_value() {
        let auditor = Auditor::us_fda();
        let r = percent_daily_value(&auditor, "sodium_mg", 230.0).unwrap();
        assert_eq!(r.percent, Some(10));
        let r = percent_daily_value(&auditor, "trans_fat", 2.0).unwrap();
        assert_eq!(r.percent, None);
    }

    #[test]
    fn test_convert_serving_size() {
        let auditor = Auditor::us_fda();
        assert_eq!(convert_serving_size(&auditor, "240ml").unwrap().household, "1 cup (240mL)");
        assert!(convert_serving_size(&auditor, "  ").is_err());
    }

    #[test]
    fn test_check_calories_tolerance() {
        let auditor = Auditor::us_fda();
        let check = check_calories(&auditor, 10.0, 20.0, 5.0, 200.0, None).unwrap();
        assert_eq!(check.estimate, 190.0);
        assert!(check.valid);
        assert!(check_calories(&auditor, 10.0, 20.0, 5.0, 200.0, Some(1.5)).is_err());
    }

    #[test]
    fn test_detect_allergens() {
        let auditor = Auditor::us_fda();
        let r = detect_allergens(&auditor, "wheat flour, whey", Some("Contains: wheat")).unwrap();
        assert_eq!(r.detected.len(), 2);
        assert_eq!(r.undeclared, vec![AllergenCategory::Milk]);
    }

    #[test]
    fn test_classify_sweeteners() {
        let auditor = Auditor::us_fda();
        let r = classify_sweeteners(&auditor, "erythritol, cocoa", 9.0, None).unwrap();
        assert_eq!(r.added_sugars_g, 0.0);
        assert_eq!(r.sugar_alcohols_g, 9.0);
        assert_eq!(r.corrections_applied.len(), 1);
    }
}

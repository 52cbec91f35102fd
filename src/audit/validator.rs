//! Label auditor
//!
//! Runs the fixed checklist against one extracted label. Each check yields
//! exactly one `ComplianceIssue`, passes included. Auditing never fails: a
//! missing or unreadable record produces a report full of critical issues.

use std::sync::Arc;

use serde_json::Value;

use super::panel::NutritionPanel;
use crate::config::AuditConfig;
use crate::ingredients::{AllergenCategory, AllergenMatches, SweetenerOutcome};
use crate::models::{
    CheckKind, ComplianceIssue, ComplianceReport, DataQualityWarning, ExtractedLabel, Nutrient,
    NutrientRecord, ReportDraft, Severity,
};
use crate::nutrition::{check_calories, convert_serving, format_display, net_quantity_units, CalorieCheck};
use crate::rules::{RuleSet, RulesError};

/// Strip a Markdown code fence (```json ... ```) around extractor output
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json") on the opening fence line
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest.trim_start_matches(|c: char| c.is_alphanumeric()),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// "Milk (whey), Sesame (tahini)"
fn describe_allergens<'a>(
    detected: &AllergenMatches,
    categories: impl IntoIterator<Item = &'a AllergenCategory>,
) -> String {
    categories
        .into_iter()
        .map(|c| match detected.get(c) {
            Some(terms) => format!("{} ({})", c.display_name(), terms.join(", ")),
            None => c.display_name().to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Audits labels against one rule table
#[derive(Debug, Clone)]
pub struct Auditor {
    rules: Arc<RuleSet>,
    config: AuditConfig,
}

impl Default for Auditor {
    fn default() -> Self {
        Self::us_fda()
    }
}

impl Auditor {
    pub fn new(rules: Arc<RuleSet>, config: AuditConfig) -> Self {
        Self { rules, config }
    }

    /// Embedded US FDA table with default configuration
    pub fn us_fda() -> Self {
        Self::new(RuleSet::us_fda_shared(), AuditConfig::default())
    }

    /// Load the configured rule table, or the embedded one when none is set
    pub fn from_config(config: AuditConfig) -> Result<Self, RulesError> {
        let rules = match &config.rules_path {
            Some(path) => Arc::new(RuleSet::from_path(path)?),
            None => RuleSet::us_fda_shared(),
        };
        Ok(Self::new(rules, config))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn audit(&self, label: &ExtractedLabel) -> ComplianceReport {
        self.run(label, Vec::new())
    }

    /// Audit a JSON value; anything but an object audits an empty record
    pub fn audit_value(&self, value: Value) -> ComplianceReport {
        let (label, warnings) = ExtractedLabel::read(value);
        self.run(&label, warnings)
    }

    /// Audit raw extractor output, with or without a code fence
    pub fn audit_json(&self, text: &str) -> ComplianceReport {
        match serde_json::from_str::<Value>(strip_code_fences(text)) {
            Ok(value) => self.audit_value(value),
            Err(err) => {
                tracing::warn!(%err, "extraction output is not valid JSON");
                let warning = DataQualityWarning::new(
                    "record",
                    format!("extraction output is not valid JSON ({}); audited as empty", err),
                );
                self.run(&ExtractedLabel::default(), vec![warning])
            }
        }
    }

    /// Rounded, %DV-annotated panel for a label, after sweetener reclassification
    pub fn regenerate_panel(&self, label: &ExtractedLabel) -> NutritionPanel {
        let (mut record, _) = label.nutrient_record(&self.rules.mandatory_nutrients);
        if let Some(ingredients) = label.ingredient_text() {
            let mut corrections = Vec::new();
            self.rules.sweeteners.classify(&ingredients, &mut record, &mut corrections);
        }
        self.panel(label, &record)
    }

    fn panel(&self, label: &ExtractedLabel, record: &NutrientRecord) -> NutritionPanel {
        let serving = label
            .serving_text()
            .map(|text| convert_serving(text, &self.rules.serving_lookup).household);
        NutritionPanel::build(
            record,
            serving,
            label.servings_per_container.clone(),
            &self.rules,
            self.config.declare_protein_percent,
        )
    }

    fn run(&self, label: &ExtractedLabel, mut warnings: Vec<DataQualityWarning>) -> ComplianceReport {
        let (mut record, record_warnings) = label.nutrient_record(&self.rules.mandatory_nutrients);
        warnings.extend(record_warnings);
        let ingredients = label.ingredient_text();
        let mut corrections = Vec::new();

        let mut issues = Vec::with_capacity(CheckKind::ALL.len());
        issues.push(self.check_identity(label));
        issues.push(self.check_net_quantity(label));
        issues.push(self.check_language(label));
        issues.push(self.check_ingredients(ingredients.as_deref()));
        issues.push(self.check_manufacturer(label));
        issues.push(self.check_nutrition_panel(label, &record));

        let (issue, allergens) = self.check_allergens(ingredients.as_deref(), label.allergen_statement.as_deref());
        issues.push(issue);
        let (issue, sweeteners) = self.check_sweeteners(ingredients.as_deref(), &mut record, &mut corrections);
        issues.push(issue);
        let (issue, calorie_check) = self.check_calories(&record);
        issues.push(issue);

        for issue in &issues {
            tracing::debug!(check = issue.check.as_str(), severity = %issue.severity, "{}", issue.description);
        }

        let serving = label
            .serving_text()
            .map(|text| convert_serving(text, &self.rules.serving_lookup));
        let panel = self.panel(label, &record);

        let report = ComplianceReport::from_draft(ReportDraft {
            issues,
            allergens,
            corrections_applied: corrections,
            data_quality_warnings: warnings,
            calorie_check,
            sweeteners,
            serving,
            panel,
            rules_version: self.rules.version.clone(),
        });
        tracing::info!(
            score = report.score(),
            status = %report.status(),
            critical = report.critical().len(),
            major = report.major().len(),
            "audit complete"
        );
        report
    }

    fn issue(
        &self,
        check: CheckKind,
        severity: Severity,
        description: impl Into<String>,
        remediation: impl Into<String>,
    ) -> ComplianceIssue {
        ComplianceIssue {
            check,
            requirement: check.requirement().to_string(),
            description: description.into(),
            citation: self.rules.citation(check).to_string(),
            remediation: remediation.into(),
            severity,
        }
    }

    fn check_identity(&self, label: &ExtractedLabel) -> ComplianceIssue {
        match label.product_name.as_deref() {
            Some(name) if !name.trim().is_empty() => self.issue(
                CheckKind::StatementOfIdentity,
                Severity::Passed,
                format!("Product name present: {}", name),
                "None required",
            ),
            _ => self.issue(
                CheckKind::StatementOfIdentity,
                Severity::Critical,
                "Statement of identity (product name) is missing",
                "Add the common or usual name of the food to the principal display panel",
            ),
        }
    }

    fn check_net_quantity(&self, label: &ExtractedLabel) -> ComplianceIssue {
        let check = CheckKind::NetQuantity;
        let Some(text) = label.net_quantity.as_deref().filter(|t| !t.trim().is_empty()) else {
            return self.issue(
                check,
                Severity::Critical,
                "Net quantity of contents is missing",
                "Declare net quantity in both US customary (oz, lb, fl oz) and metric (g, mL) units",
            );
        };

        let units = net_quantity_units(text);
        match (units.customary, units.metric) {
            (true, true) => self.issue(
                check,
                Severity::Passed,
                format!("Net quantity declared in customary and metric units: {}", text),
                "None required",
            ),
            (true, false) => self.issue(
                check,
                Severity::Critical,
                format!("Net quantity '{}' has no metric units", text),
                "Add the metric equivalent (g or mL) to the net quantity statement",
            ),
            (false, true) => self.issue(
                check,
                Severity::Critical,
                format!("Net quantity '{}' has no US customary units", text),
                "Add the US customary equivalent (oz, lb or fl oz) to the net quantity statement",
            ),
            (false, false) => self.issue(
                check,
                Severity::Critical,
                format!("Net quantity '{}' has neither customary nor metric units", text),
                "Declare net quantity in both US customary and metric units",
            ),
        }
    }

    fn check_language(&self, label: &ExtractedLabel) -> ComplianceIssue {
        let check = CheckKind::Language;
        let jurisdiction = &self.rules.jurisdiction;
        let required = &jurisdiction.required_language;
        match label.primary_language.as_deref() {
            None => self.issue(
                check,
                Severity::Critical,
                "Primary label language could not be determined",
                format!("Provide all mandatory label text in the required language ({})", required),
            ),
            Some(language) if jurisdiction.is_required_language(language) => self.issue(
                check,
                Severity::Passed,
                format!("Primary label language is {}", language),
                "None required",
            ),
            Some(language) => {
                let secondary = match label.secondary_language.as_deref() {
                    Some(s) if jurisdiction.is_required_language(s) => {
                        "; a secondary-language panel does not satisfy this requirement"
                    }
                    _ => "",
                };
                self.issue(
                    check,
                    Severity::Critical,
                    format!(
                        "Primary label language is {}, but {} labels must be in {}{}",
                        language, jurisdiction.name, required, secondary
                    ),
                    format!("Relabel with all mandatory text in {} as the primary language", required),
                )
            }
        }
    }

    fn check_ingredients(&self, ingredients: Option<&str>) -> ComplianceIssue {
        if is_blank(ingredients) {
            self.issue(
                CheckKind::Ingredients,
                Severity::Critical,
                "Ingredient list is missing",
                "Add an ingredient statement listing ingredients in descending order of predominance by weight",
            )
        } else {
            self.issue(
                CheckKind::Ingredients,
                Severity::Passed,
                "Ingredient list present",
                "None required",
            )
        }
    }

    fn check_manufacturer(&self, label: &ExtractedLabel) -> ComplianceIssue {
        let check = CheckKind::Manufacturer;
        let mut missing = Vec::new();
        if is_blank(label.manufacturer_name.as_deref()) {
            missing.push("name");
        }
        if is_blank(label.manufacturer_address.as_deref()) {
            missing.push("address");
        }
        if !missing.is_empty() {
            return self.issue(
                check,
                Severity::Critical,
                format!("Manufacturer, packer or distributor {} missing", missing.join(" and ")),
                "Declare the name and place of business (city, state, ZIP) of the responsible party",
            );
        }

        let imported = label
            .country_of_origin
            .as_deref()
            .filter(|c| !self.rules.jurisdiction.is_domestic(c));
        match imported {
            Some(country) if is_blank(label.importer_statement.as_deref()) => self.issue(
                check,
                Severity::Major,
                format!(
                    "Product originates in {} but has no importer or distributor statement",
                    country
                ),
                format!(
                    "Add the name and address of the {} importer or distributor (\"Imported by\" / \"Distributed by\")",
                    self.rules.jurisdiction.name
                ),
            ),
            _ => self.issue(
                check,
                Severity::Passed,
                "Responsible party name and address present",
                "None required",
            ),
        }
    }

    fn check_nutrition_panel(&self, label: &ExtractedLabel, record: &NutrientRecord) -> ComplianceIssue {
        let check = CheckKind::NutritionPanel;
        let absent = match label.nutrition_panel_present {
            Some(present) => !present,
            None => record.is_empty(),
        };
        if absent {
            return self.issue(
                check,
                Severity::Critical,
                "Nutrition Facts panel is missing",
                "Add a Nutrition Facts panel declaring all mandatory nutrients in the required order",
            );
        }

        let mut problems = Vec::new();
        let missing: Vec<&str> = self
            .rules
            .mandatory_nutrients
            .iter()
            .filter(|n| !record.is_declared(**n))
            .map(|n| n.display_name())
            .collect();
        if !missing.is_empty() {
            problems.push(format!("missing mandatory nutrients: {}", missing.join(", ")));
        }
        if let Some((earlier, later)) = self.first_out_of_order(label.nutrient_order.as_deref()) {
            problems.push(format!("{} is listed before {}", later.display_name(), earlier.display_name()));
        }

        if problems.is_empty() {
            self.issue(
                check,
                Severity::Passed,
                "Nutrition Facts panel declares all mandatory nutrients in order",
                "None required",
            )
        } else {
            self.issue(
                check,
                Severity::Major,
                format!("Nutrition Facts panel {}", problems.join("; ")),
                "Declare every mandatory nutrient in the mandated order (regenerate the panel from the corrected values)",
            )
        }
    }

    /// First adjacent pair of printed nutrients that breaks the mandated
    /// order, as (should come first, was printed first). Unrecognized
    /// names are ignored.
    fn first_out_of_order(&self, printed: Option<&[String]>) -> Option<(Nutrient, Nutrient)> {
        let positioned: Vec<(Nutrient, usize)> = printed?
            .iter()
            .filter_map(|name| Nutrient::from_key(name))
            .filter_map(|n| self.rules.order_position(n).map(|p| (n, p)))
            .collect();
        positioned
            .windows(2)
            .find(|pair| pair[1].1 < pair[0].1)
            .map(|pair| (pair[1].0, pair[0].0))
    }

    fn check_allergens(&self, ingredients: Option<&str>, statement: Option<&str>) -> (ComplianceIssue, AllergenMatches) {
        let check = CheckKind::Allergens;
        let Some(ingredients) = ingredients.filter(|i| !i.trim().is_empty()) else {
            let issue = self.issue(
                check,
                Severity::Minor,
                "Allergen cross-check could not be performed without an ingredient list",
                "Provide the ingredient list so allergens can be verified",
            );
            return (issue, AllergenMatches::new());
        };

        let detected = self.rules.allergens.detect(ingredients);
        if detected.is_empty() {
            let issue = self.issue(check, Severity::Passed, "No major food allergens detected in ingredients", "None required");
            return (issue, detected);
        }

        let undeclared = self.rules.allergens.undeclared(&detected, statement.unwrap_or_default());
        let issue = if undeclared.is_empty() {
            self.issue(
                check,
                Severity::Passed,
                format!("Detected allergens are declared: {}", describe_allergens(&detected, detected.keys())),
                "None required",
            )
        } else {
            tracing::debug!(?undeclared, "undeclared allergens");
            self.issue(
                check,
                Severity::Critical,
                format!("Undeclared major food allergens: {}", describe_allergens(&detected, &undeclared)),
                format!(
                    "Add a \"Contains:\" statement naming {}",
                    undeclared.iter().map(|c| c.display_name()).collect::<Vec<_>>().join(", ")
                ),
            )
        };
        (issue, detected)
    }

    fn check_sweeteners(
        &self,
        ingredients: Option<&str>,
        record: &mut NutrientRecord,
        corrections: &mut Vec<String>,
    ) -> (ComplianceIssue, SweetenerOutcome) {
        let check = CheckKind::Sweeteners;
        let Some(ingredients) = ingredients.filter(|i| !i.trim().is_empty()) else {
            let issue = self.issue(
                check,
                Severity::Minor,
                "Sugar alcohol classification could not be performed without an ingredient list",
                "Provide the ingredient list so sweeteners can be classified",
            );
            return (issue, SweetenerOutcome::NotApplicable);
        };

        let outcome = self.rules.sweeteners.classify(ingredients, record, corrections);
        let issue = match &outcome {
            SweetenerOutcome::NotApplicable => self.issue(
                check,
                Severity::Passed,
                "No sugar alcohols listed in ingredients",
                "None required",
            ),
            SweetenerOutcome::Consistent { polyols } => self.issue(
                check,
                Severity::Passed,
                format!("Sugar alcohols ({}) are not counted as added sugars", polyols.join(", ")),
                "None required",
            ),
            SweetenerOutcome::Reclassified { amount, polyols } => self.issue(
                check,
                Severity::Minor,
                format!(
                    "Added sugars ({}g) reclassified as sugar alcohols: ingredients contain {} and no caloric sugar",
                    format_display(*amount),
                    polyols.join(", ")
                ),
                "Declare the amount as Sugar Alcohol and 0g Added Sugars on the panel",
            ),
            SweetenerOutcome::NeedsReview { polyols, sugars } => self.issue(
                check,
                Severity::Major,
                format!(
                    "Ingredients contain both sugar alcohols ({}) and sugars ({}); added sugars may include polyols",
                    polyols.join(", "),
                    sugars.join(", ")
                ),
                "Verify the added sugars amount against the formulation and declare sugar alcohols separately",
            ),
        };
        (issue, outcome)
    }

    fn check_calories(&self, record: &NutrientRecord) -> (ComplianceIssue, Option<CalorieCheck>) {
        let check = CheckKind::Calories;
        if !record.is_declared(Nutrient::Calories) {
            let issue = self.issue(
                check,
                Severity::Minor,
                "Calories not declared; calorie cross-check not performed",
                "Declare calories per serving",
            );
            return (issue, None);
        }

        let result = check_calories(
            record.get(Nutrient::TotalFat),
            record.get(Nutrient::TotalCarbohydrate),
            record.get(Nutrient::Protein),
            record.get(Nutrient::Calories),
            self.config.calorie_tolerance,
        );
        let issue = if result.valid {
            self.issue(check, Severity::Passed, result.message.clone(), "None required")
        } else {
            self.issue(
                check,
                Severity::Minor,
                result.message.clone(),
                "Recheck the declared calories against the fat, carbohydrate and protein amounts",
            )
        };
        (issue, Some(result))
    }
}

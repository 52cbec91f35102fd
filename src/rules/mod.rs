//! Regulation rule tables
//!
//! Rounding bands, reference intakes, nutrient order, serving lookup,
//! allergen keywords, sweetener lexicon and citations for one jurisdiction.
//! The US FDA table ships embedded; a substitute table can be loaded from a
//! JSON file without touching the algorithms.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingredients::text::tokenize;
use crate::ingredients::{AllergenTable, SweetenerLexicon};
use crate::models::{CheckKind, Nutrient};
use crate::nutrition::{ReferenceIntakeTable, RoundingTable, ServingLookup};

static US_FDA_JSON: &str = include_str!("us_fda.json");

static US_FDA: LazyLock<Arc<RuleSet>> = LazyLock::new(|| {
    let rules = RuleSet::from_json(US_FDA_JSON).expect("embedded us_fda.json should be a valid rule table");
    tracing::info!(version = %rules.version, "loaded embedded rule table");
    Arc::new(rules)
});

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rule table: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid rule table: {0}")]
    Invalid(String),
}

/// Jurisdiction the table implements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub code: String,
    pub name: String,
    pub regulation: String,
    /// ISO 639-1 code of the language the label must be in
    pub required_language: String,
    /// Other spellings of the required language ("english")
    #[serde(default)]
    pub language_names: Vec<String>,
    /// Names that mark a country of origin as domestic
    #[serde(default)]
    pub country_names: Vec<String>,
}

impl Jurisdiction {
    /// Whether a language name or tag ("English", "en-US") is the required language.
    ///
    /// For a combined value such as "English, Spanish" only the first
    /// language listed counts.
    pub fn is_required_language(&self, language: &str) -> bool {
        let first = language.split([',', '/', ';', '&']).next().unwrap_or_default();
        let lower = first.trim().to_lowercase();
        let primary = lower.split(['-', '_']).next().unwrap_or_default().trim();
        primary == self.required_language.to_lowercase()
            || self.language_names.iter().any(|n| n.to_lowercase() == lower || n.to_lowercase() == primary)
    }

    /// Whether a country of origin is inside the jurisdiction.
    ///
    /// Compared word by word, so "U.S.A." matches "u s a".
    pub fn is_domestic(&self, country: &str) -> bool {
        let country = tokenize(country);
        if country.is_empty() {
            return true;
        }
        self.country_names.iter().any(|name| tokenize(name) == country)
    }
}

/// The full set of tables for one regulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub version: String,
    pub jurisdiction: Jurisdiction,
    pub rounding: RoundingTable,
    pub reference_intakes: ReferenceIntakeTable,
    /// Mandated panel order, top to bottom
    pub nutrient_order: Vec<Nutrient>,
    pub mandatory_nutrients: Vec<Nutrient>,
    pub serving_lookup: ServingLookup,
    pub allergens: AllergenTable,
    pub sweeteners: SweetenerLexicon,
    pub citations: BTreeMap<CheckKind, String>,
}

impl RuleSet {
    /// The embedded US FDA table, parsed once per process
    pub fn us_fda() -> &'static RuleSet {
        &US_FDA
    }

    /// Shared handle to the embedded table
    pub fn us_fda_shared() -> Arc<RuleSet> {
        Arc::clone(&US_FDA)
    }

    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: RuleSet = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let rules = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), version = %rules.version, "loaded rule table");
        Ok(rules)
    }

    /// Check internal consistency of every table
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.version.trim().is_empty() {
            return Err(RulesError::Invalid("version is empty".to_string()));
        }
        if self.jurisdiction.required_language.trim().is_empty() {
            return Err(RulesError::Invalid("required language is empty".to_string()));
        }
        self.rounding.validate().map_err(RulesError::Invalid)?;
        self.reference_intakes.validate().map_err(RulesError::Invalid)?;
        self.serving_lookup.validate().map_err(RulesError::Invalid)?;
        self.allergens.validate().map_err(RulesError::Invalid)?;

        if self.nutrient_order.is_empty() {
            return Err(RulesError::Invalid("nutrient order is empty".to_string()));
        }
        for (i, nutrient) in self.nutrient_order.iter().enumerate() {
            if self.nutrient_order[..i].contains(nutrient) {
                return Err(RulesError::Invalid(format!("'{}' appears twice in the nutrient order", nutrient.key())));
            }
        }
        if let Some(missing) = self.mandatory_nutrients.iter().find(|n| !self.nutrient_order.contains(n)) {
            return Err(RulesError::Invalid(format!(
                "mandatory nutrient '{}' is not in the nutrient order",
                missing.key()
            )));
        }

        if self.sweeteners.polyols.is_empty() || self.sweeteners.caloric_sugars.is_empty() {
            return Err(RulesError::Invalid("sweetener lexicon needs polyols and caloric sugars".to_string()));
        }
        if let Some(check) = CheckKind::ALL.iter().find(|c| !self.citations.contains_key(c)) {
            return Err(RulesError::Invalid(format!("no citation for check '{}'", check.as_str())));
        }
        Ok(())
    }

    pub fn citation(&self, check: CheckKind) -> &str {
        self.citations.get(&check).map(String::as_str).unwrap_or_default()
    }

    /// Position of a nutrient in the mandated order
    pub fn order_position(&self, nutrient: Nutrient) -> Option<usize> {
        self.nutrient_order.iter().position(|n| *n == nutrient)
    }
}

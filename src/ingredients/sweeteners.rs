//! Sugar alcohol reclassification
//!
//! Extraction sometimes reports a polyol sweetener (maltitol, E965, ...) as
//! added sugars. When the ingredients show polyols and no caloric sugar, the
//! added sugars amount is moved to sugar alcohols. When both kinds appear
//! the amount is left alone and flagged for review.

use serde::{Deserialize, Serialize};

use super::text::WordIndex;
use crate::models::{Nutrient, NutrientRecord};
use crate::nutrition::format_display;

/// Keyword lists for the classifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweetenerLexicon {
    pub polyols: Vec<String>,
    pub caloric_sugars: Vec<String>,
    /// Phrases blanked before scanning ("sugar alcohol", "sugar free")
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// What the classifier concluded for one label
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SweetenerOutcome {
    /// No polyol in the ingredients
    NotApplicable,
    /// Polyols present and added sugars already zero
    Consistent { polyols: Vec<String> },
    /// Added sugars moved to sugar alcohols
    Reclassified { amount: f64, polyols: Vec<String> },
    /// Polyols and caloric sugars both present; amount left unchanged
    NeedsReview { polyols: Vec<String>, sugars: Vec<String> },
}

impl SweetenerLexicon {
    /// Polyols and caloric sugars named in the ingredient text
    pub fn scan(&self, ingredients: &str) -> (Vec<String>, Vec<String>) {
        let index = WordIndex::new(ingredients).without_phrases(&self.exclusions);
        let owned = |found: Vec<&str>| found.into_iter().map(str::to_string).collect::<Vec<_>>();
        (owned(index.matching(&self.polyols)), owned(index.matching(&self.caloric_sugars)))
    }

    /// Classify and, when unambiguous, move added sugars to sugar alcohols.
    ///
    /// Every rewrite pushes one entry onto `corrections`. A second run over
    /// the corrected record finds added sugars at zero and changes nothing.
    pub fn classify(
        &self,
        ingredients: &str,
        record: &mut NutrientRecord,
        corrections: &mut Vec<String>,
    ) -> SweetenerOutcome {
        let (polyols, sugars) = self.scan(ingredients);
        if polyols.is_empty() {
            return SweetenerOutcome::NotApplicable;
        }

        let added = record.get(Nutrient::AddedSugars);
        if added <= 0.0 {
            return SweetenerOutcome::Consistent { polyols };
        }
        if !sugars.is_empty() {
            tracing::debug!(?polyols, ?sugars, "polyols and sugars both present, not reclassifying");
            return SweetenerOutcome::NeedsReview { polyols, sugars };
        }

        let existing = record.get(Nutrient::SugarAlcohols);
        record.set(Nutrient::SugarAlcohols, existing + added);
        record.clear(Nutrient::AddedSugars);

        let note = format!(
            "Moved {}g from Added Sugars to Sugar Alcohols: ingredients list {} and no caloric sugar",
            format_display(added),
            polyols.join(", ")
        );
        tracing::info!(amount = added, "reclassified added sugars as sugar alcohols");
        corrections.push(note);

        SweetenerOutcome::Reclassified { amount: added, polyols }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    fn lexicon() -> &'static SweetenerLexicon {
        &RuleSet::us_fda().sweeteners
    }

    fn record(added: f64) -> NutrientRecord {
        NutrientRecord::from_amounts([(Nutrient::AddedSugars, added), (Nutrient::TotalSugars, added)])
    }

    #[test]
    fn test_reclassifies_polyol_only() {
        let mut rec = record(12.0);
        let mut notes = Vec::new();
        let outcome = lexicon().classify("maltitol, cocoa butter, milk powder", &mut rec, &mut notes);

        assert!(matches!(outcome, SweetenerOutcome::Reclassified { amount, .. } if amount == 12.0));
        assert_eq!(rec.get(Nutrient::AddedSugars), 0.0);
        assert_eq!(rec.get(Nutrient::SugarAlcohols), 12.0);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("maltitol"));
    }

    #[test]
    fn test_idempotent() {
        let mut rec = record(12.0);
        let mut notes = Vec::new();
        lexicon().classify("maltitol, cocoa", &mut rec, &mut notes);
        let second = lexicon().classify("maltitol, cocoa", &mut rec, &mut notes);

        assert!(matches!(second, SweetenerOutcome::Consistent { .. }));
        assert_eq!(notes.len(), 1);
        assert_eq!(rec.get(Nutrient::SugarAlcohols), 12.0);
    }

    #[test]
    fn test_ambiguous_is_left_alone() {
        let mut rec = record(8.0);
        let mut notes = Vec::new();
        let outcome = lexicon().classify("sorbitol, sucrose, flour", &mut rec, &mut notes);

        match outcome {
            SweetenerOutcome::NeedsReview { polyols, sugars } => {
                assert_eq!(polyols, vec!["sorbitol"]);
                assert_eq!(sugars, vec!["sucrose"]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(rec.get(Nutrient::AddedSugars), 8.0);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_e_numbers_and_exclusions() {
        let mut rec = record(5.0);
        let mut notes = Vec::new();
        let outcome = lexicon().classify(
            "sweetener (E 965), sugar alcohols, cocoa. Sugar free.",
            &mut rec,
            &mut notes,
        );
        assert!(matches!(outcome, SweetenerOutcome::Reclassified { .. }));
    }

    #[test]
    fn test_no_polyols() {
        let mut rec = record(5.0);
        let mut notes = Vec::new();
        assert_eq!(
            lexicon().classify("sugar, flour", &mut rec, &mut notes),
            SweetenerOutcome::NotApplicable
        );
        assert_eq!(rec.get(Nutrient::AddedSugars), 5.0);
    }

    #[test]
    fn test_adds_to_existing_sugar_alcohols() {
        let mut rec = NutrientRecord::from_amounts([(Nutrient::AddedSugars, 4.0), (Nutrient::SugarAlcohols, 2.0)]);
        let mut notes = Vec::new();
        lexicon().classify("xylitol", &mut rec, &mut notes);
        assert_eq!(rec.get(Nutrient::SugarAlcohols), 6.0);
    }
}

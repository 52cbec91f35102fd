//! Regenerated nutrition panel
//!
//! Rounded display amounts and %DV for every nutrient in mandated order,
//! ready for a layout collaborator to render.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Nutrient, NutrientRecord};
use crate::rules::RuleSet;

/// One line of the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelLine {
    pub nutrient: Nutrient,
    pub name: String,
    /// Rounded display amount ("0", "2.5", "140")
    pub amount: String,
    pub unit: String,
    /// Omitted for nutrients without a reference intake, and for protein
    /// unless a protein claim requires it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_daily_value: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionPanel {
    pub serving_size: Option<String>,
    pub servings_per_container: Option<String>,
    pub lines: Vec<PanelLine>,
}

impl NutritionPanel {
    /// Build a panel from a (possibly reclassified) nutrient record.
    ///
    /// %DV is computed from the unrounded amount. Sugar alcohols get a line
    /// only when nonzero.
    pub fn build(
        record: &NutrientRecord,
        serving_size: Option<String>,
        servings_per_container: Option<String>,
        rules: &RuleSet,
        declare_protein_percent: bool,
    ) -> Self {
        let lines = rules
            .nutrient_order
            .iter()
            .filter(|n| **n != Nutrient::SugarAlcohols || record.get(**n) > 0.0)
            .map(|&nutrient| {
                let amount = record.get(nutrient);
                let shows_percent = rules.reference_intakes.reference_value(nutrient).is_some()
                    && (nutrient != Nutrient::Protein || declare_protein_percent);
                PanelLine {
                    nutrient,
                    name: nutrient.display_name().to_string(),
                    amount: rules.rounding.display(amount, nutrient.rounding_category()),
                    unit: nutrient.unit().symbol().to_string(),
                    percent_daily_value: shows_percent
                        .then(|| rules.reference_intakes.percent(nutrient, amount)),
                }
            })
            .collect();

        Self {
            serving_size,
            servings_per_container,
            lines,
        }
    }

    pub fn line(&self, nutrient: Nutrient) -> Option<&PanelLine> {
        self.lines.iter().find(|l| l.nutrient == nutrient)
    }
}

impl fmt::Display for NutritionPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nutrition Facts")?;
        if let Some(servings) = &self.servings_per_container {
            writeln!(f, "{} servings per container", servings)?;
        }
        if let Some(serving) = &self.serving_size {
            writeln!(f, "Serving size {}", serving)?;
        }
        for line in &self.lines {
            match line.percent_daily_value {
                Some(pct) => writeln!(f, "{} {}{}  {}%", line.name, line.amount, line.unit, pct)?,
                None => writeln!(f, "{} {}{}", line.name, line.amount, line.unit)?,
            }
        }
        Ok(())
    }
}

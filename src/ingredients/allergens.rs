//! Major food allergen detection
//!
//! Scans ingredient text for keywords of the nine major allergen categories
//! and checks each detected category against the label's allergen statement.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::text::WordIndex;

/// Major allergen category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllergenCategory {
    Milk,
    Eggs,
    Fish,
    Shellfish,
    TreeNuts,
    Peanuts,
    Wheat,
    Soybeans,
    Sesame,
}

impl AllergenCategory {
    pub const ALL: [AllergenCategory; 9] = [
        AllergenCategory::Milk,
        AllergenCategory::Eggs,
        AllergenCategory::Fish,
        AllergenCategory::Shellfish,
        AllergenCategory::TreeNuts,
        AllergenCategory::Peanuts,
        AllergenCategory::Wheat,
        AllergenCategory::Soybeans,
        AllergenCategory::Sesame,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AllergenCategory::Milk => "milk",
            AllergenCategory::Eggs => "eggs",
            AllergenCategory::Fish => "fish",
            AllergenCategory::Shellfish => "shellfish",
            AllergenCategory::TreeNuts => "tree_nuts",
            AllergenCategory::Peanuts => "peanuts",
            AllergenCategory::Wheat => "wheat",
            AllergenCategory::Soybeans => "soybeans",
            AllergenCategory::Sesame => "sesame",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AllergenCategory::Milk => "Milk",
            AllergenCategory::Eggs => "Eggs",
            AllergenCategory::Fish => "Fish",
            AllergenCategory::Shellfish => "Crustacean Shellfish",
            AllergenCategory::TreeNuts => "Tree Nuts",
            AllergenCategory::Peanuts => "Peanuts",
            AllergenCategory::Wheat => "Wheat",
            AllergenCategory::Soybeans => "Soybeans",
            AllergenCategory::Sesame => "Sesame",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        AllergenCategory::ALL.into_iter().find(|c| c.as_str() == key)
    }
}

impl fmt::Display for AllergenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Keywords that reveal a category in ingredient text, and the terms that
/// count as declaring it in an allergen statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllergenEntry {
    pub keywords: Vec<String>,
    pub declaration_terms: Vec<String>,
    /// Phrases ignored for this category ("cocoa butter" is not milk)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
}

/// Category -> matched keywords
pub type AllergenMatches = BTreeMap<AllergenCategory, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllergenTable {
    categories: BTreeMap<AllergenCategory, AllergenEntry>,
}

impl AllergenTable {
    pub fn new(categories: BTreeMap<AllergenCategory, AllergenEntry>) -> Self {
        Self { categories }
    }

    pub fn entry(&self, category: AllergenCategory) -> Option<&AllergenEntry> {
        self.categories.get(&category)
    }

    /// Categories whose keywords occur as whole words in the ingredient text.
    /// Categories with no match are absent from the result.
    pub fn detect(&self, ingredients: &str) -> AllergenMatches {
        let index = WordIndex::new(ingredients);
        self.categories
            .iter()
            .filter_map(|(category, entry)| {
                let scoped = index.without_phrases(&entry.exclusions);
                let found: Vec<String> =
                    scoped.matching(&entry.keywords).into_iter().map(str::to_string).collect();
                (!found.is_empty()).then_some((*category, found))
            })
            .collect()
    }

    /// Detected categories that the allergen statement does not name.
    ///
    /// A category counts as declared when the statement contains one of its
    /// declaration terms or one of the keywords that matched it.
    pub fn undeclared(&self, detected: &AllergenMatches, statement: &str) -> Vec<AllergenCategory> {
        let index = WordIndex::new(statement);
        detected
            .iter()
            .filter(|(category, matched)| {
                let terms = self
                    .entry(**category)
                    .map(|e| e.declaration_terms.as_slice())
                    .unwrap_or(&[]);
                let named = !index.matching(terms).is_empty() || !index.matching(matched).is_empty();
                !named
            })
            .map(|(category, _)| *category)
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        for category in AllergenCategory::ALL {
            match self.categories.get(&category) {
                None => return Err(format!("allergen table is missing '{}'", category.as_str())),
                Some(entry) if entry.keywords.is_empty() => {
                    return Err(format!("allergen '{}' has no keywords", category.as_str()))
                }
                Some(entry) if entry.declaration_terms.is_empty() => {
                    return Err(format!("allergen '{}' has no declaration terms", category.as_str()))
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    fn table() -> &'static AllergenTable {
        &RuleSet::us_fda().allergens
    }

    #[test]
    fn test_detects_categories_with_terms() {
        let found = table().detect("Enriched wheat flour, sugar, whey, soy lecithin, peanut oil");
        assert_eq!(found.get(&AllergenCategory::Wheat), Some(&vec!["wheat".to_string()]));
        assert_eq!(found.get(&AllergenCategory::Milk), Some(&vec!["whey".to_string()]));
        assert_eq!(found.get(&AllergenCategory::Soybeans), Some(&vec!["soy".to_string()]));
        assert_eq!(found.get(&AllergenCategory::Peanuts), Some(&vec!["peanut".to_string()]));
        assert!(!found.contains_key(&AllergenCategory::Sesame));
    }

    #[test]
    fn test_whole_word_only() {
        assert!(table().detect("a peanutty flavor").is_empty());
        assert!(table().detect("roasted peanuts").contains_key(&AllergenCategory::Peanuts));
        assert!(table().detect("buttery notes").is_empty());
    }

    #[test]
    fn test_exclusions() {
        assert!(table().detect("sugar, cocoa butter, cream of tartar").is_empty());
        let found = table().detect("cocoa butter, butter");
        assert_eq!(found.get(&AllergenCategory::Milk), Some(&vec!["butter".to_string()]));
    }

    #[test]
    fn test_undeclared() {
        let found = table().detect("wheat flour, eggs, tahini");
        assert_eq!(found.len(), 3);

        let missing = table().undeclared(&found, "Contains: Wheat, Egg");
        assert_eq!(missing, vec![AllergenCategory::Sesame]);

        let missing = table().undeclared(&found, "");
        assert_eq!(missing.len(), 3);

        assert!(table().undeclared(&found, "CONTAINS WHEAT, EGGS, SESAME").is_empty());
    }

    #[test]
    fn test_matched_keyword_counts_as_declared() {
        let found = table().detect("salmon, salt");
        assert!(table().undeclared(&found, "Contains: salmon").is_empty());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(AllergenCategory::from_str("Tree Nuts"), Some(AllergenCategory::TreeNuts));
        assert_eq!(AllergenCategory::from_str("gluten"), None);
    }

    #[test]
    fn test_validate() {
        assert!(table().validate().is_ok());
        assert!(AllergenTable::default().validate().is_err());
    }
}

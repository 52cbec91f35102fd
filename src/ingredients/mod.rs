//! Ingredient text scanning: allergens and sweeteners

pub mod allergens;
pub mod sweeteners;
pub mod text;

pub use allergens::{AllergenCategory, AllergenEntry, AllergenMatches, AllergenTable};
pub use sweeteners::{SweetenerLexicon, SweetenerOutcome};
pub use text::WordIndex;

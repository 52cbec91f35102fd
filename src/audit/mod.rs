//! Compliance audit: the checklist, scoring and panel regeneration

pub mod panel;
pub mod scoring;
pub mod validator;

pub use panel::{NutritionPanel, PanelLine};
pub use scoring::{score, status};
pub use validator::{strip_code_fences, Auditor};

use crate::models::{ComplianceReport, ExtractedLabel};

/// Audit one label against the embedded US FDA rules with default settings
pub fn audit(label: &ExtractedLabel) -> ComplianceReport {
    Auditor::us_fda().audit(label)
}

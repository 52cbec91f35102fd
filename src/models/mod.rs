//! Data models for label audits

pub mod label;
pub mod nutrient;
pub mod report;

pub use label::{DataQualityWarning, ExtractedLabel};
pub use nutrient::{Nutrient, NutrientRecord, NutrientUnit};
pub use report::{CheckKind, ComplianceIssue, ComplianceReport, ReportStatus, Severity};
pub(crate) use report::ReportDraft;

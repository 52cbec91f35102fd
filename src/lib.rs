//! Food Label Compliance (FLC) Library
//!
//! Audits extracted nutrition-label data against a packaged-food labeling
//! regulation: display rounding, percent daily values, household serving
//! sizes, calorie cross-checks, allergen and sweetener scanning, and a
//! severity-graded compliance report.

pub mod audit;
pub mod build_info;
pub mod config;
pub mod ingredients;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod rules;
pub mod tools;

pub use audit::{audit, Auditor, NutritionPanel};
pub use config::{AuditConfig, ConfigError};
pub use models::{ComplianceIssue, ComplianceReport, ExtractedLabel, ReportStatus, Severity};
pub use rules::{RuleSet, RulesError};

//! Compliance issues and the audit report

use std::fmt;

use serde::{Deserialize, Serialize};

use super::label::DataQualityWarning;
use crate::audit::NutritionPanel;
use crate::ingredients::{AllergenMatches, SweetenerOutcome};
use crate::nutrition::{CalorieCheck, ServingDeclaration};

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks market entry
    Critical,
    /// Must be fixed before launch
    Major,
    /// Optional improvement or advisory
    Minor,
    /// Verified compliant
    Passed,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
            Severity::Passed => "passed",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal status of an audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Ready,
    NeedsFixes,
    MajorRevision,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Ready => "ready",
            ReportStatus::NeedsFixes => "needs_fixes",
            ReportStatus::MajorRevision => "major_revision",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed checklist, in the order checks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    StatementOfIdentity,
    NetQuantity,
    Language,
    Ingredients,
    Manufacturer,
    NutritionPanel,
    Allergens,
    Sweeteners,
    Calories,
}

impl CheckKind {
    pub const ALL: [CheckKind; 9] = [
        CheckKind::StatementOfIdentity,
        CheckKind::NetQuantity,
        CheckKind::Language,
        CheckKind::Ingredients,
        CheckKind::Manufacturer,
        CheckKind::NutritionPanel,
        CheckKind::Allergens,
        CheckKind::Sweeteners,
        CheckKind::Calories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::StatementOfIdentity => "statement_of_identity",
            CheckKind::NetQuantity => "net_quantity",
            CheckKind::Language => "language",
            CheckKind::Ingredients => "ingredients",
            CheckKind::Manufacturer => "manufacturer",
            CheckKind::NutritionPanel => "nutrition_panel",
            CheckKind::Allergens => "allergens",
            CheckKind::Sweeteners => "sweeteners",
            CheckKind::Calories => "calories",
        }
    }

    /// Requirement name shown in reports
    pub fn requirement(&self) -> &'static str {
        match self {
            CheckKind::StatementOfIdentity => "Statement of Identity",
            CheckKind::NetQuantity => "Net Quantity of Contents",
            CheckKind::Language => "Label Language",
            CheckKind::Ingredients => "Ingredient List",
            CheckKind::Manufacturer => "Manufacturer Identification",
            CheckKind::NutritionPanel => "Nutrition Facts Panel",
            CheckKind::Allergens => "Allergen Declaration",
            CheckKind::Sweeteners => "Sugar Alcohol Declaration",
            CheckKind::Calories => "Calorie Accuracy",
        }
    }
}

/// One finding of one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    pub check: CheckKind,
    pub requirement: String,
    pub description: String,
    pub citation: String,
    pub remediation: String,
    pub severity: Severity,
}

/// Everything an audit produced before scoring
#[derive(Debug, Clone)]
pub(crate) struct ReportDraft {
    pub issues: Vec<ComplianceIssue>,
    pub allergens: AllergenMatches,
    pub corrections_applied: Vec<String>,
    pub data_quality_warnings: Vec<DataQualityWarning>,
    pub calorie_check: Option<CalorieCheck>,
    pub sweeteners: SweetenerOutcome,
    pub serving: Option<ServingDeclaration>,
    pub panel: NutritionPanel,
    pub rules_version: String,
}

/// Result of one audit. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    score: u8,
    status: ReportStatus,
    critical: Vec<ComplianceIssue>,
    major: Vec<ComplianceIssue>,
    minor: Vec<ComplianceIssue>,
    passed: Vec<ComplianceIssue>,
    allergens: AllergenMatches,
    corrections_applied: Vec<String>,
    data_quality_warnings: Vec<DataQualityWarning>,
    calorie_check: Option<CalorieCheck>,
    sweeteners: SweetenerOutcome,
    serving: Option<ServingDeclaration>,
    panel: NutritionPanel,
    rules_version: String,
}

impl ComplianceReport {
    pub(crate) fn from_draft(draft: ReportDraft) -> Self {
        let mut critical = Vec::new();
        let mut major = Vec::new();
        let mut minor = Vec::new();
        let mut passed = Vec::new();
        for issue in draft.issues {
            match issue.severity {
                Severity::Critical => critical.push(issue),
                Severity::Major => major.push(issue),
                Severity::Minor => minor.push(issue),
                Severity::Passed => passed.push(issue),
            }
        }

        let score = crate::audit::score(critical.len(), major.len());
        let status = crate::audit::status(critical.len());

        Self {
            score,
            status,
            critical,
            major,
            minor,
            passed,
            allergens: draft.allergens,
            corrections_applied: draft.corrections_applied,
            data_quality_warnings: draft.data_quality_warnings,
            calorie_check: draft.calorie_check,
            sweeteners: draft.sweeteners,
            serving: draft.serving,
            panel: draft.panel,
            rules_version: draft.rules_version,
        }
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn critical(&self) -> &[ComplianceIssue] {
        &self.critical
    }

    pub fn major(&self) -> &[ComplianceIssue] {
        &self.major
    }

    pub fn minor(&self) -> &[ComplianceIssue] {
        &self.minor
    }

    pub fn passed(&self) -> &[ComplianceIssue] {
        &self.passed
    }

    /// All issues, most severe first
    pub fn issues(&self) -> impl Iterator<Item = &ComplianceIssue> {
        self.critical
            .iter()
            .chain(&self.major)
            .chain(&self.minor)
            .chain(&self.passed)
    }

    /// The issue a given check produced
    pub fn issue(&self, check: CheckKind) -> Option<&ComplianceIssue> {
        self.issues().find(|i| i.check == check)
    }

    pub fn allergens(&self) -> &AllergenMatches {
        &self.allergens
    }

    pub fn corrections_applied(&self) -> &[String] {
        &self.corrections_applied
    }

    pub fn data_quality_warnings(&self) -> &[DataQualityWarning] {
        &self.data_quality_warnings
    }

    pub fn calorie_check(&self) -> Option<&CalorieCheck> {
        self.calorie_check.as_ref()
    }

    pub fn sweeteners(&self) -> &SweetenerOutcome {
        &self.sweeteners
    }

    pub fn serving(&self) -> Option<&ServingDeclaration> {
        self.serving.as_ref()
    }

    pub fn panel(&self) -> &NutritionPanel {
        &self.panel
    }

    pub fn rules_version(&self) -> &str {
        &self.rules_version
    }
}

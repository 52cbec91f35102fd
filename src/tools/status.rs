//! FLC Status Tool
//!
//! Runtime status of the service and the extraction field contract.

use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Audit input instructions for AI assistants
pub const AUDIT_INSTRUCTIONS: &str = r#"
# FLC Label Audit Instructions

This guide explains how to audit a food label with the Food Label Compliance (FLC) tools.

## Overview

1. Extract the label fields from the image into a JSON object (field list below)
2. Call `audit_label` with that object as `label`
3. Fix every **critical** and **major** issue, then re-audit
4. Call `regenerate_panel` for the corrected, rounded Nutrition Facts values

---

## Extraction Rules

- Extract EXACT numbers as they appear on the label
- If a value is not on the label, use null (not 0)
- "<1g" on the label: use "0.5"
- Nutrient names translated to English
- Return only JSON: no markdown, no explanations

## Fields

| Field | Meaning |
|-------|---------|
| product_name | Statement of identity |
| net_quantity | Net quantity text exactly as printed ("NET WT 12 OZ (340g)") |
| serving_size_original | Serving text as printed |
| serving_size_metric | Metric serving only ("30g", "240mL") |
| servings_per_container | Number or "About X" |
| calories | kcal per serving |
| total_fat_g, saturated_fat_g, trans_fat_g | grams |
| cholesterol_mg, sodium_mg | milligrams |
| total_carb_g, fiber_g, total_sugars_g, added_sugars_g, sugar_alcohols_g | grams |
| protein_g | grams |
| vitamin_d_mcg | micrograms |
| calcium_mg, iron_mg, potassium_mg | milligrams |
| nutrient_order | Nutrient names as printed, top to bottom |
| nutrition_panel_present | true / false |
| ingredients | Ingredient list as printed |
| ingredients_translated | English translation of the ingredient list |
| allergen_statement | "Contains: ..." statement |
| manufacturer_name, manufacturer_address | Responsible party |
| country_of_origin | Country the product is made in |
| importer_statement | "Imported by" / "Distributed by" text |
| primary_language, secondary_language | Label languages ("en", "es", ...) |

---

## Reading the Report

| Severity | Meaning |
|----------|---------|
| critical | Blocks market entry |
| major | Must be fixed before launch |
| minor | Advisory (calorie cross-check, automatic corrections) |
| passed | Verified compliant |

Score: 100 - 20 per critical - 10 per major (never below 0).
Status: `ready` (no critical), `needs_fixes` (1-2 critical), `major_revision` (3 or more).

`corrections_applied` lists values FLC changed itself, such as added sugars
moved to sugar alcohols. `data_quality_warnings` lists values that were
missing or unreadable and treated as 0: check these against the label
before trusting the panel.
"#;

/// Runtime status of the FLC service
#[derive(Debug, Clone, Serialize)]
pub struct FlcStatus {
    #[serde(flatten)]
    pub build: BuildInfo,
    pub calorie_tolerance: f64,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    build: BuildInfo,
    calorie_tolerance: f64,
}

impl StatusTracker {
    pub fn new(build: BuildInfo, calorie_tolerance: f64) -> Self {
        Self {
            start_time: Instant::now(),
            build,
            calorie_tolerance,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> FlcStatus {
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));
        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        FlcStatus {
            build: self.build.clone(),
            calorie_tolerance: self.calorie_tolerance,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    #[test]
    fn test_status_reports_rules() {
        let tracker = StatusTracker::new(BuildInfo::new(RuleSet::us_fda()), 0.15);
        let status = tracker.get_status();
        assert_eq!(status.build.rules_version, "us-fda-2016.1");
        assert_eq!(status.process_id, std::process::id());
    }
}

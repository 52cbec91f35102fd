//! Build script for FLC
//!
//! Stamps the binary with its build time and profile, and reads the version
//! of the embedded rule table so a broken table fails the build instead of
//! the first audit.

use std::fs;

const EMBEDDED_RULES: &str = "src/rules/us_fda.json";

fn main() {
    println!("cargo:rerun-if-changed={}", EMBEDDED_RULES);
    println!("cargo:rerun-if-changed=build.rs");

    let table = fs::read_to_string(EMBEDDED_RULES)
        .unwrap_or_else(|err| panic!("cannot read {}: {}", EMBEDDED_RULES, err));
    let table: serde_json::Value = serde_json::from_str(&table)
        .unwrap_or_else(|err| panic!("{} is not valid JSON: {}", EMBEDDED_RULES, err));
    let rules_version = table["version"]
        .as_str()
        .unwrap_or_else(|| panic!("{} has no string \"version\"", EMBEDDED_RULES));

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=FLC_EMBEDDED_RULES_VERSION={}", rules_version);
    println!("cargo:rustc-env=FLC_BUILD_PROFILE={}", profile);
    println!("cargo:rustc-env=FLC_BUILD_TIMESTAMP={}", timestamp);
}

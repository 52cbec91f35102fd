//! What this binary is and which rules it audits against

use std::fmt;

use serde::Serialize;

use crate::rules::RuleSet;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `debug` or `release`
pub const BUILD_PROFILE: &str = match option_env!("FLC_BUILD_PROFILE") {
    Some(s) => s,
    None => "unknown",
};

/// Build timestamp in ISO 8601 format
pub const BUILD_TIMESTAMP: &str = match option_env!("FLC_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Version of the rule table compiled into the binary
pub const EMBEDDED_RULES_VERSION: &str = match option_env!("FLC_EMBEDDED_RULES_VERSION") {
    Some(s) => s,
    None => "unknown",
};

/// Build and rule-table identity, reported by the status tool and the
/// startup banner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    /// Rule table in use, which may be a substitute loaded from disk
    pub rules_version: String,
    pub jurisdiction: String,
    pub regulation: String,
    pub embedded_rules_version: &'static str,
}

impl BuildInfo {
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_profile: BUILD_PROFILE,
            build_timestamp: BUILD_TIMESTAMP,
            rules_version: rules.version.clone(),
            jurisdiction: rules.jurisdiction.code.clone(),
            regulation: rules.jurisdiction.regulation.clone(),
            embedded_rules_version: EMBEDDED_RULES_VERSION,
        }
    }

    /// True when the rule table was loaded from disk instead of the binary
    pub fn rules_substituted(&self) -> bool {
        self.rules_version != self.embedded_rules_version
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Food Label Compliance ({}) {} [{}]", self.name, self.version, self.build_profile)?;
        writeln!(f, "  Compiled: {}", self.build_timestamp)?;
        write!(f, "  Rules: {} ({}, {})", self.rules_version, self.jurisdiction, self.regulation)?;
        if self.rules_substituted() {
            write!(f, " replacing embedded {}", self.embedded_rules_version)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_rules() {
        let info = BuildInfo::new(RuleSet::us_fda());
        assert_eq!(info.jurisdiction, "US");
        assert_eq!(info.embedded_rules_version, RuleSet::us_fda().version);
        assert!(!info.rules_substituted());
        assert!(info.to_string().contains("Rules: us-fda-2016.1 (US, 21 CFR Part 101)"));
    }

    #[test]
    fn test_substituted_rules() {
        let mut rules = RuleSet::us_fda().clone();
        rules.version = "us-fda-draft".to_string();
        let info = BuildInfo::new(&rules);
        assert!(info.rules_substituted());
        assert!(info.to_string().ends_with("replacing embedded us-fda-2016.1"));
    }
}

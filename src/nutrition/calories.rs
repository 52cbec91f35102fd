//! Declared calories versus an Atwater estimate
//!
//! Advisory only: the outcome is always reported as a minor issue or a pass.

use serde::Serialize;

/// Energy per gram of fat
pub const KCAL_PER_G_FAT: f64 = 9.0;
/// Energy per gram of carbohydrate
pub const KCAL_PER_G_CARBOHYDRATE: f64 = 4.0;
/// Energy per gram of protein
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;

/// Default tolerance band around the estimate (15%)
pub const DEFAULT_CALORIE_TOLERANCE: f64 = 0.15;

/// Result of the calorie cross-check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalorieCheck {
    pub valid: bool,
    pub message: String,
    /// Rounded Atwater estimate
    pub estimate: f64,
    pub declared: f64,
    pub tolerance: f64,
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Compare declared calories with `fat*9 + carbohydrate*4 + protein*4`.
///
/// The declared value is valid when it lies within `estimate * (1 ± tolerance)`,
/// inclusive at both ends.
pub fn check_calories(
    fat_g: f64,
    carbohydrate_g: f64,
    protein_g: f64,
    declared: f64,
    tolerance: f64,
) -> CalorieCheck {
    let estimate = (non_negative(fat_g) * KCAL_PER_G_FAT
        + non_negative(carbohydrate_g) * KCAL_PER_G_CARBOHYDRATE
        + non_negative(protein_g) * KCAL_PER_G_PROTEIN)
        .round();
    let declared = non_negative(declared);
    let tolerance = non_negative(tolerance);

    // epsilon keeps the band edges inclusive under float error
    let valid = (declared - estimate).abs() <= estimate * tolerance + 1e-9;

    let message = if valid {
        format!(
            "Calorie calculation verified: declared {} within {:.0}% of estimate {}",
            declared,
            tolerance * 100.0,
            estimate
        )
    } else {
        format!(
            "Calorie mismatch: declared {}, calculated {} from fat/carbohydrate/protein (tolerance {:.0}%)",
            declared,
            estimate,
            tolerance * 100.0
        )
    };

    CalorieCheck {
        valid,
        message,
        estimate,
        declared,
        tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate() {
        let check = check_calories(10.0, 20.0, 5.0, 190.0, DEFAULT_CALORIE_TOLERANCE);
        assert_eq!(check.estimate, 190.0);
        assert!(check.valid);
    }

    #[test]
    fn test_tolerance_band_edges() {
        // estimate 100
        assert!(check_calories(0.0, 25.0, 0.0, 115.0, 0.15).valid);
        assert!(check_calories(0.0, 25.0, 0.0, 85.0, 0.15).valid);
        assert!(!check_calories(0.0, 25.0, 0.0, 116.0, 0.15).valid);
        assert!(!check_calories(0.0, 25.0, 0.0, 84.0, 0.15).valid);
        assert!(check_calories(0.0, 25.0, 0.0, 120.0, 0.20).valid);
    }

    #[test]
    fn test_mismatch_message() {
        let check = check_calories(1.0, 1.0, 1.0, 300.0, 0.15);
        assert!(!check.valid);
        assert_eq!(check.estimate, 17.0);
        assert!(check.message.contains("mismatch"));
    }

    #[test]
    fn test_all_zero_is_consistent() {
        assert!(check_calories(0.0, 0.0, 0.0, 0.0, 0.15).valid);
    }

    #[test]
    fn test_bad_inputs_clamp() {
        let check = check_calories(-5.0, f64::NAN, 10.0, -1.0, 0.15);
        assert_eq!(check.estimate, 40.0);
        assert_eq!(check.declared, 0.0);
        assert!(!check.valid);
    }
}

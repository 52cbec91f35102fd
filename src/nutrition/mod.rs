//! Nutrition calculation module
//!
//! Rounding, reference intakes, serving conversion, calorie cross-checks and
//! the unit handling they share.

pub mod amount;
pub mod calories;
pub mod reference_intake;
pub mod rounding;
pub mod serving;
pub mod units;

pub use amount::{parse_amount, AmountError, RawAmount};
pub use calories::{check_calories, CalorieCheck, DEFAULT_CALORIE_TOLERANCE};
pub use reference_intake::ReferenceIntakeTable;
pub use rounding::{format_display, RoundingBand, RoundingCategory, RoundingStep, RoundingTable};
pub use serving::{
    convert_serving, net_quantity_units, ConversionSource, NetQuantityUnits, ServingDeclaration, ServingLookup,
};
pub use units::{find_measures, Measure, UnitCategory, UnitSystem};

//! Shared helpers for the aggregation passes
//!
//! - Selection: filter sentinels and view/value modes
//! - Lookup: state code ↔ name, FIPS padding, district naming
//! - Rates: guarded rate arithmetic and the filtered base-acre helper

pub mod lookup;
pub mod rates;
pub mod selection;

// Re-export commonly used types
pub use lookup::{district_name_from_id, normalize_county_fips, StateLookup};
pub use rates::{clamp_symmetric, filtered_base_acres, percent_change, round2, weighted_mean_rate, BaseAcresFn};
pub use selection::{Scenario, Selection, StateFilter, ValueMode, ViewMode};

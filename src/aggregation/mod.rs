//! Region Aggregator
//!
//! Raw hierarchy → flat `PaymentRow`s (`rows`) → per-region accumulators
//! (`accumulator`), with the year walk in `years` and the relaxed
//! empty-filter pass in `fallback`.

pub mod accumulator;
pub mod fallback;
pub mod rows;
pub mod years;

pub use accumulator::{
    fold_rows, CommodityAccumulator, ProgramAccumulator, RateSummary, RegionAccumulator,
    RegionFold, RegionStatus, Totals, WeightedRates,
};
pub use fallback::relaxed_regions;
pub use rows::{extract_rows, PaymentRow, RegionKey, RowFilter};
pub use years::resolve_years;

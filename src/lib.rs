//! Payment Map Rust Implementation
//!
//! Map-data aggregation and classification for agricultural-subsidy payment
//! data: nested per-year payment records in, per-region statistics and
//! colour-scale break points out.
//!
//! - `data/`: typed record hierarchy and JSON loading
//! - `geography/`: county and congressional-district extractors
//! - `aggregation/`: row extraction, region fold, relaxed fallback pass
//! - `finisher/`: view values, weighted rates, validity
//! - `thresholds/` + `legend/`: break points and legend helpers
//! - `engine/`: the coordinator (`MapDataEngine`, `ChunkedMapBuilder`)

pub mod aggregation;
pub mod config;
pub mod data;
pub mod engine;
pub mod finisher;
pub mod geography;
pub mod legend;
pub mod thresholds;
pub mod utils;

// Re-export commonly used types
pub use aggregation::{RegionAccumulator, RegionStatus};
pub use config::{ConfigError, EngineConfig};
pub use data::{CountyRecord, DistrictRecord, PaymentDataset};
pub use engine::{ChunkedMapBuilder, MapData, MapDataEngine, MapRequest};
pub use geography::{CountyExtractor, DistrictExtractor, RegionExtractor};
pub use thresholds::calculate_thresholds;
pub use utils::{Selection, StateFilter, StateLookup, ValueMode, ViewMode};

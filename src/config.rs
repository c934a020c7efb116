//! Engine Configuration
//!
//! Numeric knobs for the finisher and the threshold classifier. Passed
//! explicitly into every call; nothing here is global.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use thiserror::Error;

/// Default percentile cut list, denser toward both extremes
pub const DEFAULT_PERCENTILES: [f64; 11] = [0.0, 5.0, 10.0, 15.0, 40.0, 65.0, 80.0, 85.0, 90.0, 95.0, 100.0];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("percentile {0} is outside 0..=100")]
    PercentileOutOfRange(f64),
    #[error("percentiles must be ascending ({previous} followed by {next})")]
    PercentilesNotAscending { previous: f64, next: f64 },
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositiveBound { field: &'static str, value: f64 },
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall { field: &'static str, min: usize, value: usize },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Target percentiles for large datasets
    pub percentiles: Vec<f64>,
    /// Below this many valid samples, thresholds are evenly spaced
    pub even_spacing_below: usize,
    /// Number of equal segments between min and max for even spacing
    pub even_spacing_segments: usize,
    /// Upper display bound for region mean rates ($/acre)
    pub max_display_rate: f64,
    /// Symmetric bound for rate differences ($/acre)
    pub rate_difference_clamp: f64,
    /// Adjacent legend labels closer than this ratio collide
    pub label_ratio: f64,
    /// Smallest acceptable simplified legend
    pub min_legend_points: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            even_spacing_below: 30,
            even_spacing_segments: 10,
            max_display_rate: 1000.0,
            rate_difference_clamp: 500.0,
            label_ratio: 1.25,
            min_legend_points: 3,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file; absent keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {:?}", path))?;

        let config: EngineConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse engine config JSON")?;

        config
            .validate()
            .with_context(|| format!("Invalid engine config: {:?}", path))?;

        Ok(config)
    }

    pub fn with_percentiles(mut self, percentiles: Vec<f64>) -> Self {
        self.percentiles = percentiles;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let mut previous: Option<f64> = None;
        for &p in &self.percentiles {
            if !(0.0..=100.0).contains(&p) {
                return Err(ConfigError::PercentileOutOfRange(p));
            }
            if let Some(prev) = previous {
                if p < prev {
                    return Err(ConfigError::PercentilesNotAscending { previous: prev, next: p });
                }
            }
            previous = Some(p);
        }

        for (field, value) in [
            ("maxDisplayRate", self.max_display_rate),
            ("rateDifferenceClamp", self.rate_difference_clamp),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositiveBound { field, value });
            }
        }
        if !(self.label_ratio.is_finite() && self.label_ratio >= 1.0) {
            return Err(ConfigError::NonPositiveBound { field: "labelRatio", value: self.label_ratio });
        }

        if self.even_spacing_below < 1 {
            return Err(ConfigError::TooSmall {
                field: "evenSpacingBelow",
                min: 1,
                value: self.even_spacing_below,
            });
        }
        if self.even_spacing_segments < 1 {
            return Err(ConfigError::TooSmall {
                field: "evenSpacingSegments",
                min: 1,
                value: self.even_spacing_segments,
            });
        }
        if self.min_legend_points < 2 {
            return Err(ConfigError::TooSmall {
                field: "minLegendPoints",
                min: 2,
                value: self.min_legend_points,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.percentiles.len(), 11);
        assert_eq!(config.even_spacing_below, 30);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "rateDifferenceClamp": 250, "percentiles": [0, 50, 100] }"#).unwrap();
        assert_eq!(config.rate_difference_clamp, 250.0);
        assert_eq!(config.percentiles, vec![0.0, 50.0, 100.0]);
        assert_eq!(config.max_display_rate, 1000.0);
    }

    #[test]
    fn test_validation_errors() {
        let config = EngineConfig::default().with_percentiles(vec![0.0, 120.0]);
        assert_eq!(config.validate(), Err(ConfigError::PercentileOutOfRange(120.0)));

        let config = EngineConfig::default().with_percentiles(vec![50.0, 10.0]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PercentilesNotAscending { .. })
        ));

        let config = EngineConfig { rate_difference_clamp: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::NonPositiveBound { .. })));
    }
}

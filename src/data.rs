//! Raw Payment Records
//!
//! Typed view of the nested payment feed: year → states → regions →
//! scenarios → commodities → programs. One `PaymentDataset` instance holds a
//! single policy (current or proposed).
//!
//! Numeric fields are lenient: missing values deserialize as zero and
//! non-finite values are treated as zero by every consumer (see
//! [`ProgramRecord::payment`]). Missing nested collections deserialize as
//! empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};

/// Replace NaN/±inf with zero
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Year label → state records, for one policy
///
/// Backed by a `BTreeMap` so `years()` is already in sorted order.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PaymentDataset<R> {
    years: BTreeMap<String, Vec<StateRecord<R>>>,
}

impl<R> Default for PaymentDataset<R> {
    fn default() -> Self {
        Self { years: BTreeMap::new() }
    }
}

impl<R> PaymentDataset<R> {
    pub fn new(years: BTreeMap<String, Vec<StateRecord<R>>>) -> Self {
        Self { years }
    }

    /// State records for one year (empty slice if the year is absent)
    pub fn year(&self, year: &str) -> &[StateRecord<R>] {
        self.years.get(year).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_year(&self, year: &str) -> bool {
        self.years.contains_key(year)
    }

    /// Available year labels, sorted
    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.years.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[StateRecord<R>])> {
        self.years.iter().map(|(year, states)| (year.as_str(), states.as_slice()))
    }

    pub fn insert_year(&mut self, year: impl Into<String>, states: Vec<StateRecord<R>>) {
        self.years.insert(year.into(), states);
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

impl<R: for<'de> Deserialize<'de>> PaymentDataset<R> {
    /// Load a dataset from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read payment dataset: {:?}", path))?;

        let dataset: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse payment dataset JSON: {:?}", path))?;

        tracing::debug!(
            "Loaded payment dataset {:?} ({} years)",
            path,
            dataset.years.len()
        );

        Ok(dataset)
    }
}

/// One state's regions for one year
///
/// Accepts either `counties` or `districts` for the region list, so the same
/// type serves both geographies.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateRecord<R> {
    pub state: String,
    #[serde(alias = "counties", alias = "districts", default = "Vec::new")]
    pub regions: Vec<R>,
}

/// County-level record
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyRecord {
    #[serde(rename = "countyFIPS", default)]
    pub county_fips: String,
    #[serde(default)]
    pub county_name: Option<String>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioRecord>,
}

/// Congressional-district record
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictRecord {
    #[serde(default)]
    pub district_id: Option<String>,
    #[serde(default)]
    pub district_number: Option<DistrictNumber>,
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioRecord>,
}

/// District numbers arrive either as integers or as zero-padded strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DistrictNumber {
    Number(u32),
    Text(String),
}

impl DistrictNumber {
    /// Two-digit, zero-padded form ("5" → "05")
    pub fn padded(&self) -> String {
        match self {
            DistrictNumber::Number(n) => format!("{:02}", n),
            DistrictNumber::Text(s) => format!("{:0>2}", s.trim()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRecord {
    #[serde(default)]
    pub scenario_name: Option<String>,
    #[serde(default)]
    pub commodities: Vec<CommodityRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityRecord {
    pub commodity_name: String,
    #[serde(default)]
    pub base_acres: Option<f64>,
    #[serde(default)]
    pub programs: Vec<ProgramRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRecord {
    pub program_name: String,
    #[serde(default)]
    pub total_payment_in_dollars: f64,
    #[serde(default)]
    pub base_acres: f64,
    #[serde(default)]
    pub mean_payment_rate_in_dollars_per_acre: Option<f64>,
    #[serde(default)]
    pub median_payment_rate_in_dollars_per_acre: Option<f64>,
}

impl ProgramRecord {
    pub fn payment(&self) -> f64 {
        finite_or_zero(self.total_payment_in_dollars)
    }

    pub fn acres(&self) -> f64 {
        finite_or_zero(self.base_acres)
    }

    /// Reported mean rate, else payment / acres (zero when acres ≤ 0)
    pub fn mean_rate(&self) -> f64 {
        match self.mean_payment_rate_in_dollars_per_acre {
            Some(rate) if rate.is_finite() => rate,
            _ if self.acres() > 0.0 => self.payment() / self.acres(),
            _ => 0.0,
        }
    }

    /// Reported median rate, else the mean rate
    pub fn median_rate(&self) -> f64 {
        match self.median_payment_rate_in_dollars_per_acre {
            Some(rate) if rate.is_finite() => rate,
            _ => self.mean_rate(),
        }
    }
}

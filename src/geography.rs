//! Region geographies
//!
//! The aggregation algorithm is identical for counties and congressional
//! districts; only the field names differ. A `RegionExtractor` tells the
//! generic passes how to read one geography's records.

use crate::data::{CountyRecord, DistrictRecord, ScenarioRecord, StateRecord};
use crate::utils::lookup::{district_name_from_id, normalize_county_fips};
use rustc_hash::FxHashMap;

pub trait RegionExtractor {
    type Region;

    /// Regions listed under a state record
    fn regions_of<'a>(&self, state: &'a StateRecord<Self::Region>) -> &'a [Self::Region] {
        &state.regions
    }

    /// Stable region identifier (map key)
    fn id_of(&self, state_code: &str, region: &Self::Region) -> String;

    /// Display name for a region
    fn name_of(&self, region_id: &str, region: &Self::Region) -> String;

    fn scenarios_of<'a>(&self, region: &'a Self::Region) -> &'a [ScenarioRecord];
}

/// County geography, with an optional FIPS → name table for records that
/// carry no name of their own
#[derive(Debug, Clone, Default)]
pub struct CountyExtractor {
    names: FxHashMap<String, String>,
}

impl CountyExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names<I, K, V>(names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let names = names
            .into_iter()
            .map(|(fips, name)| {
                let fips: String = fips.into();
                (normalize_county_fips(&fips), name.into())
            })
            .collect();
        Self { names }
    }
}

impl RegionExtractor for CountyExtractor {
    type Region = CountyRecord;

    fn id_of(&self, _state_code: &str, region: &CountyRecord) -> String {
        normalize_county_fips(&region.county_fips)
    }

    fn name_of(&self, region_id: &str, region: &CountyRecord) -> String {
        region
            .county_name
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| self.names.get(region_id).cloned())
            .unwrap_or_else(|| format!("County {}", region_id))
    }

    fn scenarios_of<'a>(&self, region: &'a CountyRecord) -> &'a [ScenarioRecord] {
        &region.scenarios
    }
}

/// Congressional-district geography
#[derive(Debug, Clone, Copy, Default)]
pub struct DistrictExtractor;

impl RegionExtractor for DistrictExtractor {
    type Region = DistrictRecord;

    fn id_of(&self, state_code: &str, region: &DistrictRecord) -> String {
        match (&region.district_id, &region.district_number) {
            (Some(id), _) if !id.is_empty() => id.clone(),
            (_, Some(number)) => format!("{}{}", state_code, number.padded()),
            _ => format!("{}00", state_code),
        }
    }

    fn name_of(&self, region_id: &str, region: &DistrictRecord) -> String {
        region
            .district_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| district_name_from_id(region_id))
    }

    fn scenarios_of<'a>(&self, region: &'a DistrictRecord) -> &'a [ScenarioRecord] {
        &region.scenarios
    }
}

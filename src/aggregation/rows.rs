//! Row extraction
//!
//! Flattens one year of one policy dataset into `PaymentRow`s, applying the
//! state, commodity and program filters up front. Excluded rows never leave
//! this module, so the fold only ever sees included data.

use crate::data::{CommodityRecord, StateRecord};
use crate::geography::RegionExtractor;
use crate::utils::lookup::StateLookup;
use crate::utils::rates::BaseAcresFn;
use crate::utils::selection::{Scenario, Selection, StateFilter};
use std::rc::Rc;

/// Identity of one region, shared by all of its rows in a pass
#[derive(Debug, Clone, PartialEq)]
pub struct RegionKey {
    pub id: String,
    pub name: String,
    pub state_code: String,
    pub state_name: String,
}

/// One included program payment
#[derive(Debug, Clone)]
pub struct PaymentRow<'a> {
    pub region: Rc<RegionKey>,
    pub year: &'a str,
    pub scenario: Scenario,
    pub commodity: &'a str,
    pub program: &'a str,
    pub payment: f64,
    pub base_acres: f64,
    pub mean_rate: f64,
    pub median_rate: f64,
    /// Commodity-level acreage as reported on the commodity record
    pub commodity_base_acres: Option<f64>,
    /// Filtered base acres of the whole region for this (year, scenario) pass
    pub region_base_acres: f64,
}

/// The active filter set
#[derive(Debug, Clone, Copy)]
pub struct RowFilter<'f> {
    pub commodities: &'f Selection,
    pub programs: &'f Selection,
    pub state: &'f StateFilter,
    pub states: &'f StateLookup,
}

impl<'f> RowFilter<'f> {
    pub fn state_matches(&self, code: &str) -> bool {
        match self.state.name() {
            None => true,
            Some(selected) => self.states.matches(code, selected),
        }
    }

    /// Commodity is selected and at least one of its programs is selected
    pub fn commodity_included(&self, commodity: &CommodityRecord) -> bool {
        self.commodities.includes(&commodity.commodity_name)
            && commodity
                .programs
                .iter()
                .any(|program| self.programs.includes(&program.program_name))
    }

    pub fn program_included(&self, program_name: &str) -> bool {
        self.programs.includes(program_name)
    }
}

/// Extract the included rows of one (year, scenario) pass
pub fn extract_rows<'a, G: RegionExtractor>(
    geography: &G,
    states: &'a [StateRecord<G::Region>],
    year: &'a str,
    scenario: Scenario,
    filter: &RowFilter<'_>,
    base_acres: BaseAcresFn,
) -> Vec<PaymentRow<'a>> {
    let mut rows = Vec::new();

    for state in states {
        if !filter.state_matches(&state.state) {
            continue;
        }

        for region in geography.regions_of(state) {
            let scenarios = geography.scenarios_of(region);
            let mut key: Option<(Rc<RegionKey>, f64)> = None;

            for scenario_record in scenarios {
                for commodity in &scenario_record.commodities {
                    if !filter.commodity_included(commodity) {
                        continue;
                    }

                    for program in &commodity.programs {
                        if !filter.program_included(&program.program_name) {
                            continue;
                        }

                        // Region identity and pass acreage are resolved once,
                        // on the region's first included row
                        let (region_key, region_base_acres) = key
                            .get_or_insert_with(|| {
                                let id = geography.id_of(&state.state, region);
                                let region_key = RegionKey {
                                    name: geography.name_of(&id, region),
                                    state_name: filter.states.display_name(&state.state).to_string(),
                                    state_code: state.state.clone(),
                                    id,
                                };
                                let acres = base_acres(
                                    scenarios,
                                    filter.commodities,
                                    filter.programs,
                                    scenario,
                                );
                                (Rc::new(region_key), acres)
                            })
                            .clone();

                        rows.push(PaymentRow {
                            region: region_key,
                            year,
                            scenario,
                            commodity: &commodity.commodity_name,
                            program: &program.program_name,
                            payment: program.payment(),
                            base_acres: program.acres(),
                            mean_rate: program.mean_rate(),
                            median_rate: program.median_rate(),
                            commodity_base_acres: commodity.base_acres.filter(|a| a.is_finite() && *a > 0.0),
                            region_base_acres,
                        });
                    }
                }
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CountyRecord, ProgramRecord, ScenarioRecord};
    use crate::geography::CountyExtractor;
    use crate::utils::rates::filtered_base_acres;

    fn program(name: &str, payment: f64, acres: f64) -> ProgramRecord {
        ProgramRecord {
            program_name: name.into(),
            total_payment_in_dollars: payment,
            base_acres: acres,
            ..Default::default()
        }
    }

    fn state(code: &str, fips: &str) -> StateRecord<CountyRecord> {
        StateRecord {
            state: code.into(),
            regions: vec![CountyRecord {
                county_fips: fips.into(),
                county_name: Some("Story".into()),
                scenarios: vec![ScenarioRecord {
                    scenario_name: Some("Current".into()),
                    commodities: vec![
                        CommodityRecord {
                            commodity_name: "Corn".into(),
                            base_acres: Some(150.0),
                            programs: vec![program("ARC-CO", 1000.0, 100.0), program("PLC", 500.0, 50.0)],
                        },
                        CommodityRecord {
                            commodity_name: "Soybeans".into(),
                            base_acres: None,
                            programs: vec![program("PLC", 200.0, 20.0)],
                        },
                    ],
                }],
            }],
        }
    }

    #[test]
    fn test_extract_applies_all_filters() {
        let states = vec![state("19", "19169"), state("17", "17031")];
        let lookup = StateLookup::new([("19", "Iowa"), ("17", "Illinois")]);
        let commodities = Selection::commodities(["Corn"]);
        let programs = Selection::programs(["PLC"]);
        let state_filter = StateFilter::from("Iowa");
        let filter = RowFilter {
            commodities: &commodities,
            programs: &programs,
            state: &state_filter,
            states: &lookup,
        };

        let rows = extract_rows(
            &CountyExtractor::new(),
            &states,
            "2024",
            Scenario::Current,
            &filter,
            filtered_base_acres,
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.region.id, "19169");
        assert_eq!(row.region.state_name, "Iowa");
        assert_eq!((row.commodity, row.program), ("Corn", "PLC"));
        assert_eq!(row.payment, 500.0);
        assert_eq!(row.region_base_acres, 50.0);
        assert_eq!(row.commodity_base_acres, Some(150.0));
    }

    #[test]
    fn test_extract_all_shares_region_key() {
        let states = vec![state("19", "19169")];
        let lookup = StateLookup::default();
        let all_state = StateFilter::All;
        let filter = RowFilter {
            commodities: &Selection::All,
            programs: &Selection::All,
            state: &all_state,
            states: &lookup,
        };

        let rows = extract_rows(
            &CountyExtractor::new(),
            &states,
            "2024",
            Scenario::Proposed,
            &filter,
            filtered_base_acres,
        );

        assert_eq!(rows.len(), 3);
        assert!(Rc::ptr_eq(&rows[0].region, &rows[2].region));
        assert!(rows.iter().all(|r| r.region_base_acres == 170.0));
        assert_eq!(rows.iter().map(|r| r.payment).sum::<f64>(), 1700.0);
    }

    #[test]
    fn test_commodity_without_selected_program_is_excluded() {
        let states = vec![state("19", "19169")];
        let lookup = StateLookup::default();
        let all_state = StateFilter::All;
        let programs = Selection::programs(["ARC-CO"]);
        let filter = RowFilter {
            commodities: &Selection::All,
            programs: &programs,
            state: &all_state,
            states: &lookup,
        };

        let rows = extract_rows(
            &CountyExtractor::new(),
            &states,
            "2024",
            Scenario::Current,
            &filter,
            filtered_base_acres,
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].commodity, "Corn");
    }
}

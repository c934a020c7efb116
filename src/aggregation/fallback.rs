//! Relaxed fallback pass
//!
//! Used only when a state filter is active and the filtered walk produced
//! no regions at all. Re-includes every region of the filtered state that
//! has any positive payment in any year of the dataset, ignoring the
//! commodity and program selection. Those regions carry no figures and are
//! marked `FilteredOut`.

use crate::aggregation::accumulator::RegionAccumulator;
use crate::aggregation::rows::RegionKey;
use crate::data::{PaymentDataset, ScenarioRecord};
use crate::geography::RegionExtractor;
use crate::utils::lookup::StateLookup;
use crate::utils::selection::StateFilter;
use std::collections::BTreeMap;

/// Any program payment above zero, in any scenario
fn has_any_payment(scenarios: &[ScenarioRecord]) -> bool {
    scenarios
        .iter()
        .flat_map(|scenario| &scenario.commodities)
        .flat_map(|commodity| &commodity.programs)
        .any(|program| program.payment() > 0.0)
}

pub fn relaxed_regions<G: RegionExtractor>(
    geography: &G,
    dataset: &PaymentDataset<G::Region>,
    state_filter: &StateFilter,
    states: &StateLookup,
    is_multi_selection: bool,
) -> BTreeMap<String, RegionAccumulator> {
    let mut regions = BTreeMap::new();

    let Some(selected) = state_filter.name() else {
        return regions;
    };

    for (_, year_states) in dataset.iter() {
        for state in year_states {
            if !states.matches(&state.state, selected) {
                continue;
            }

            for region in geography.regions_of(state) {
                let id = geography.id_of(&state.state, region);
                if regions.contains_key(&id) || !has_any_payment(geography.scenarios_of(region)) {
                    continue;
                }

                let key = RegionKey {
                    name: geography.name_of(&id, region),
                    state_name: states.display_name(&state.state).to_string(),
                    state_code: state.state.clone(),
                    id,
                };
                regions.insert(
                    key.id.clone(),
                    RegionAccumulator::filtered_out(&key, is_multi_selection),
                );
            }
        }
    }

    regions
}

//! Statistic & Validity Finisher
//!
//! Turns accumulated totals into display figures, in this order:
//!
//! 1. view value + percent change
//! 2. region acres re-summed from the per-year breakdown
//! 3. weighted mean/median rates at every level (2 dp, region clamped to
//!    `max_display_rate`, unclamped copy kept)
//! 4. rate differences from the unclamped rates, clamped to
//!    ±`rate_difference_clamp`
//! 5. validity check; failing regions are zeroed
//! 6. flat display value for the threshold classifier

use crate::aggregation::accumulator::{
    CommodityAccumulator, ProgramAccumulator, RateSummary, RegionAccumulator, RegionStatus,
    WeightedRates,
};
use crate::config::EngineConfig;
use crate::utils::rates::{clamp_symmetric, percent_change, round2};
use crate::utils::selection::{Scenario, ValueMode, ViewMode};
use std::collections::BTreeMap;

/// Finish every region and collect the classifier input
///
/// Values are pushed in region-id order. Regions added by the relaxed pass
/// (`FilteredOut`) are left untouched and contribute no value.
pub fn finish_regions(
    regions: &mut BTreeMap<String, RegionAccumulator>,
    view: ViewMode,
    value_mode: ValueMode,
    config: &EngineConfig,
) -> Vec<f64> {
    regions
        .values_mut()
        .filter_map(|region| finish_region(region, view, value_mode, config))
        .collect()
}

/// Finish one region; returns its display value when it belongs in the
/// classifier input
pub fn finish_region(
    region: &mut RegionAccumulator,
    view: ViewMode,
    value_mode: ValueMode,
    config: &EngineConfig,
) -> Option<f64> {
    if region.status == RegionStatus::FilteredOut {
        return None;
    }

    // Step 1
    region.totals.refresh(view);
    region.percent_change = percent_change(region.totals.current_value, region.totals.proposed_value);

    // Step 2
    let (mut acres, mut current_acres, mut proposed_acres) = (0.0, 0.0, 0.0);
    for yearly in region.yearly_data.values_mut() {
        yearly.refresh(view);
        acres += yearly.base_acres;
        current_acres += yearly.current_base_acres;
        proposed_acres += yearly.proposed_base_acres;
    }
    region.totals.base_acres = acres;
    region.totals.current_base_acres = current_acres;
    region.totals.proposed_base_acres = proposed_acres;
    region.has_valid_base_acres = acres > 0.0;

    // Steps 3 and 4
    for commodity in region.commodities.values_mut() {
        finish_commodity(commodity, view, config);
    }
    for program in region.programs.values_mut() {
        finish_program(program, view, config);
    }
    if region.has_data && region.has_valid_base_acres {
        finish_region_rates(region, view, config);
    }

    // Step 5
    if is_valid(region) {
        region.has_data = true;
        region.status = RegionStatus::Reported;
    } else {
        region.zero_out();
        region.has_data = false;
        region.status = RegionStatus::Empty;
        return None;
    }

    // Step 6
    let display = match value_mode {
        ValueMode::Total => region.totals.value,
        ValueMode::MeanRate if !region.has_valid_base_acres => return None,
        ValueMode::MeanRate => match view {
            ViewMode::Difference => region.rates.mean_rate_difference,
            _ => region.mean_payment_rate_in_dollars_per_acre,
        },
    };

    (display.is_finite() && display != 0.0).then_some(display)
}

/// Region value is finite and non-zero, or some commodity has a positive value
pub fn is_valid(region: &RegionAccumulator) -> bool {
    let value = region.totals.value;
    (value.is_finite() && value != 0.0)
        || region
            .commodities
            .values()
            .any(|commodity| commodity.totals.value > 0.0)
}

fn finish_region_rates(region: &mut RegionAccumulator, view: ViewMode, config: &EngineConfig) {
    let weighted = &region.weighted;
    let current_precise = weighted.mean(Scenario::Current);
    let proposed_precise = weighted.mean(Scenario::Proposed);
    let current_median = weighted.median(Scenario::Current);
    let proposed_median = weighted.median(Scenario::Proposed);
    let max_rate = config.max_display_rate;

    region.current_mean_rate_precise = current_precise;
    region.proposed_mean_rate_precise = proposed_precise;

    region.rates = RateSummary {
        current_mean_rate: round2(current_precise.min(max_rate)),
        proposed_mean_rate: round2(proposed_precise.min(max_rate)),
        current_median_rate: round2(current_median.min(max_rate)),
        proposed_median_rate: round2(proposed_median.min(max_rate)),
        mean_rate_difference: clamp_symmetric(
            round2(proposed_precise - current_precise),
            config.rate_difference_clamp,
        ),
        median_rate_difference: clamp_symmetric(
            round2(proposed_median - current_median),
            config.rate_difference_clamp,
        ),
    };

    let scenario = match view {
        ViewMode::Proposed => Scenario::Proposed,
        ViewMode::Current | ViewMode::Difference => Scenario::Current,
    };
    region.mean_payment_rate_in_dollars_per_acre = match scenario {
        Scenario::Current => region.rates.current_mean_rate,
        Scenario::Proposed => region.rates.proposed_mean_rate,
    };
    region.is_mean_weighted = region.is_multi_selection && region.weighted.acres(scenario) > 0.0;
}

/// Rounded rates for a sub-object; sides without acres stay at zero
fn sub_rates(weighted: &WeightedRates, config: &EngineConfig) -> RateSummary {
    let mut rates = RateSummary {
        current_mean_rate: round2(weighted.mean(Scenario::Current)),
        proposed_mean_rate: round2(weighted.mean(Scenario::Proposed)),
        current_median_rate: round2(weighted.median(Scenario::Current)),
        proposed_median_rate: round2(weighted.median(Scenario::Proposed)),
        ..Default::default()
    };

    if weighted.acres(Scenario::Current) > 0.0 && weighted.acres(Scenario::Proposed) > 0.0 {
        rates.mean_rate_difference = clamp_symmetric(
            round2(rates.proposed_mean_rate - rates.current_mean_rate),
            config.rate_difference_clamp,
        );
        rates.median_rate_difference = clamp_symmetric(
            round2(rates.proposed_median_rate - rates.current_median_rate),
            config.rate_difference_clamp,
        );
    }
    rates
}

fn finish_program(program: &mut ProgramAccumulator, view: ViewMode, config: &EngineConfig) {
    program.totals.refresh(view);
    program.rates = sub_rates(&program.weighted, config);
}

fn finish_commodity(commodity: &mut CommodityAccumulator, view: ViewMode, config: &EngineConfig) {
    commodity.totals.refresh(view);
    commodity.rates = sub_rates(&commodity.weighted, config);

    // Commodity-level acreage reported on the records wins over the row sum
    if commodity.reported_base_acres > 0.0 {
        commodity.totals.base_acres = commodity.reported_base_acres;
    }

    let has_current = commodity.weighted.acres(Scenario::Current) > 0.0;
    let has_proposed = commodity.weighted.acres(Scenario::Proposed) > 0.0;
    commodity.mean_payment_rate_in_dollars_per_acre = match view {
        ViewMode::Current if has_current => commodity.rates.current_mean_rate,
        ViewMode::Proposed if has_proposed => commodity.rates.proposed_mean_rate,
        ViewMode::Difference if has_current && has_proposed => commodity.rates.mean_rate_difference,
        _ => 0.0,
    };

    for cell in commodity.programs.values_mut() {
        finish_program(cell, view, config);
    }
    for yearly in commodity.yearly_data.values_mut() {
        yearly.refresh(view);
    }
}

//! Region accumulators and the fold over payment rows
//!
//! One `RegionAccumulator` per region id, created on the region's first
//! included row. Every level (region, commodity, program, commodity×program
//! cell, year) carries a `Totals` whose `value` is re-derived from the view
//! mode after each addition.

use crate::aggregation::rows::{PaymentRow, RegionKey};
use crate::utils::rates::weighted_mean_rate;
use crate::utils::selection::{Scenario, ViewMode};
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Current/proposed payment and acreage totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// View-selected figure; never written directly
    pub value: f64,
    pub current_value: f64,
    pub proposed_value: f64,
    pub base_acres: f64,
    pub current_base_acres: f64,
    pub proposed_base_acres: f64,
}

impl Totals {
    pub fn add_payment(&mut self, scenario: Scenario, payment: f64, view: ViewMode) {
        match scenario {
            Scenario::Current => self.current_value += payment,
            Scenario::Proposed => self.proposed_value += payment,
        }
        self.refresh(view);
    }

    /// Acres accumulate per scenario; `base_acres` is the larger side
    pub fn add_acres(&mut self, scenario: Scenario, acres: f64) {
        match scenario {
            Scenario::Current => self.current_base_acres += acres,
            Scenario::Proposed => self.proposed_base_acres += acres,
        }
        self.base_acres = self.current_base_acres.max(self.proposed_base_acres);
    }

    pub fn add(&mut self, scenario: Scenario, payment: f64, acres: f64, view: ViewMode) {
        self.add_acres(scenario, acres);
        self.add_payment(scenario, payment, view);
    }

    #[inline]
    pub fn refresh(&mut self, view: ViewMode) {
        self.value = view.select(self.current_value, self.proposed_value);
    }

    pub fn acres(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Current => self.current_base_acres,
            Scenario::Proposed => self.proposed_base_acres,
        }
    }
}

/// Σ(rate × acres) and Σ acres over rows with positive acreage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedRates {
    pub current_total_weighted_mean: f64,
    pub proposed_total_weighted_mean: f64,
    pub current_total_weighted_median: f64,
    pub proposed_total_weighted_median: f64,
    pub current_weighted_acres: f64,
    pub proposed_weighted_acres: f64,
}

impl WeightedRates {
    pub fn add(&mut self, scenario: Scenario, mean_rate: f64, median_rate: f64, acres: f64) {
        if !(acres > 0.0) {
            return;
        }
        let (mean_sum, median_sum, acre_sum) = match scenario {
            Scenario::Current => (
                &mut self.current_total_weighted_mean,
                &mut self.current_total_weighted_median,
                &mut self.current_weighted_acres,
            ),
            Scenario::Proposed => (
                &mut self.proposed_total_weighted_mean,
                &mut self.proposed_total_weighted_median,
                &mut self.proposed_weighted_acres,
            ),
        };
        *mean_sum += mean_rate * acres;
        *median_sum += median_rate * acres;
        *acre_sum += acres;
    }

    pub fn mean(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Current => weighted_mean_rate(self.current_total_weighted_mean, self.current_weighted_acres),
            Scenario::Proposed => weighted_mean_rate(self.proposed_total_weighted_mean, self.proposed_weighted_acres),
        }
    }

    pub fn median(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Current => weighted_mean_rate(self.current_total_weighted_median, self.current_weighted_acres),
            Scenario::Proposed => weighted_mean_rate(self.proposed_total_weighted_median, self.proposed_weighted_acres),
        }
    }

    pub fn acres(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Current => self.current_weighted_acres,
            Scenario::Proposed => self.proposed_weighted_acres,
        }
    }
}

/// Finished per-acre rates (two decimals)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSummary {
    pub current_mean_rate: f64,
    pub proposed_mean_rate: f64,
    pub current_median_rate: f64,
    pub proposed_median_rate: f64,
    pub mean_rate_difference: f64,
    pub median_rate_difference: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramAccumulator {
    #[serde(flatten)]
    pub totals: Totals,
    #[serde(flatten)]
    pub weighted: WeightedRates,
    #[serde(flatten)]
    pub rates: RateSummary,
}

impl ProgramAccumulator {
    fn record(&mut self, row: &PaymentRow<'_>, view: ViewMode) {
        self.totals.add(row.scenario, row.payment, row.base_acres, view);
        self.weighted.add(row.scenario, row.mean_rate, row.median_rate, row.base_acres);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityAccumulator {
    #[serde(flatten)]
    pub totals: Totals,
    #[serde(flatten)]
    pub weighted: WeightedRates,
    #[serde(flatten)]
    pub rates: RateSummary,
    /// Largest commodity-level acreage reported on the raw records
    pub reported_base_acres: f64,
    /// View-dependent rate: current, proposed, or their difference
    pub mean_payment_rate_in_dollars_per_acre: f64,
    /// Commodity × program cells
    pub programs: BTreeMap<String, ProgramAccumulator>,
    pub yearly_data: BTreeMap<String, Totals>,
}

impl CommodityAccumulator {
    fn record(&mut self, row: &PaymentRow<'_>, view: ViewMode) {
        self.totals.add(row.scenario, row.payment, row.base_acres, view);
        self.weighted.add(row.scenario, row.mean_rate, row.median_rate, row.base_acres);

        if let Some(acres) = row.commodity_base_acres {
            self.reported_base_acres = self.reported_base_acres.max(acres);
        }

        self.programs
            .entry(row.program.to_string())
            .or_default()
            .record(row, view);

        self.yearly_data
            .entry(row.year.to_string())
            .or_default()
            .add(row.scenario, row.payment, row.base_acres, view);
    }
}

/// Where a region's figures came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RegionStatus {
    /// Still accumulating
    #[default]
    Pending,
    /// Finished with real data
    Reported,
    /// Finished, failed validity checks, all figures zeroed
    Empty,
    /// Added by the relaxed pass: has payments, but none under the active filter
    FilteredOut,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionAccumulator {
    pub id: String,
    pub name: String,
    pub state: String,
    pub state_code: String,

    #[serde(flatten)]
    pub totals: Totals,
    #[serde(flatten)]
    pub weighted: WeightedRates,
    #[serde(flatten)]
    pub rates: RateSummary,

    pub percent_change: f64,
    /// Unclamped rates, used for difference arithmetic
    pub current_mean_rate_precise: f64,
    pub proposed_mean_rate_precise: f64,
    pub mean_payment_rate_in_dollars_per_acre: f64,
    pub is_multi_selection: bool,
    pub is_mean_weighted: bool,

    pub commodities: BTreeMap<String, CommodityAccumulator>,
    pub programs: BTreeMap<String, ProgramAccumulator>,
    pub yearly_data: BTreeMap<String, Totals>,

    /// Region acreage from the filtered-acres helper, one value per
    /// (year, scenario) pass, summed per scenario
    pub current_filtered_base_acres: f64,
    pub proposed_filtered_base_acres: f64,
    pub filtered_base_acres: f64,

    pub has_data: bool,
    pub has_valid_base_acres: bool,
    pub status: RegionStatus,

    /// (year, scenario) passes whose region acreage is already set
    #[serde(skip)]
    acre_passes: SmallVec<[(String, Scenario); 4]>,
}

impl RegionAccumulator {
    pub fn new(key: &RegionKey, is_multi_selection: bool) -> Self {
        Self {
            id: key.id.clone(),
            name: key.name.clone(),
            state: key.state_name.clone(),
            state_code: key.state_code.clone(),
            is_multi_selection,
            ..Default::default()
        }
    }

    /// Placeholder for a region that has payments outside the active filter
    pub fn filtered_out(key: &RegionKey, is_multi_selection: bool) -> Self {
        Self {
            has_data: true,
            status: RegionStatus::FilteredOut,
            ..Self::new(key, is_multi_selection)
        }
    }

    fn record(&mut self, row: &PaymentRow<'_>, view: ViewMode) {
        if row.payment != 0.0 {
            self.has_data = true;
        }

        let pass_seen = self
            .acre_passes
            .iter()
            .any(|(year, scenario)| year == row.year && *scenario == row.scenario);
        if !pass_seen {
            self.acre_passes.push((row.year.to_string(), row.scenario));
            self.set_pass_acres(row.scenario, row.region_base_acres);
        }

        self.totals.add_payment(row.scenario, row.payment, view);
        self.weighted.add(row.scenario, row.mean_rate, row.median_rate, row.base_acres);

        self.commodities
            .entry(row.commodity.to_string())
            .or_default()
            .record(row, view);

        self.programs
            .entry(row.program.to_string())
            .or_default()
            .record(row, view);

        self.yearly_data
            .entry(row.year.to_string())
            .or_default()
            .add(row.scenario, row.payment, row.base_acres, view);
    }

    /// Region acreage for one pass comes from the filtered-acres helper
    fn set_pass_acres(&mut self, scenario: Scenario, acres: f64) {
        if !acres.is_finite() {
            return;
        }
        match scenario {
            Scenario::Current => self.current_filtered_base_acres += acres,
            Scenario::Proposed => self.proposed_filtered_base_acres += acres,
        }
        self.filtered_base_acres = self
            .current_filtered_base_acres
            .max(self.proposed_filtered_base_acres);
        if acres > 0.0 {
            self.has_valid_base_acres = true;
        }
    }

    /// Force every figure to zero, keeping identity and breakdown keys
    pub fn zero_out(&mut self) {
        self.totals = Totals::default();
        self.weighted = WeightedRates::default();
        self.rates = RateSummary::default();
        self.percent_change = 0.0;
        self.current_mean_rate_precise = 0.0;
        self.proposed_mean_rate_precise = 0.0;
        self.mean_payment_rate_in_dollars_per_acre = 0.0;
        self.is_mean_weighted = false;
        self.current_filtered_base_acres = 0.0;
        self.proposed_filtered_base_acres = 0.0;
        self.filtered_base_acres = 0.0;
        self.has_valid_base_acres = false;

        for commodity in self.commodities.values_mut() {
            commodity.totals = Totals::default();
            commodity.weighted = WeightedRates::default();
            commodity.rates = RateSummary::default();
            commodity.reported_base_acres = 0.0;
            commodity.mean_payment_rate_in_dollars_per_acre = 0.0;
            for cell in commodity.programs.values_mut() {
                *cell = ProgramAccumulator::default();
            }
            for yearly in commodity.yearly_data.values_mut() {
                *yearly = Totals::default();
            }
        }
        for program in self.programs.values_mut() {
            *program = ProgramAccumulator::default();
        }
        for yearly in self.yearly_data.values_mut() {
            *yearly = Totals::default();
        }
    }
}

/// Incremental fold of payment rows into region accumulators
///
/// Rows may arrive in several batches (e.g. one per year chunk); the result
/// depends only on the concatenated row order.
#[derive(Debug, Clone)]
pub struct RegionFold {
    view: ViewMode,
    is_multi_selection: bool,
    regions: BTreeMap<String, RegionAccumulator>,
    rows_applied: usize,
}

impl RegionFold {
    pub fn new(view: ViewMode, is_multi_selection: bool) -> Self {
        Self {
            view,
            is_multi_selection,
            regions: BTreeMap::new(),
            rows_applied: 0,
        }
    }

    pub fn apply(&mut self, row: &PaymentRow<'_>) {
        let is_multi_selection = self.is_multi_selection;
        self.regions
            .entry(row.region.id.clone())
            .or_insert_with(|| RegionAccumulator::new(&row.region, is_multi_selection))
            .record(row, self.view);
        self.rows_applied += 1;
    }

    pub fn extend<'a, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = PaymentRow<'a>>,
    {
        for row in rows {
            self.apply(&row);
        }
    }

    pub fn rows_applied(&self) -> usize {
        self.rows_applied
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn into_regions(self) -> BTreeMap<String, RegionAccumulator> {
        self.regions
    }
}

/// Fold a complete row sequence
pub fn fold_rows<'a, I>(rows: I, view: ViewMode, is_multi_selection: bool) -> BTreeMap<String, RegionAccumulator>
where
    I: IntoIterator<Item = PaymentRow<'a>>,
{
    let mut fold = RegionFold::new(view, is_multi_selection);
    fold.extend(rows);
    fold.into_regions()
}

//! Map Data Engine
//!
//! Coordinates one map computation:
//! years → rows → fold → (fallback) → finish → thresholds.
//!
//! `MapDataEngine::process` runs the whole thing in one go;
//! `ChunkedMapBuilder` walks the same year list a few years at a time and
//! produces an identical `MapData`. Thresholds are computed exactly once, in
//! `finish`, over the final value list.

use crate::aggregation::{
    extract_rows, relaxed_regions, resolve_years, RegionAccumulator, RegionFold, RowFilter,
};
use crate::config::EngineConfig;
use crate::data::PaymentDataset;
use crate::finisher::finish_regions;
use crate::geography::RegionExtractor;
use crate::legend::simplify_for_legend;
use crate::thresholds::calculate_thresholds;
use crate::utils::lookup::StateLookup;
use crate::utils::rates::{filtered_base_acres, BaseAcresFn};
use crate::utils::selection::{
    commodity_labels, program_labels, Scenario, Selection, StateFilter, ValueMode, ViewMode,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Filter and mode state for one map computation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapRequest {
    pub selected_year: String,
    /// Explicit year list; used only when aggregation is enabled
    pub selected_years: Vec<String>,
    /// Number of earlier years to add to the selected one
    pub year_aggregation: usize,
    pub aggregation_enabled: bool,
    pub view_mode: ViewMode,
    pub value_mode: ValueMode,
    #[serde(with = "commodity_labels")]
    pub selected_commodities: Selection,
    #[serde(with = "program_labels")]
    pub selected_programs: Selection,
    pub selected_state: StateFilter,
}

impl Default for MapRequest {
    fn default() -> Self {
        Self {
            selected_year: String::new(),
            selected_years: Vec::new(),
            year_aggregation: 0,
            aggregation_enabled: false,
            view_mode: ViewMode::Current,
            value_mode: ValueMode::Total,
            selected_commodities: Selection::All,
            selected_programs: Selection::All,
            selected_state: StateFilter::All,
        }
    }
}

impl MapRequest {
    pub fn for_year(year: impl Into<String>) -> Self {
        Self {
            selected_year: year.into(),
            ..Default::default()
        }
    }

    pub fn view(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    pub fn value(mut self, value_mode: ValueMode) -> Self {
        self.value_mode = value_mode;
        self
    }

    pub fn commodities(mut self, selection: Selection) -> Self {
        self.selected_commodities = selection;
        self
    }

    pub fn programs(mut self, selection: Selection) -> Self {
        self.selected_programs = selection;
        self
    }

    pub fn state(mut self, state: impl Into<StateFilter>) -> Self {
        self.selected_state = state.into();
        self
    }

    /// Enable aggregation over `depth` earlier years
    pub fn aggregate(mut self, depth: usize) -> Self {
        self.aggregation_enabled = true;
        self.year_aggregation = depth;
        self
    }

    /// Enable aggregation over an explicit year list
    pub fn years<I, S>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregation_enabled = true;
        self.selected_years = years.into_iter().map(Into::into).collect();
        self
    }
}

/// Finished map: regions, classifier input and break points
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub regions: BTreeMap<String, RegionAccumulator>,
    pub thresholds: Vec<f64>,
    /// Display values fed to the classifier, in region-id order
    pub data: Vec<f64>,
    /// Years actually walked
    pub years: Vec<String>,
    #[serde(with = "commodity_labels")]
    pub selected_commodities: Selection,
    #[serde(with = "program_labels")]
    pub selected_programs: Selection,
    /// Regions came from the relaxed pass
    pub used_fallback: bool,
}

impl MapData {
    pub fn empty(request: &MapRequest) -> Self {
        Self {
            regions: BTreeMap::new(),
            thresholds: Vec::new(),
            data: Vec::new(),
            years: Vec::new(),
            selected_commodities: request.selected_commodities.clone(),
            selected_programs: request.selected_programs.clone(),
            used_fallback: false,
        }
    }

    /// Nothing to draw
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Label-friendly break points for the legend
    pub fn legend_points(&self, config: &EngineConfig) -> Vec<f64> {
        simplify_for_legend(&self.thresholds, config)
    }
}

pub struct MapDataEngine<G: RegionExtractor> {
    geography: G,
    states: StateLookup,
    config: EngineConfig,
    base_acres: BaseAcresFn,
}

impl<G: RegionExtractor> MapDataEngine<G> {
    pub fn new(geography: G, states: StateLookup, config: EngineConfig) -> Self {
        Self {
            geography,
            states,
            config,
            base_acres: filtered_base_acres,
        }
    }

    /// Replace the per-pass region base-acre helper
    pub fn with_base_acres_helper(mut self, helper: BaseAcresFn) -> Self {
        self.base_acres = helper;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn states(&self) -> &StateLookup {
        &self.states
    }

    /// One complete, unchunked computation
    pub fn process(
        &self,
        request: &MapRequest,
        current: &PaymentDataset<G::Region>,
        proposed: Option<&PaymentDataset<G::Region>>,
    ) -> MapData {
        let Some(years) = self.plan_years(request, current, proposed) else {
            tracing::debug!("Year {} absent from both datasets", request.selected_year);
            return MapData::empty(request);
        };

        let mut fold = RegionFold::new(request.view_mode, self.is_multi_selection(request, &years));
        for year in &years {
            self.fold_year(&mut fold, year, request, current, proposed);
        }

        self.complete(fold, years, request, current)
    }

    /// Start a chunked computation over the same year list `process` would walk
    pub fn chunked<'e>(
        &'e self,
        request: &'e MapRequest,
        current: &'e PaymentDataset<G::Region>,
        proposed: Option<&'e PaymentDataset<G::Region>>,
    ) -> ChunkedMapBuilder<'e, G> {
        let planned = self.plan_years(request, current, proposed);
        let early_exit = planned.is_none();
        let years = planned.unwrap_or_default();
        let fold = RegionFold::new(request.view_mode, self.is_multi_selection(request, &years));

        ChunkedMapBuilder {
            engine: self,
            request,
            current,
            proposed,
            years,
            next: 0,
            fold,
            early_exit,
            in_flight: false,
        }
    }

    /// Year list to walk, or `None` when neither dataset has the selected year
    fn plan_years(
        &self,
        request: &MapRequest,
        current: &PaymentDataset<G::Region>,
        proposed: Option<&PaymentDataset<G::Region>>,
    ) -> Option<Vec<String>> {
        let selected = request.selected_year.as_str();
        let in_proposed = proposed.is_some_and(|p| p.contains_year(selected));
        if !current.contains_year(selected) && !in_proposed {
            return None;
        }

        // The year history comes from the current dataset when it has any
        let available = match proposed {
            Some(p) if current.is_empty() => p,
            _ => current,
        };

        let years = resolve_years(
            available.years(),
            selected,
            &request.selected_years,
            request.aggregation_enabled,
            request.year_aggregation,
        );
        tracing::debug!("Aggregating years {:?}", years);
        Some(years)
    }

    fn is_multi_selection(&self, request: &MapRequest, years: &[String]) -> bool {
        request.selected_commodities.is_multiple()
            || request.selected_programs.is_multiple()
            || years.len() > 1
    }

    fn row_filter<'f>(&'f self, request: &'f MapRequest) -> RowFilter<'f> {
        RowFilter {
            commodities: &request.selected_commodities,
            programs: &request.selected_programs,
            state: &request.selected_state,
            states: &self.states,
        }
    }

    /// Walk every dataset the view needs for one year, folding its rows
    fn fold_year(
        &self,
        fold: &mut RegionFold,
        year: &str,
        request: &MapRequest,
        current: &PaymentDataset<G::Region>,
        proposed: Option<&PaymentDataset<G::Region>>,
    ) {
        let filter = self.row_filter(request);

        for &scenario in request.view_mode.scenarios() {
            let dataset = match scenario {
                Scenario::Current => Some(current),
                Scenario::Proposed => proposed,
            };
            let Some(dataset) = dataset else {
                continue;
            };

            let rows = extract_rows(
                &self.geography,
                dataset.year(year),
                year,
                scenario,
                &filter,
                self.base_acres,
            );
            tracing::debug!("{} {:?}: {} included rows", year, scenario, rows.len());
            fold.extend(rows);
        }
    }

    /// Fallback, finish and classify
    fn complete(
        &self,
        fold: RegionFold,
        years: Vec<String>,
        request: &MapRequest,
        current: &PaymentDataset<G::Region>,
    ) -> MapData {
        let is_multi_selection = self.is_multi_selection(request, &years);
        let mut regions = fold.into_regions();
        let mut used_fallback = false;

        if regions.is_empty() && request.selected_state.is_active() {
            regions = relaxed_regions(
                &self.geography,
                current,
                &request.selected_state,
                &self.states,
                is_multi_selection,
            );
            used_fallback = !regions.is_empty();
            if used_fallback {
                tracing::warn!(
                    "No regions matched the selection in {:?}; showing {} regions with payments elsewhere",
                    request.selected_state.name().unwrap_or_default(),
                    regions.len()
                );
            }
        }

        if regions.is_empty() {
            tracing::debug!("No regions for this selection");
            return MapData {
                years,
                ..MapData::empty(request)
            };
        }

        let data = finish_regions(&mut regions, request.view_mode, request.value_mode, &self.config);
        let thresholds = calculate_thresholds(&data, &self.config);

        tracing::debug!(
            "Finished {} regions, {} values, {} thresholds",
            regions.len(),
            data.len(),
            thresholds.len()
        );

        MapData {
            regions,
            thresholds,
            data,
            years,
            selected_commodities: request.selected_commodities.clone(),
            selected_programs: request.selected_programs.clone(),
            used_fallback,
        }
    }
}

/// Year-chunked computation
///
/// Chunks are folded strictly in order into one accumulator map; chunk
/// boundaries never change filters or weighting. `finish` folds whatever is
/// left and classifies once.
pub struct ChunkedMapBuilder<'e, G: RegionExtractor> {
    engine: &'e MapDataEngine<G>,
    request: &'e MapRequest,
    current: &'e PaymentDataset<G::Region>,
    proposed: Option<&'e PaymentDataset<G::Region>>,
    years: Vec<String>,
    next: usize,
    fold: RegionFold,
    early_exit: bool,
    in_flight: bool,
}

impl<'e, G: RegionExtractor> ChunkedMapBuilder<'e, G> {
    /// Fold the next `chunk_size` years (at least one); returns whether
    /// years remain
    pub fn fold_next(&mut self, chunk_size: usize) -> bool {
        let end = (self.next + chunk_size.max(1)).min(self.years.len());
        if self.next < end {
            self.in_flight = true;
            for year in &self.years[self.next..end] {
                self.engine
                    .fold_year(&mut self.fold, year, self.request, self.current, self.proposed);
            }
            tracing::debug!("Folded chunk {:?}", &self.years[self.next..end]);
            self.next = end;
        }

        self.remaining() > 0
    }

    pub fn fold_remaining(&mut self) {
        while self.fold_next(self.remaining()) {}
    }

    /// A chunk has been folded and `finish` has not run yet
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn remaining(&self) -> usize {
        self.years.len() - self.next
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn finish(mut self) -> MapData {
        if self.early_exit {
            tracing::debug!("Year {} absent from both datasets", self.request.selected_year);
            return MapData::empty(self.request);
        }

        self.fold_remaining();
        self.in_flight = false;
        let years = std::mem::take(&mut self.years);
        self.engine.complete(self.fold, years, self.request, self.current)
    }
}

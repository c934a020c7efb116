//! Rate and acreage arithmetic
//!
//! Every division here is guarded by a `> 0` check; degenerate inputs
//! produce zero, never NaN or infinity.

use crate::data::ScenarioRecord;
use crate::utils::selection::{Scenario, Selection};
use rustc_hash::FxHashSet;

/// Round to two decimal places
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Σ(rate × acres) / Σ acres, zero when no acres
#[inline]
pub fn weighted_mean_rate(weighted_sum: f64, acres: f64) -> f64 {
    if acres > 0.0 && weighted_sum.is_finite() {
        weighted_sum / acres
    } else {
        0.0
    }
}

/// Percent change from current to proposed
///
/// A zero baseline reports exactly 100 when proposed is positive and 0
/// otherwise (including negative proposed values).
pub fn percent_change(current: f64, proposed: f64) -> f64 {
    if current != 0.0 {
        return (proposed - current) / current * 100.0;
    }
    if proposed > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Clamp into `[-bound, bound]`
#[inline]
pub fn clamp_symmetric(value: f64, bound: f64) -> f64 {
    value.clamp(-bound, bound)
}

/// Helper signature for per-pass region base acres
///
/// Receives the region's scenarios, the active filters and the pass's
/// scenario; returns the region's filtered base acres.
pub type BaseAcresFn = fn(&[ScenarioRecord], &Selection, &Selection, Scenario) -> f64;

/// Base acres of a region restricted to the selected commodity×program set
///
/// Uses the scenario named after the pass ("Current"/"Proposed"), or the
/// first scenario when no such name exists. Each commodity×program pair is
/// counted once.
pub fn filtered_base_acres(
    scenarios: &[ScenarioRecord],
    commodities: &Selection,
    programs: &Selection,
    scenario: Scenario,
) -> f64 {
    let target = scenarios
        .iter()
        .find(|s| s.scenario_name.as_deref() == Some(scenario.record_name()))
        .or_else(|| scenarios.first());

    let Some(target) = target else {
        return 0.0;
    };

    let mut seen: FxHashSet<(&str, &str)> = FxHashSet::default();
    let mut total = 0.0;

    for commodity in &target.commodities {
        if !commodities.includes(&commodity.commodity_name) {
            continue;
        }
        for program in &commodity.programs {
            if !programs.includes(&program.program_name) {
                continue;
            }
            if seen.insert((commodity.commodity_name.as_str(), program.program_name.as_str())) {
                total += program.acres();
            }
        }
    }

    round2(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CommodityRecord, ProgramRecord};
    use approx::assert_relative_eq;

    fn program(name: &str, payment: f64, acres: f64) -> ProgramRecord {
        ProgramRecord {
            program_name: name.to_string(),
            total_payment_in_dollars: payment,
            base_acres: acres,
            ..Default::default()
        }
    }

    fn scenario(name: Option<&str>, commodities: Vec<CommodityRecord>) -> ScenarioRecord {
        ScenarioRecord {
            scenario_name: name.map(str::to_string),
            commodities,
        }
    }

    #[test]
    fn test_percent_change_conventions() {
        assert_relative_eq!(percent_change(100.0, 150.0), 50.0);
        assert_relative_eq!(percent_change(-100.0, -50.0), -50.0);
        assert_eq!(percent_change(0.0, 25.0), 100.0);
        assert_eq!(percent_change(0.0, -25.0), 0.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_weighted_mean_guards() {
        assert_relative_eq!(weighted_mean_rate(1000.0, 100.0), 10.0);
        assert_eq!(weighted_mean_rate(1000.0, 0.0), 0.0);
        assert_eq!(weighted_mean_rate(f64::NAN, 10.0), 0.0);
        assert_eq!(round2(10.456), 10.46);
        assert_eq!(clamp_symmetric(-595.0, 500.0), -500.0);
    }

    #[test]
    fn test_filtered_base_acres_prefers_named_scenario() {
        let scenarios = vec![
            scenario(
                Some("Proposed"),
                vec![CommodityRecord {
                    commodity_name: "Corn".into(),
                    base_acres: None,
                    programs: vec![program("PLC", 10.0, 999.0)],
                }],
            ),
            scenario(
                Some("Current"),
                vec![
                    CommodityRecord {
                        commodity_name: "Corn".into(),
                        base_acres: None,
                        programs: vec![program("PLC", 10.0, 40.0), program("ARC-CO", 5.0, 60.25)],
                    },
                    CommodityRecord {
                        commodity_name: "Wheat".into(),
                        base_acres: None,
                        programs: vec![program("PLC", 10.0, 7.0)],
                    },
                ],
            ),
        ];

        let all = Selection::All;
        let corn = Selection::commodities(["Corn"]);
        let plc = Selection::programs(["PLC"]);

        assert_relative_eq!(filtered_base_acres(&scenarios, &all, &all, Scenario::Current), 107.25);
        assert_relative_eq!(filtered_base_acres(&scenarios, &corn, &plc, Scenario::Current), 40.0);
        assert_relative_eq!(filtered_base_acres(&scenarios, &corn, &plc, Scenario::Proposed), 999.0);
    }

    #[test]
    fn test_filtered_base_acres_falls_back_to_first_scenario() {
        let scenarios = vec![scenario(
            None,
            vec![CommodityRecord {
                commodity_name: "Corn".into(),
                base_acres: None,
                programs: vec![program("PLC", 1.0, 12.0), program("PLC", 1.0, 12.0)],
            }],
        )];

        // Duplicate commodity×program pairs count once
        assert_relative_eq!(
            filtered_base_acres(&scenarios, &Selection::All, &Selection::All, Scenario::Proposed),
            12.0
        );
        assert_eq!(filtered_base_acres(&[], &Selection::All, &Selection::All, Scenario::Current), 0.0);
    }
}

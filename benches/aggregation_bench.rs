use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use payment_map_rust::data::{CommodityRecord, ProgramRecord, ScenarioRecord, StateRecord};
use payment_map_rust::{
    calculate_thresholds, CountyExtractor, CountyRecord, EngineConfig, MapDataEngine, MapRequest,
    PaymentDataset, StateLookup, ValueMode, ViewMode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const COMMODITIES: [&str; 6] = ["Corn", "Soybeans", "Wheat", "Cotton", "Rice", "Peanuts"];
const PROGRAMS: [&str; 3] = ["ARC-CO", "PLC", "ARC-IC"];

fn synthetic_dataset(rng: &mut StdRng, states: usize, counties: usize, years: &[&str]) -> PaymentDataset<CountyRecord> {
    let mut dataset = PaymentDataset::default();

    for year in years {
        let state_records = (0..states)
            .map(|s| {
                let state = format!("{:02}", s + 1);
                let regions = (0..counties)
                    .map(|c| {
                        let commodities = COMMODITIES
                            .iter()
                            .map(|commodity| CommodityRecord {
                                commodity_name: commodity.to_string(),
                                base_acres: None,
                                programs: PROGRAMS
                                    .iter()
                                    .map(|program| ProgramRecord {
                                        program_name: program.to_string(),
                                        total_payment_in_dollars: rng.gen_range(0.0..80_000.0),
                                        base_acres: rng.gen_range(0.0..3_000.0),
                                        ..Default::default()
                                    })
                                    .collect(),
                            })
                            .collect();

                        CountyRecord {
                            county_fips: format!("{}{:03}", state, c * 2 + 1),
                            county_name: None,
                            scenarios: vec![ScenarioRecord {
                                scenario_name: Some("Current".into()),
                                commodities,
                            }],
                        }
                    })
                    .collect();
                StateRecord { state, regions }
            })
            .collect();

        dataset.insert_year(*year, state_records);
    }

    dataset
}

fn benchmark_process(c: &mut Criterion) {
    let years = ["2020", "2021", "2022", "2023", "2024"];
    let mut rng = StdRng::seed_from_u64(2024);
    let current = synthetic_dataset(&mut rng, 20, 60, &years);
    let proposed = synthetic_dataset(&mut rng, 20, 60, &years);
    let engine = MapDataEngine::new(CountyExtractor::new(), StateLookup::default(), EngineConfig::default());

    let mut group = c.benchmark_group("process");
    for depth in [0usize, 2, 4] {
        let request = MapRequest::for_year("2024")
            .view(ViewMode::Difference)
            .value(ValueMode::MeanRate)
            .aggregate(depth);

        group.bench_with_input(BenchmarkId::new("difference_mean_rate", depth), &request, |b, request| {
            b.iter(|| engine.process(black_box(request), black_box(&current), Some(&proposed)))
        });
    }
    group.finish();
}

fn benchmark_thresholds(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let values: Vec<f64> = (0..3_000).map(|_| rng.gen_range(-500.0..500.0)).collect();
    let config = EngineConfig::default();

    c.bench_function("calculate_thresholds_3000", |b| {
        b.iter(|| calculate_thresholds(black_box(&values), &config))
    });
}

criterion_group!(benches, benchmark_process, benchmark_thresholds);
criterion_main!(benches);

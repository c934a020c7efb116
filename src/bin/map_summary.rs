// Map summary driver
//
// Purpose: Run one map computation from JSON files and print a summary
// Usage: cargo run --bin map_summary -- <request.json> <current.json> [proposed.json]
//
// Optional environment:
//   STATE_CODES    JSON object of state code -> state name
//   MAP_CONFIG     engine config JSON (absent keys keep defaults)
//   MAP_GEOGRAPHY  "district" for congressional districts (default: county)

use anyhow::{Context, Result};
use payment_map_rust::legend::{bucket_distribution, legend_labels};
use payment_map_rust::{
    CountyExtractor, DistrictExtractor, EngineConfig, MapData, MapDataEngine, MapRequest,
    PaymentDataset, RegionExtractor, StateLookup,
};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payment_map_rust=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        anyhow::bail!("Usage: map_summary <request.json> <current.json> [proposed.json]");
    }
    let request_path = PathBuf::from(&args[0]);
    let current_path = PathBuf::from(&args[1]);
    let proposed_path = args.get(2).map(PathBuf::from);

    let request: MapRequest = {
        let contents = fs::read_to_string(&request_path)
            .with_context(|| format!("Failed to read request: {:?}", request_path))?;
        serde_json::from_str(&contents).with_context(|| "Failed to parse request JSON")?
    };

    let states = match std::env::var("STATE_CODES") {
        Ok(path) => StateLookup::load(Path::new(&path))?,
        Err(_) => StateLookup::default(),
    };
    let config = match std::env::var("MAP_CONFIG") {
        Ok(path) => EngineConfig::load(Path::new(&path))?,
        Err(_) => EngineConfig::default(),
    };
    let geography = std::env::var("MAP_GEOGRAPHY").unwrap_or_else(|_| "county".to_string());

    tracing::info!("Configuration:");
    tracing::info!("  geography: {}", geography);
    tracing::info!("  state codes: {}", states.len());
    tracing::info!("  year: {} ({:?})", request.selected_year, request.view_mode);

    let result = if geography == "district" {
        run(DistrictExtractor, states, config.clone(), &request, &current_path, proposed_path.as_deref())?
    } else {
        run(CountyExtractor::new(), states, config.clone(), &request, &current_path, proposed_path.as_deref())?
    };

    print_summary(&result, &config);
    Ok(())
}

fn run<G>(
    geography: G,
    states: StateLookup,
    config: EngineConfig,
    request: &MapRequest,
    current_path: &Path,
    proposed_path: Option<&Path>,
) -> Result<MapData>
where
    G: RegionExtractor,
    G::Region: DeserializeOwned,
{
    let current = PaymentDataset::<G::Region>::load(current_path)?;
    let proposed = proposed_path.map(PaymentDataset::<G::Region>::load).transpose()?;

    let engine = MapDataEngine::new(geography, states, config);
    Ok(engine.process(request, &current, proposed.as_ref()))
}

fn print_summary(result: &MapData, config: &EngineConfig) {
    println!("\n=== MAP SUMMARY ===\n");

    if result.is_empty() {
        println!("No data for this selection.");
        return;
    }

    println!("Years: {}", result.years.join(", "));
    println!("Regions: {}", result.regions.len());
    println!("Classified values: {}", result.data.len());
    if result.used_fallback {
        println!("(no region matched the commodity/program filter; showing regions with payments elsewhere)");
    }

    println!("\nThresholds:");
    let shares = bucket_distribution(&result.data, &result.thresholds);
    for ((label, threshold), share) in legend_labels(&result.thresholds)
        .iter()
        .zip(&result.thresholds)
        .zip(&shares)
    {
        println!("  <= {:>10}  ({:.4})  {:>5.1}%", label, threshold, share * 100.0);
    }

    let legend = result.legend_points(config);
    println!("\nLegend: {}", legend_labels(&legend).join(" | "));

    let mut top: Vec<_> = result.regions.values().filter(|r| r.totals.value != 0.0).collect();
    top.sort_by(|a, b| b.totals.value.abs().total_cmp(&a.totals.value.abs()));
    println!("\nTop regions:");
    for region in top.iter().take(10) {
        println!(
            "  {:<8} {:<32} {:>14.2}  {:>8.2}/acre",
            region.id,
            format!("{}, {}", region.name, region.state),
            region.totals.value,
            region.mean_payment_rate_in_dollars_per_acre
        );
    }
}

//! plan — command-line front end for the `tn-*` route planner.
//!
//! Loads a CSV snapshot (nodes, edges, optional flows) and a JSON planner
//! configuration, plans one route and prints it as JSON.
//!
//! ```text
//! plan --data demos/plan/data --config demos/plan/data/config.json \
//!      --start 39.9001,116.4002 --end 39.9098,116.4139 --route-type avoidingtraffic
//! ```
//!
//! Set `RUST_LOG=info` (or `debug`) to see fallback and exclusion decisions.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use tn_core::{GeoPoint, NodeId, PlannerConfig, RouteType, TimePoint};
use tn_routing::{PlanRequest, Planner, Route};
use tn_store::load_store_dir;
use tn_traffic::HttpVolumeService;

#[derive(Parser)]
#[command(name = "plan")]
#[command(about = "Plan a traffic-aware route over a CSV road graph")]
struct Cli {
    /// Directory holding nodes.csv, edges.csv and optionally flows.csv
    #[arg(long, default_value = "demos/plan/data")]
    data: PathBuf,

    /// Planner configuration (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start coordinate as "lat,lng"
    #[arg(long, required_unless_present = "from_node")]
    start: Option<String>,

    /// End coordinate as "lat,lng"
    #[arg(long, required_unless_present = "to_node")]
    end: Option<String>,

    /// Plan between stored node ids instead of coordinates
    #[arg(long, requires = "to_node")]
    from_node: Option<u32>,

    #[arg(long, requires = "from_node")]
    to_node: Option<u32>,

    /// shortest | fastest | avoidingtraffic (unknown values plan as fastest)
    #[arg(long, default_value = "fastest")]
    route_type: String,

    /// Day used for flow lookups (overrides the configuration)
    #[arg(long)]
    day: Option<u32>,

    /// Hourly slot 0..24 used for flow lookups (overrides the configuration)
    #[arg(long)]
    slot: Option<u8>,

    /// Never call the prediction service
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => PlannerConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if cli.offline {
        config.predictor.enabled = false;
    }
    let time_point = match (cli.day, cli.slot) {
        (None, None) => None,
        (day, slot) => Some(TimePoint::new(
            day.unwrap_or(config.time_point.day),
            slot.unwrap_or(config.time_point.slot),
        )?),
    };

    let store = load_store_dir(&cli.data)
        .with_context(|| format!("loading store from {}", cli.data.display()))?;
    let service = HttpVolumeService::from_config(&config.predictor)?;
    let planner = Planner::new(store, service, config)?;

    let route_type = RouteType::parse_lenient(&cli.route_type);
    let cancel = CancellationToken::new();
    let t0 = Instant::now();

    let route = match (cli.from_node, cli.to_node) {
        (Some(from), Some(to)) => {
            planner
                .plan_between_nodes(NodeId(from), NodeId(to), route_type, time_point, &cancel)
                .await?
        }
        _ => {
            let start = parse_pair(cli.start.as_deref().unwrap_or_default())?;
            let end = parse_pair(cli.end.as_deref().unwrap_or_default())?;
            let mut request = PlanRequest::new(
                GeoPoint::parse(start.0, start.1)?,
                GeoPoint::parse(end.0, end.1)?,
                route_type,
            );
            request.time_point = time_point;
            planner.plan(&request, &cancel).await?
        }
    };

    info!("planned in {:.1} ms", t0.elapsed().as_secs_f64() * 1_000.0);
    print_summary(&route);
    println!("{}", serde_json::to_string_pretty(&route)?);
    Ok(())
}

/// Split `"lat,lng"` into its two textual halves.
fn parse_pair(s: &str) -> Result<(&str, &str)> {
    s.split_once(',')
        .with_context(|| format!("expected \"lat,lng\", got {s:?}"))
}

fn print_summary(route: &Route) {
    let d = &route.diagnostics;
    eprintln!(
        "{} route: {} nodes, {:.3} km ({:.3} km on graph), {:.1} min",
        route.route_type_name(),
        route.node_path.len(),
        route.total_distance_km,
        route.graph_distance_km,
        route.total_time_min,
    );
    if let Some(level) = route.peak_congestion {
        eprintln!("  peak congestion : {level}");
    }
    eprintln!(
        "  flow estimates  : {} predicted, {} historical, {} default (service {})",
        d.predicted,
        d.historical,
        d.defaulted,
        if d.service_available { "up" } else { "down" },
    );
    if !d.substituted_edges.is_empty() || !d.rejected_edges.is_empty() || !d.rejected_nodes.is_empty() {
        eprintln!(
            "  data issues     : {} substituted, {} rejected edges, {} rejected nodes",
            d.substituted_edges.len(),
            d.rejected_edges.len(),
            d.rejected_nodes.len(),
        );
    }
}

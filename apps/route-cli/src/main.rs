//! `route-cli` — load road graphs and the parcel table once, then answer
//! route requests.
//!
//! ```text
//! route-cli --drive-graph drive.json --parcels parcels.csv request body.json
//! echo '{"parcels":["P1","P2"]}' | route-cli --parcels parcels.csv request
//! route-cli --parcels parcels.csv batch requests.json
//! route-cli --parcels parcels.csv health
//! ```
//!
//! Every flag also reads a `PR_*` environment variable.  Loading is all or
//! nothing: if any graph or the parcel table fails to load the process exits
//! before answering anything.

mod logging;

use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};
use serde_json::{json, Value};

use pr_core::{GeoPoint, TravelMode};
use pr_network::SnapConfig;
use pr_service::{
    handle, handle_batch, InMemoryParcelProvider, Reply, Request, ServiceConfig, ServiceContext,
    ServiceContextBuilder, DEFAULT_DEPOT, DEFAULT_MAX_STOPS,
};

#[derive(Parser)]
#[command(name = "route-cli", about = "Parcel route sequencing and clustering", version)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, env = "PR_LOG_LEVEL", default_value = "info", global = true)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DataArgs {
    /// JSON road graph for `drive` mode.
    #[arg(long, env = "PR_DRIVE_GRAPH", value_name = "path")]
    drive_graph: Option<PathBuf>,

    /// JSON road graph for `walk` mode.
    #[arg(long, env = "PR_WALK_GRAPH", value_name = "path")]
    walk_graph: Option<PathBuf>,

    /// Parcel table (`parcel_id,lat,lon,geometry`).
    #[arg(long, env = "PR_PARCELS_CSV", value_name = "path")]
    parcels: PathBuf,

    #[arg(long, env = "PR_DEPOT_LAT", default_value_t = DEFAULT_DEPOT.lat, allow_negative_numbers = true)]
    depot_lat: f64,

    #[arg(long, env = "PR_DEPOT_LON", default_value_t = DEFAULT_DEPOT.lon, allow_negative_numbers = true)]
    depot_lon: f64,

    /// Most parcels accepted by one `optimize_route` request.
    #[arg(long, env = "PR_MAX_STOPS", default_value_t = DEFAULT_MAX_STOPS)]
    max_stops: usize,

    /// How far outside the graph's bounding box a parcel may lie, in degrees.
    #[arg(long, default_value_t = SnapConfig::default().domain_margin)]
    snap_margin: f64,

    /// Skip the 2-opt improvement pass.
    #[arg(long)]
    no_two_opt: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Answer one `POST /` body read from a file, or stdin for `-`.
    Request {
        #[arg(default_value = "-")]
        body: String,
    },
    /// Answer a JSON array of request bodies concurrently.
    Batch { input: String },
    /// Print the health report.
    Health,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.log_level).context("failed to initialise logging")?;

    let started = Instant::now();
    let ctx = build_context(&cli.data)?;
    info!("ready in {:.2?}", started.elapsed());

    let failed = match cli.command {
        Command::Request { body } => {
            let reply = handle(&ctx, "POST", "/", &read_input(&body)?);
            println!("{}", reply.body);
            reply.status >= 400
        }
        Command::Batch { input } => run_batch(&ctx, &input)?,
        Command::Health => {
            println!("{}", handle(&ctx, "GET", "/health", b"").body);
            false
        }
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn build_context(args: &DataArgs) -> Result<ServiceContext> {
    let mut sequencer = ServiceConfig::default().sequencer;
    sequencer.two_opt = !args.no_two_opt;
    let config = ServiceConfig {
        depot: GeoPoint::checked(args.depot_lat, args.depot_lon).context("invalid depot")?,
        max_stops: args.max_stops,
        snap: SnapConfig { domain_margin: args.snap_margin },
        sequencer,
    };

    let parcels = InMemoryParcelProvider::from_csv_path(&args.parcels)
        .with_context(|| format!("failed to load parcels from {}", args.parcels.display()))?;

    let mut builder = ServiceContextBuilder::new().config(config).parcels(parcels);
    if let Some(path) = &args.drive_graph {
        builder = builder.graph_path(TravelMode::Drive, path);
    }
    if let Some(path) = &args.walk_graph {
        builder = builder.graph_path(TravelMode::Walk, path);
    }
    if args.drive_graph.is_none() && args.walk_graph.is_none() {
        info!("no road graphs configured; only clustering requests can be answered");
    }

    Ok(builder.build()?)
}

/// Run every request in the array; returns `true` if any failed.
fn run_batch(ctx: &ServiceContext, input: &str) -> Result<bool> {
    let bodies: Vec<Value> =
        serde_json::from_slice(&read_input(input)?).context("batch input must be a JSON array")?;
    let requests: Vec<Request> = bodies.iter().map(|b| Request::post(b.to_string())).collect();

    let started = Instant::now();
    let replies = handle_batch(ctx, &requests);
    info!("answered {} requests in {:.2?}", replies.len(), started.elapsed());

    let failed = replies.iter().any(|r| r.status >= 400);
    let out: Vec<Value> = replies.iter().map(reply_json).collect();
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(failed)
}

fn reply_json(reply: &Reply) -> Value {
    json!({
        "status": reply.status,
        "body": reply.json_body().unwrap_or(Value::Null),
    })
}

fn read_input(source: &str) -> Result<Vec<u8>> {
    if source == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read(source).with_context(|| format!("failed to read {source}"))
    }
}

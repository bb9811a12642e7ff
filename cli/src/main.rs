use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use route_sanitizer_core::diagnostics::TracingDiagnosticSink;
use route_sanitizer_core::trip::{FieldNames, TripColumns, TripSplitter};
use route_sanitizer_core::{shape, trip};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "route-sanitizer-cli", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a shape file and print counts of each shape kind.
    ShapeInspect {
        /// Path to the shape CSV.
        path: PathBuf,
    },
    /// Parse a trip file's header and print its resolved field columns.
    TripInspect {
        /// Path to the trip CSV.
        path: PathBuf,
        #[arg(long, default_value = "Latitude")]
        lat: String,
        #[arg(long, default_value = "Longitude")]
        lon: String,
        #[arg(long, default_value = "Heading")]
        heading: String,
        #[arg(long, default_value = "Speed")]
        speed: String,
        #[arg(long, default_value = "Gentime")]
        gentime: String,
    },
    /// Scan a multi-trip file and print each trip's UID and byte extent.
    TripSplit {
        /// Path to the trip CSV.
        path: PathBuf,
        #[arg(long, default_value = "RxDevice,FileId")]
        uid_fields: String,
    },
}

fn shape_inspect(path: &PathBuf) -> anyhow::Result<()> {
    let sink = TracingDiagnosticSink;
    let registry = shape::load(path, &sink)
        .with_context(|| format!("failed to load shape file {}", path.display()))?;
    println!("vertices:            {}", registry.vertices().len());
    println!("edges:                {}", registry.edges().len());
    println!("implicit edges:       {}", registry.implicit_edges().len());
    println!("circles:              {}", registry.circles().len());
    println!("grids:                {}", registry.grids().len());
    println!("critical intervals:   {}", registry.critical_intervals().len());
    println!("privacy intervals:    {}", registry.privacy_intervals().len());
    Ok(())
}

fn trip_inspect(
    path: &PathBuf,
    lat: String,
    lon: String,
    heading: String,
    speed: String,
    gentime: String,
) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trip file {}", path.display()))?;
    let mut lines = contents.lines();
    let header = lines.next().context("trip file has no header")?;
    let fields = FieldNames {
        lat,
        lon,
        heading,
        speed,
        gentime,
    };
    let columns = TripColumns::resolve(header, &fields)?;
    let body = lines.collect::<Vec<_>>().join("\n");
    let trajectory = trip::read_all(body.as_bytes(), &columns)?;
    println!("header columns: {:?}", columns.header());
    println!("records:        {}", trajectory.len());
    Ok(())
}

fn trip_split(path: &PathBuf, uid_fields: &str) -> anyhow::Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open trip file {}", path.display()))?;
    let size = file.metadata()?.len();
    let mut splitter = TripSplitter::new(file, size, uid_fields, ',')?;
    info!(header = splitter.header(), "resolved trip file header");
    while let Some(extent) = splitter.next_trajectory()? {
        println!("{}\t{}\t{}", extent.uid, extent.start, extent.end);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ShapeInspect { path } => shape_inspect(&path),
        Commands::TripInspect {
            path,
            lat,
            lon,
            heading,
            speed,
            gentime,
        } => trip_inspect(&path, lat, lon, heading, speed, gentime),
        Commands::TripSplit { path, uid_fields } => trip_split(&path, &uid_fields),
    }
}

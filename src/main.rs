//! ROSphere Monitor
//!
//! Entry point: serves the dashboard control surface, or replays a dataset
//! headlessly and prints the trend summary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use rosphere::api::{self, AppState};
use rosphere::config;
use rosphere::dataset::SourceDataset;
use rosphere::replay::ReplaySession;
use rosphere::runtime;
use rosphere::stats::{self, SAMPLE_INTERVAL_SECONDS};
use rosphere::storage::UploadStore;

#[derive(Parser)]
#[command(name = "rosphere", about = "ROSphere Monitor - hemodynamic replay and risk service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP control surface and the tick driver.
    Serve,
    /// Replay a dataset end to end and print the trend summary as JSON.
    Replay {
        /// CSV dataset; omitted means a synthetic patient.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = config::load().context("failed to load configuration")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => serve(settings).await,
        Commands::Replay { file } => replay(file),
    }
}

async fn serve(settings: config::Settings) -> Result<()> {
    let session = Arc::new(Mutex::new(ReplaySession::new()));
    let _ticker = runtime::spawn_ticker(
        session.clone(),
        Duration::from_millis(settings.replay.tick_interval_ms),
    );

    let state = web::Data::new(AppState {
        session,
        uploads: UploadStore::new(
            &settings.data.upload_dir,
            Duration::from_secs(settings.data.retention_seconds),
        ),
        patient_dir: PathBuf::from(&settings.data.patient_dir),
    });

    let bind = format!("{}:{}", settings.server.host, settings.server.port);
    info!(%bind, "starting ROSphere Monitor");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .configure(api::configure)
    })
    .bind(&bind)
    .with_context(|| format!("failed to bind {bind}"))?
    .run()
    .await
    .context("server error")
}

/// Headless replay: run the whole dataset through the session as fast as the
/// clock maths allow, then summarize the risk history.
fn replay(file: Option<PathBuf>) -> Result<()> {
    let dataset = match file {
        Some(path) => SourceDataset::from_path(&path)
            .with_context(|| format!("failed to ingest {}", path.display()))?,
        None => SourceDataset::synthetic(&mut rand::thread_rng()),
    };
    let end = dataset.max_time().unwrap_or(0.0);
    info!(rows = dataset.len(), end, "replaying dataset");

    let mut session = ReplaySession::new();
    session.toggle_mode();
    session.load_dataset(dataset);
    session.start();
    while session.simulation_time() < end {
        session.tick();
    }

    let summary = stats::summarize(&session.risk_history(), SAMPLE_INTERVAL_SECONDS);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

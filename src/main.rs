//! Trend Tracker — Binary Entrypoint
//! Runs the demo topology: rotating word source → sliding-window driver →
//! top-N ranker → report log.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trend_tracker::config::TrackerConfig;
use trend_tracker::pipeline::spawn_pipeline;
use trend_tracker::source::RotatingWordSource;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op where absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = TrackerConfig::load_default()?;
    tracing::info!(
        window_length_secs = cfg.window_length_secs,
        emit_frequency_secs = cfg.emit_frequency_secs,
        num_slots = cfg.num_slots(),
        "starting trend tracker"
    );

    let handles = spawn_pipeline(&cfg, Box::new(RotatingWordSource::demo()))?;
    handles.join().await;
    Ok(())
}

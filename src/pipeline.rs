//! # Pipeline
//! Wires source → window driver → ranker → report logging.
//!
//! Every stage owns its state and mutates it only from its own task; the
//! mpsc channels are what serialize access. Shutdown propagates by channel
//! close: source ends → driver drains and flushes → ranker sends its final
//! snapshot → reporter exits.

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::TrackerConfig;
use crate::driver::WindowDriver;
use crate::ranker::{RankedEntry, Ranker};
use crate::source::EventSource;

const CHANNEL_CAPACITY: usize = 1024;

/// Join handles for the four pipeline stages.
pub struct PipelineHandles {
    pub source: JoinHandle<()>,
    pub driver: JoinHandle<()>,
    pub ranker: JoinHandle<()>,
    pub reporter: JoinHandle<()>,
}

impl PipelineHandles {
    /// Wait for every stage to finish.
    pub async fn join(self) {
        let _ = self.source.await;
        let _ = self.driver.await;
        let _ = self.ranker.await;
        let _ = self.reporter.await;
    }
}

/// Spawn the full trending pipeline. Fails fast on invalid window settings;
/// nothing is spawned in that case.
pub fn spawn_pipeline(
    cfg: &TrackerConfig,
    mut source: Box<dyn EventSource>,
) -> Result<PipelineHandles> {
    cfg.validate()?;
    let driver = WindowDriver::new(cfg.window_length(), cfg.emit_frequency())?;

    let (event_tx, event_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let (aggregate_tx, aggregate_rx) = mpsc::channel::<(String, u64)>(CHANNEL_CAPACITY);
    let (report_tx, mut report_rx) = mpsc::channel::<Vec<RankedEntry<String>>>(16);

    let source_task = tokio::spawn(async move {
        while let Some(word) = source.next_event().await {
            if event_tx.send(word).await.is_err() {
                break;
            }
        }
    });

    let driver_task = tokio::spawn(driver.run(event_rx, aggregate_tx));

    let report_every = cfg.report_frequency();
    let ranker_task = tokio::spawn(Ranker::new().run(aggregate_rx, report_every, report_tx));

    let report_top = cfg.report_top;
    let reporter_task = tokio::spawn(async move {
        while let Some(snapshot) = report_rx.recv().await {
            log_report(&snapshot, report_top);
        }
    });

    Ok(PipelineHandles {
        source: source_task,
        driver: driver_task,
        ranker: ranker_task,
        reporter: reporter_task,
    })
}

fn log_report(snapshot: &[RankedEntry<String>], top: usize) {
    let line = snapshot
        .iter()
        .take(top)
        .map(|entry| format!("{}: {}", entry.key, entry.count))
        .collect::<Vec<_>>()
        .join(", ");
    info!(target: "report", tracked = snapshot.len(), "top [{line}]");
}

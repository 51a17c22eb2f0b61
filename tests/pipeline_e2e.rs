// tests/pipeline_e2e.rs
//
// End-to-end: scripted events through the window driver and ranker, reading
// ranking snapshots off the report channel, plus shutdown propagation for
// the fully wired pipeline.

use std::time::Duration;

use tokio::sync::mpsc;
use trend_tracker::{
    spawn_pipeline, EventSource, RankedEntry, Ranker, ScriptedSource, TrackerConfig, WindowDriver,
};

#[tokio::test(start_paused = true)]
async fn final_ranking_reflects_all_events() {
    // Ticks far in the future: the whole script lands in one window flush,
    // so the cumulative ranking equals the raw event counts.
    let driver =
        WindowDriver::new(Duration::from_secs(4000), Duration::from_secs(1000)).unwrap();

    let (event_tx, event_rx) = mpsc::channel(64);
    let (aggregate_tx, aggregate_rx) = mpsc::channel(64);
    let (report_tx, mut report_rx) = mpsc::channel(16);

    let mut source = ScriptedSource::new(["x", "x", "y", "x", "y", "z"]);
    while let Some(word) = source.next_event().await {
        event_tx.send(word).await.unwrap();
    }
    drop(event_tx);

    tokio::spawn(driver.run(event_rx, aggregate_tx));
    tokio::spawn(Ranker::new().run(aggregate_rx, Duration::from_secs(1000), report_tx));

    let mut last = Vec::new();
    while let Some(snapshot) = report_rx.recv().await {
        last = snapshot;
    }

    let got: Vec<(String, u64)> = last.into_iter().map(|e| (e.key, e.count)).collect();
    assert_eq!(
        got,
        vec![
            ("x".to_string(), 3),
            ("y".to_string(), 2),
            ("z".to_string(), 1)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn snapshots_stay_descending_across_rotations() {
    let driver = WindowDriver::new(Duration::from_secs(6), Duration::from_secs(2)).unwrap();

    let (event_tx, event_rx) = mpsc::channel(64);
    let (aggregate_tx, aggregate_rx) = mpsc::channel(64);
    let (report_tx, mut report_rx) = mpsc::channel::<Vec<RankedEntry<String>>>(16);

    for key in ["a", "b", "a", "c", "a", "b"] {
        event_tx.send(key.to_string()).await.unwrap();
    }
    tokio::spawn(driver.run(event_rx, aggregate_tx));
    tokio::spawn(Ranker::new().run(aggregate_rx, Duration::from_secs(2), report_tx));

    // Let several window rotations and reports happen, then end the stream.
    for _ in 0..4 {
        let snapshot = report_rx.recv().await.expect("report expected");
        for pair in snapshot.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
    }
    drop(event_tx);

    let mut last = Vec::new();
    while let Some(snapshot) = report_rx.recv().await {
        last = snapshot;
    }
    // "a" led every window emit, so it leads the cumulative ranking too.
    assert_eq!(last.first().map(|e| e.key.clone()).as_deref(), Some("a"));
}

#[tokio::test(start_paused = true)]
async fn pipeline_shuts_down_once_the_source_ends() {
    let cfg = TrackerConfig::default();
    let source = ScriptedSource::new(["one", "two", "one"]);
    let handles = spawn_pipeline(&cfg, Box::new(source)).unwrap();

    // Source exhaustion must ripple through every stage; join would hang
    // otherwise and the test harness would time out.
    handles.join().await;
}

#[tokio::test]
async fn pipeline_rejects_invalid_window_settings() {
    let cfg = TrackerConfig {
        window_length_secs: 2,
        emit_frequency_secs: 2,
        ..TrackerConfig::default()
    };
    let source = ScriptedSource::new(["one"]);
    assert!(spawn_pipeline(&cfg, Box::new(source)).is_err());
}

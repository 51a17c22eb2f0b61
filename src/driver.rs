//! # Window Driver
//! Bridges real-time event arrival and wall-clock ticks to the sliding
//! window: one increment per incoming event, one emit-and-advance per tick.

use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use anyhow::{ensure, Result};
use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::sliding_window::SlidingWindow;

/// Wall-clock cadence around a [`SlidingWindow`].
#[derive(Debug)]
pub struct WindowDriver<K> {
    window: SlidingWindow<K>,
    emit_frequency: Duration,
}

impl<K> WindowDriver<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Build a driver covering `window_length` with one advance per
    /// `emit_frequency`.
    ///
    /// The bucket count is `window_length / emit_frequency`, truncating: a
    /// non-divisible remainder is dropped, shortening the effective span to
    /// `buckets * emit_frequency`. A derived count below two propagates the
    /// window's configuration error; no driver is produced.
    pub fn new(window_length: Duration, emit_frequency: Duration) -> Result<Self> {
        ensure!(!emit_frequency.is_zero(), "emit frequency must be non-zero");
        let num_slots = (window_length.as_millis() / emit_frequency.as_millis()) as usize;
        Ok(Self {
            window: SlidingWindow::new(num_slots)?,
            emit_frequency,
        })
    }

    pub fn emit_frequency(&self) -> Duration {
        self.emit_frequency
    }

    pub fn window(&self) -> &SlidingWindow<K> {
        &self.window
    }

    /// Count one incoming event.
    pub fn record(&mut self, key: K) {
        self.window.increment_count(key);
    }

    /// Snapshot full-window totals as aggregate records, then advance the
    /// window. Record order is arbitrary.
    pub fn emit(&mut self) -> Vec<(K, u64)> {
        self.window.log_state();
        self.window
            .get_counts_then_advance_window()
            .into_iter()
            .collect()
    }

    /// Drive the window from an event stream and a periodic tick.
    ///
    /// Receiving an event off the channel consumes (acks) it; emission runs
    /// on its own cadence and is not tied 1:1 to input. The select is biased
    /// so queued events drain before a tick fires, keeping a tick from racing
    /// the events delivered ahead of it. Exits when the event channel closes,
    /// flushing the window once more so nothing counted is lost.
    pub async fn run(mut self, mut events: mpsc::Receiver<K>, out: mpsc::Sender<(K, u64)>) {
        let mut ticker = tokio::time::interval(self.emit_frequency);
        loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(key) => {
                        self.record(key);
                        counter!("driver_events_total").increment(1);
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    let records = self.emit();
                    counter!("driver_emits_total").increment(1);
                    gauge!("driver_tracked_keys").set(self.window.tracked_keys() as f64);
                    debug!(records = records.len(), "window emit");
                    for record in records {
                        if out.send(record).await.is_err() {
                            warn!("aggregate sink closed, stopping window driver");
                            return;
                        }
                    }
                }
            }
        }
        for record in self.emit() {
            if out.send(record).await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_bucket_count_by_truncating_division() {
        let d = WindowDriver::<String>::new(Duration::from_secs(6), Duration::from_secs(2));
        assert_eq!(d.unwrap().window().num_slots(), 3);

        // 7 / 2 truncates to 3 buckets; the seventh second is dropped.
        let d = WindowDriver::<String>::new(Duration::from_secs(7), Duration::from_secs(2));
        assert_eq!(d.unwrap().window().num_slots(), 3);
    }

    #[test]
    fn rejects_configurations_below_two_buckets() {
        assert!(WindowDriver::<String>::new(Duration::from_secs(6), Duration::from_secs(4)).is_err());
        assert!(WindowDriver::<String>::new(Duration::from_secs(2), Duration::from_secs(2)).is_err());
        assert!(WindowDriver::<String>::new(Duration::from_secs(6), Duration::ZERO).is_err());
    }

    #[test]
    fn emit_returns_one_record_per_tracked_key() {
        let mut d =
            WindowDriver::new(Duration::from_secs(6), Duration::from_secs(2)).unwrap();
        d.record("a");
        d.record("b");
        d.record("a");

        let mut records = d.emit();
        records.sort();
        assert_eq!(records, vec![("a", 2), ("b", 1)]);

        // Nothing new since: the same totals ride along until rotated out.
        let mut records = d.emit();
        records.sort();
        assert_eq!(records, vec![("a", 2), ("b", 1)]);
    }
}

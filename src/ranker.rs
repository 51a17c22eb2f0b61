//! # Top-N Ranker
//! Live leaderboard over a never-ending stream of (key, count) aggregate
//! records.
//!
//! Totals are cumulative across every record ever received and are never
//! evicted or reset here; recency is supplied entirely by what the sliding
//! window upstream has already filtered out. A key that goes quiet keeps its
//! historical weight.

use std::time::Duration;

use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tracing::warn;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry<K> {
    pub key: K,
    pub count: u64,
}

/// Fully sorted ranking, descending by cumulative count.
///
/// Keys with equal totals keep first-seen order: `merge` re-sorts with a
/// stable sort on count only, so ties are broken by insertion order.
#[derive(Debug)]
pub struct Ranker<K> {
    ranking: Vec<RankedEntry<K>>,
}

impl<K> Default for Ranker<K>
where
    K: PartialEq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Ranker<K>
where
    K: PartialEq + Clone,
{
    pub fn new() -> Self {
        Self {
            ranking: Vec::new(),
        }
    }

    /// Fold one aggregate record into the leaderboard: add to the key's
    /// cumulative total (inserting on first sight), then re-sort.
    ///
    /// Re-sorting on every merge costs O(k log k) over the k distinct keys
    /// ever seen; fine while k stays small relative to throughput. Callers
    /// needing more should batch merges between reports.
    pub fn merge(&mut self, key: K, count: u64) {
        match self.ranking.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.count += count,
            None => self.ranking.push(RankedEntry { key, count }),
        }
        self.ranking.sort_by(|a, b| b.count.cmp(&a.count));
    }

    /// Current ranking in descending order. Read-only.
    pub fn report(&self) -> &[RankedEntry<K>] {
        &self.ranking
    }

    pub fn len(&self) -> usize {
        self.ranking.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }
}

impl<K> Ranker<K>
where
    K: PartialEq + Clone + Send + 'static,
{
    /// Consume aggregate records and periodically ship a snapshot of the full
    /// ranking to the report sink.
    ///
    /// Pending records drain before a report fires. Exits when the record
    /// channel closes, sending one final snapshot so short-lived streams
    /// still report.
    pub async fn run(
        mut self,
        mut records: mpsc::Receiver<(K, u64)>,
        report_every: Duration,
        reports: mpsc::Sender<Vec<RankedEntry<K>>>,
    ) {
        let mut ticker = tokio::time::interval(report_every);
        loop {
            tokio::select! {
                biased;
                record = records.recv() => match record {
                    Some((key, count)) => {
                        self.merge(key, count);
                        counter!("ranker_records_total").increment(1);
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    gauge!("ranker_tracked_keys").set(self.len() as f64);
                    if reports.send(self.ranking.clone()).await.is_err() {
                        warn!("report sink closed, stopping ranker");
                        return;
                    }
                }
            }
        }
        let _ = reports.send(self.ranking).await;
    }
}

//! # Sliding Window
//! Fixed-memory, time-bucketed counting over a rotating set of slots.
//!
//! Keeps one bucket vector of `num_slots` counts per tracked key. Exactly one
//! slot (`head_slot`) receives increments at any time; `tail_slot` is the next
//! slot due for eviction. Advancing the window discards one slot's worth of
//! history, so memory stays bounded by distinct keys times `num_slots` no
//! matter how long the stream runs.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use anyhow::{bail, Result};
use tracing::debug;

/// Per-key counts spread across a fixed ring of time buckets.
#[derive(Debug)]
pub struct SlidingWindow<K> {
    counts: HashMap<K, Vec<u64>>,
    num_slots: usize,
    head_slot: usize,
    tail_slot: usize,
}

impl<K> SlidingWindow<K>
where
    K: Eq + Hash + Clone,
{
    /// Create a window of `num_slots` buckets.
    ///
    /// A window needs at least a head and a tail bucket, so `num_slots < 2`
    /// is a configuration error.
    pub fn new(num_slots: usize) -> Result<Self> {
        if num_slots < 2 {
            bail!("window length in slots must be at least two (you requested {num_slots})");
        }
        Ok(Self {
            counts: HashMap::new(),
            num_slots,
            head_slot: 0,
            tail_slot: 1,
        })
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    pub fn head_slot(&self) -> usize {
        self.head_slot
    }

    pub fn tail_slot(&self) -> usize {
        self.tail_slot
    }

    /// Number of currently tracked keys.
    pub fn tracked_keys(&self) -> usize {
        self.counts.len()
    }

    /// Count one occurrence of `key` in the currently open slot.
    pub fn increment_count(&mut self, key: K) {
        self.increment_count_at_slot(key, self.head_slot);
    }

    /// Count one occurrence of `key` in an explicit slot (`slot < num_slots`).
    ///
    /// The production path always targets the head slot; this variant exists
    /// for bootstrap and tests.
    pub fn increment_count_at_slot(&mut self, key: K, slot: usize) {
        let buckets = self
            .counts
            .entry(key)
            .or_insert_with(|| vec![0; self.num_slots]);
        buckets[slot] += 1;
    }

    /// Total count per tracked key over the full window span. Read-only.
    pub fn get_counts(&self) -> HashMap<K, u64> {
        self.counts
            .iter()
            .map(|(key, buckets)| (key.clone(), buckets.iter().sum()))
            .collect()
    }

    /// Return the current totals of all tracked keys, then advance the window.
    ///
    /// Totals are captured before anything rotates, so the caller always sees
    /// the complete current window, never a partially rotated one. Afterwards
    /// keys whose totals dropped to zero are evicted, the tail bucket is
    /// cleared (it is about to become the new head and must start empty), and
    /// head/tail move forward one slot.
    pub fn get_counts_then_advance_window(&mut self) -> HashMap<K, u64> {
        let counts = self.get_counts();
        self.wipe_zeros();
        self.wipe_slot(self.tail_slot);
        self.advance_head();
        counts
    }

    /// Zero one slot's bucket for every tracked key (`slot < num_slots`).
    pub fn wipe_slot(&mut self, slot: usize) {
        for buckets in self.counts.values_mut() {
            buckets[slot] = 0;
        }
    }

    /// Drop every key whose bucket vector sums to zero.
    pub fn wipe_zeros(&mut self) {
        self.counts
            .retain(|_, buckets| buckets.iter().sum::<u64>() > 0);
    }

    fn advance_head(&mut self) {
        self.head_slot = self.tail_slot;
        self.tail_slot = self.slot_after(self.tail_slot);
    }

    fn slot_after(&self, slot: usize) -> usize {
        (slot + 1) % self.num_slots
    }
}

impl<K> SlidingWindow<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Dump every tracked key's buckets (oldest to newest) and total at
    /// `debug` level. Diagnostics only.
    pub fn log_state(&self) {
        for (key, buckets) in &self.counts {
            let mut line = String::new();
            let mut pos = self.head_slot;
            let mut total = 0u64;
            for _ in 0..self.num_slots {
                pos = self.slot_after(pos);
                let val = buckets[pos];
                total += val;
                line.push_str(&format!("{val:3} "));
            }
            debug!(target: "window", key = ?key, total, "buckets: {line}");
        }
    }
}

//! # Event Source
//! Seam for the upstream event stream, plus the demo word generator.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::info;

/// Upstream supplier of keyed events. Returning `None` ends the stream and
/// shuts the pipeline down stage by stage.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Option<String>;
}

/// Demo generator: emits its word list in bursts with sharply decaying
/// per-word frequency, and periodically rotates the list so the trending
/// winner changes over time.
pub struct RotatingWordSource {
    words: Vec<String>,
    pause: Duration,
    rotate_every: Duration,
    last_rotation: Option<Instant>,
    queue: VecDeque<String>,
}

impl RotatingWordSource {
    pub fn new(words: Vec<String>, pause: Duration, rotate_every: Duration) -> Self {
        Self {
            words,
            pause,
            rotate_every,
            last_rotation: None,
            queue: VecDeque::new(),
        }
    }

    /// Stock demo: three words, one burst per second, new leader every 9 s.
    pub fn demo() -> Self {
        Self::new(
            vec!["rust".into(), "tokio".into(), "tracing".into()],
            Duration::from_secs(1),
            Duration::from_secs(9),
        )
    }

    /// Queue one burst: the first word gets the most emissions, each later
    /// word a quarter as many.
    fn refill(&mut self) {
        let mut emissions = 2usize << self.words.len();
        for word in &self.words {
            for _ in 0..emissions {
                self.queue.push_back(word.clone());
            }
            emissions >>= 2;
        }
    }

    fn rotate(&mut self) {
        let first = self.words.remove(0);
        self.words.push(first);
        info!("{} takes the lead", self.words[0]);
    }

    fn due_for_rotation(&self) -> bool {
        match self.last_rotation {
            None => true,
            Some(at) => at.elapsed() >= self.rotate_every,
        }
    }
}

#[async_trait]
impl EventSource for RotatingWordSource {
    async fn next_event(&mut self) -> Option<String> {
        if self.queue.is_empty() {
            if self.words.is_empty() {
                return None;
            }
            if self.due_for_rotation() {
                self.rotate();
                self.last_rotation = Some(Instant::now());
            }
            tokio::time::sleep(self.pause).await;
            self.refill();
        }
        self.queue.pop_front()
    }
}

/// Replays a fixed sequence of events. Used by tests and offline runs.
pub struct ScriptedSource {
    events: std::vec::IntoIter<String>,
}

impl ScriptedSource {
    pub fn new<I, S>(events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            events: events
                .into_iter()
                .map(Into::into)
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_event(&mut self) -> Option<String> {
        self.events.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_source_replays_then_ends() {
        let mut src = ScriptedSource::new(["a", "b", "a"]);
        assert_eq!(src.next_event().await.as_deref(), Some("a"));
        assert_eq!(src.next_event().await.as_deref(), Some("b"));
        assert_eq!(src.next_event().await.as_deref(), Some("a"));
        assert_eq!(src.next_event().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_sizes_decay_per_word() {
        let mut src = RotatingWordSource::new(
            vec!["a".into(), "b".into(), "c".into()],
            Duration::from_millis(10),
            Duration::from_secs(3600),
        );

        // 2 << 3 = 16 of the leader, then 4, then 1 per burst. The first
        // burst rotates immediately, making "b" the leader.
        let mut burst = Vec::new();
        for _ in 0..21 {
            burst.push(src.next_event().await.unwrap());
        }
        assert_eq!(burst.iter().filter(|w| *w == "b").count(), 16);
        assert_eq!(burst.iter().filter(|w| *w == "c").count(), 4);
        assert_eq!(burst.iter().filter(|w| *w == "a").count(), 1);
    }
}

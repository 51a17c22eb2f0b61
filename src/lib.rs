// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod driver;
pub mod pipeline;
pub mod ranker;
pub mod sliding_window;
pub mod source;

// ---- Re-exports for stable public API ----
pub use crate::config::TrackerConfig;
pub use crate::driver::WindowDriver;
pub use crate::pipeline::{spawn_pipeline, PipelineHandles};
pub use crate::ranker::{RankedEntry, Ranker};
pub use crate::sliding_window::SlidingWindow;
pub use crate::source::{EventSource, RotatingWordSource, ScriptedSource};

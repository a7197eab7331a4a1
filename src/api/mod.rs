//! High-level API and engine interface.

pub mod engine;
pub mod results;

pub use engine::{relocate, summary_lines, RelocationEngine, RelocationOptions};
pub use results::{Collision, CollisionKind, PhaseTiming, PhaseTimings, RelocationReport};

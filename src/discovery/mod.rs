//! Discovery phases: locating packages, scanning a subtree for source
//! directories and collecting the units that import the moved package.
//!
//! Nothing here parses more than a file's header or resolves a symbol.

pub mod collector;
pub mod locator;
pub mod scanner;

pub use collector::{collect, AffectedUnit, Collection, Collector, SkippedFile};
pub use locator::{locate, locate_in, locate_or_plan, Target};
pub use scanner::collect_directories;

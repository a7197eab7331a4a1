//! # pkgmove-rs: Semantic-Aware Go Package Relocation
//!
//! Moves a Go package to a new import path and rewrites every reference to
//! it across a source tree: import declarations, qualified references and
//! the package's own clause. Qualifiers are renamed only when symbol
//! resolution proves they denote the moved package, so aliased, shadowed and
//! conflicting bindings are left alone.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          API Layer                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Discovery   │   Loader    │   Oracle    │     Rewrite       │
//! │ • Locator    │ • Plan      │ • Scopes    │ • Target pass     │
//! │ • Scanner    │ • Importer  │ • Resolver  │ • Affected pass   │
//! │ • Collector  │ • Program   │             │ • Write set       │
//! ├──────────────────────────────────────────────────────────────┤
//! │   Core (errors, config, AST)  │  Lang (Go)  │  I/O (fs, printer) │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pkgmove_rs::{MoveConfig, RelocationEngine, RelocationOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = RelocationEngine::new(&MoveConfig::default())?;
//!     let report = engine.run(&RelocationOptions::new("github.com/acme/foo", "github.com/acme/bar"))?;
//!
//!     println!("{} files written", report.files_written());
//!     Ok(())
//! }
//! ```

#![warn(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Core data structures
pub mod core {
    //! Errors, configuration, build context and syntax tree helpers.

    pub mod ast;
    pub mod config;
    pub mod context;
    pub mod errors;
}

// Go parsing
pub mod lang;

// Filesystem facade and printer
pub mod io;

// Locating packages and finding their importers
pub mod discovery;

// Selective program loading
pub mod loader;

// Symbol resolution
pub mod oracle;

// Rewrite passes
pub mod rewrite;

// Public API and engine interface
pub mod api;

// Re-export primary types for convenience
pub use api::engine::{RelocationEngine, RelocationOptions};
pub use api::results::RelocationReport;
pub use crate::core::config::{FidelityMode, MatchMode, MoveConfig, PrinterConfig};
pub use crate::core::context::{BuildContext, PackageMatcher};
pub use crate::core::errors::{PkgMoveError, Result, ResultExt};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

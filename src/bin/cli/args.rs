//! CLI Argument Structures
//!
//! Flag definitions for the pkgmove binary.

use clap::Parser;
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Move a Go package and rewrite every reference to it
#[derive(Parser, Debug, Clone)]
#[command(name = "pkgmove")]
#[command(version = VERSION)]
#[command(about = "Move a Go package to a new import path and rewrite its importers")]
#[command(long_about = "
Moves a Go package directory and rewrites import declarations, qualified
references and the package clause so the tree keeps compiling.

Common Usage:

  # Move foo to bar, rewriting importers anywhere under the source roots
  pkgmove --from github.com/acme/foo --to github.com/acme/bar

  # Only rewrite importers below github.com/acme
  pkgmove --from github.com/acme/foo --to github.com/acme/bar --in github.com/acme

  # Move foo together with every package below it
  pkgmove --from github.com/acme/foo --to github.com/acme/bar --recursive

  # Preview without touching the tree
  pkgmove --from foo --to bar --dry-run
")]
pub struct Cli {
    /// Import path of the package to move
    #[arg(long, value_name = "PATH")]
    pub from: String,

    /// Destination import path
    #[arg(long, value_name = "PATH")]
    pub to: String,

    /// Only rewrite importers below this import path
    #[arg(long = "in", value_name = "PATH", default_value = "")]
    pub scope: String,

    /// Also move (and rewrite imports of) every package below --from
    #[arg(long)]
    pub recursive: bool,

    /// Resolve only the affected neighbourhood; faster, may miss references
    #[arg(long)]
    pub unsafe_fast: bool,

    /// Enable verbose logging for debugging
    #[arg(short, long)]
    pub verbose: bool,

    /// Write phase timings as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Configuration file (defaults to .pkgmove.yml in the working directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Source root to search; repeatable, overrides GOPATH
    #[arg(long = "root", value_name = "DIR", env = "PKGMOVE_ROOT")]
    pub roots: Vec<PathBuf>,

    /// Show what would change without writing or moving anything
    #[arg(long)]
    pub dry_run: bool,
}

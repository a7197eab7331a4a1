//! Rewrite passes and the state they share.
//!
//! A [`RelocationRequest`] carries the move being performed, the affected
//! units found by discovery and the [`WriteSet`] both passes append to. The
//! target pass renames the moved package itself; the affected pass rewrites
//! its importers.

pub mod affected;
pub mod bindings;
pub mod target;
pub mod write_set;

use std::path::PathBuf;

use serde::Serialize;

use crate::core::context::BuildContext;
use crate::core::errors::{PkgMoveError, Result};
use crate::discovery::{AffectedUnit, Target};
use crate::lang::last_segment;
use crate::loader::Program;

pub use affected::{rewrite_affected, AffectedRewriter};
pub use bindings::{BindingTable, DestinationBinding, Substitution};
pub use target::{import_comment_path, rename_package_declaration};
pub use write_set::{PendingWrite, WriteSet};

/// Two or more imports of a file would bind the destination name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub file: PathBuf,
    /// Import path of the file's package
    pub package: String,
    /// The contested local name
    pub name: String,
    /// Distinct import paths binding it after substitution
    pub paths: Vec<String>,
}

/// A collected file the loaded program does not carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingFile {
    pub package: String,
    pub file: String,
}

/// What the rewrite passes noticed along the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub conflicts: Vec<Conflict>,
    pub missing: Vec<MissingFile>,
    /// Qualifier identifiers renamed
    pub renamed: usize,
}

/// Declared names of the moved package before and after the move. Derived
/// once per run and shared by every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageNames {
    pub from: String,
    pub to: String,
}

impl PackageNames {
    /// The moved package's declared name, and the destination's declared
    /// name when it is loaded (its last path segment otherwise).
    pub fn derive(program: &Program, from: &str, to: &str) -> Result<Self> {
        let moved = program
            .package(from)
            .filter(|p| !p.no_source)
            .ok_or_else(|| PkgMoveError::not_found("pkg", from))?;
        let to_name = program
            .package(to)
            .filter(|p| !p.no_source)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| last_segment(to).to_string());
        Ok(Self {
            from: moved.name.clone(),
            to: to_name,
        })
    }
}

/// One package move in progress.
#[derive(Debug)]
pub struct RelocationRequest<'p> {
    /// Import path of the moved package
    pub from: String,
    /// Destination import path
    pub to: String,
    /// Import path of the scope root (empty for a whole source root)
    pub scope: String,
    /// The located scope root
    pub root: Target,
    pub affected: Vec<AffectedUnit>,
    pub verbose: bool,
    pub substitution: Substitution,
    pub test_suffix: String,
    pub write_set: WriteSet<'p>,
    pub diagnostics: Diagnostics,
}

impl<'p> RelocationRequest<'p> {
    pub fn new(
        ctx: &BuildContext,
        from: &str,
        to: &str,
        root: Target,
        affected: Vec<AffectedUnit>,
    ) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            scope: root.pkg.clone(),
            root,
            affected,
            verbose: false,
            substitution: Substitution::new(from, to, ctx.matcher.clone()),
            test_suffix: ctx.test_suffix.clone(),
            write_set: WriteSet::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

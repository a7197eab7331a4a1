//! The accumulated files pending serialisation.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::core::ast::EditScript;
use crate::lang::SourceFile;

/// One file scheduled for writing.
#[derive(Debug)]
pub struct PendingWrite<'p> {
    /// Import path of the package that owns the file in the loaded program
    pub package: String,
    /// Import path of the package the file belongs to after the move
    pub destination: String,
    /// The parsed file the edits apply to
    pub file: &'p SourceFile,
    pub edits: EditScript,
}

/// Files keyed by path. An entry is never removed; later passes keep
/// editing the script they get back from [`WriteSet::entry`].
#[derive(Debug, Default)]
pub struct WriteSet<'p> {
    entries: IndexMap<PathBuf, PendingWrite<'p>>,
}

impl<'p> WriteSet<'p> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Edit script of `file`, registering the file on first use. The
    /// package and destination tags follow the latest caller.
    pub fn entry(
        &mut self,
        file: &'p SourceFile,
        package: &str,
        destination: &str,
    ) -> &mut EditScript {
        let pending = self
            .entries
            .entry(file.path.clone())
            .or_insert_with(|| PendingWrite {
                package: package.to_string(),
                destination: destination.to_string(),
                file,
                edits: EditScript::new(),
            });
        pending.package = package.to_string();
        pending.destination = destination.to_string();
        &mut pending.edits
    }

    pub fn get(&self, path: &Path) -> Option<&PendingWrite<'p>> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = &PendingWrite<'p>> {
        self.entries.values()
    }

    /// Number of files per destination package, in first-seen order.
    pub fn counts_by_destination(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for pending in self.entries.values() {
            *counts.entry(pending.destination.clone()).or_insert(0) += 1;
        }
        counts
    }
}

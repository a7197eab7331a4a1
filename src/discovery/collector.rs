//! Header-only pass that finds the files importing the moved package.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::locator::Target;
use crate::core::context::BuildContext;
use crate::core::errors::Result;
use crate::lang::GoAdapter;

/// Files of one directory and one declared package that import the moved
/// package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedUnit {
    /// Directory on disk
    pub dir: PathBuf,
    /// Import path; external test units carry the test suffix
    pub pkg: String,
    /// Declared package name
    pub name: String,
    /// File names (not paths) that import the moved package
    pub files: Vec<String>,
    /// Every other import seen in the unit's files
    pub shallow_imports: BTreeSet<String>,
    /// This is the directory's external test package
    pub is_xtest: bool,
}

impl AffectedUnit {
    fn new(dir: &Path, pkg: String, is_xtest: bool) -> Self {
        Self {
            dir: dir.to_path_buf(),
            pkg,
            is_xtest,
            ..Self::default()
        }
    }

    fn add_file(&mut self, name: &str) {
        if !self.files.iter().any(|f| f == name) {
            self.files.push(name.to_string());
        }
    }
}

/// A file left out of collection, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Units found plus the files that could not be read or parsed.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub units: Vec<AffectedUnit>,
    pub skipped: Vec<SkippedFile>,
}

/// Runs the header parser over candidate directories.
#[derive(Debug)]
pub struct Collector<'a> {
    ctx: &'a BuildContext,
    adapter: GoAdapter,
}

impl<'a> Collector<'a> {
    pub fn new(ctx: &'a BuildContext) -> Result<Self> {
        Ok(Self {
            ctx,
            adapter: GoAdapter::new()?,
        })
    }

    /// Build the affected units of `dirs` for a move of `moved`.
    ///
    /// Unreadable or unparsable files are skipped; a directory that cannot
    /// be listed fails the whole collection.
    pub fn collect(&mut self, moved: &str, scope: &Target, dirs: &[PathBuf]) -> Result<Collection> {
        let mut collection = Collection::default();

        for dir in dirs {
            let Some(pkg) = scope.import_path_of(dir) else {
                debug!("{} is a source root, not a package", dir.display());
                continue;
            };

            let mut primary = AffectedUnit::new(dir, pkg.clone(), false);
            let mut xtest = AffectedUnit::new(dir, self.ctx.test_twin_path(&pkg), true);

            for entry in self.ctx.fs.read_dir(dir)? {
                if entry.is_dir || !self.ctx.is_source_file(&entry.name) {
                    continue;
                }
                let path = dir.join(&entry.name);
                let header = match self
                    .ctx
                    .fs
                    .read_file(&path)
                    .and_then(|text| self.adapter.parse_header(&text, &entry.name))
                {
                    Ok(header) => header,
                    Err(err) => {
                        warn!("skipping {}: {}", path.display(), err);
                        collection.skipped.push(SkippedFile {
                            path,
                            reason: err.to_string(),
                        });
                        continue;
                    }
                };

                let unit = if self.ctx.is_test_package(&header.package_name) {
                    &mut xtest
                } else {
                    &mut primary
                };
                unit.name = header.package_name;

                for imported in header.imports {
                    if self.ctx.matcher.matches(moved, &imported) {
                        unit.add_file(&entry.name);
                    } else {
                        unit.shallow_imports.insert(imported);
                    }
                }
            }

            for unit in [primary, xtest] {
                if !unit.files.is_empty() {
                    debug!("affected {} ({} files)", unit.pkg, unit.files.len());
                    collection.units.push(unit);
                }
            }
        }

        info!("collect affected packages {}", collection.units.len());
        Ok(collection)
    }
}

/// Affected units of `dirs`; per-file failures are logged and dropped.
pub fn collect(
    ctx: &BuildContext,
    moved: &str,
    scope: &Target,
    dirs: &[PathBuf],
) -> Result<Vec<AffectedUnit>> {
    Ok(Collector::new(ctx)?.collect(moved, scope, dirs)?.units)
}

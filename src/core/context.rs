//! Explicit build context handed to every phase.
//!
//! Holds the filesystem facade, the source roots and the import matching
//! strategy. Nothing in the engine reads ambient state; tests build a
//! context around a [`MemoryFileSystem`](crate::io::memory::MemoryFileSystem).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::GlobSet;

use crate::core::config::{compile_globset, MatchMode, MoveConfig};
use crate::core::errors::Result;
use crate::io::fs::{has_extension, FileSystem, MoveScope, OsFileSystem};

type MatchFn = dyn Fn(&str, &str) -> bool + Send + Sync;

/// Decides whether an imported path refers to the moved package.
#[derive(Clone)]
pub enum PackageMatcher {
    /// `imported == moved`
    Exact,
    /// `imported == moved` or `imported` lies below `moved/`
    Subtree,
    /// Caller supplied predicate `(moved, imported)`; `recursive` tells the
    /// mover whether nested directories travel with the package.
    Custom {
        /// The predicate
        matches: Arc<MatchFn>,
        /// Whether the strategy covers a whole subtree
        recursive: bool,
    },
}

impl PackageMatcher {
    /// Whether `imported` refers to `moved` under this strategy
    pub fn matches(&self, moved: &str, imported: &str) -> bool {
        match self {
            Self::Exact => moved == imported,
            Self::Subtree => is_within(moved, imported),
            Self::Custom { matches, .. } => matches(moved, imported),
        }
    }

    /// Whether nested packages move along with the package
    pub fn is_recursive(&self) -> bool {
        match self {
            Self::Exact => false,
            Self::Subtree => true,
            Self::Custom { recursive, .. } => *recursive,
        }
    }
}

impl fmt::Debug for PackageMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("Exact"),
            Self::Subtree => f.write_str("Subtree"),
            Self::Custom { recursive, .. } => {
                f.debug_struct("Custom").field("recursive", recursive).finish()
            }
        }
    }
}

impl From<MatchMode> for PackageMatcher {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Exact => Self::Exact,
            MatchMode::Subtree => Self::Subtree,
        }
    }
}

/// `path` equals `root` or sits below it on a `/` segment boundary.
pub fn is_within(root: &str, path: &str) -> bool {
    if root.is_empty() {
        return true;
    }
    path == root
        || path
            .strip_prefix(root)
            .map_or(false, |rest| rest.starts_with('/'))
}

/// Everything the phases need to touch the outside world.
#[derive(Clone)]
pub struct BuildContext {
    /// Filesystem facade
    pub fs: Arc<dyn FileSystem>,
    /// Source roots searched in order
    pub source_roots: Vec<PathBuf>,
    /// Import matching strategy
    pub matcher: PackageMatcher,
    /// Source file extension without the dot
    pub source_extension: String,
    /// External test package suffix
    pub test_suffix: String,
    /// Directories whose packages may contain syntax errors
    pub lenient: Option<GlobSet>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("fs", &self.fs)
            .field("source_roots", &self.source_roots)
            .field("matcher", &self.matcher)
            .field("source_extension", &self.source_extension)
            .finish()
    }
}

impl BuildContext {
    /// Context over an arbitrary filesystem with default Go conventions
    pub fn new(fs: Arc<dyn FileSystem>, source_roots: Vec<PathBuf>) -> Self {
        Self {
            fs,
            source_roots,
            matcher: PackageMatcher::Exact,
            source_extension: "go".to_string(),
            test_suffix: "_test".to_string(),
            lenient: None,
        }
    }

    /// Context over the real filesystem described by a configuration
    pub fn from_config(config: &MoveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fs: Arc::new(OsFileSystem::new(config.use_git)),
            source_roots: config.resolved_source_roots(),
            matcher: config.match_mode.into(),
            source_extension: config.source_extension.clone(),
            test_suffix: config.test_package_suffix.clone(),
            lenient: compile_globset(&config.lenient_patterns)?,
        })
    }

    /// Replace the matching strategy
    pub fn with_matcher(mut self, matcher: PackageMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Replace the lenient directory patterns
    pub fn with_lenient_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.lenient = compile_globset(patterns)?;
        Ok(self)
    }

    /// Join an import path onto a directory
    pub fn join_path(&self, base: &Path, relative: &str) -> PathBuf {
        self.fs.join_path(base, relative)
    }

    /// Whether a file name is a source file
    pub fn is_source_file(&self, name: &str) -> bool {
        has_extension(name, &self.source_extension)
    }

    /// Whether a declared package name marks an external test package
    pub fn is_test_package(&self, name: &str) -> bool {
        name.len() > self.test_suffix.len() && name.ends_with(&self.test_suffix)
    }

    /// Import path under which the external test twin of `path` is known
    pub fn test_twin_path(&self, path: &str) -> String {
        format!("{}{}", path, self.test_suffix)
    }

    /// Whether a package directory tolerates syntax errors
    pub fn is_lenient(&self, dir: &Path) -> bool {
        self.lenient.as_ref().map_or(false, |set| set.is_match(dir))
    }

    /// How the package directory is carried when moved
    pub fn move_scope(&self) -> MoveScope {
        if self.matcher.is_recursive() {
            MoveScope::Subtree
        } else {
            MoveScope::SourceFiles {
                extension: self.source_extension.clone(),
            }
        }
    }
}

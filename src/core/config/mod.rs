//! Configuration types and management for pkgmove-rs.
//!
//! A [`MoveConfig`] can be loaded from YAML, merged with CLI flags by the
//! binary, and validated before a [`BuildContext`](crate::core::context::BuildContext)
//! is built from it.

pub mod validation;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{PkgMoveError, Result};

pub use validation::{compile_globset, validate_non_empty, validate_positive_usize};

/// How an import path is matched against the moved package path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Only the package itself (`foo` matches `foo`).
    #[default]
    Exact,
    /// The package and every package below it (`foo`, `foo/sub`, ...).
    Subtree,
}

/// How much of the dependency graph the loader resolves from source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FidelityMode {
    /// Resolve the true transitive dependency graph.
    #[default]
    Exhaustive,
    /// Resolve only the neighbourhood seen by affected files; stub the rest.
    Pruned,
}

/// Formatting options handed to the printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// Width of a tab stop in columns
    #[serde(default = "PrinterConfig::default_tab_width")]
    pub tab_width: usize,
    /// Pad with spaces rather than tabs when expanding indentation
    #[serde(default = "PrinterConfig::default_true")]
    pub use_spaces: bool,
    /// Keep tab characters for leading indentation
    #[serde(default = "PrinterConfig::default_true")]
    pub tab_indent: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            tab_width: Self::default_tab_width(),
            use_spaces: true,
            tab_indent: true,
        }
    }
}

impl PrinterConfig {
    const fn default_tab_width() -> usize {
        8
    }

    const fn default_true() -> bool {
        true
    }

    /// Validate printer settings
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.tab_width, "printer.tab_width")
    }
}

/// Main configuration for a relocation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveConfig {
    /// Source roots searched for packages, in priority order.
    /// Empty means "derive from GOPATH / GOROOT".
    #[serde(default)]
    pub source_roots: Vec<PathBuf>,

    /// Extension of source files, without the leading dot
    #[serde(default = "MoveConfig::default_source_extension")]
    pub source_extension: String,

    /// Suffix marking an external test package
    #[serde(default = "MoveConfig::default_test_suffix")]
    pub test_package_suffix: String,

    /// Packages whose directory matches one of these globs tolerate
    /// syntax errors even when loading exhaustively
    #[serde(default = "MoveConfig::default_lenient_patterns")]
    pub lenient_patterns: Vec<String>,

    /// Printer settings
    #[serde(default)]
    pub printer: PrinterConfig,

    /// Import matching strategy
    #[serde(default)]
    pub match_mode: MatchMode,

    /// Loader fidelity
    #[serde(default)]
    pub fidelity: FidelityMode,

    /// Record directory moves in the git index when inside a work tree
    #[serde(default = "MoveConfig::default_use_git")]
    pub use_git: bool,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            source_roots: Vec::new(),
            source_extension: Self::default_source_extension(),
            test_package_suffix: Self::default_test_suffix(),
            lenient_patterns: Self::default_lenient_patterns(),
            printer: PrinterConfig::default(),
            match_mode: MatchMode::default(),
            fidelity: FidelityMode::default(),
            use_git: Self::default_use_git(),
        }
    }
}

impl MoveConfig {
    fn default_source_extension() -> String {
        "go".to_string()
    }

    fn default_test_suffix() -> String {
        "_test".to_string()
    }

    fn default_lenient_patterns() -> Vec<String> {
        vec!["**/vendor/**".to_string()]
    }

    const fn default_use_git() -> bool {
        true
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            PkgMoveError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            PkgMoveError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        validate_non_empty(&self.source_extension, "source_extension")?;
        validate_non_empty(&self.test_package_suffix, "test_package_suffix")?;
        if self.source_extension.starts_with('.') {
            return Err(PkgMoveError::config_field(
                "source_extension must not start with '.'",
                "source_extension",
            ));
        }
        compile_globset(&self.lenient_patterns)?;
        self.printer.validate()
    }

    /// Source roots to search: the configured ones, or the GOPATH/GOROOT
    /// derived defaults when none are configured.
    pub fn resolved_source_roots(&self) -> Vec<PathBuf> {
        if !self.source_roots.is_empty() {
            return self.source_roots.clone();
        }
        default_source_roots(
            std::env::var_os("GOPATH").as_deref().map(Path::new),
            std::env::var_os("GOROOT").as_deref().map(Path::new),
            std::env::var_os("HOME").as_deref().map(Path::new),
        )
    }
}

/// `<each GOPATH entry>/src` followed by `<GOROOT>/src`. Falls back to
/// `$HOME/go/src` when GOPATH is unset.
pub fn default_source_roots(
    gopath: Option<&Path>,
    goroot: Option<&Path>,
    home: Option<&Path>,
) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = match gopath {
        Some(gopath) => std::env::split_paths(gopath.as_os_str())
            .filter(|entry| !entry.as_os_str().is_empty())
            .map(|entry| entry.join("src"))
            .collect(),
        None => home.map(|h| h.join("go").join("src")).into_iter().collect(),
    };
    if let Some(goroot) = goroot {
        roots.push(goroot.join("src"));
    }
    roots
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

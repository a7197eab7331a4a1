//! Resolution plan: which packages the loader parses from source.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::config::FidelityMode;
use crate::core::context::BuildContext;
use crate::discovery::AffectedUnit;

/// How far the loader follows imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Fidelity {
    /// Follow the true transitive import graph; failures are fatal.
    Exhaustive,
    /// Parse only requested and allow-listed packages; every other import is
    /// answered with an empty stand-in and load errors become warnings.
    /// Rewrites stay correct for allow-listed packages and may be incomplete
    /// for references reaching the rest of the tree.
    Pruned {
        /// Import paths that are still parsed from source
        allow: BTreeSet<String>,
    },
}

/// Packages requested from the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadPlan {
    /// Import path -> also load the package's tests
    pub imports: IndexMap<String, bool>,
    /// Loaded when present on disk, silently skipped otherwise
    pub optional: Vec<String>,
    pub fidelity: Fidelity,
}

impl LoadPlan {
    pub fn new(fidelity: Fidelity) -> Self {
        Self {
            imports: IndexMap::new(),
            optional: Vec::new(),
            fidelity,
        }
    }

    /// Plan for moving `moved`: the package and its tests, plus every
    /// affected unit's package with tests. External test units request
    /// their base package, whose load registers the test twin.
    pub fn for_relocation(
        ctx: &BuildContext,
        moved: &str,
        units: &[AffectedUnit],
        mode: FidelityMode,
    ) -> Self {
        let fidelity = match mode {
            FidelityMode::Exhaustive => Fidelity::Exhaustive,
            FidelityMode::Pruned => {
                let mut allow: BTreeSet<String> = units
                    .iter()
                    .flat_map(|unit| unit.shallow_imports.iter().cloned())
                    .collect();
                allow.insert(moved.to_string());
                Fidelity::Pruned { allow }
            }
        };

        let mut plan = Self::new(fidelity);
        plan.import_with_tests(moved);
        for unit in units {
            let base = if unit.is_xtest {
                unit.pkg
                    .strip_suffix(ctx.test_suffix.as_str())
                    .unwrap_or(unit.pkg.as_str())
            } else {
                unit.pkg.as_str()
            };
            plan.import_with_tests(base);
        }
        plan
    }

    /// Request a package together with its tests
    pub fn import_with_tests(&mut self, path: &str) {
        self.imports.insert(path.to_string(), true);
    }

    /// Request a package without its tests
    pub fn import(&mut self, path: &str) {
        self.imports.entry(path.to_string()).or_insert(false);
    }

    /// Load `path` only if it exists
    pub fn import_if_present(&mut self, path: &str) {
        if !self.imports.contains_key(path) && !self.optional.iter().any(|p| p == path) {
            self.optional.push(path.to_string());
        }
        if let Fidelity::Pruned { allow } = &mut self.fidelity {
            allow.insert(path.to_string());
        }
    }

    pub fn is_pruned(&self) -> bool {
        matches!(self.fidelity, Fidelity::Pruned { .. })
    }

    /// Load errors are downgraded to warnings
    pub fn tolerates_errors(&self) -> bool {
        self.is_pruned()
    }

    /// Whether an import reached transitively is parsed from source
    pub fn parses(&self, path: &str) -> bool {
        match &self.fidelity {
            Fidelity::Exhaustive => true,
            Fidelity::Pruned { allow } => {
                self.imports.contains_key(path)
                    || self.optional.iter().any(|p| p == path)
                    || allow.contains(path)
            }
        }
    }
}

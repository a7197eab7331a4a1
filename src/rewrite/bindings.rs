//! Import path substitution and per-file binding bookkeeping.

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::context::{is_within, PackageMatcher};

/// Maps import paths of the moved package (or subtree) onto the
/// destination.
#[derive(Debug, Clone)]
pub struct Substitution {
    from: String,
    to: String,
    matcher: PackageMatcher,
}

impl Substitution {
    pub fn new(from: impl Into<String>, to: impl Into<String>, matcher: PackageMatcher) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            matcher,
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    /// Whether an import must be rewritten. When the destination lies
    /// inside the moved subtree, imports already below the destination are
    /// never candidates, so a second pass cannot cascade.
    pub fn is_candidate(&self, imported: &str) -> bool {
        if !self.matcher.matches(&self.from, imported) {
            return false;
        }
        !(self.nested_destination() && is_within(&self.to, imported))
    }

    /// The destination lies inside the moved subtree (`foo` -> `foo/v2`).
    fn nested_destination(&self) -> bool {
        self.to != self.from && is_within(&self.from, &self.to)
    }

    /// Rewritten path of a candidate import.
    pub fn apply(&self, imported: &str) -> Option<String> {
        if !self.is_candidate(imported) {
            return None;
        }
        match &self.matcher {
            PackageMatcher::Exact | PackageMatcher::Subtree => imported
                .strip_prefix(self.from.as_str())
                .map(|rest| format!("{}{}", self.to, rest)),
            PackageMatcher::Custom { .. } => Some(imported.replacen(&self.from, &self.to, 1)),
        }
    }

    /// Where a package ends up after the move. External test packages keep
    /// their suffix.
    pub fn destination_of(&self, package: &str, test_suffix: &str) -> String {
        let (base, suffix) = match package.strip_suffix(test_suffix) {
            Some(base) if !base.is_empty() => (base, test_suffix),
            _ => (package, ""),
        };
        let moves = base == self.from || (self.matcher.is_recursive() && is_within(&self.from, base));
        if !moves || (self.nested_destination() && is_within(&self.to, base)) {
            return package.to_string();
        }
        let moved = base
            .strip_prefix(self.from.as_str())
            .map(|rest| format!("{}{}", self.to, rest))
            .unwrap_or_else(|| base.to_string());
        format!("{}{}", moved, suffix)
    }
}

/// What the destination's name is bound to in one file after substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "paths", rename_all = "snake_case")]
pub enum DestinationBinding {
    /// Exactly one import binds the name
    Clean(String),
    /// Two or more distinct imports would bind the name
    Conflicting(Vec<String>),
}

/// Local import names of one file, each with the distinct paths that bind
/// it once the rewrite is applied.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    names: IndexMap<String, Vec<String>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `name` binds `path`
    pub fn bind(&mut self, name: &str, path: &str) {
        let paths = self.names.entry(name.to_string()).or_default();
        if !paths.iter().any(|p| p == path) {
            paths.push(path.to_string());
        }
    }

    pub fn lookup(&self, name: &str) -> Option<DestinationBinding> {
        match self.names.get(name)?.as_slice() {
            [] => None,
            [single] => Some(DestinationBinding::Clean(single.clone())),
            many => Some(DestinationBinding::Conflicting(many.to_vec())),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

//! Relocation results and reporting structures.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::core::errors::Result;
use crate::discovery::SkippedFile;
use crate::rewrite::{Conflict, MissingFile};

/// Wall-clock time spent in one engine phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseTiming {
    pub phase: String,
    /// Duration in milliseconds
    pub millis: f64,
}

/// Phase timings of a run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseTimings {
    pub phases: Vec<PhaseTiming>,
}

impl PhaseTimings {
    pub fn record(&mut self, phase: &str, elapsed: Duration) {
        self.phases.push(PhaseTiming {
            phase: phase.to_string(),
            millis: elapsed.as_secs_f64() * 1000.0,
        });
    }

    pub fn get(&self, phase: &str) -> Option<f64> {
        self.phases
            .iter()
            .find(|timing| timing.phase == phase)
            .map(|timing| timing.millis)
    }

    /// Sum over every phase, in milliseconds
    pub fn total_millis(&self) -> f64 {
        self.phases.iter().map(|timing| timing.millis).sum()
    }
}

/// What a destination collision is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    /// Package-level declaration declared by both packages
    Declaration,
    /// File name present in both directories
    File,
}

/// Something the moved package shares with an existing destination.
/// Reported, never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub kind: CollisionKind,
    pub name: String,
}

/// Outcome of a relocation run
#[derive(Debug, Clone, Serialize)]
pub struct RelocationReport {
    /// Moved package
    pub from: String,
    /// Destination package
    pub to: String,

    /// Files written (or rendered, on a dry run), grouped by the package
    /// they belong to after the move
    pub written: IndexMap<String, Vec<PathBuf>>,

    /// Files whose references were left alone because of a name conflict
    pub conflicts: Vec<Conflict>,

    /// Files dropped during collection
    pub skipped: Vec<SkippedFile>,

    /// Collected files the loaded program did not carry
    pub missing: Vec<MissingFile>,

    /// Overlap with an already existing destination
    pub collisions: Vec<Collision>,

    /// Load problems downgraded to warnings
    pub warnings: Vec<String>,

    /// Number of qualifier identifiers renamed
    pub renamed: usize,

    /// The directory moved, as (source, destination)
    pub moved: Option<(PathBuf, PathBuf)>,

    pub dry_run: bool,

    /// Rendered contents by path; only filled on a dry run
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub rendered: IndexMap<PathBuf, String>,

    pub timings: PhaseTimings,

    pub generated_at: DateTime<Utc>,
}

impl RelocationReport {
    pub fn new(from: &str, to: &str, dry_run: bool) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            written: IndexMap::new(),
            conflicts: Vec::new(),
            skipped: Vec::new(),
            missing: Vec::new(),
            collisions: Vec::new(),
            warnings: Vec::new(),
            renamed: 0,
            moved: None,
            dry_run,
            rendered: IndexMap::new(),
            timings: PhaseTimings::default(),
            generated_at: Utc::now(),
        }
    }

    /// Record a written file under its destination package
    pub fn add_written(&mut self, destination: &str, path: &Path) {
        self.written
            .entry(destination.to_string())
            .or_default()
            .push(path.to_path_buf());
    }

    /// Total number of files written
    pub fn files_written(&self) -> usize {
        self.written.values().map(Vec::len).sum()
    }

    /// Whether anything needs the operator's attention
    pub fn has_warnings(&self) -> bool {
        !self.conflicts.is_empty()
            || !self.skipped.is_empty()
            || !self.missing.is_empty()
            || !self.collisions.is_empty()
            || !self.warnings.is_empty()
    }

    /// Phase profile of the run as pretty JSON
    pub fn to_profile_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Profile<'a> {
            from: &'a str,
            to: &'a str,
            generated_at: &'a DateTime<Utc>,
            total_millis: f64,
            phases: &'a [PhaseTiming],
        }

        let profile = Profile {
            from: &self.from,
            to: &self.to,
            generated_at: &self.generated_at,
            total_millis: self.timings.total_millis(),
            phases: &self.timings.phases,
        };
        Ok(serde_json::to_string_pretty(&profile)?)
    }
}

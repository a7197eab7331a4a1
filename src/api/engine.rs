//! Main relocation engine implementation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::results::{Collision, CollisionKind, RelocationReport};
use crate::core::config::{FidelityMode, MoveConfig, PrinterConfig};
use crate::core::context::BuildContext;
use crate::core::errors::{PkgMoveError, Result, ResultExt};
use crate::discovery::{collect_directories, locate, locate_or_plan, Collector, Target};
use crate::io::Printer;
use crate::loader::{LoadPlan, Loader, Program};
use crate::oracle::GoResolver;
use crate::rewrite::{rename_package_declaration, rewrite_affected, PackageNames, RelocationRequest};

/// What to move, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationOptions {
    /// Import path of the package to move
    pub from: String,
    /// Destination import path
    pub to: String,
    /// Import path of the subtree searched for importers; empty for the
    /// whole source root
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub fidelity: FidelityMode,
    #[serde(default)]
    pub verbose: bool,
    /// Render everything, write and move nothing
    #[serde(default)]
    pub dry_run: bool,
}

impl RelocationOptions {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            scope: String::new(),
            fidelity: FidelityMode::default(),
            verbose: false,
            dry_run: false,
        }
    }

    pub fn within(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn fidelity(mut self, fidelity: FidelityMode) -> Self {
        self.fidelity = fidelity;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the requested move
    pub fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(PkgMoveError::validation_field("source package is required", "from"));
        }
        if self.to.trim().is_empty() {
            return Err(PkgMoveError::validation_field("destination package is required", "to"));
        }
        if self.from == self.to {
            return Err(PkgMoveError::validation(format!(
                "source and destination are both {}",
                self.from
            )));
        }
        Ok(())
    }
}

/// Main pkgmove relocation engine
#[derive(Debug)]
pub struct RelocationEngine {
    ctx: BuildContext,
    printer: PrinterConfig,
}

impl RelocationEngine {
    /// Engine over the real filesystem described by `config`
    pub fn new(config: &MoveConfig) -> Result<Self> {
        info!("Initializing relocation engine");
        let ctx = BuildContext::from_config(config)?;
        debug!("source roots: {:?}", ctx.source_roots);
        Ok(Self {
            ctx,
            printer: config.printer.clone(),
        })
    }

    /// Engine over an explicit build context, e.g. an in-memory tree
    pub fn with_context(ctx: BuildContext, printer: PrinterConfig) -> Self {
        Self { ctx, printer }
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    /// Move `options.from` to `options.to` and rewrite every importer found
    /// under `options.scope`.
    pub fn run(&self, options: &RelocationOptions) -> Result<RelocationReport> {
        options.validate()?;
        let ctx = &self.ctx;
        let mut report = RelocationReport::new(&options.from, &options.to, options.dry_run);
        let mut clock = Instant::now();
        let mut lap = |report: &mut RelocationReport, phase: &str| {
            report.timings.record(phase, clock.elapsed());
            clock = Instant::now();
        };

        let root = locate(ctx, &options.scope).context("locate scope")?;
        info!("get in-pkg {}", root.path.display());
        let source = locate(ctx, &options.from)
            .map_err(|_| PkgMoveError::not_found("source package", options.from.clone()))?;
        if self.source_files(&source.path)?.is_empty() {
            // Only nested packages left, e.g. after an earlier move into a child.
            return Err(PkgMoveError::not_found("source package", options.from.clone()));
        }
        lap(&mut report, "locate");

        let dirs = collect_directories(ctx, &root)?;
        info!("collect candidate directories {}", dirs.len());
        lap(&mut report, "scan");

        let mut collector = Collector::new(ctx)?;
        let mut collection = collector.collect(&options.from, &root, &dirs)?;
        if !dirs.contains(&source.path) {
            // The moved package's own directory carries its external tests.
            let own = collector.collect(&options.from, &source, &[source.path.clone()])?;
            collection.units.extend(own.units);
            collection.skipped.extend(own.skipped);
        }
        report.skipped = collection.skipped;
        info!("collect affected packages {}", collection.units.len());
        lap(&mut report, "collect");

        let mut plan = LoadPlan::for_relocation(ctx, &options.from, &collection.units, options.fidelity);
        plan.import_if_present(&options.to);
        if plan.is_pruned() {
            warn!("pruned loading: packages outside the affected neighbourhood are stubbed");
        }
        let program = Loader::new(ctx)?.load(&plan)?;
        report.warnings = program.warnings.clone();
        lap(&mut report, "load");

        let names = PackageNames::derive(&program, &options.from, &options.to)?;
        let destination = locate(ctx, &options.to).ok();
        if let Some(existing) = &destination {
            report.collisions = self.collisions(&program, &source, existing, &names)?;
        }
        let clobbered: Vec<&str> = report
            .collisions
            .iter()
            .filter(|collision| collision.kind == CollisionKind::File)
            .map(|collision| collision.name.as_str())
            .collect();
        if !clobbered.is_empty() && !options.dry_run {
            return Err(PkgMoveError::validation_field(
                format!(
                    "destination {} already contains {}",
                    options.to,
                    clobbered.join(", ")
                ),
                "to",
            ));
        }

        let mut request = RelocationRequest::new(
            ctx,
            &options.from,
            &options.to,
            root.clone(),
            collection.units,
        )
        .verbose(options.verbose);
        rename_package_declaration(&program, &mut request, &names)?;
        rewrite_affected(&GoResolver::new(&program), &program, &mut request, &names)?;
        report.conflicts = std::mem::take(&mut request.diagnostics.conflicts);
        report.missing = std::mem::take(&mut request.diagnostics.missing);
        report.renamed = request.diagnostics.renamed;
        lap(&mut report, "rewrite");

        let mut printer = Printer::new(self.printer.clone())?;
        for pending in request.write_set.iter() {
            let text = printer.print(pending.file, &pending.edits)?;
            let path = &pending.file.path;
            if options.dry_run {
                report.rendered.insert(path.clone(), text);
            } else {
                ctx.fs
                    .write_file(path, &text)
                    .with_context(|| format!("write {}", path.display()))?;
                info!("write file {}", path.display());
            }
            report.add_written(&pending.destination, path);
        }
        lap(&mut report, "write");

        let target = match destination {
            Some(existing) => existing,
            None => locate_or_plan(ctx, &options.to, &source.dir)?,
        };
        report.moved = Some((source.path.clone(), target.path.clone()));
        if options.dry_run {
            info!("dry run: {} stays in place", source.pkg);
        } else {
            self.move_package(&source, &target)?;
        }
        lap(&mut report, "move");

        Ok(report)
    }

    fn move_package(&self, source: &Target, target: &Target) -> Result<()> {
        if target.needs_create {
            if let Some(parent) = target.path.parent() {
                self.ctx.fs.mkdir_all(parent)?;
            }
        }
        info!("move package {} -> {}", source.pkg, target.pkg);
        self.ctx
            .fs
            .move_dir(&source.path, &target.path, &self.ctx.move_scope())
    }

    /// Declarations and file names the moved package shares with an
    /// existing destination.
    fn collisions(
        &self,
        program: &Program,
        source: &Target,
        destination: &Target,
        names: &PackageNames,
    ) -> Result<Vec<Collision>> {
        let mut collisions = Vec::new();

        if let (Some(moved), Some(existing)) = (
            program.package(&source.pkg),
            program.package(&destination.pkg).filter(|p| !p.no_source),
        ) {
            if moved.name != existing.name {
                warn!(
                    "destination {} declares package {}, moved package declares {}",
                    destination.pkg, existing.name, moved.name
                );
            }
            for name in moved.decls.keys().filter(|name| existing.decls.contains_key(*name)) {
                if name == "_" || name == "init" {
                    continue;
                }
                collisions.push(Collision {
                    kind: CollisionKind::Declaration,
                    name: name.clone(),
                });
            }
        }

        let existing_files = self.source_files(&destination.path)?;
        for name in self.source_files(&source.path)?.intersection(&existing_files) {
            collisions.push(Collision {
                kind: CollisionKind::File,
                name: name.clone(),
            });
        }

        for collision in &collisions {
            warn!(
                "{} already has {:?} {} (moving {} as {})",
                destination.pkg, collision.kind, collision.name, source.pkg, names.to
            );
        }
        Ok(collisions)
    }

    fn source_files(&self, dir: &Path) -> Result<BTreeSet<String>> {
        Ok(self
            .ctx
            .fs
            .read_dir(dir)?
            .into_iter()
            .filter(|entry| !entry.is_dir && self.ctx.is_source_file(&entry.name))
            .map(|entry| entry.name)
            .collect())
    }
}

/// Run a relocation over the real filesystem described by `config`
pub fn relocate(config: &MoveConfig, options: &RelocationOptions) -> Result<RelocationReport> {
    RelocationEngine::new(config)?.run(options)
}

/// Files of `report` as `destination: path` lines, for logging
pub fn summary_lines(report: &RelocationReport) -> Vec<String> {
    report
        .written
        .iter()
        .flat_map(|(destination, paths)| {
            paths
                .iter()
                .map(move |path: &PathBuf| format!("{}: {}", destination, path.display()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryFileSystem;
    use std::sync::Arc;

    fn engine(packages: Vec<(&str, Vec<(&str, &str)>)>) -> (Arc<MemoryFileSystem>, RelocationEngine) {
        let fs = Arc::new(MemoryFileSystem::with_packages("/go/src", packages));
        let ctx = BuildContext::new(fs.clone(), vec![PathBuf::from("/go/src")]);
        (fs, RelocationEngine::with_context(ctx, PrinterConfig::default()))
    }

    #[test]
    fn test_options_validation() {
        assert!(RelocationOptions::new("foo", "foo").validate().is_err());
        assert!(RelocationOptions::new("", "bar").validate().is_err());
        assert!(RelocationOptions::new("foo", " ").validate().is_err());
        assert!(RelocationOptions::new("foo", "bar").validate().is_ok());
    }

    #[test]
    fn test_missing_source_is_not_found() {
        let (_, engine) = engine(vec![("main", vec![("0.go", "package main\n")])]);
        let err = engine.run(&RelocationOptions::new("foo", "bar")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_directory_without_sources_is_not_found() {
        let (_, engine) = engine(vec![
            ("foo/v2", vec![("0.go", "package v2\n\ntype T int\n")]),
            ("main", vec![("0.go", "package main\n\nimport \"foo/v2\"\n\nvar _ v2.T\n")]),
        ]);
        let err = engine
            .run(&RelocationOptions::new("foo", "foo/v2"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn test_dry_run_leaves_the_tree_alone() {
        let (fs, engine) = engine(vec![
            ("foo", vec![("0.go", "package foo\n\ntype T int\n")]),
            ("main", vec![("0.go", "package main\n\nimport \"foo\"\n\nvar _ foo.T\n")]),
        ]);
        let before = fs.snapshot();
        let report = engine
            .run(&RelocationOptions::new("foo", "bar").dry_run(true))
            .unwrap();

        assert_eq!(fs.snapshot(), before);
        assert_eq!(report.files_written(), 2);
        assert_eq!(
            report.rendered[Path::new("/go/src/main/0.go")],
            "package main\n\nimport \"bar\"\n\nvar _ bar.T\n"
        );
        assert_eq!(
            report.moved,
            Some((PathBuf::from("/go/src/foo"), PathBuf::from("/go/src/bar")))
        );
        for phase in ["locate", "scan", "collect", "load", "rewrite", "write", "move"] {
            assert!(report.timings.get(phase).is_some(), "missing phase {}", phase);
        }
    }

    #[test]
    fn test_existing_destination_collisions_are_reported() {
        let (fs, engine) = engine(vec![
            ("foo", vec![("0.go", "package foo\n\ntype T int\n\nfunc New() T { return 0 }\n")]),
            ("bar", vec![("1.go", "package bar\n\ntype T string\n")]),
            ("main", vec![("0.go", "package main\n\nimport \"foo\"\n\nvar _ foo.T\n")]),
        ]);
        let report = engine.run(&RelocationOptions::new("foo", "bar")).unwrap();

        assert_eq!(
            report.collisions,
            vec![Collision {
                kind: CollisionKind::Declaration,
                name: "T".into()
            }]
        );
        assert!(report.has_warnings());
        assert_eq!(
            fs.contents("/go/src/main/0.go").as_deref(),
            Some("package main\n\nimport \"bar\"\n\nvar _ bar.T\n")
        );
        assert_eq!(
            fs.contents("/go/src/bar/1.go").as_deref(),
            Some("package bar\n\ntype T string\n")
        );
        assert!(fs.contents("/go/src/bar/0.go").is_some());
    }

    #[test]
    fn test_file_collision_refuses_the_move() {
        let (fs, engine) = engine(vec![
            ("foo", vec![("0.go", "package foo\n\ntype T int\n")]),
            ("bar", vec![("0.go", "package bar\n\ntype U int\n")]),
            ("main", vec![("0.go", "package main\n\nimport \"foo\"\n\nvar _ foo.T\n")]),
        ]);
        let before = fs.snapshot();

        let preview = engine
            .run(&RelocationOptions::new("foo", "bar").dry_run(true))
            .unwrap();
        assert_eq!(
            preview.collisions,
            vec![Collision {
                kind: CollisionKind::File,
                name: "0.go".into()
            }]
        );

        let err = engine.run(&RelocationOptions::new("foo", "bar")).unwrap_err();
        assert!(err.to_string().contains("0.go"));
        assert_eq!(fs.snapshot(), before);
        assert_eq!(
            fs.contents("/go/src/bar/0.go").as_deref(),
            Some("package bar\n\ntype U int\n")
        );
    }

    #[test]
    fn test_summary_lines() {
        let mut report = RelocationReport::new("foo", "bar", false);
        report.add_written("bar", Path::new("/go/src/foo/0.go"));
        assert_eq!(summary_lines(&report), vec!["bar: /go/src/foo/0.go".to_string()]);
    }
}

//! Rewrites the packages that import the moved package.
//!
//! For each affected file the rewriter works out the local name the moved
//! package is imported under, checks that renaming it cannot collide with
//! another import, renames qualifiers of references the oracle resolves
//! into the moved package and finally substitutes the import paths.

use tracing::{debug, info, warn};
use tree_sitter::Node;

use super::bindings::{BindingTable, DestinationBinding, Substitution};
use super::{Conflict, Diagnostics, MissingFile, PackageNames, RelocationRequest, WriteSet};
use crate::core::ast::{walk, walk_tree, EditScript, QualifiedRef};
use crate::core::errors::{PkgMoveError, Result};
use crate::discovery::AffectedUnit;
use crate::lang::{last_segment, requote_like, unquote_go_string, ImportSpecNode, SourceFile};
use crate::loader::{PackageInfo, Program};
use crate::oracle::SymbolOracle;

/// An import that moves with the package.
#[derive(Debug)]
struct Candidate<'t> {
    spec: ImportSpecNode<'t>,
    literal: &'t str,
    replacement: String,
}

/// Import analysis of one file.
#[derive(Debug)]
struct ImportPlan<'t> {
    /// Local name the moved package is imported under
    import_name: String,
    candidates: Vec<Candidate<'t>>,
    bindings: BindingTable,
}

/// Rewrites affected units against a loaded program.
pub struct AffectedRewriter<'a, 'p, O: ?Sized> {
    oracle: &'a O,
    program: &'p Program,
    names: &'a PackageNames,
    substitution: Substitution,
    test_suffix: String,
    verbose: bool,
}

impl<'a, 'p, O> AffectedRewriter<'a, 'p, O>
where
    O: SymbolOracle + ?Sized,
{
    pub fn new(
        oracle: &'a O,
        program: &'p Program,
        names: &'a PackageNames,
        request: &RelocationRequest<'p>,
    ) -> Self {
        Self {
            oracle,
            program,
            names,
            substitution: request.substitution.clone(),
            test_suffix: request.test_suffix.clone(),
            verbose: request.verbose,
        }
    }

    /// Rewrite every file of every affected unit of `request`.
    pub fn rewrite(&self, request: &mut RelocationRequest<'p>) -> Result<()> {
        let RelocationRequest {
            affected,
            write_set,
            diagnostics,
            ..
        } = request;

        let before = diagnostics.renamed;
        let mut files = 0;
        for unit in affected.iter() {
            let package = self
                .program
                .package(&unit.pkg)
                .ok_or_else(|| PkgMoveError::resolution(unit.pkg.clone(), "package not found"))?;

            for name in &unit.files {
                let Some(file) = package.file(name) else {
                    warn!("{}/{} is not found", unit.pkg, name);
                    diagnostics.missing.push(MissingFile {
                        package: unit.pkg.clone(),
                        file: name.clone(),
                    });
                    continue;
                };
                self.rewrite_file(unit, package, file, write_set, diagnostics)?;
                files += 1;
            }
        }

        info!(
            "rewrite affected packages: {} files, {} references",
            files,
            diagnostics.renamed - before
        );
        Ok(())
    }

    fn rewrite_file(
        &self,
        unit: &AffectedUnit,
        package: &'p PackageInfo,
        file: &'p SourceFile,
        write_set: &mut WriteSet<'p>,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let plan = self.plan_imports(file)?;

        let mut skip = false;
        if plan.import_name != self.names.from {
            debug!(
                "{}/{} imports {} as {}; references left alone",
                unit.pkg,
                file.name,
                self.substitution.from(),
                plan.import_name
            );
            skip = true;
        }
        if let Some(DestinationBinding::Conflicting(paths)) = plan.bindings.lookup(&self.names.to) {
            warn!("conflict: {:?} (in {}/{})", paths, unit.pkg, file.name);
            diagnostics.conflicts.push(Conflict {
                file: file.path.clone(),
                package: unit.pkg.clone(),
                name: self.names.to.clone(),
                paths,
            });
            skip = true;
        }

        let destination = self
            .substitution
            .destination_of(&package.path, &self.test_suffix);
        let edits = write_set.entry(file, &package.path, &destination);

        if !skip {
            diagnostics.renamed += self.rename_references(unit, package, file, &plan, edits)?;
        }

        for candidate in &plan.candidates {
            edits.replace(
                candidate.spec.path,
                requote_like(candidate.literal, &candidate.replacement),
            );
            if let Some(alias) = candidate.spec.name {
                if file.text_of(alias) == plan.import_name && plan.import_name == self.names.from {
                    edits.replace(alias, self.names.to.clone());
                }
            }
        }
        Ok(())
    }

    fn plan_imports<'t>(&self, file: &'t SourceFile) -> Result<ImportPlan<'t>> {
        let mut specs = Vec::new();
        for spec in file.import_specs() {
            let literal = file.text_of(spec.path);
            let path = unquote_go_string(literal).ok_or_else(|| {
                PkgMoveError::malformed_import(literal, file.path.display().to_string())
            })?;
            specs.push((spec, literal, path));
        }

        let from = self.substitution.from();
        let mut import_name = self.names.from.clone();
        for (spec, _, path) in &specs {
            if path == from {
                if let Some(alias) = spec.name {
                    import_name = file.text_of(alias).to_string();
                }
            }
        }

        let mut candidates = Vec::new();
        let mut bindings = BindingTable::new();
        for (spec, literal, path) in specs {
            let alias = spec.name.map(|n| file.text_of(n));
            match self.substitution.apply(&path) {
                Some(replacement) => {
                    let bound = match alias {
                        Some(alias) if alias == import_name && import_name == self.names.from => {
                            self.names.to.clone()
                        }
                        Some(alias) => alias.to_string(),
                        None if path == from => self.names.to.clone(),
                        None => last_segment(&replacement).to_string(),
                    };
                    if !is_blank_or_dot(&bound) {
                        bindings.bind(&bound, &replacement);
                    }
                    candidates.push(Candidate {
                        spec,
                        literal,
                        replacement,
                    });
                }
                None => {
                    let bound = match alias {
                        Some(alias) => alias.to_string(),
                        None => self
                            .program
                            .package(&path)
                            .filter(|p| !p.no_source)
                            .map(|p| p.name.clone())
                            .unwrap_or_else(|| last_segment(&path).to_string()),
                    };
                    if !is_blank_or_dot(&bound) {
                        bindings.bind(&bound, &path);
                    }
                }
            }
        }

        Ok(ImportPlan {
            import_name,
            candidates,
            bindings,
        })
    }

    /// Rename the qualifiers of references resolving into the moved package
    /// (or into the file's own package). Returns the number of renamed
    /// identifiers.
    fn rename_references(
        &self,
        unit: &AffectedUnit,
        package: &PackageInfo,
        file: &'p SourceFile,
        plan: &ImportPlan<'_>,
        edits: &mut EditScript,
    ) -> Result<usize> {
        let from = self.substitution.from();
        let mut renamed = 0;

        let mut visit = |node: Node<'p>| -> Result<bool> {
            let Some(reference) = QualifiedRef::from_node(node) else {
                return Ok(true);
            };
            let Some(symbol) = self.oracle.resolve(file, reference.member) else {
                if self.verbose {
                    debug!(
                        "affected package, inspect, {:?} is unresolved (in {}/{})",
                        file.text_of(reference.member),
                        unit.pkg,
                        file.name
                    );
                }
                return Ok(true);
            };

            let owner = self.oracle.owning_package(&symbol);
            if owner != from && owner != package.path {
                return Ok(true);
            }

            walk_tree(reference.qualifier, &mut |ident: Node<'p>| {
                if matches!(ident.kind(), "identifier" | "package_identifier")
                    && file.text_of(ident) == plan.import_name
                    && !self.oracle.is_locally_bound(file, ident)
                {
                    edits.replace(ident, self.names.to.clone());
                    renamed += 1;
                }
            });
            Ok(false)
        };
        walk(file.root(), &mut visit)?;
        Ok(renamed)
    }
}

fn is_blank_or_dot(name: &str) -> bool {
    name == "_" || name == "."
}

/// Run the affected rewriter over `request` with `oracle`.
pub fn rewrite_affected<'p, O>(
    oracle: &O,
    program: &'p Program,
    request: &mut RelocationRequest<'p>,
    names: &PackageNames,
) -> Result<()>
where
    O: SymbolOracle + ?Sized,
{
    AffectedRewriter::new(oracle, program, names, request).rewrite(request)
}

#[cfg(test)]
#[path = "affected_tests.rs"]
mod tests;

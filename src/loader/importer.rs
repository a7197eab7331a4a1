//! Loads the packages named by a [`LoadPlan`] into a [`Program`].

use std::collections::{HashSet, VecDeque};
use std::path::Path;

use tracing::{debug, info, warn};

use super::plan::LoadPlan;
use super::program::{PackageInfo, Program};
use crate::core::context::BuildContext;
use crate::core::errors::{PkgMoveError, Result};
use crate::discovery::locate;
use crate::lang::{last_segment, GoAdapter, SourceFile};

/// Pseudo-packages that never have source.
const BUILTIN_PACKAGES: &[&str] = &["C", "unsafe"];

/// Parses packages from source following a plan.
#[derive(Debug)]
pub struct Loader<'a> {
    ctx: &'a BuildContext,
    adapter: GoAdapter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    /// Asked for by the plan
    Required { with_tests: bool },
    /// Reached through an import
    Transitive,
    /// Load only if it exists
    Optional,
}

/// Files of one directory split by role.
#[derive(Default)]
struct DirectoryFiles {
    primary: Vec<SourceFile>,
    xtest: Vec<SourceFile>,
}

impl<'a> Loader<'a> {
    pub fn new(ctx: &'a BuildContext) -> Result<Self> {
        Ok(Self {
            ctx,
            adapter: GoAdapter::new()?,
        })
    }

    /// Load every package of `plan`, plus whatever its fidelity requires.
    pub fn load(&mut self, plan: &LoadPlan) -> Result<Program> {
        let mut program = Program::new();
        program.pruned = plan.is_pruned();

        let mut queue: VecDeque<(String, Request)> = plan
            .imports
            .iter()
            .map(|(path, &with_tests)| (path.clone(), Request::Required { with_tests }))
            .collect();
        queue.extend(
            plan.optional
                .iter()
                .map(|path| (path.clone(), Request::Optional)),
        );
        let mut seen: HashSet<String> = HashSet::new();

        while let Some((path, request)) = queue.pop_front() {
            if !seen.insert(path.clone()) {
                continue;
            }

            if BUILTIN_PACKAGES.contains(&path.as_str()) {
                program.insert(PackageInfo::stub(&path));
                continue;
            }
            if request == Request::Transitive && !plan.parses(&path) {
                debug!("stub for {}", path);
                program.insert(PackageInfo::stub(&path));
                continue;
            }

            let target = match locate(self.ctx, &path) {
                Ok(target) => target,
                Err(err) if err.is_not_found() => {
                    match request {
                        Request::Optional => debug!("{} does not exist yet", path),
                        _ if plan.tolerates_errors() => {
                            let message = format!("cannot find package {}", path);
                            warn!("{}", message);
                            program.warnings.push(message);
                            program.insert(PackageInfo::stub(&path));
                        }
                        _ => return Err(err),
                    }
                    continue;
                }
                Err(err) => return Err(err),
            };

            let with_tests = matches!(request, Request::Required { with_tests: true });
            let files = self.read_directory(&path, &target.path, with_tests, plan, &mut program)?;

            if files.primary.is_empty() && files.xtest.is_empty() {
                let message = format!("no source files in {}", target.path.display());
                if matches!(request, Request::Optional) || plan.tolerates_errors() {
                    debug!("{}", message);
                    program.warnings.push(message);
                    if !matches!(request, Request::Optional) {
                        program.insert(PackageInfo::stub(&path));
                    }
                    continue;
                }
                return Err(PkgMoveError::resolution(&path, message));
            }

            for file in files.primary.iter().chain(files.xtest.iter()) {
                for spec in file.import_specs() {
                    if let Some(imported) = crate::lang::unquote_go_string(file.text_of(spec.path)) {
                        if !seen.contains(&imported) {
                            queue.push_back((imported, Request::Transitive));
                        }
                    }
                }
            }

            let name = package_name(&files.primary).unwrap_or_else(|| last_segment(&path).to_string());
            if !files.xtest.is_empty() {
                let twin_path = self.ctx.test_twin_path(&path);
                let twin_name = package_name(&files.xtest)
                    .unwrap_or_else(|| format!("{}{}", name, self.ctx.test_suffix));
                let mut twin =
                    PackageInfo::from_source(&twin_path, &twin_name, &target.path, files.xtest);
                twin.is_external_test = true;
                debug!("loaded {} ({} files)", twin_path, twin.files.len());
                program.insert(twin);
            }
            debug!("loaded {} ({} files)", path, files.primary.len());
            program.insert(PackageInfo::from_source(&path, &name, &target.path, files.primary));
        }

        program.index_declarations();
        info!(
            "loaded {} packages ({} from source)",
            program.packages().count(),
            program.packages().filter(|p| !p.no_source).count()
        );
        Ok(program)
    }

    fn read_directory(
        &mut self,
        pkg: &str,
        dir: &Path,
        with_tests: bool,
        plan: &LoadPlan,
        program: &mut Program,
    ) -> Result<DirectoryFiles> {
        let mut files = DirectoryFiles::default();
        for entry in self.ctx.fs.read_dir(dir)? {
            if entry.is_dir || !self.ctx.is_source_file(&entry.name) {
                continue;
            }
            let is_test_file = entry
                .name
                .strip_suffix(&format!(".{}", self.ctx.source_extension))
                .map_or(false, |stem| stem.ends_with("_test"));
            if is_test_file && !with_tests {
                continue;
            }

            let path = dir.join(&entry.name);
            let text = self.ctx.fs.read_file(&path)?;
            let file = self.adapter.parse_file(&path, text)?;

            if file.has_errors() {
                let (line, column) = file.first_error().unwrap_or((0, 0));
                if plan.tolerates_errors() || self.ctx.is_lenient(dir) {
                    let message = format!("{}:{}:{}: syntax error", path.display(), line, column);
                    warn!("{}", message);
                    program.warnings.push(message);
                } else {
                    return Err(PkgMoveError::parse_with_location(
                        "go",
                        format!("syntax error in package {}", pkg),
                        path.display().to_string(),
                        Some(line),
                        Some(column),
                    ));
                }
            }

            let is_xtest = file
                .package_name()
                .map_or(false, |name| self.ctx.is_test_package(name));
            if is_xtest && is_test_file {
                files.xtest.push(file);
            } else {
                files.primary.push(file);
            }
        }
        Ok(files)
    }
}

fn package_name(files: &[SourceFile]) -> Option<String> {
    files
        .iter()
        .find_map(|file| file.package_name().map(str::to_string))
}

//! Finding a package directory under the configured source roots.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::context::BuildContext;
use crate::core::errors::{PkgMoveError, Result};

/// A package directory resolved against a source root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Source root the package was found under
    pub dir: PathBuf,
    /// Import path of the package
    pub pkg: String,
    /// `dir` joined with `pkg`
    pub path: PathBuf,
    /// The directory does not exist yet
    pub needs_create: bool,
}

impl Target {
    /// Import path of a directory below this target's source root.
    /// `None` for the source root itself or for directories outside it.
    pub fn import_path_of(&self, dir: &Path) -> Option<String> {
        let relative = dir.strip_prefix(&self.dir).ok()?;
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if segments.is_empty() {
            None
        } else {
            Some(segments.join("/"))
        }
    }
}

/// First source root holding `pkg` as an existing directory.
pub fn locate(ctx: &BuildContext, pkg: &str) -> Result<Target> {
    locate_in(ctx, &ctx.source_roots, pkg)
}

/// [`locate`] over an explicit list of root candidates.
pub fn locate_in(ctx: &BuildContext, roots: &[PathBuf], pkg: &str) -> Result<Target> {
    roots
        .iter()
        .find_map(|root| {
            let path = ctx.join_path(root, pkg);
            ctx.fs.is_dir(&path).then(|| Target {
                dir: root.clone(),
                pkg: pkg.to_string(),
                path,
                needs_create: false,
            })
        })
        .ok_or_else(|| PkgMoveError::not_found("package", pkg))
}

/// Locate `pkg`, or describe where it will be created: under `fallback_root`
/// with `needs_create` set. Only a not-found outcome is absorbed.
pub fn locate_or_plan(ctx: &BuildContext, pkg: &str, fallback_root: &Path) -> Result<Target> {
    match locate(ctx, pkg) {
        Ok(target) => Ok(target),
        Err(err) if err.is_not_found() => Ok(Target {
            dir: fallback_root.to_path_buf(),
            pkg: pkg.to_string(),
            path: ctx.join_path(fallback_root, pkg),
            needs_create: true,
        }),
        Err(err) => Err(err),
    }
}

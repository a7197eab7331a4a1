//! Breadth-first search for directories that hold source files.

use std::collections::VecDeque;
use std::path::PathBuf;

use tracing::debug;

use super::locator::Target;
use crate::core::context::BuildContext;
use crate::core::errors::{Result, ResultExt};

/// Every directory below (and including) `root` with at least one source
/// file, in breadth-first order. Listings are sorted, so the order is stable.
pub fn collect_directories(ctx: &BuildContext, root: &Target) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut queue = VecDeque::from([root.path.clone()]);

    while let Some(dir) = queue.pop_front() {
        let entries = ctx
            .fs
            .read_dir(&dir)
            .context("collect source directories")?;

        let mut used = false;
        for entry in entries {
            if entry.is_dir {
                queue.push_back(dir.join(&entry.name));
                continue;
            }
            if !used && ctx.is_source_file(&entry.name) {
                debug!("source directory {}", dir.display());
                found.push(dir.clone());
                used = true;
            }
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::locator::locate;
    use crate::io::memory::MemoryFileSystem;
    use std::sync::Arc;

    #[test]
    fn test_breadth_first_and_nested_packages() {
        let fs = MemoryFileSystem::with_packages(
            "/go/src",
            vec![
                ("foo", vec![("0.go", "package foo"), ("1.go", "package foo")]),
                ("foo/a", vec![("0.go", "package a")]),
                ("foo/a/deep", vec![("0.go", "package deep")]),
                ("foo/b", vec![("README", "no go here")]),
                ("foo/c", vec![("0.go", "package c")]),
            ],
        );
        let ctx = BuildContext::new(Arc::new(fs), vec![PathBuf::from("/go/src")]);
        let root = locate(&ctx, "foo").unwrap();

        let dirs = collect_directories(&ctx, &root).unwrap();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/go/src/foo"),
                PathBuf::from("/go/src/foo/a"),
                PathBuf::from("/go/src/foo/c"),
                PathBuf::from("/go/src/foo/a/deep"),
            ]
        );
    }

    #[test]
    fn test_directory_without_sources_is_descended() {
        let fs = MemoryFileSystem::with_packages(
            "/go/src",
            vec![("empty", vec![]), ("empty/pkg", vec![("0.go", "package pkg")])],
        );
        let ctx = BuildContext::new(Arc::new(fs), vec![PathBuf::from("/go/src")]);
        let root = locate(&ctx, "empty").unwrap();
        assert_eq!(
            collect_directories(&ctx, &root).unwrap(),
            vec![PathBuf::from("/go/src/empty/pkg")]
        );
    }
}

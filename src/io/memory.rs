//! In-memory filesystem used to drive whole relocations in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::fs::{already_exists, DirEntry, FileSystem, MoveScope};
use crate::core::errors::{PkgMoveError, Result};

/// A fake filesystem: files keyed by absolute path, directories implied by
/// the files below them plus any explicitly created ones.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<BTreeMap<PathBuf, String>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
}

impl MemoryFileSystem {
    /// Create an empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a GOPATH-like tree: `packages` maps an import path to
    /// `(file name, contents)` pairs, placed under `root`.
    pub fn with_packages<'a, I, F>(root: impl AsRef<Path>, packages: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, F)>,
        F: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let fs = Self::new();
        let root = root.as_ref();
        fs.add_dir(root);
        for (import_path, files) in packages {
            let dir = fs.join_path(root, import_path);
            fs.add_dir(&dir);
            for (name, contents) in files {
                fs.add_file(dir.join(name), contents);
            }
        }
        fs
    }

    /// Insert or replace a file
    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        write_lock(&self.files).insert(path, contents.into());
    }

    /// Register a directory (and its parents)
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut dirs = write_lock(&self.dirs);
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    /// Current contents of a file
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        read_lock(&self.files).get(path.as_ref()).cloned()
    }

    /// Copy of every file
    pub fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        read_lock(&self.files).clone()
    }

    fn not_found(path: &Path) -> PkgMoveError {
        PkgMoveError::io(
            format!("{} does not exist", path.display()),
            io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
        )
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FileSystem for MemoryFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        read_lock(&self.dirs).contains(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        if !self.is_dir(path) {
            return Err(Self::not_found(path));
        }

        let mut entries = BTreeSet::new();
        for dir in read_lock(&self.dirs).iter() {
            if dir.parent() == Some(path) {
                if let Some(name) = dir.file_name() {
                    entries.insert(DirEntry::dir(name.to_string_lossy()));
                }
            }
        }
        for file in read_lock(&self.files).keys() {
            if file.parent() == Some(path) {
                if let Some(name) = file.file_name() {
                    entries.insert(DirEntry::file(name.to_string_lossy()));
                }
            }
        }
        Ok(entries.into_iter().collect())
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        self.contents(path).ok_or_else(|| Self::not_found(path))
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        match path.parent() {
            Some(parent) if self.is_dir(parent) => {
                write_lock(&self.files).insert(path.to_path_buf(), contents.to_string());
                Ok(())
            }
            _ => Err(Self::not_found(path)),
        }
    }

    fn mkdir_all(&self, path: &Path) -> Result<()> {
        self.add_dir(path);
        Ok(())
    }

    fn move_dir(&self, from: &Path, to: &Path, scope: &MoveScope) -> Result<()> {
        if !self.is_dir(from) {
            return Err(Self::not_found(from));
        }

        let moved: Vec<(PathBuf, PathBuf)> = read_lock(&self.files)
            .keys()
            .filter_map(|path| {
                let rest = path.strip_prefix(from).ok()?;
                if to != from && path.starts_with(to) {
                    return None;
                }
                let travels = match scope {
                    MoveScope::Subtree => true,
                    MoveScope::SourceFiles { .. } => {
                        rest.components().count() == 1
                            && scope.carries_file(&rest.to_string_lossy())
                    }
                };
                travels.then(|| (path.clone(), to.join(rest)))
            })
            .collect();

        {
            let files = read_lock(&self.files);
            if let Some((_, new)) = moved.iter().find(|(_, new)| files.contains_key(new)) {
                return Err(already_exists(new));
            }
        }
        self.add_dir(to);

        {
            let mut files = write_lock(&self.files);
            let mut relocated = Vec::with_capacity(moved.len());
            for (old, new) in &moved {
                if let Some(contents) = files.remove(old) {
                    relocated.push((new.clone(), contents));
                }
            }
            files.extend(relocated);
        }

        let new_parents: Vec<PathBuf> = moved
            .iter()
            .filter_map(|(_, new)| new.parent().map(Path::to_path_buf))
            .collect();
        for parent in new_parents {
            self.add_dir(parent);
        }

        if matches!(scope, MoveScope::Subtree) {
            let files = read_lock(&self.files);
            let mut dirs = write_lock(&self.dirs);
            dirs.retain(|dir| {
                !dir.starts_with(from)
                    || to.starts_with(dir)
                    || dir.starts_with(to)
                    || files.keys().any(|f| f.starts_with(dir))
            });
        }
        Ok(())
    }
}

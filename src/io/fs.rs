//! Filesystem facade.
//!
//! The relocation engine never calls `std::fs` directly; every directory
//! listing, read, write and move goes through [`FileSystem`] so a run can be
//! executed against [`MemoryFileSystem`](super::memory::MemoryFileSystem)
//! in tests.

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::{debug, info, warn};

use crate::core::errors::{PkgMoveError, Result};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    /// Base name of the entry
    pub name: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

impl DirEntry {
    /// Create a file entry
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    /// Create a directory entry
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// What a directory move carries along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveScope {
    /// Only the source files sitting directly in the directory; nested
    /// package directories stay where they are.
    SourceFiles {
        /// Source extension without the dot
        extension: String,
    },
    /// The whole directory tree.
    Subtree,
}

impl MoveScope {
    /// Whether a file directly inside the moved directory travels with it
    pub fn carries_file(&self, name: &str) -> bool {
        match self {
            Self::SourceFiles { extension } => has_extension(name, extension),
            Self::Subtree => true,
        }
    }
}

/// Abstract filesystem used by every phase of a relocation.
pub trait FileSystem: Debug + Send + Sync {
    /// Join an import-style relative path (`a/b/c`) onto a base directory.
    /// An empty relative path yields the base itself.
    fn join_path(&self, base: &Path, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(base.to_path_buf(), |acc, segment| acc.join(segment))
    }

    /// Whether the path exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// List a directory, sorted by entry name
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Read a whole file as UTF-8 text
    fn read_file(&self, path: &Path) -> Result<String>;

    /// Replace the contents of a file
    fn write_file(&self, path: &Path, contents: &str) -> Result<()>;

    /// Create a directory and all of its parents
    fn mkdir_all(&self, path: &Path) -> Result<()>;

    /// Move a package directory
    fn move_dir(&self, from: &Path, to: &Path, scope: &MoveScope) -> Result<()>;
}

/// `name` ends with `.<extension>`
pub fn has_extension(name: &str, extension: &str) -> bool {
    name.strip_suffix(extension)
        .map_or(false, |stem| stem.ends_with('.') && stem.len() > 1)
}

/// Error for a move that would replace an existing file
pub(crate) fn already_exists(path: &Path) -> PkgMoveError {
    PkgMoveError::io(
        format!("refusing to overwrite {}", path.display()),
        io::Error::new(io::ErrorKind::AlreadyExists, "destination file exists"),
    )
}

/// The real filesystem.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    use_git: bool,
}

impl Default for OsFileSystem {
    fn default() -> Self {
        Self { use_git: true }
    }
}

impl OsFileSystem {
    /// Create a facade; when `use_git` is set, moves inside a git work
    /// tree are staged in the index as renames.
    pub fn new(use_git: bool) -> Self {
        Self { use_git }
    }

    fn move_entry(&self, from: &Path, to: &Path, index: &mut Option<GitIndex>) -> Result<()> {
        if to.exists() {
            return Err(already_exists(to));
        }
        if let Some(parent) = to.parent() {
            self.mkdir_all(parent)?;
        }
        fs::rename(from, to).map_err(|e| {
            PkgMoveError::io(
                format!("Failed to move {} to {}", from.display(), to.display()),
                e,
            )
        })?;
        if let Some(git) = index.as_mut() {
            git.record_rename(from, to);
        }
        Ok(())
    }

    /// First destination path a move would overwrite.
    fn first_clobbered(&self, from: &Path, to: &Path, scope: &MoveScope) -> Result<Option<PathBuf>> {
        for entry in self.read_dir(from)? {
            let src = from.join(&entry.name);
            let dst = to.join(&entry.name);
            match scope {
                MoveScope::Subtree if entry.is_dir => {
                    if to.starts_with(&src) {
                        continue;
                    }
                    if let Some(path) = self.first_clobbered(&src, &dst, scope)? {
                        return Ok(Some(path));
                    }
                }
                MoveScope::SourceFiles { .. } if entry.is_dir || !scope.carries_file(&entry.name) => {}
                _ => {
                    if dst.exists() {
                        return Ok(Some(dst));
                    }
                }
            }
        }
        Ok(None)
    }

    fn move_tree(&self, from: &Path, to: &Path, index: &mut Option<GitIndex>) -> Result<()> {
        for entry in self.read_dir(from)? {
            let src = from.join(&entry.name);
            let dst = to.join(&entry.name);
            if to.starts_with(&src) {
                continue;
            }
            if entry.is_dir {
                self.move_tree(&src, &dst, index)?;
            } else {
                self.move_entry(&src, &dst, index)?;
            }
        }
        if fs::read_dir(from).map(|mut it| it.next().is_none()).unwrap_or(false) {
            // Leftover empty directories are not worth failing the run over.
            if let Err(err) = fs::remove_dir(from) {
                debug!("could not remove {}: {}", from.display(), err);
            }
        }
        Ok(())
    }
}

impl FileSystem for OsFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let reader = fs::read_dir(path).map_err(|e| {
            PkgMoveError::io(format!("Failed to read directory {}", path.display()), e)
        })?;

        let mut entries = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|e| {
                PkgMoveError::io(format!("Failed to read entry in {}", path.display()), e)
            })?;
            let file_type = entry
                .file_type()
                .map_err(|e| PkgMoveError::io("Failed to read file type", e))?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: file_type.is_dir(),
            });
        }
        entries.sort();
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .map_err(|e| PkgMoveError::io(format!("Failed to read {}", path.display()), e))
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents)
            .map_err(|e| PkgMoveError::io(format!("Failed to write {}", path.display()), e))
    }

    fn mkdir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| {
            PkgMoveError::io(format!("Failed to create directory {}", path.display()), e)
        })
    }

    fn move_dir(&self, from: &Path, to: &Path, scope: &MoveScope) -> Result<()> {
        if let Some(existing) = self.first_clobbered(from, to, scope)? {
            return Err(already_exists(&existing));
        }
        let mut index = if self.use_git {
            GitIndex::discover(from)
        } else {
            None
        };

        self.mkdir_all(to)?;
        match scope {
            MoveScope::Subtree => self.move_tree(from, to, &mut index)?,
            MoveScope::SourceFiles { .. } => {
                for entry in self.read_dir(from)? {
                    if entry.is_dir || !scope.carries_file(&entry.name) {
                        continue;
                    }
                    info!(
                        "mv {} {}",
                        from.join(&entry.name).display(),
                        to.join(&entry.name).display()
                    );
                    self.move_entry(&from.join(&entry.name), &to.join(&entry.name), &mut index)?;
                }
            }
        }

        if let Some(git) = index {
            git.write();
        }
        Ok(())
    }
}

/// Git index bookkeeping for moves inside a work tree.
struct GitIndex {
    repo: Repository,
    workdir: PathBuf,
    index: git2::Index,
}

impl GitIndex {
    fn discover(path: &Path) -> Option<Self> {
        let repo = Repository::discover(path).ok()?;
        let workdir = repo.workdir()?.canonicalize().ok()?;
        let index = repo.index().ok()?;
        info!("Located git repository: {}", workdir.display());
        Some(Self {
            repo,
            workdir,
            index,
        })
    }

    fn relative(&self, path: &Path) -> Option<PathBuf> {
        let absolute = match path.parent().and_then(|p| p.canonicalize().ok()) {
            Some(parent) => parent.join(path.file_name()?),
            None => path.to_path_buf(),
        };
        absolute
            .strip_prefix(&self.workdir)
            .ok()
            .map(Path::to_path_buf)
    }

    fn record_rename(&mut self, from: &Path, to: &Path) {
        let (Some(old), Some(new)) = (self.relative(from), self.relative(to)) else {
            return;
        };
        if self.index.get_path(&old, 0).is_none() {
            debug!("{} is not tracked, leaving index untouched", old.display());
            return;
        }
        if let Err(err) = self.index.remove_path(&old) {
            warn!("git: failed to unstage {}: {}", old.display(), err);
        }
        if let Err(err) = self.index.add_path(&new) {
            warn!("git: failed to stage {}: {}", new.display(), err);
        }
    }

    fn write(mut self) {
        if let Err(err) = self.index.write() {
            warn!(
                "git: failed to write index for {}: {}",
                self.repo.path().display(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        assert!(has_extension("0.go", "go"));
        assert!(has_extension("foo_test.go", "go"));
        assert!(!has_extension("go", "go"));
        assert!(!has_extension(".go", "go"));
        assert!(!has_extension("main.golang", "go"));
        assert!(!has_extension("README.md", "go"));
    }

    #[test]
    fn test_join_path_handles_empty_and_nested() {
        let fs = OsFileSystem::new(false);
        let base = Path::new("/go/src");
        assert_eq!(fs.join_path(base, ""), PathBuf::from("/go/src"));
        assert_eq!(fs.join_path(base, "foo/sub"), PathBuf::from("/go/src/foo/sub"));
    }

    #[test]
    fn test_os_round_trip_and_move() {
        let dir = tempfile::tempdir().unwrap();
        let fs = OsFileSystem::new(false);
        let foo = dir.path().join("foo");
        fs.mkdir_all(&foo.join("sub")).unwrap();
        fs.write_file(&foo.join("0.go"), "package foo\n").unwrap();
        fs.write_file(&foo.join("notes.txt"), "keep").unwrap();
        fs.write_file(&foo.join("sub").join("0.go"), "package sub\n").unwrap();

        let entries = fs.read_dir(&foo).unwrap();
        assert_eq!(
            entries,
            vec![DirEntry::file("0.go"), DirEntry::file("notes.txt"), DirEntry::dir("sub")]
        );

        let bar = dir.path().join("bar");
        fs.move_dir(
            &foo,
            &bar,
            &MoveScope::SourceFiles {
                extension: "go".into(),
            },
        )
        .unwrap();

        assert_eq!(fs.read_file(&bar.join("0.go")).unwrap(), "package foo\n");
        assert!(fs.is_dir(&foo.join("sub")));
        assert!(foo.join("notes.txt").exists());
        assert!(!bar.join("sub").exists());
    }

    #[test]
    fn test_os_subtree_move() {
        let dir = tempfile::tempdir().unwrap();
        let fs = OsFileSystem::new(false);
        let foo = dir.path().join("foo");
        fs.mkdir_all(&foo.join("sub")).unwrap();
        fs.write_file(&foo.join("0.go"), "package foo\n").unwrap();
        fs.write_file(&foo.join("sub").join("0.go"), "package sub\n").unwrap();

        let bar = dir.path().join("bar");
        fs.move_dir(&foo, &bar, &MoveScope::Subtree).unwrap();

        assert_eq!(fs.read_file(&bar.join("sub").join("0.go")).unwrap(), "package sub\n");
        assert!(!foo.exists());
    }

    #[test]
    fn test_os_move_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let fs = OsFileSystem::new(false);
        let foo = dir.path().join("foo");
        let bar = dir.path().join("bar");
        fs.mkdir_all(&foo).unwrap();
        fs.mkdir_all(&bar).unwrap();
        fs.write_file(&foo.join("0.go"), "package foo\n").unwrap();
        fs.write_file(&foo.join("1.go"), "package foo\n").unwrap();
        fs.write_file(&bar.join("1.go"), "package bar\n").unwrap();

        let scope = MoveScope::SourceFiles {
            extension: "go".into(),
        };
        assert!(fs.move_dir(&foo, &bar, &scope).is_err());
        assert!(fs.move_dir(&foo, &bar, &MoveScope::Subtree).is_err());

        assert_eq!(fs.read_file(&bar.join("1.go")).unwrap(), "package bar\n");
        assert!(foo.join("0.go").exists());
        assert!(!bar.join("0.go").exists());
    }
}

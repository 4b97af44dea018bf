//! Filesystem-backed paths
//!
//! A [`FilePath`] is a mapped [`Path`] under a file root, with direct
//! passthroughs to the operating system. OS-level failures (missing file,
//! permission denied) are logged and reported as `false`; only caller
//! mistakes are errors.

use crate::file_root::{is_valid_name, validate_segments, FileRoot, FsError};
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path as StdPath, PathBuf};
use std::sync::Arc;
use uri_mapper::{Mapper, Path, Root};
use uri_types::Uri;
use walkdir::WalkDir;

/// A location under a file root
#[derive(Debug, Clone)]
pub struct FilePath {
    path: Path,
}

impl FilePath {
    /// Creates a path under a file root
    ///
    /// `uri` follows [`Root::path`] and must not contain `.` or `..`
    /// segments.
    pub fn new(root: Arc<Root>, uri: Option<Uri>) -> Result<Self, FsError> {
        FileRoot::ensure_file_root(&root)?;
        if let Some(uri) = &uri {
            validate_segments(uri)?;
        }
        Ok(Self {
            path: Path::new(root, uri)?,
        })
    }

    /// Views a mapped path as a file path
    ///
    /// Fails unless the path lives under a file root.
    pub fn from_path(path: Path) -> Result<Self, FsError> {
        FileRoot::ensure_file_root(path.root())?;
        if let Some(relative) = path.relative_uri() {
            validate_segments(relative)?;
        }
        Ok(Self { path })
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> Path {
        self.path
    }

    /// Location on the local filesystem
    pub fn unix_path(&self) -> PathBuf {
        PathBuf::from(self.path.uri().path())
    }

    pub fn exists(&self) -> bool {
        self.unix_path().exists()
    }

    pub fn is_file(&self) -> bool {
        self.unix_path().is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.unix_path().is_dir()
    }

    /// Last path segment, empty for the filesystem root
    pub fn filename(&self) -> &str {
        self.path.uri().segments().last().unwrap_or_default()
    }

    /// Entries of this directory, sorted by name
    ///
    /// Children that fall under a more specific file root resolve to that
    /// root. A path that is not a readable directory has no children.
    /// Entries whose names are not valid UTF-8 are skipped.
    pub fn children(&self, mapper: &Mapper) -> Result<Vec<FilePath>, FsError> {
        let dir = self.unix_path();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                log_failure(&dir, "read_dir", &err);
                return Ok(Vec::new());
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => match entry.file_name().into_string() {
                    Ok(name) => names.push(name),
                    Err(name) => log_skipped(&dir, &name),
                },
                Err(err) => log_failure(&dir, "read_dir", &err),
            }
        }
        names.sort();

        let mut children = Vec::with_capacity(names.len());
        for name in names {
            if let Some(child) = self.path.descend(mapper, &name)? {
                children.push(FilePath::from_path(child)?);
            }
        }
        Ok(children)
    }

    /// All entries below this directory, depth first and sorted by name
    ///
    /// Symbolic links are listed but never followed. Entries resolve like
    /// [`children`](Self::children), and a directory whose name is not
    /// valid UTF-8 is skipped together with its contents.
    pub fn descendants(&self, mapper: &Mapper) -> Result<Vec<FilePath>, FsError> {
        let dir = self.unix_path();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut descendants = Vec::new();
        let mut walker = WalkDir::new(&dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(path = %dir.display(), error = %err, "Directory walk failed");
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(&dir) else {
                continue;
            };
            let Some(relative) = relative.to_str() else {
                log_skipped(&dir, relative.as_os_str());
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            };
            if let Some(descendant) = self.path.descend(mapper, relative)? {
                descendants.push(FilePath::from_path(descendant)?);
            }
        }
        Ok(descendants)
    }

    /// Creates the directory and any missing ancestors
    ///
    /// With `exclude_last`, only the parent directory is created.
    pub fn create_dir(&self, exclude_last: bool) -> bool {
        let path = self.unix_path();
        let target = if exclude_last {
            match path.parent() {
                Some(parent) => parent.to_path_buf(),
                None => return true,
            }
        } else {
            path
        };
        report(&target, "create_dir", fs::create_dir_all(&target))
    }

    /// Renames the entry within its directory
    ///
    /// On success the path points to the new name.
    pub fn rename(&mut self, new_name: &str) -> Result<bool, FsError> {
        if !is_valid_name(new_name) {
            return Err(FsError::InvalidName(new_name.to_string()));
        }
        let at_mount = self
            .path
            .relative_uri()
            .map_or(true, |relative| relative.path_depth() == 0);
        if at_mount {
            return Err(FsError::RenameRoot(self.path.to_string()));
        }

        let target = self.path.uri().ascend(1).descend(new_name);
        let from = self.unix_path();
        let to = PathBuf::from(target.path());
        if !report(&from, "rename", fs::rename(&from, &to)) {
            return Ok(false);
        }
        self.path.set_uri(Some(target))?;
        Ok(true)
    }

    /// Removes a file, or a directory's contents
    ///
    /// With `including_dir` the directory itself is removed as well.
    pub fn rm(&self, including_dir: bool) -> bool {
        let path = self.unix_path();
        let result = if path.is_dir() {
            if including_dir {
                fs::remove_dir_all(&path)
            } else {
                clear_dir(&path)
            }
        } else {
            fs::remove_file(&path)
        };
        report(&path, "remove", result)
    }
}

impl From<FilePath> for Path {
    fn from(file_path: FilePath) -> Self {
        file_path.path
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

fn clear_dir(dir: &StdPath) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

fn report(path: &StdPath, operation: &'static str, result: io::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log_failure(path, operation, &err);
            false
        }
    }
}

fn log_failure(path: &StdPath, operation: &'static str, err: &io::Error) {
    tracing::debug!(path = %path.display(), operation, error = %err, "Filesystem operation failed");
}

fn log_skipped(dir: &StdPath, name: &OsStr) {
    tracing::debug!(dir = %dir.display(), name = ?name, "Skipping entry with a non UTF-8 name");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_root(mapper: &mut Mapper, mount: &str) -> Arc<Root> {
        let root = FileRoot::new(mapper, Uri::unix_path(mount).unwrap()).unwrap();
        mapper.add_root(root).unwrap()
    }

    #[test]
    fn test_relative_dot_segments_rejected() {
        let mut mapper = Mapper::new();
        let root = file_root(&mut mapper, "/srv/");
        let result = FilePath::new(root, Some(Uri::unix_path("a/../b").unwrap()));
        assert!(matches!(result, Err(FsError::InvalidPath(_))));
    }

    #[test]
    fn test_unix_path_and_filename() {
        let mut mapper = Mapper::new();
        let root = file_root(&mut mapper, "/srv/");
        let path = FilePath::new(root, Some(Uri::unix_path("a/b.txt").unwrap())).unwrap();
        assert_eq!(path.unix_path(), PathBuf::from("/srv/a/b.txt"));
        assert_eq!(path.filename(), "b.txt");
        assert_eq!(path.to_string(), "/srv/a/b.txt");
    }

    #[test]
    fn test_filename_of_directory() {
        let mut mapper = Mapper::new();
        let root = file_root(&mut mapper, "/srv/data/");
        let path = FilePath::new(root, None).unwrap();
        assert_eq!(path.filename(), "data");
    }

    #[test]
    fn test_from_path_requires_file_root() {
        let mut mapper = Mapper::new();
        let root = Root::new(&mapper, Uri::parse("http://host/").unwrap()).unwrap();
        let root = mapper.add_root(root).unwrap();
        let path = root.path(None).unwrap();
        assert!(matches!(
            FilePath::from_path(path),
            Err(FsError::NotAFileRoot(_))
        ));
    }

    #[test]
    fn test_rename_rejects_invalid_names() {
        let mut mapper = Mapper::new();
        let root = file_root(&mut mapper, "/srv/");
        let mut path = FilePath::new(root, Some(Uri::unix_path("a").unwrap())).unwrap();
        for name in ["", ".", "..", "x/y"] {
            assert_eq!(
                path.rename(name),
                Err(FsError::InvalidName(name.to_string()))
            );
        }
    }

    #[test]
    fn test_rename_root_fails() {
        let mut mapper = Mapper::new();
        let root = file_root(&mut mapper, "/srv/");
        let mut path = FilePath::new(root, None).unwrap();
        assert!(matches!(path.rename("x"), Err(FsError::RenameRoot(_))));
    }
}

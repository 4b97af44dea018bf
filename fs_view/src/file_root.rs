//! Filesystem roots and path validation
//!
//! File roots are ordinary [`Root`]s mounted at unix paths. What makes them
//! file roots is validation: mount points and relative locations must not
//! contain `.` or `..` segments.

use thiserror::Error;
use uri_mapper::{Mapper, MapperError, Root};
use uri_types::{Uri, UriFlavor};

/// Errors raised by filesystem roots and paths
///
/// Ordinary OS failures are not errors; operations report them as `false`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsError {
    /// Mount or relative path contains `.` or `..`
    #[error("File paths must not contain '.' or '..' as path fragments: {0}")]
    InvalidPath(String),

    /// Root is not mounted at a unix path
    #[error("Not a file root: {0}")]
    NotAFileRoot(String),

    /// Rename target is not a plain file name
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    /// Attempted to rename the mount location itself
    #[error("Cannot rename file root {0}")]
    RenameRoot(String),

    /// Mapper rejected the operation
    #[error(transparent)]
    Mapper(#[from] MapperError),
}

/// Constructors and validation for filesystem roots
pub struct FileRoot;

impl FileRoot {
    /// Creates a root mounted at a unix path
    ///
    /// # Examples
    ///
    /// ```
    /// use fs_view::FileRoot;
    /// use uri_mapper::Mapper;
    /// use uri_types::Uri;
    ///
    /// let mapper = Mapper::new();
    /// assert!(FileRoot::new(&mapper, Uri::unix_path("/srv/data/").unwrap()).is_ok());
    /// assert!(FileRoot::new(&mapper, Uri::unix_path("/srv/../etc/").unwrap()).is_err());
    /// ```
    pub fn new(mapper: &Mapper, mount_uri: Uri) -> Result<Root, FsError> {
        Self::validate_file_path(&mount_uri)?;
        Ok(Root::new(mapper, mount_uri)?)
    }

    /// Checks that `uri` is a unix path without `.` or `..` segments
    pub fn validate_file_path(uri: &Uri) -> Result<(), FsError> {
        if uri.flavor() != UriFlavor::UnixPath {
            return Err(FsError::NotAFileRoot(uri.to_string()));
        }
        validate_segments(uri)
    }

    /// Checks that `root` was created as a file root
    pub fn ensure_file_root(root: &Root) -> Result<(), FsError> {
        Self::validate_file_path(root.mount_uri())
    }
}

/// Rejects `.` and `..` segments regardless of flavor
pub(crate) fn validate_segments(uri: &Uri) -> Result<(), FsError> {
    if uri.path().split('/').any(|segment| segment == "." || segment == "..") {
        return Err(FsError::InvalidPath(uri.path().to_string()));
    }
    Ok(())
}

/// Returns true if `name` can name an entry in a directory
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/') && !name.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unix(text: &str) -> Uri {
        Uri::unix_path(text).unwrap()
    }

    #[test]
    fn test_valid_mounts() {
        let mapper = Mapper::new();
        assert!(FileRoot::new(&mapper, unix("/")).is_ok());
        assert!(FileRoot::new(&mapper, unix("/srv/data")).is_ok());
        assert!(FileRoot::new(&mapper, unix("/srv/.hidden/")).is_ok());
    }

    #[test]
    fn test_dot_segments_rejected() {
        let mapper = Mapper::new();
        for mount in ["/srv/./data/", "/srv/../data/", "/srv/..", "/srv/."] {
            assert!(
                matches!(
                    FileRoot::new(&mapper, unix(mount)),
                    Err(FsError::InvalidPath(_))
                ),
                "{mount} should be rejected"
            );
        }
    }

    #[test]
    fn test_generic_mount_rejected() {
        let mapper = Mapper::new();
        let result = FileRoot::new(&mapper, Uri::parse("/srv/").unwrap());
        assert!(matches!(result, Err(FsError::NotAFileRoot(_))));
    }

    #[test]
    fn test_unrooted_mount_rejected() {
        let mapper = Mapper::new();
        let result = FileRoot::new(&mapper, unix("srv/"));
        assert!(matches!(
            result,
            Err(FsError::Mapper(MapperError::UnrootedUri(_)))
        ));
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("notes.txt"));
        assert!(is_valid_name(".profile"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("a\0b"));
    }
}

//! Navigable locations under a root
//!
//! A [`Path`] stores its location relative to its root and computes the
//! absolute URI on demand. Navigation that can leave the root (ascending
//! past its top, descending into a subroot, switching context) goes back
//! through the [`Mapper`] that owns the root.

use crate::error::MapperError;
use crate::mapper::Mapper;
use crate::root::Root;
use crate::validate::validate_relative_path;
use core_types::{Context, MapperId};
use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;
use uri_types::Uri;

/// A resolved location under a specific root
#[derive(Debug, Clone)]
pub struct Path {
    root: Arc<Root>,
    relative_uri: Option<Uri>,
    absolute_uri: OnceCell<Uri>,
}

impl Path {
    /// Creates a path under `root`
    ///
    /// See [`Root::path`].
    pub fn new(root: Arc<Root>, uri: Option<Uri>) -> Result<Self, MapperError> {
        let relative_uri = relative_to_root(&root, uri)?;
        Ok(Self {
            root,
            relative_uri,
            absolute_uri: OnceCell::new(),
        })
    }

    pub fn root(&self) -> &Arc<Root> {
        &self.root
    }

    pub fn context(&self) -> &Context {
        self.root.context()
    }

    pub fn mapper_id(&self) -> MapperId {
        self.root.mapper_id()
    }

    /// Location relative to the root prefix, `None` for the mount itself
    pub fn relative_uri(&self) -> Option<&Uri> {
        self.relative_uri.as_ref()
    }

    /// Moves the path to another location under the same root
    pub fn set_uri(&mut self, uri: Option<Uri>) -> Result<(), MapperError> {
        self.relative_uri = relative_to_root(&self.root, uri)?;
        self.absolute_uri = OnceCell::new();
        Ok(())
    }

    /// Absolute URI of this location
    pub fn uri(&self) -> &Uri {
        self.absolute_uri
            .get_or_init(|| match (&self.relative_uri, self.root.prefix_uri()) {
                (Some(relative), Some(prefix)) => prefix.apply_relative(relative),
                _ => self.root.mount_uri().clear_query_and_fragment(),
            })
    }

    /// Walks `levels` segments up, crossing into enclosing roots as needed
    ///
    /// Returns `None` once there is no enclosing root left to ascend into.
    pub fn ascend(&self, mapper: &Mapper, levels: usize) -> Result<Option<Path>, MapperError> {
        if levels == 0 {
            return Err(MapperError::InvalidAscendLevels);
        }
        mapper.ensure_owner(self.root.mapper_id(), "Path")?;

        let depth = self.relative_uri.as_ref().map_or(0, Uri::path_depth);
        if let Some(relative) = self.relative_uri.as_ref().filter(|_| depth >= levels) {
            return Path::new(Arc::clone(&self.root), Some(relative.ascend(levels))).map(Some);
        }

        match mapper.parent_root_path(&self.root)? {
            Some(parent) => parent.ascend(mapper, levels - depth),
            None => Ok(None),
        }
    }

    /// Walks down a relative path
    ///
    /// When the root allows subroots the target is resolved again, since it
    /// may lie in a more specific root.
    pub fn descend(&self, mapper: &Mapper, relative: &str) -> Result<Option<Path>, MapperError> {
        if relative.is_empty() {
            return Ok(Some(self.clone()));
        }
        validate_relative_path(relative)?;
        mapper.ensure_owner(self.root.mapper_id(), "Path")?;

        if !self.root.allows_subroots() {
            // No other root can match below this one.
            let base = match &self.relative_uri {
                Some(uri) => uri.clone(),
                None => self.root.mount_uri().empty_like(),
            };
            return Ok(Some(Path {
                root: Arc::clone(&self.root),
                relative_uri: Some(base.descend(relative)),
                absolute_uri: OnceCell::new(),
            }));
        }

        let target = self.uri().descend(relative);
        mapper.map_uri(&target, self.context().as_str())
    }

    /// Translates the path into another context
    ///
    /// Returns `None` if no join covers the translation.
    pub fn to_context(&self, mapper: &Mapper, context: &str) -> Result<Option<Path>, MapperError> {
        if self.context().as_str() == context {
            return Ok(Some(self.clone()));
        }
        mapper.map_path(self, context)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

fn relative_to_root(root: &Root, uri: Option<Uri>) -> Result<Option<Uri>, MapperError> {
    let prefix = root
        .prefix_uri()
        .ok_or_else(|| MapperError::NotADirectoryRoot(root.mount_uri().to_string()))?;
    match uri {
        Some(uri) if uri.is_rooted() => uri
            .make_relative_to(prefix)
            .map(Some)
            .map_err(|_| MapperError::OutsideRoot {
                uri: uri.to_string(),
                prefix: prefix.to_string(),
            }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(text: &str) -> Uri {
        Uri::parse(text).unwrap()
    }

    #[test]
    fn test_mount_path_uri_drops_query() {
        let mapper = Mapper::new();
        let root = Arc::new(Root::new(&mapper, uri("/a/?qs#f")).unwrap());
        let path = root.path(None).unwrap();
        assert!(path.relative_uri().is_none());
        assert_eq!(path.uri().to_string(), "/a/");
    }

    #[test]
    fn test_relative_and_absolute_construction_agree() {
        let mapper = Mapper::new();
        let root = Arc::new(Root::new(&mapper, uri("/a/")).unwrap());
        let from_relative = root.path(Some(uri("b/c"))).unwrap();
        let from_absolute = root.path(Some(uri("/a/b/c"))).unwrap();
        assert_eq!(from_relative.uri(), from_absolute.uri());
        assert_eq!(from_absolute.relative_uri().unwrap().to_string(), "b/c");
    }

    #[test]
    fn test_set_uri_invalidates_cached_uri() {
        let mapper = Mapper::new();
        let root = Arc::new(Root::new(&mapper, uri("/a/")).unwrap());
        let mut path = root.path(Some(uri("x"))).unwrap();
        assert_eq!(path.uri().to_string(), "/a/x");
        path.set_uri(Some(uri("/a/y/"))).unwrap();
        assert_eq!(path.uri().to_string(), "/a/y/");
        assert_eq!(path.to_string(), "/a/y/");
    }

    #[test]
    fn test_ascend_zero_levels_fails() {
        let mapper = Mapper::new();
        let root = Arc::new(Root::new(&mapper, uri("/a/")).unwrap());
        let path = root.path(Some(uri("b"))).unwrap();
        assert_eq!(
            path.ascend(&mapper, 0).unwrap_err(),
            MapperError::InvalidAscendLevels
        );
    }

    #[test]
    fn test_descend_validates_segment() {
        let mapper = Mapper::new();
        let root = Arc::new(Root::new(&mapper, uri("/a/")).unwrap());
        let path = root.path(None).unwrap();
        assert!(matches!(
            path.descend(&mapper, "/x"),
            Err(MapperError::InvalidRelativePath(_))
        ));
        assert!(matches!(
            path.descend(&mapper, "x//y"),
            Err(MapperError::InvalidRelativePath(_))
        ));
    }

    #[test]
    fn test_descend_empty_is_identity() {
        let mapper = Mapper::new();
        let root = Arc::new(Root::new(&mapper, uri("/a/")).unwrap());
        let path = root.path(Some(uri("b"))).unwrap();
        let same = path.descend(&mapper, "").unwrap().unwrap();
        assert_eq!(same.uri(), path.uri());
        assert!(Arc::ptr_eq(same.root(), path.root()));
    }

    #[test]
    fn test_navigation_with_foreign_mapper_fails() {
        let mapper = Mapper::new();
        let other = Mapper::new();
        let root = Arc::new(Root::new(&mapper, uri("/a/")).unwrap());
        let path = root.path(Some(uri("b/c"))).unwrap();
        assert_eq!(
            path.ascend(&other, 1).unwrap_err(),
            MapperError::ForeignMapper("Path")
        );
    }
}

//! Mount points

use crate::error::MapperError;
use crate::mapper::Mapper;
use crate::path::Path;
use crate::validate::{directory_prefix, ensure_rooted};
use core_types::{Context, MapperId, RootId};
use std::sync::Arc;
use uri_types::Uri;

/// A mount point binding a context to a subtree of the URI space
///
/// A root is configured while it is still owned by value and becomes
/// immutable once handed to [`Mapper::add_root`], which shares it behind an
/// `Arc`.
#[derive(Debug)]
pub struct Root {
    id: RootId,
    mapper_id: MapperId,
    mount_uri: Uri,
    context: Context,
    prefix_uri: Option<Uri>,
    allows_subroots: bool,
}

impl Root {
    /// Creates a root in the default context that allows subroots
    pub fn new(mapper: &Mapper, mount_uri: Uri) -> Result<Self, MapperError> {
        ensure_rooted(&mount_uri)?;
        let prefix_uri = directory_prefix(&mount_uri).map(Uri::clear_query_and_fragment);
        Ok(Self {
            id: RootId::new(),
            mapper_id: mapper.id(),
            mount_uri,
            context: Context::default(),
            prefix_uri,
            allows_subroots: true,
        })
    }

    /// Places the root in a context
    pub fn in_context(mut self, context: impl Into<Context>) -> Self {
        self.context = context.into();
        self
    }

    /// Sets whether other roots may be mounted beneath this one
    pub fn with_subroots(mut self, allows_subroots: bool) -> Self {
        self.allows_subroots = allows_subroots;
        self
    }

    pub fn id(&self) -> RootId {
        self.id
    }

    pub fn mapper_id(&self) -> MapperId {
        self.mapper_id
    }

    pub fn mount_uri(&self) -> &Uri {
        &self.mount_uri
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Directory form of the mount URI, `None` if it cannot hold children
    pub fn prefix_uri(&self) -> Option<&Uri> {
        self.prefix_uri.as_ref()
    }

    pub fn allows_subroots(&self) -> bool {
        self.allows_subroots
    }

    /// Builds a path under this root
    ///
    /// An absolute `uri` must lie under the prefix; a relative one is taken
    /// as is; `None` denotes the mount location itself.
    pub fn path(self: &Arc<Self>, uri: Option<Uri>) -> Result<Path, MapperError> {
        Path::new(Arc::clone(self), uri)
    }
}

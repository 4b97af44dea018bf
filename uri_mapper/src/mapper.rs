//! The mapper: registry and lookup dispatcher
//!
//! The mapper owns every registered root and join. Lookups run against
//! indices that are rebuilt lazily after any registration; the cache moves
//! through `Stale -> Building -> Fresh`, and a failed build always falls
//! back to `Stale` so the next lookup retries.

use crate::error::MapperError;
use crate::index::Index;
use crate::join::Join;
use crate::path::Path;
use crate::prefix::MatchKey;
use crate::root::Root;
use core_types::MapperId;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use uri_types::Uri;

/// Freshness of the lookup indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Stale,
    Building,
    Fresh,
}

/// Resets the cache to stale unless the build completed
struct BuildGuard<'a> {
    state: &'a Cell<CacheState>,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        if self.state.get() == CacheState::Building {
            self.state.set(CacheState::Stale);
        }
    }
}

/// Registry of roots and joins
///
/// Registration takes `&mut self`; lookups take `&self` and prime the
/// indices on demand. The mapper is not `Sync`: priming mutates the cache
/// through interior mutability.
#[derive(Debug)]
pub struct Mapper {
    id: MapperId,
    roots: Vec<Arc<Root>>,
    joins: Vec<Arc<Join>>,
    state: Cell<CacheState>,
    index: RefCell<Index>,
}

impl Mapper {
    pub fn new() -> Self {
        Self {
            id: MapperId::new(),
            roots: Vec::new(),
            joins: Vec::new(),
            state: Cell::new(CacheState::Stale),
            index: RefCell::new(Index::default()),
        }
    }

    pub fn id(&self) -> MapperId {
        self.id
    }

    pub fn roots(&self) -> &[Arc<Root>] {
        &self.roots
    }

    pub fn joins(&self) -> &[Arc<Join>] {
        &self.joins
    }

    pub fn cache_state(&self) -> CacheState {
        self.state.get()
    }

    pub fn is_primed(&self) -> bool {
        self.state.get() == CacheState::Fresh
    }

    /// Registers a root built for this mapper
    pub fn add_root(&mut self, root: impl Into<Arc<Root>>) -> Result<Arc<Root>, MapperError> {
        let root = root.into();
        self.ensure_owner(root.mapper_id(), "Root")?;
        self.roots.push(Arc::clone(&root));
        self.state.set(CacheState::Stale);
        Ok(root)
    }

    /// Registers several roots; stops at the first foreign one
    pub fn add_roots<R>(&mut self, roots: impl IntoIterator<Item = R>) -> Result<(), MapperError>
    where
        R: Into<Arc<Root>>,
    {
        for root in roots {
            self.add_root(root)?;
        }
        Ok(())
    }

    /// Registers a join built for this mapper
    ///
    /// Adding the same join twice is harmless; a different join wiring a
    /// join point to an already wired context fails on the next prime.
    pub fn add_join(&mut self, join: impl Into<Arc<Join>>) -> Result<Arc<Join>, MapperError> {
        let join = join.into();
        self.ensure_owner(join.mapper_id(), "Join")?;
        self.joins.push(Arc::clone(&join));
        self.state.set(CacheState::Stale);
        Ok(join)
    }

    /// Registers several joins; stops at the first foreign one
    pub fn add_joins<J>(&mut self, joins: impl IntoIterator<Item = J>) -> Result<(), MapperError>
    where
        J: Into<Arc<Join>>,
    {
        for join in joins {
            self.add_join(join)?;
        }
        Ok(())
    }

    /// Rebuilds the lookup indices
    ///
    /// Configuration errors are reported here. On failure the indices are
    /// emptied and the cache stays stale.
    pub fn prime(&self) -> Result<(), MapperError> {
        if self.state.get() == CacheState::Building {
            return Ok(());
        }
        self.state.set(CacheState::Building);
        let _guard = BuildGuard { state: &self.state };

        match Index::build(&self.roots, &self.joins) {
            Ok(index) => {
                tracing::debug!(
                    mapper = %self.id,
                    roots = self.roots.len(),
                    joins = self.joins.len(),
                    contexts = index.context_count(),
                    join_tables = index.join_table_count(),
                    "Primed URI mapper"
                );
                *self.index.borrow_mut() = index;
                self.state.set(CacheState::Fresh);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(mapper = %self.id, error = %err, "Failed to prime URI mapper");
                *self.index.borrow_mut() = Index::default();
                Err(err.into())
            }
        }
    }

    /// Resolves a URI to a path under the most specific enclosing root
    pub fn map_uri(&self, uri: &Uri, context: &str) -> Result<Option<Path>, MapperError> {
        match self.lookup_root(uri, context)? {
            Some(root) => root.path(Some(uri.clone())).map(Some),
            None => Ok(None),
        }
    }

    /// Most specific root in `context` enclosing `uri`
    pub fn lookup_root(&self, uri: &Uri, context: &str) -> Result<Option<Arc<Root>>, MapperError> {
        self.ensure_fresh()?;
        let root = self
            .index
            .borrow()
            .root_for(uri, context)
            .cloned();
        tracing::trace!(
            context,
            uri = %uri,
            root = ?root.as_ref().map(|root| root.mount_uri().to_string()),
            "Root lookup"
        );
        Ok(root)
    }

    /// The mount location of `root` as a path under its enclosing root
    pub fn parent_root_path(&self, root: &Root) -> Result<Option<Path>, MapperError> {
        self.ensure_owner(root.mapper_id(), "Root")?;
        self.ensure_fresh()?;
        let parent = self.index.borrow().parent_of(root).cloned();
        match parent {
            Some(parent) => parent.path(Some(root.mount_uri().clone())).map(Some),
            None => Ok(None),
        }
    }

    /// Root registered in `context` with the same mount text as `uri`
    ///
    /// Query and fragment are ignored, as is an optional trailing slash
    /// for trailing-slash insensitive URIs.
    pub fn root_with_uri(&self, uri: &Uri, context: &str) -> Result<Option<Arc<Root>>, MapperError> {
        self.ensure_fresh()?;
        let key = MatchKey::of(uri);
        Ok(self.index.borrow().root_with_text(&key.text, context).cloned())
    }

    /// Translates a path into another context
    ///
    /// A path already in `target_context` is returned unchanged.
    pub fn map_path(&self, path: &Path, target_context: &str) -> Result<Option<Path>, MapperError> {
        self.ensure_owner(path.mapper_id(), "Path")?;
        if path.context().as_str() == target_context {
            return Ok(Some(path.clone()));
        }
        match self.lookup_join(path.uri(), path.context().as_str(), target_context)? {
            Some(join) => join.map_path(self, path, target_context),
            None => Ok(None),
        }
    }

    /// Most specific join translating `uri` from `source_context` to `target_context`
    pub fn lookup_join(
        &self,
        uri: &Uri,
        source_context: &str,
        target_context: &str,
    ) -> Result<Option<Arc<Join>>, MapperError> {
        self.ensure_fresh()?;
        let join = self
            .index
            .borrow()
            .join_for(uri, source_context, target_context)
            .cloned();
        tracing::trace!(
            source_context,
            target_context,
            uri = %uri,
            found = join.is_some(),
            "Join lookup"
        );
        Ok(join)
    }

    pub(crate) fn ensure_owner(&self, owner: MapperId, what: &'static str) -> Result<(), MapperError> {
        if owner != self.id {
            return Err(MapperError::ForeignMapper(what));
        }
        Ok(())
    }

    fn ensure_fresh(&self) -> Result<(), MapperError> {
        match self.state.get() {
            CacheState::Stale => self.prime(),
            CacheState::Building | CacheState::Fresh => Ok(()),
        }
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

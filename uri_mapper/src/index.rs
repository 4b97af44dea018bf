//! Lookup indices built while priming a mapper

use crate::error::ConfigError;
use crate::join::Join;
use crate::prefix::{MatchKey, PrefixEntry, PrefixTable};
use crate::root::Root;
use core_types::{Context, JoinId, JoinPointId, RootId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use uri_types::Uri;

type ByContext<T> = HashMap<Context, T>;

/// Compiled root and join matchers
///
/// An index is rebuilt from scratch on every prime and never patched in
/// place, so a failed build leaves no partial state behind.
#[derive(Debug, Default)]
pub(crate) struct Index {
    roots: ByContext<PrefixTable<Arc<Root>>>,
    roots_by_text: ByContext<HashMap<String, Arc<Root>>>,
    parent_roots: ByContext<PrefixTable<Arc<Root>>>,
    parents: HashMap<RootId, Arc<Root>>,
    joins: ByContext<ByContext<PrefixTable<Arc<Join>>>>,
}

impl Index {
    pub fn build(roots: &[Arc<Root>], joins: &[Arc<Join>]) -> Result<Self, ConfigError> {
        let mut index = Index::default();
        index.index_roots(roots)?;
        index.index_parents(roots)?;
        index.index_joins(joins)?;
        Ok(index)
    }

    fn index_roots(&mut self, roots: &[Arc<Root>]) -> Result<(), ConfigError> {
        let mut entries: ByContext<Vec<PrefixEntry<Arc<Root>>>> = HashMap::new();
        let mut parent_entries: ByContext<Vec<PrefixEntry<Arc<Root>>>> = HashMap::new();

        for root in roots {
            let key = MatchKey::of(root.mount_uri());
            let by_text = self
                .roots_by_text
                .entry(root.context().clone())
                .or_default();
            match by_text.entry(key.text.clone()) {
                Entry::Occupied(existing) if existing.get().id() == root.id() => continue,
                Entry::Occupied(_) => {
                    return Err(ConfigError::AmbiguousRoot {
                        context: root.context().clone(),
                        uri: key.text,
                    })
                }
                Entry::Vacant(slot) => {
                    slot.insert(Arc::clone(root));
                }
            }

            if let Some(boundary) = root.prefix_uri().and(key.parent_boundary()) {
                parent_entries
                    .entry(root.context().clone())
                    .or_default()
                    .push(PrefixEntry::new(key.text.clone(), boundary, Arc::clone(root)));
            }
            entries
                .entry(root.context().clone())
                .or_default()
                .push(PrefixEntry::new(key.text.clone(), key.mount_boundary(), Arc::clone(root)));
        }

        self.roots = compile(entries);
        self.parent_roots = compile(parent_entries);
        Ok(())
    }

    fn index_parents(&mut self, roots: &[Arc<Root>]) -> Result<(), ConfigError> {
        for root in roots {
            let Some(table) = self.parent_roots.get(root.context()) else {
                continue;
            };
            let Some(parent) = table.lookup(root.mount_uri()) else {
                continue;
            };
            if !parent.allows_subroots() {
                return Err(ConfigError::ForbiddenSubroot {
                    context: root.context().clone(),
                    parent: parent.mount_uri().to_string(),
                    subroot: root.mount_uri().to_string(),
                });
            }
            self.parents.insert(root.id(), Arc::clone(parent));
        }
        Ok(())
    }

    fn index_joins(&mut self, joins: &[Arc<Join>]) -> Result<(), ConfigError> {
        let mut wiring: HashMap<(JoinPointId, Context), JoinId> = HashMap::new();
        let mut by_text: HashMap<(Context, Context, String), JoinId> = HashMap::new();
        let mut entries: ByContext<ByContext<Vec<PrefixEntry<Arc<Join>>>>> = HashMap::new();

        for join in joins {
            for source in join.source_join_points() {
                let key = MatchKey::of(source.uri());
                for destination in join.destination_join_points() {
                    let target = destination.context();
                    if target == source.context() {
                        continue;
                    }

                    match wiring.entry((source.id(), target.clone())) {
                        Entry::Occupied(wired) if *wired.get() == join.id() => continue,
                        Entry::Occupied(_) => {
                            return Err(ConfigError::DuplicateJoinWiring {
                                join_point: source.uri().to_string(),
                                target_context: target.clone(),
                            })
                        }
                        Entry::Vacant(slot) => {
                            slot.insert(join.id());
                        }
                    }

                    let text_key = (source.context().clone(), target.clone(), key.text.clone());
                    match by_text.entry(text_key) {
                        Entry::Occupied(claimed) if *claimed.get() == join.id() => continue,
                        Entry::Occupied(_) => {
                            return Err(ConfigError::AmbiguousJoin {
                                source_context: source.context().clone(),
                                target_context: target.clone(),
                                uri: key.text.clone(),
                            })
                        }
                        Entry::Vacant(slot) => {
                            slot.insert(join.id());
                        }
                    }

                    entries
                        .entry(source.context().clone())
                        .or_default()
                        .entry(target.clone())
                        .or_default()
                        .push(PrefixEntry::new(
                            key.text.clone(),
                            key.mount_boundary(),
                            Arc::clone(join),
                        ));
                }
            }
        }

        self.joins = entries
            .into_iter()
            .map(|(source, targets)| (source, compile(targets)))
            .collect();
        Ok(())
    }

    /// Most specific root in `context` enclosing `uri`
    pub fn root_for(&self, uri: &Uri, context: &str) -> Option<&Arc<Root>> {
        self.roots.get(context)?.lookup(uri)
    }

    /// Root registered under exactly this match text
    pub fn root_with_text(&self, match_text: &str, context: &str) -> Option<&Arc<Root>> {
        self.roots_by_text.get(context)?.get(match_text)
    }

    /// Nearest root strictly enclosing `root`
    pub fn parent_of(&self, root: &Root) -> Option<&Arc<Root>> {
        self.parents.get(&root.id())
    }

    /// Most specific join translating `uri` from `source` to `target`
    pub fn join_for(&self, uri: &Uri, source: &str, target: &str) -> Option<&Arc<Join>> {
        self.joins.get(source)?.get(target)?.lookup(uri)
    }

    pub fn context_count(&self) -> usize {
        self.roots.len()
    }

    pub fn join_table_count(&self) -> usize {
        self.joins.values().map(HashMap::len).sum()
    }
}

fn compile<T>(entries: ByContext<Vec<PrefixEntry<T>>>) -> ByContext<PrefixTable<T>> {
    entries
        .into_iter()
        .map(|(context, entries)| (context, PrefixTable::new(entries)))
        .collect()
}

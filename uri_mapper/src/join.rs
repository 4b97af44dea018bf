//! Cross-context splices
//!
//! A [`Join`] ties together [`JoinPoint`]s living in different contexts.
//! Translating a path copies its location relative to the source join
//! point onto the destination join point, then resolves the result in the
//! target context.

use crate::error::MapperError;
use crate::mapper::Mapper;
use crate::path::Path;
use crate::validate::{directory_prefix, ensure_rooted};
use core_types::{Context, JoinId, JoinPointId, MapperId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uri_types::{Uri, UriError};

/// Which direction(s) a join point takes part in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinRole {
    Source,
    Destination,
    #[default]
    Both,
}

impl JoinRole {
    pub fn is_source(self) -> bool {
        matches!(self, JoinRole::Source | JoinRole::Both)
    }

    pub fn is_destination(self) -> bool {
        matches!(self, JoinRole::Destination | JoinRole::Both)
    }
}

/// One endpoint of a join
#[derive(Debug)]
pub struct JoinPoint {
    id: JoinPointId,
    mapper_id: MapperId,
    uri: Uri,
    context: Context,
    role: JoinRole,
    prefix_uri: Option<Uri>,
}

impl JoinPoint {
    /// Creates a join point in the default context with [`JoinRole::Both`]
    pub fn new(mapper: &Mapper, uri: Uri) -> Result<Self, MapperError> {
        ensure_rooted(&uri)?;
        let prefix_uri = directory_prefix(&uri).cloned();
        Ok(Self {
            id: JoinPointId::new(),
            mapper_id: mapper.id(),
            uri,
            context: Context::default(),
            role: JoinRole::default(),
            prefix_uri,
        })
    }

    pub fn in_context(mut self, context: impl Into<Context>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_role(mut self, role: JoinRole) -> Self {
        self.role = role;
        self
    }

    pub fn id(&self) -> JoinPointId {
        self.id
    }

    pub fn mapper_id(&self) -> MapperId {
        self.mapper_id
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn role(&self) -> JoinRole {
        self.role
    }

    /// Directory form of the join point URI
    ///
    /// Unlike a root prefix this keeps the query and fragment, so they are
    /// carried onto translated paths that land on the join point itself.
    pub fn prefix_uri(&self) -> Option<&Uri> {
        self.prefix_uri.as_ref()
    }
}

/// A set of join points, at most one per context and direction
#[derive(Debug)]
pub struct Join {
    id: JoinId,
    mapper_id: MapperId,
    sources: BTreeMap<Context, Arc<JoinPoint>>,
    destinations: BTreeMap<Context, Arc<JoinPoint>>,
}

impl Join {
    /// Creates a join from its points
    ///
    /// Fails if a point belongs to another mapper, or if two points share a
    /// context in the same direction.
    pub fn new(
        mapper: &Mapper,
        points: impl IntoIterator<Item = Arc<JoinPoint>>,
    ) -> Result<Self, MapperError> {
        let mut sources = BTreeMap::new();
        let mut destinations = BTreeMap::new();

        for point in points {
            mapper.ensure_owner(point.mapper_id(), "JoinPoint")?;
            if point.role().is_source() {
                insert_unique(&mut sources, &point, "source")?;
            }
            if point.role().is_destination() {
                insert_unique(&mut destinations, &point, "destination")?;
            }
        }

        Ok(Self {
            id: JoinId::new(),
            mapper_id: mapper.id(),
            sources,
            destinations,
        })
    }

    pub fn id(&self) -> JoinId {
        self.id
    }

    pub fn mapper_id(&self) -> MapperId {
        self.mapper_id
    }

    pub fn source_join_point(&self, context: &str) -> Option<&Arc<JoinPoint>> {
        self.sources.get(context)
    }

    pub fn destination_join_point(&self, context: &str) -> Option<&Arc<JoinPoint>> {
        self.destinations.get(context)
    }

    /// Source points, ordered by context
    pub fn source_join_points(&self) -> impl Iterator<Item = &Arc<JoinPoint>> {
        self.sources.values()
    }

    /// Destination points, ordered by context
    pub fn destination_join_points(&self) -> impl Iterator<Item = &Arc<JoinPoint>> {
        self.destinations.values()
    }

    /// Translates `path` into `target_context`
    ///
    /// The join must have a source point in the path's context and a
    /// destination point in the target context. The translated URI is
    /// resolved through `mapper`, so it may land in a nested root.
    pub fn map_path(
        &self,
        mapper: &Mapper,
        path: &Path,
        target_context: &str,
    ) -> Result<Option<Path>, MapperError> {
        let unmappable = || MapperError::UnmappableJoin {
            source_context: path.context().clone(),
            target_context: Context::from(target_context),
        };
        let source = self
            .source_join_point(path.context().as_str())
            .ok_or_else(unmappable)?;
        let destination = self
            .destination_join_point(target_context)
            .ok_or_else(unmappable)?;

        let uri = path.uri();
        let relative = match source.prefix_uri() {
            Some(prefix) => uri.make_relative_to(prefix)?,
            None if uri.text_without_query_or_fragment()
                == source.uri().text_without_query_or_fragment() =>
            {
                uri.empty_like()
                    .with_query(uri.query())
                    .with_fragment(uri.fragment())
            }
            None => {
                return Err(UriError::NotAPrefix {
                    uri: uri.to_string(),
                    base: source.uri().to_string(),
                }
                .into())
            }
        };

        let base = destination.prefix_uri().unwrap_or(destination.uri());
        let translated = base.apply_relative(&relative);
        mapper.map_uri(&translated, target_context)
    }
}

fn insert_unique(
    points: &mut BTreeMap<Context, Arc<JoinPoint>>,
    point: &Arc<JoinPoint>,
    role: &'static str,
) -> Result<(), MapperError> {
    if points.contains_key(point.context()) {
        return Err(MapperError::DuplicateJoinPoint {
            role,
            context: point.context().clone(),
        });
    }
    points.insert(point.context().clone(), Arc::clone(point));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(mapper: &Mapper, uri: &str, context: &str) -> Arc<JoinPoint> {
        Arc::new(
            JoinPoint::new(mapper, Uri::parse(uri).unwrap())
                .unwrap()
                .in_context(context),
        )
    }

    #[test]
    fn test_join_point_requires_rooted_uri() {
        let mapper = Mapper::new();
        let result = JoinPoint::new(&mapper, Uri::parse("x/").unwrap());
        assert!(matches!(result, Err(MapperError::UnrootedUri(_))));
    }

    #[test]
    fn test_join_point_prefix_keeps_query() {
        let mapper = Mapper::new();
        let jp = point(&mapper, "http://host/x/?qs#f", "d");
        assert_eq!(jp.prefix_uri().unwrap().to_string(), "http://host/x/?qs#f");
        assert_eq!(jp.role(), JoinRole::Both);
    }

    #[test]
    fn test_roles_partition_points() {
        let mapper = Mapper::new();
        let a = point(&mapper, "/a/", "");
        let b = Arc::new(
            JoinPoint::new(&mapper, Uri::parse("http://host/x/").unwrap())
                .unwrap()
                .in_context("d")
                .with_role(JoinRole::Destination),
        );
        let join = Join::new(&mapper, [a, b]).unwrap();
        assert!(join.source_join_point("").is_some());
        assert!(join.destination_join_point("").is_some());
        assert!(join.source_join_point("d").is_none());
        assert!(join.destination_join_point("d").is_some());
        assert_eq!(join.source_join_points().count(), 1);
        assert_eq!(join.destination_join_points().count(), 2);
    }

    #[test]
    fn test_duplicate_context_per_role_fails() {
        let mapper = Mapper::new();
        let result = Join::new(&mapper, [point(&mapper, "/a/", "x"), point(&mapper, "/b/", "x")]);
        assert!(matches!(
            result,
            Err(MapperError::DuplicateJoinPoint { role: "source", .. })
        ));
    }

    #[test]
    fn test_source_and_destination_may_share_context() {
        let mapper = Mapper::new();
        let source = Arc::new(
            JoinPoint::new(&mapper, Uri::parse("/a/").unwrap())
                .unwrap()
                .with_role(JoinRole::Source),
        );
        let destination = Arc::new(
            JoinPoint::new(&mapper, Uri::parse("/b/").unwrap())
                .unwrap()
                .with_role(JoinRole::Destination),
        );
        assert!(Join::new(&mapper, [source, destination]).is_ok());
    }

    #[test]
    fn test_foreign_join_point_fails() {
        let mapper = Mapper::new();
        let other = Mapper::new();
        let result = Join::new(&mapper, [point(&other, "/a/", "")]);
        assert_eq!(
            result.unwrap_err(),
            MapperError::ForeignMapper("JoinPoint")
        );
    }

    #[test]
    fn test_role_serde() {
        let role: JoinRole = serde_json::from_str("\"destination\"").unwrap();
        assert_eq!(role, JoinRole::Destination);
        assert_eq!(serde_json::to_string(&JoinRole::Both).unwrap(), "\"both\"");
    }
}

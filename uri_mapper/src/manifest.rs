//! Declarative mapper configuration.
//!
//! A JSON manifest lists the roots and joins of a mapper. The loader
//! validates the manifest; [`MapperManifest::build`] turns it into a primed
//! [`Mapper`], so configuration errors surface at load time instead of on
//! the first lookup.

use crate::error::MapperError;
use crate::join::{Join, JoinPoint, JoinRole};
use crate::mapper::Mapper;
use crate::root::Root;
use core_types::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use uri_types::{Uri, UriError, UriFlavor};

pub const MANIFEST_FILE_NAME: &str = "uri_mapper.json";

/// Manifest major version this crate understands.
pub const SUPPORTED_MAJOR_VERSION: u32 = 1;

/// Manifest format version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestFormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl ManifestFormatVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// Top-level mapper manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperManifest {
    pub format_version: ManifestFormatVersion,
    #[serde(default)]
    pub roots: Vec<RootSpec>,
    #[serde(default)]
    pub joins: Vec<JoinSpec>,
}

/// Root declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootSpec {
    pub uri: String,
    #[serde(default)]
    pub flavor: UriFlavor,
    #[serde(default)]
    pub context: Context,
    #[serde(default = "default_allow_subroots")]
    pub allow_subroots: bool,
}

fn default_allow_subroots() -> bool {
    true
}

/// Join declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinSpec {
    pub points: Vec<JoinPointSpec>,
}

/// Join point declaration.
///
/// Points declared with the same `id` are one join point, which lets a
/// single point take part in several joins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinPointSpec {
    #[serde(default)]
    pub id: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub flavor: UriFlavor,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub role: JoinRole,
}

/// Errors related to loading or building mapper manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Mapper manifest not found: {0}")]
    NotFound(String),

    #[error("Failed to read manifest: {0}")]
    Io(String),

    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Unsupported manifest version {major}.{minor}")]
    UnsupportedVersion { major: u32, minor: u32 },

    #[error("Join point {0:?} is declared twice with different settings")]
    ConflictingJoinPoint(String),

    #[error("Invalid URI: {0}")]
    Uri(#[from] UriError),

    #[error(transparent)]
    Mapper(#[from] MapperError),
}

impl MapperManifest {
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.format_version.major != SUPPORTED_MAJOR_VERSION {
            return Err(ManifestError::UnsupportedVersion {
                major: self.format_version.major,
                minor: self.format_version.minor,
            });
        }

        for root in &self.roots {
            check_rooted(root.flavor, &root.uri)?;
        }

        let mut declared: HashMap<&str, &JoinPointSpec> = HashMap::new();
        for (index, join) in self.joins.iter().enumerate() {
            if join.points.is_empty() {
                return Err(ManifestError::InvalidManifest(format!(
                    "Join {index} has no join points"
                )));
            }
            for point in &join.points {
                check_rooted(point.flavor, &point.uri)?;
                let Some(id) = point.id.as_deref() else {
                    continue;
                };
                match declared.get(id) {
                    Some(previous) if *previous != point => {
                        return Err(ManifestError::ConflictingJoinPoint(id.to_string()))
                    }
                    Some(_) => {}
                    None => {
                        declared.insert(id, point);
                    }
                }
            }
        }

        Ok(())
    }

    /// Builds and primes a mapper from the manifest
    pub fn build(&self) -> Result<Mapper, ManifestError> {
        self.validate()?;
        let mut mapper = Mapper::new();

        for spec in &self.roots {
            let root = Root::new(&mapper, Uri::parse_as(spec.flavor, &spec.uri)?)?
                .in_context(spec.context.clone())
                .with_subroots(spec.allow_subroots);
            mapper.add_root(root)?;
        }

        let mut shared: HashMap<&str, Arc<JoinPoint>> = HashMap::new();
        for spec in &self.joins {
            let mut points = Vec::with_capacity(spec.points.len());
            for point_spec in &spec.points {
                let existing = point_spec.id.as_deref().and_then(|id| shared.get(id));
                let point = match existing {
                    Some(point) => Arc::clone(point),
                    None => {
                        let point = Arc::new(point_spec.to_join_point(&mapper)?);
                        if let Some(id) = point_spec.id.as_deref() {
                            shared.insert(id, Arc::clone(&point));
                        }
                        point
                    }
                };
                points.push(point);
            }
            let join = Join::new(&mapper, points)?;
            mapper.add_join(join)?;
        }

        mapper.prime()?;
        tracing::debug!(
            roots = self.roots.len(),
            joins = self.joins.len(),
            shared_join_points = shared.len(),
            "Built URI mapper from manifest"
        );
        Ok(mapper)
    }
}

impl JoinPointSpec {
    fn to_join_point(&self, mapper: &Mapper) -> Result<JoinPoint, ManifestError> {
        let uri = Uri::parse_as(self.flavor, &self.uri)?;
        Ok(JoinPoint::new(mapper, uri)?
            .in_context(self.context.clone())
            .with_role(self.role))
    }
}

fn check_rooted(flavor: UriFlavor, text: &str) -> Result<(), ManifestError> {
    if !Uri::parse_as(flavor, text)?.is_rooted() {
        return Err(ManifestError::InvalidManifest(format!(
            "URI {text:?} must be rooted"
        )));
    }
    Ok(())
}

/// Loads mapper manifests from disk.
pub struct ManifestLoader;

impl ManifestLoader {
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<MapperManifest, ManifestError> {
        let manifest_path = PathBuf::from(dir.as_ref()).join(MANIFEST_FILE_NAME);
        if !manifest_path.exists() {
            return Err(ManifestError::NotFound(
                manifest_path.display().to_string(),
            ));
        }
        Self::load_from_path(manifest_path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<MapperManifest, ManifestError> {
        let data = fs::read_to_string(path.as_ref())
            .map_err(|err| ManifestError::Io(err.to_string()))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<MapperManifest, ManifestError> {
        let manifest: MapperManifest =
            serde_json::from_str(data).map_err(|err| ManifestError::Parse(err.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }
}

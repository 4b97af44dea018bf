//! # URI Mapper
//!
//! This crate resolves URIs to locations under registered mount points and
//! translates locations between addressing contexts.
//!
//! ## Philosophy
//!
//! - **Contexts are namespaces, not schemes**: a local path, a public URL and
//!   an internal id can all name the same resource
//! - **Most specific wins**: a URI belongs to the longest enclosing root
//! - **Joins are declared, not coded**: translation between two contexts is
//!   a prefix splice, never per-pair logic
//! - **Misconfiguration is loud, absence is quiet**: ambiguous setups fail
//!   while priming, a URI nothing covers is simply `None`
//!
//! ## Key Types
//!
//! - [`Mapper`]: Owns roots and joins, primes and runs the lookup indices
//! - [`Root`]: Mount point binding a context to a URI subtree
//! - [`Path`]: Navigable location under a root (ascend, descend, translate)
//! - [`JoinPoint`] / [`Join`]: Splice between contexts
//! - [`MapperManifest`]: Declarative JSON configuration
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use uri_mapper::{Join, JoinPoint, Mapper, Root};
//! use uri_types::Uri;
//!
//! let mut mapper = Mapper::new();
//! let local = Root::new(&mapper, Uri::unix_path("/srv/site/")?)?;
//! let public = Root::new(&mapper, Uri::parse("https://example.org/")?)?.in_context("public");
//! mapper.add_roots([local, public])?;
//!
//! let points = [
//!     JoinPoint::new(&mapper, Uri::unix_path("/srv/site/")?)?,
//!     JoinPoint::new(&mapper, Uri::parse("https://example.org/")?)?.in_context("public"),
//! ];
//! let join = Join::new(&mapper, points.map(Arc::new))?;
//! mapper.add_join(join)?;
//!
//! let path = mapper.map_uri(&Uri::unix_path("/srv/site/docs/index.html")?, "")?.unwrap();
//! let url = path.to_context(&mapper, "public")?.unwrap();
//! assert_eq!(url.uri().to_string(), "https://example.org/docs/index.html");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
mod index;
pub mod join;
pub mod manifest;
pub mod mapper;
pub mod path;
mod prefix;
pub mod root;
pub mod validate;

pub use error::{ConfigError, MapperError};
pub use join::{Join, JoinPoint, JoinRole};
pub use manifest::{ManifestError, ManifestLoader, MapperManifest, MANIFEST_FILE_NAME};
pub use mapper::{CacheState, Mapper};
pub use path::Path;
pub use root::Root;
pub use validate::validate_relative_path;

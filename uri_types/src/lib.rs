//! # URI Types
//!
//! The URI value the mapper addresses locations with.
//!
//! A [`Uri`] is either absolute ("rooted") or relative, and carries a
//! [`UriFlavor`] that decides how a trailing slash is treated:
//!
//! - [`UriFlavor::Generic`]: `/a/b` and `/a/b/` are different locations
//! - [`UriFlavor::UnixPath`]: `/a/b` and `/a/b/` name the same directory
//!
//! Relative algebra (`make_relative_to`, `apply_relative`) is flavor aware
//! and works across flavors, so a location expressed as a unix path can be
//! transplanted under a generic URL.

pub mod flavor;
pub mod relative;
pub mod uri;

pub use flavor::UriFlavor;
pub use uri::{Uri, UriError};

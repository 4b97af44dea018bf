//! URI flavors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete variant of a URI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UriFlavor {
    /// RFC 3986 style URI or reference, trailing slash is significant
    #[default]
    Generic,
    /// Unix filesystem path, trailing slash is optional for directories
    UnixPath,
}

impl UriFlavor {
    /// Returns true if `x` and `x/` address the same location
    pub fn is_trailing_slash_insensitive(self) -> bool {
        matches!(self, UriFlavor::UnixPath)
    }

    /// Returns true if `?` and `#` start a query and fragment
    ///
    /// In a unix path they are ordinary file name characters.
    pub fn has_query_and_fragment(self) -> bool {
        matches!(self, UriFlavor::Generic)
    }
}

impl fmt::Display for UriFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriFlavor::Generic => write!(f, "generic"),
            UriFlavor::UnixPath => write!(f, "unix_path"),
        }
    }
}

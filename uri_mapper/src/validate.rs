//! Validation shared by roots, paths and joins

use crate::error::MapperError;
use uri_types::Uri;

/// Checks a relative path used to descend from a location
///
/// # Examples
///
/// ```
/// use uri_mapper::validate_relative_path;
///
/// assert!(validate_relative_path("b/c/").is_ok());
/// assert!(validate_relative_path("/b").is_err());
/// assert!(validate_relative_path("b//c").is_err());
/// ```
pub fn validate_relative_path(path: &str) -> Result<(), MapperError> {
    if path.starts_with('/') || path.contains("//") {
        return Err(MapperError::InvalidRelativePath(path.to_string()));
    }
    Ok(())
}

/// Checks that a mount or join point URI is absolute
pub(crate) fn ensure_rooted(uri: &Uri) -> Result<(), MapperError> {
    if !uri.is_rooted() {
        return Err(MapperError::UnrootedUri(uri.to_string()));
    }
    Ok(())
}

/// Prefix URI of a mount or join point, if it can contain children
pub(crate) fn directory_prefix(uri: &Uri) -> Option<&Uri> {
    if uri.has_trailing_slash() || uri.is_trailing_slash_insensitive() {
        Some(uri)
    } else {
        None
    }
}

//! Relative URI algebra
//!
//! `make_relative_to` and `apply_relative` are inverses for any URI that
//! lies under a base directory:
//!
//! ```
//! use uri_types::Uri;
//!
//! let base = Uri::parse("http://host/x/").unwrap();
//! let uri = Uri::parse("http://host/x/p/q?k#f").unwrap();
//! let relative = uri.make_relative_to(&base).unwrap();
//! assert_eq!(relative.to_string(), "p/q?k#f");
//! assert_eq!(base.apply_relative(&relative), uri);
//! ```

use crate::uri::{Uri, UriError};
use std::borrow::Cow;

impl Uri {
    /// Expresses `self` relative to the directory of `base`
    ///
    /// Fails unless `base` encloses `self`: same scheme and authority, and
    /// the base directory is a prefix of the path. The query and fragment of
    /// `base` are ignored; those of `self` are kept.
    pub fn make_relative_to(&self, base: &Uri) -> Result<Uri, UriError> {
        let not_a_prefix = || UriError::NotAPrefix {
            uri: self.to_string(),
            base: base.to_string(),
        };

        let same_origin = self.is_rooted() == base.is_rooted()
            && eq_ignore_case(self.scheme.as_deref(), base.scheme.as_deref())
            && self.authority == base.authority;
        if !same_origin {
            return Err(not_a_prefix());
        }

        let insensitive =
            self.is_trailing_slash_insensitive() || base.is_trailing_slash_insensitive();
        let dir = directory_of(base, insensitive);

        let relative_path = match self.path.strip_prefix(&*dir) {
            Some(rest) => rest,
            None if insensitive && dir.strip_suffix('/') == Some(self.path.as_str()) => "",
            None => return Err(not_a_prefix()),
        };

        Ok(Uri {
            flavor: self.flavor,
            scheme: None,
            authority: None,
            path: relative_path.to_string(),
            query: self.query.clone(),
            fragment: self.fragment.clone(),
        })
    }

    /// Resolves a relative URI against `self` as base
    ///
    /// The result has the flavor of the base. An entirely empty relative
    /// yields the base itself, query and fragment included.
    pub fn apply_relative(&self, relative: &Uri) -> Uri {
        if relative.scheme.is_some() {
            return Uri {
                path: remove_dot_segments(&relative.path),
                ..relative.clone()
            };
        }

        let mut target = Uri {
            flavor: self.flavor,
            scheme: self.scheme.clone(),
            authority: self.authority.clone(),
            path: String::new(),
            query: relative.query.clone(),
            fragment: relative.fragment.clone(),
        };

        if relative.authority.is_some() {
            target.authority = relative.authority.clone();
            target.path = remove_dot_segments(&relative.path);
        } else if relative.path.is_empty() {
            target.path = self.path.clone();
            if relative.query.is_none() {
                target.query = self.query.clone();
                if relative.fragment.is_none() {
                    target.fragment = self.fragment.clone();
                }
            }
        } else if relative.path.starts_with('/') {
            target.path = remove_dot_segments(&relative.path);
        } else {
            let dir = directory_of(self, self.is_trailing_slash_insensitive());
            target.path = remove_dot_segments(&format!("{dir}{}", relative.path));
        }

        target
    }
}

/// The directory a relative path is resolved against
fn directory_of(base: &Uri, insensitive: bool) -> Cow<'_, str> {
    let path = base.path.as_str();
    if path.ends_with('/') {
        Cow::Borrowed(path)
    } else if path.is_empty() {
        if base.authority.is_some() {
            Cow::Borrowed("/")
        } else {
            Cow::Borrowed("")
        }
    } else if insensitive {
        Cow::Owned(format!("{path}/"))
    } else {
        match path.rfind('/') {
            Some(idx) => Cow::Borrowed(&path[..=idx]),
            None => Cow::Borrowed(""),
        }
    }
}

fn eq_ignore_case(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

/// Removes `.` and `..` segments (RFC 3986, section 5.2.4)
pub(crate) fn remove_dot_segments(path: &str) -> String {
    if !path.split('/').any(|segment| segment == "." || segment == "..") {
        return path.to_string();
    }

    let absolute = path.starts_with('/');
    let mut segments = path.split('/').peekable();
    if absolute {
        segments.next();
    }

    let mut output: Vec<&str> = Vec::new();
    let mut trailing_slash = false;
    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        match segment {
            "." => trailing_slash = last,
            ".." => {
                output.pop();
                trailing_slash = last;
            }
            other => {
                output.push(other);
                trailing_slash = false;
            }
        }
    }

    let mut result = String::new();
    if absolute {
        result.push('/');
    }
    result.push_str(&output.join("/"));
    if trailing_slash && !output.is_empty() {
        result.push('/');
    }
    result
}

//! URI values: parsing, serialization and structural navigation

use crate::flavor::UriFlavor;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced by URI parsing and relative algebra
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UriError {
    /// The text contains a character no URI may hold
    #[error("Invalid character {character:?} in URI {uri:?}")]
    InvalidCharacter { uri: String, character: char },

    /// The base does not enclose the URI being made relative
    #[error("{base} is not a prefix of {uri}")]
    NotAPrefix { uri: String, base: String },
}

/// An absolute or relative URI
///
/// Values are immutable by convention: structural operations return a new
/// `Uri` and leave the receiver untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    pub(crate) flavor: UriFlavor,
    pub(crate) scheme: Option<String>,
    pub(crate) authority: Option<String>,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) fragment: Option<String>,
}

impl Uri {
    /// Parses a generic URI or relative reference
    ///
    /// # Examples
    ///
    /// ```
    /// use uri_types::Uri;
    ///
    /// let uri = Uri::parse("http://host/x/?qs#f").unwrap();
    /// assert_eq!(uri.scheme(), Some("http"));
    /// assert_eq!(uri.authority(), Some("host"));
    /// assert_eq!(uri.path(), "/x/");
    /// assert_eq!(uri.query(), Some("qs"));
    /// assert_eq!(uri.fragment(), Some("f"));
    /// ```
    pub fn parse(text: &str) -> Result<Self, UriError> {
        check_characters(text, |c| c.is_control() || c == ' ')?;

        let (rest, fragment) = match text.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (text, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query.to_string())),
            None => (rest, None),
        };

        let (scheme, rest) = match rest.find(':') {
            Some(idx) if is_scheme(&rest[..idx]) => {
                (Some(rest[..idx].to_string()), &rest[idx + 1..])
            }
            _ => (None, rest),
        };

        let (authority, path) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find('/').unwrap_or(after.len());
                (Some(after[..end].to_string()), &after[end..])
            }
            None => (None, rest),
        };

        Ok(Self {
            flavor: UriFlavor::Generic,
            scheme,
            authority,
            path: path.to_string(),
            query,
            fragment,
        })
    }

    /// Builds a unix path URI
    ///
    /// The whole text is the path: `?` and `#` are ordinary characters.
    pub fn unix_path(text: &str) -> Result<Self, UriError> {
        check_characters(text, |c| c == '\0')?;
        Ok(Self {
            path: text.to_string(),
            ..Self::empty(UriFlavor::UnixPath)
        })
    }

    /// Parses text as a URI of the given flavor
    pub fn parse_as(flavor: UriFlavor, text: &str) -> Result<Self, UriError> {
        match flavor {
            UriFlavor::Generic => Self::parse(text),
            UriFlavor::UnixPath => Self::unix_path(text),
        }
    }

    /// Creates the empty relative URI of a flavor
    pub fn empty(flavor: UriFlavor) -> Self {
        Self {
            flavor,
            scheme: None,
            authority: None,
            path: String::new(),
            query: None,
            fragment: None,
        }
    }

    /// Creates the empty relative URI of the same flavor as `self`
    pub fn empty_like(&self) -> Self {
        Self::empty(self.flavor)
    }

    pub fn flavor(&self) -> UriFlavor {
        self.flavor
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Returns true if the URI is absolute or starts at a path root
    pub fn is_rooted(&self) -> bool {
        self.scheme.is_some() || self.authority.is_some() || self.path.starts_with('/')
    }

    /// Returns true if every component is absent
    pub fn is_empty(&self) -> bool {
        !self.is_rooted()
            && self.path.is_empty()
            && self.query.is_none()
            && self.fragment.is_none()
    }

    pub fn has_trailing_slash(&self) -> bool {
        self.path.ends_with('/')
    }

    pub fn is_trailing_slash_insensitive(&self) -> bool {
        self.flavor.is_trailing_slash_insensitive()
    }

    /// Serializes everything but the query and fragment
    pub fn text_without_query_or_fragment(&self) -> String {
        let mut text = String::new();
        self.write_location(&mut text);
        text
    }

    /// Returns a copy without query and fragment
    pub fn clear_query_and_fragment(&self) -> Self {
        Self {
            query: None,
            fragment: None,
            ..self.clone()
        }
    }

    /// Returns a copy with the given query
    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.map(str::to_string);
        self
    }

    /// Returns a copy with the given fragment
    pub fn with_fragment(mut self, fragment: Option<&str>) -> Self {
        self.fragment = fragment.map(str::to_string);
        self
    }

    /// Non-empty path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }

    /// Number of path segments; a trailing slash does not add one
    pub fn path_depth(&self) -> usize {
        self.segments().count()
    }

    /// The last path segment, empty for directory URIs
    pub fn document(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    /// Drops `levels` trailing path segments
    ///
    /// The result names a directory (keeps a trailing slash) and carries no
    /// query or fragment. Ascending past the top stops at the path root.
    ///
    /// ```
    /// use uri_types::Uri;
    ///
    /// let uri = Uri::parse("d/e?x").unwrap();
    /// assert_eq!(uri.ascend(1).to_string(), "d/");
    /// assert_eq!(uri.ascend(2).to_string(), "");
    /// ```
    pub fn ascend(&self, levels: usize) -> Self {
        let rooted_path = self.path.starts_with('/');
        let mut path = self.path.strip_suffix('/').unwrap_or(&self.path);
        for _ in 0..levels {
            match path.rfind('/') {
                Some(idx) => path = &path[..idx],
                None => {
                    path = "";
                    break;
                }
            }
        }

        let path = if path.is_empty() {
            if rooted_path {
                "/".to_string()
            } else {
                String::new()
            }
        } else {
            format!("{path}/")
        };

        Self {
            path,
            query: None,
            fragment: None,
            ..self.clone()
        }
    }

    /// Appends a relative path below the current path
    ///
    /// The result carries no query or fragment.
    pub fn descend(&self, relative: &str) -> Self {
        let mut path = self.path.clone();
        if path.is_empty() {
            if self.authority.is_some() {
                path.push('/');
            }
        } else if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(relative);

        Self {
            path,
            query: None,
            fragment: None,
            ..self.clone()
        }
    }

    fn write_location(&self, out: &mut String) {
        if let Some(scheme) = &self.scheme {
            out.push_str(scheme);
            out.push(':');
        }
        if let Some(authority) = &self.authority {
            out.push_str("//");
            out.push_str(authority);
        }
        out.push_str(&self.path);
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        self.write_location(&mut text);
        if let Some(query) = &self.query {
            text.push('?');
            text.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            text.push('#');
            text.push_str(fragment);
        }
        f.write_str(&text)
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn check_characters(text: &str, invalid: impl Fn(char) -> bool) -> Result<(), UriError> {
    match text.chars().find(|c| invalid(*c)) {
        Some(character) => Err(UriError::InvalidCharacter {
            uri: text.to_string(),
            character,
        }),
        None => Ok(()),
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

//! Longest-prefix lookup tables
//!
//! Each registered URI contributes its text (query and fragment stripped)
//! and a [`Boundary`] describing what may follow it in an input. Entries are
//! kept sorted by descending text length, so the first entry that matches is
//! the most specific one. Two distinct entries of equal length can never
//! both match one input, so the result does not depend on insertion order.
//!
//! Whether `?` and `#` end the location depends on the flavor of the input:
//! they delimit a query and fragment in a generic URI but are plain
//! characters in a unix path.

use uri_types::{Uri, UriFlavor};

/// Condition on the input text following a matched prefix
///
/// "End of location" below means end of input, or `?`/`#` for flavors with
/// a query and fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Boundary {
    /// End of location, or `/`
    Segment,
    /// Anything; the registered text already ends in `/`
    Literal,
    /// End of location
    Document,
    /// `/` followed by something that is not end of location
    BelowSegment,
    /// Something that is not end of location
    Below,
}

impl Boundary {
    fn accepts(self, rest: &str, flavor: UriFlavor) -> bool {
        let ends_location = |c: char| flavor.has_query_and_fragment() && matches!(c, '?' | '#');
        let mut chars = rest.chars();
        match self {
            Boundary::Segment => chars.next().map_or(true, |c| c == '/' || ends_location(c)),
            Boundary::Literal => true,
            Boundary::Document => chars.next().map_or(true, ends_location),
            Boundary::BelowSegment => {
                chars.next() == Some('/') && chars.next().is_some_and(|c| !ends_location(c))
            }
            Boundary::Below => chars.next().is_some_and(|c| !ends_location(c)),
        }
    }
}

/// Canonical match text of a URI plus its trailing-slash traits
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchKey {
    pub text: String,
    pub has_trailing_slash: bool,
    pub insensitive: bool,
}

impl MatchKey {
    /// Derives the match key; an optional trailing slash is dropped
    pub fn of(uri: &Uri) -> Self {
        let mut text = uri.text_without_query_or_fragment();
        let has_trailing_slash = uri.has_trailing_slash();
        let insensitive = uri.is_trailing_slash_insensitive();
        if has_trailing_slash && insensitive {
            text.pop();
        }
        Self {
            text,
            has_trailing_slash,
            insensitive,
        }
    }

    /// Boundary for resolving a URI to the mount or join point itself
    pub fn mount_boundary(&self) -> Boundary {
        match (self.has_trailing_slash, self.insensitive) {
            (true, true) => Boundary::Segment,
            (true, false) => Boundary::Literal,
            (false, _) => Boundary::Document,
        }
    }

    /// Boundary for finding the root strictly enclosing another mount
    ///
    /// `None` when nothing can be mounted beneath this key.
    pub fn parent_boundary(&self) -> Option<Boundary> {
        match (self.has_trailing_slash, self.insensitive) {
            (_, true) => Some(Boundary::BelowSegment),
            (true, false) => Some(Boundary::Below),
            (false, false) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PrefixEntry<T> {
    text: String,
    boundary: Boundary,
    value: T,
}

impl<T> PrefixEntry<T> {
    pub fn new(text: String, boundary: Boundary, value: T) -> Self {
        Self {
            text,
            boundary,
            value,
        }
    }
}

/// A compiled longest-prefix matcher
#[derive(Debug, Clone)]
pub(crate) struct PrefixTable<T> {
    entries: Vec<PrefixEntry<T>>,
}

impl<T> PrefixTable<T> {
    pub fn new(mut entries: Vec<PrefixEntry<T>>) -> Self {
        entries.sort_by_key(|entry| std::cmp::Reverse(entry.text.len()));
        Self { entries }
    }

    /// Returns the value of the longest entry matching the start of `input`
    pub fn lookup(&self, input: &Uri) -> Option<&T> {
        let text = input.to_string();
        self.entries.iter().find_map(|entry| {
            let rest = text.strip_prefix(entry.text.as_str())?;
            entry
                .boundary
                .accepts(rest, input.flavor())
                .then_some(&entry.value)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> MatchKey {
        MatchKey::of(&Uri::parse(text).unwrap())
    }

    fn unix_key(text: &str) -> MatchKey {
        MatchKey::of(&Uri::unix_path(text).unwrap())
    }

    fn lookup<'a>(table: &'a PrefixTable<String>, input: &str) -> Option<&'a str> {
        table.lookup(&Uri::parse(input).unwrap()).map(String::as_str)
    }

    fn unix_lookup<'a>(table: &'a PrefixTable<String>, input: &str) -> Option<&'a str> {
        table.lookup(&Uri::unix_path(input).unwrap()).map(String::as_str)
    }

    fn table(keys: &[MatchKey]) -> PrefixTable<String> {
        PrefixTable::new(
            keys.iter()
                .map(|k| PrefixEntry::new(k.text.clone(), k.mount_boundary(), k.text.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_match_key_strips_query_and_optional_slash() {
        let generic = key("/a/?qs#f");
        assert_eq!(generic.text, "/a/");
        assert_eq!(generic.mount_boundary(), Boundary::Literal);

        let unix = unix_key("/a/");
        assert_eq!(unix.text, "/a");
        assert_eq!(unix.mount_boundary(), Boundary::Segment);

        let document = key("/a/page");
        assert_eq!(document.mount_boundary(), Boundary::Document);
        assert_eq!(document.parent_boundary(), None);
    }

    #[test]
    fn test_longest_prefix_wins_regardless_of_order() {
        let t = table(&[key("/a/"), key("/a/b/c/"), key("/a/b/")]);
        assert_eq!(lookup(&t, "/a/b/c/d"), Some("/a/b/c/"));
        assert_eq!(lookup(&t, "/a/b/x"), Some("/a/b/"));
        assert_eq!(lookup(&t, "/a/b"), Some("/a/"));
        assert_eq!(lookup(&t, "/z"), None);
    }

    #[test]
    fn test_segment_boundary() {
        let t = table(&[unix_key("/a/b/")]);
        assert!(unix_lookup(&t, "/a/b").is_some());
        assert!(unix_lookup(&t, "/a/b/").is_some());
        assert!(lookup(&t, "/a/b?x").is_some());
        assert!(unix_lookup(&t, "/a/bc").is_none());
    }

    #[test]
    fn test_unix_input_treats_query_characters_as_name() {
        let t = table(&[unix_key("/srv/"), unix_key("/srv/a/")]);
        assert_eq!(unix_lookup(&t, "/srv/a/x"), Some("/srv/a"));
        assert_eq!(unix_lookup(&t, "/srv/a?b"), Some("/srv"));
        assert_eq!(unix_lookup(&t, "/srv/a#x"), Some("/srv"));

        let document = table(&[key("/srv/page")]);
        assert!(lookup(&document, "/srv/page?x").is_some());
        assert!(unix_lookup(&document, "/srv/page?x").is_none());
    }

    #[test]
    fn test_document_boundary() {
        let t = table(&[key("http://host/page")]);
        assert!(lookup(&t, "http://host/page").is_some());
        assert!(lookup(&t, "http://host/page#top").is_some());
        assert!(lookup(&t, "http://host/pages").is_none());
        assert!(lookup(&t, "http://host/page/child").is_none());
    }

    #[test]
    fn test_parent_boundaries_require_something_below() {
        let generic = UriFlavor::Generic;
        assert!(!Boundary::Below.accepts("", generic));
        assert!(!Boundary::Below.accepts("?qs", generic));
        assert!(Boundary::Below.accepts("b/", generic));

        assert!(!Boundary::BelowSegment.accepts("/", generic));
        assert!(!Boundary::BelowSegment.accepts("/#f", generic));
        assert!(!Boundary::BelowSegment.accepts("b", generic));
        assert!(Boundary::BelowSegment.accepts("/b", generic));
    }

    #[test]
    fn test_parent_boundaries_for_unix_input() {
        let unix = UriFlavor::UnixPath;
        assert!(Boundary::BelowSegment.accepts("/#f", unix));
        assert!(!Boundary::BelowSegment.accepts("?b", unix));
        assert!(!Boundary::BelowSegment.accepts("/", unix));
    }
}

//! Mapper errors
//!
//! Two classes of failure exist. Invalid-argument errors are raised by the
//! call that violates a precondition. Configuration errors are raised while
//! priming the lookup indices and mean the registered roots or joins are
//! ambiguous or contradictory. Not finding a match is never an error.

use core_types::Context;
use thiserror::Error;
use uri_types::UriError;

/// Inconsistent root or join registrations, detected while priming
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Two distinct roots share a mount URI in one context
    #[error("Multiple roots for the same uri {uri:?} in context {context}")]
    AmbiguousRoot { context: Context, uri: String },

    /// A root is mounted beneath a root that forbids subroots
    #[error("Subroot {subroot:?} mounted in root {parent:?} that does not allow subroots (context {context})")]
    ForbiddenSubroot {
        context: Context,
        parent: String,
        subroot: String,
    },

    /// Two distinct joins wire one join point to the same target context
    #[error("Multiple joins for join point {join_point:?} to context {target_context}")]
    DuplicateJoinWiring {
        join_point: String,
        target_context: Context,
    },

    /// Two distinct joins claim the same source uri for one context pair
    #[error("Multiple joins for uri {uri:?} from context {source_context} to context {target_context}")]
    AmbiguousJoin {
        source_context: Context,
        target_context: Context,
        uri: String,
    },
}

/// Errors that can occur while building or navigating mapped paths
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapperError {
    /// Root and join point URIs must be absolute
    #[error("Root URI must be rooted: {0}")]
    UnrootedUri(String),

    /// Relative path starts with '/' or contains '//'
    #[error("Relative paths must not start with '/' or contain consecutive '/'s: {0:?}")]
    InvalidRelativePath(String),

    /// Ascend level count must be at least one
    #[error("Ascend levels must be a positive integer")]
    InvalidAscendLevels,

    /// Object was built for another mapper
    #[error("{0} is assigned to another URI mapper")]
    ForeignMapper(&'static str),

    /// Root without a prefix URI cannot hold paths
    #[error("Can only derive paths from directory roots: {0}")]
    NotADirectoryRoot(String),

    /// Absolute URI is not under the root prefix
    #[error("Absolute uri {uri} must have the root prefix {prefix}")]
    OutsideRoot { uri: String, prefix: String },

    /// Join has two join points with the same role and context
    #[error("Multiple join points in the same join for the same {role} context {context}")]
    DuplicateJoinPoint { role: &'static str, context: Context },

    /// Join has no join point for one side of the requested mapping
    #[error("Join cannot map from context {source_context} to context {target_context}")]
    UnmappableJoin {
        source_context: Context,
        target_context: Context,
    },

    /// Priming failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// URI algebra failed
    #[error("URI error: {0}")]
    Uri(#[from] UriError),
}

impl MapperError {
    /// Returns true for errors raised while priming
    pub fn is_configuration(&self) -> bool {
        matches!(self, MapperError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_class() {
        let err = MapperError::from(ConfigError::AmbiguousRoot {
            context: Context::default(),
            uri: "/a/".to_string(),
        });
        assert!(err.is_configuration());
        assert!(!MapperError::InvalidAscendLevels.is_configuration());
    }

    #[test]
    fn test_messages_name_the_context() {
        let err = ConfigError::DuplicateJoinWiring {
            join_point: "/a/".to_string(),
            target_context: Context::from("d"),
        };
        assert_eq!(
            err.to_string(),
            "Multiple joins for join point \"/a/\" to context \"d\""
        );
    }
}

//! Identity handles for mapper-owned objects
//!
//! Roots, joins and join points are compared by identity, not by value:
//! two roots mounted at the same URI are still two different roots. Each
//! object receives a random id at construction and keeps it across clones.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from a UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a mapper
    ///
    /// Roots, joins and join points record the mapper they were built for;
    /// registration checks this id instead of holding a back-reference.
    MapperId,
    "Mapper"
);

define_id!(
    /// Unique identifier for a root (mount point)
    RootId,
    "Root"
);

define_id!(
    /// Unique identifier for a join
    JoinId,
    "Join"
);

define_id!(
    /// Unique identifier for a join point
    JoinPointId,
    "JoinPoint"
);

//! # Core Types
//!
//! Fundamental types shared by the URI mapping crates.
//!
//! ## Key Types
//!
//! - [`Context`]: Name of an addressing namespace
//! - [`MapperId`]: Identity of a mapper
//! - [`RootId`], [`JoinId`], [`JoinPointId`]: Identity of registered objects

pub mod context;
pub mod ids;

pub use context::Context;
pub use ids::{JoinId, JoinPointId, MapperId, RootId};

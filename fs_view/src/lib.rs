//! # Filesystem View
//!
//! This crate binds the URI mapper to the local filesystem.
//!
//! ## Philosophy
//!
//! - **Files are just another context**: a file root is a mapper root mounted
//!   at a unix path, and joins translate files to URLs like any other path
//! - **Paths are validated, not normalized**: `.` and `..` segments are
//!   rejected instead of resolved
//! - **The OS decides**: operations pass straight through and report
//!   ordinary failures as `false`
//!
//! ## Key Types
//!
//! - [`FileRoot`]: Creates and validates roots mounted at unix paths
//! - [`FilePath`]: Mapped path with existence checks, listing, rename and removal

pub mod file_path;
pub mod file_root;

pub use file_path::FilePath;
pub use file_root::{FileRoot, FsError};

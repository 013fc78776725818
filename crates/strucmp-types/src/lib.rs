//! Foundation types for strucmp.
//!
//! This crate provides the tree value model shared by both sides of a
//! comparison and the path type that addresses locations inside a tree.
//! Every other strucmp crate depends on `strucmp-types`.
//!
//! # Key Types
//!
//! - [`Value`] — Tagged JSON-like tree (null, bool, int, float, string, list, map)
//! - [`ValueKind`] / [`ScalarKind`] — The tag of a value, and its scalar subset
//! - [`Path`] / [`PathSegment`] — Dotted/bracketed location such as `a.b[2].c`

pub mod error;
pub mod path;
pub mod value;

pub use error::TypeError;
pub use path::{Path, PathSegment};
pub use value::{Map, ScalarKind, Value, ValueKind};

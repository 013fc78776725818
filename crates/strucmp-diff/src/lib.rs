//! Structural comparison engine for strucmp.
//!
//! Compares an "origin" value tree against a "current" one and reports every
//! location where the current data fails to reproduce the origin: missing or
//! redundant fields, type conflicts, changed values, and list items that were
//! added or removed. Benign encoding differences can be absorbed through
//! type-groups, and whole subtrees can be exempted with exclude patterns.
//!
//! # Key Types
//!
//! - [`DiffOptions`] -- Check toggles, exclude patterns, equivalence config, depth limit
//! - [`ExcludeSpec`] / [`ExcludePattern`] -- Exempt paths such as `rows[*].link`
//! - [`EquivalenceConfig`] / [`TypeGroup`] -- List order handling and cross-type groups
//! - [`DiffReport`] / [`DifferenceRecord`] -- Ordered difference records
//! - [`Differ`] -- The recursive comparison walk
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use strucmp_diff::{compare, DiffOptions, DifferenceRecord};
//! use strucmp_types::Value;
//!
//! let origin = Value::from(json!({"name": "张三", "age": 25}));
//! let current = Value::from(json!({"name": "张三", "age": 26}));
//!
//! let report = compare(&origin, &current, &DiffOptions::default()).unwrap();
//! assert_eq!(report.len(), 1);
//! assert!(matches!(
//!     &report.records()[0],
//!     DifferenceRecord::ValueChanged { path, .. } if path.to_string() == "age"
//! ));
//! ```

pub mod differ;
pub mod equivalence;
pub mod error;
pub mod exclude;
pub mod format;
pub mod list_match;
pub mod options;
pub mod record;

pub use differ::{compare, compare_at, Differ};
pub use equivalence::{
    is_equivalent, is_same_tag, scalars_equal, type_conversion_allowed, EquivalenceConfig,
    TypeGroup,
};
pub use error::{DiffError, DiffResult};
pub use exclude::{is_excluded, ExcludePattern, ExcludeSpec, DEFAULT_EXCLUDE};
pub use format::{format_value, type_detail};
pub use list_match::match_lists;
pub use options::{DiffOptions, DEFAULT_MAX_DEPTH};
pub use record::{DiffReport, DifferenceRecord, RecordKind, ValueNote};

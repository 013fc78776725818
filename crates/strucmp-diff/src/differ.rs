//! Structural differ: the recursive walk over maps and lists.
//!
//! Each visited pair is classified (both null, one side null, both maps, both
//! lists, container against scalar, both scalars) and dispatched. Every call
//! returns its own record vector and callers concatenate, so no accumulator
//! is shared across the recursion.
//!
//! Scalar leaves are checked in a fixed order: equivalence first (skip if
//! equivalent), then type conflict, then plain equality.

use strucmp_types::{Map, Path, Value};
use tracing::debug;

use crate::equivalence::{is_equivalent, is_same_tag, scalars_equal, type_conversion_allowed};
use crate::error::{DiffError, DiffResult};
use crate::format::{format_value, format_value_capped, type_detail, SPECIAL_VALUE_MAX_CHARS};
use crate::options::DiffOptions;
use crate::record::{DiffReport, DifferenceRecord, ValueNote};

/// Compare two root values.
///
/// Both roots must be a map or a list. Records come back in discovery order;
/// an empty report means the current data reproduces the origin.
///
/// Unordered list comparison (the default) costs O(n·m) element comparisons
/// per list, each of them a deep walk. Very large unordered lists are slow;
/// set [`EquivalenceConfig::ignore_order`](crate::EquivalenceConfig) to
/// `false` when positions are meaningful.
pub fn compare(origin: &Value, current: &Value, options: &DiffOptions) -> DiffResult<DiffReport> {
    Differ::new(options).compare(origin, current)
}

/// Compare two values located at `base` inside larger documents.
///
/// Record paths are prefixed with `base`, and exclude patterns are matched
/// against the full path. The map-or-list requirement only applies when
/// `base` is the root.
pub fn compare_at(
    origin: &Value,
    current: &Value,
    base: &Path,
    options: &DiffOptions,
) -> DiffResult<DiffReport> {
    Differ::new(options).compare_at(origin, current, base)
}

/// Which checks are active for a subtree.
///
/// Elements of value-checked lists are compared with a different set than
/// the caller's, so the flags travel with the recursion instead of being
/// read from [`DiffOptions`] each time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Checks {
    pub value: bool,
    pub missing: bool,
    pub redundant: bool,
    pub types: bool,
}

impl Checks {
    pub(crate) fn from_options(options: &DiffOptions) -> Self {
        Self {
            value: options.check_value,
            missing: options.check_missing,
            redundant: options.check_redundant,
            types: options.check_type,
        }
    }

    /// Checks used inside container elements of a value-checked list, in
    /// both ordered and unordered mode. Only the type check is inherited.
    pub(crate) fn for_list_element(self) -> Self {
        Self {
            value: true,
            missing: true,
            redundant: false,
            ..self
        }
    }
}

/// Where a scalar leaf sits. List elements get the extra type-conversion
/// fallback before a value change is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Leaf {
    Field,
    Element,
}

/// The comparison walk, borrowing one set of options.
#[derive(Clone, Copy, Debug)]
pub struct Differ<'a> {
    options: &'a DiffOptions,
}

impl<'a> Differ<'a> {
    pub fn new(options: &'a DiffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &'a DiffOptions {
        self.options
    }

    /// Compare two root values. See [`compare`].
    pub fn compare(&self, origin: &Value, current: &Value) -> DiffResult<DiffReport> {
        self.compare_at(origin, current, &Path::root())
    }

    /// Compare two values below `base`. See [`compare_at`].
    pub fn compare_at(&self, origin: &Value, current: &Value, base: &Path) -> DiffResult<DiffReport> {
        if base.is_root() && !(origin.is_container() && current.is_container()) {
            return Err(DiffError::InvalidInput {
                origin: origin.kind(),
                current: current.kind(),
            });
        }

        let records = self.diff_node(origin, current, base, Checks::from_options(self.options), 0)?;
        debug!(
            path = %base,
            differences = records.len(),
            "comparison finished"
        );
        Ok(DiffReport::new(records))
    }

    pub(crate) fn is_excluded(&self, path: &Path) -> bool {
        self.options.exclude_fields.is_excluded(path)
    }

    pub(crate) fn guard_depth(&self, path: &Path, depth: usize) -> DiffResult<()> {
        if depth > self.options.max_depth {
            return Err(DiffError::DepthExceeded {
                limit: self.options.max_depth,
                path: path.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn diff_node(
        &self,
        origin: &Value,
        current: &Value,
        path: &Path,
        checks: Checks,
        depth: usize,
    ) -> DiffResult<Vec<DifferenceRecord>> {
        self.guard_depth(path, depth)?;

        match (origin, current) {
            (Value::Null, Value::Null) => Ok(Vec::new()),
            (Value::Null, _) => Ok(checks
                .missing
                .then(|| DifferenceRecord::MissingField {
                    path: path.clone(),
                    origin: type_detail(origin),
                })
                .into_iter()
                .collect()),
            (_, Value::Null) => Ok(checks
                .redundant
                .then(|| DifferenceRecord::RedundantField {
                    path: path.clone(),
                    current: type_detail(current),
                })
                .into_iter()
                .collect()),
            (Value::Map(o), Value::Map(c)) => self.diff_maps(o, c, path, checks, depth),
            (Value::List(o), Value::List(c)) => self.diff_lists(o, c, path, checks, depth),
            // Container against scalar, map against list, or two scalars.
            _ => Ok(self
                .diff_leaf(origin, current, path, checks, Leaf::Field)
                .into_iter()
                .collect()),
        }
    }

    fn diff_maps(
        &self,
        origin: &Map,
        current: &Map,
        path: &Path,
        checks: Checks,
        depth: usize,
    ) -> DiffResult<Vec<DifferenceRecord>> {
        let mut records = Vec::new();

        for (key, origin_val) in origin {
            let child = path.child(key);
            if self.is_excluded(&child) {
                continue;
            }

            let Some(current_val) = current.get(key) else {
                if checks.missing {
                    records.push(DifferenceRecord::MissingField {
                        path: child,
                        origin: type_detail(origin_val),
                    });
                }
                continue;
            };

            if origin_val.is_container() || current_val.is_container() {
                records.extend(self.diff_node(origin_val, current_val, &child, checks, depth + 1)?);
            } else if let Some(record) = self.diff_leaf(origin_val, current_val, &child, checks, Leaf::Field) {
                records.push(record);
            }
        }

        if checks.redundant {
            for (key, current_val) in current {
                if origin.contains_key(key) {
                    continue;
                }
                let child = path.child(key);
                if !self.is_excluded(&child) {
                    records.push(DifferenceRecord::RedundantField {
                        path: child,
                        current: type_detail(current_val),
                    });
                }
            }
        }

        Ok(records)
    }

    fn diff_lists(
        &self,
        origin: &[Value],
        current: &[Value],
        path: &Path,
        checks: Checks,
        depth: usize,
    ) -> DiffResult<Vec<DifferenceRecord>> {
        if checks.value {
            return self.match_lists(origin, current, path, checks, depth);
        }

        // Structure-only mode: pair by position, ignore trailing extras.
        let mut records = Vec::new();
        for (i, (o, c)) in origin.iter().zip(current).enumerate() {
            let child = path.index(i);
            if self.is_excluded(&child) {
                continue;
            }
            if o.is_container() {
                records.extend(self.diff_node(o, c, &child, checks, depth + 1)?);
            } else if let Some(record) = self.diff_leaf(o, c, &child, checks, Leaf::Element) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Compare a pair that is not two same-shaped containers. Produces at
    /// most one record.
    pub(crate) fn diff_leaf(
        &self,
        origin: &Value,
        current: &Value,
        path: &Path,
        checks: Checks,
        leaf: Leaf,
    ) -> Option<DifferenceRecord> {
        let config = &self.options.equivalence;

        // Without value checks a map field only gets the special-value
        // warning; positional list elements also keep the type check.
        if !checks.value {
            return special_value_check(origin, current, path).or_else(|| {
                (leaf == Leaf::Element && checks.types && !is_same_tag(origin, current, config))
                    .then(|| type_conflict(origin, current, path))
            });
        }

        if is_equivalent(origin, current, config) {
            return None;
        }
        if checks.types && !is_same_tag(origin, current, config) {
            return Some(type_conflict(origin, current, path));
        }
        if scalars_equal(origin, current) {
            return None;
        }
        if leaf == Leaf::Element && type_conversion_allowed(origin, current, config) {
            return None;
        }

        Some(DifferenceRecord::ValueChanged {
            path: path.clone(),
            origin: format_value(origin),
            current: format_value(current),
            note: None,
        })
    }
}

fn type_conflict(origin: &Value, current: &Value, path: &Path) -> DifferenceRecord {
    DifferenceRecord::TypeConflict {
        path: path.clone(),
        origin: type_detail(origin),
        current: type_detail(current),
    }
}

/// Flags fields that were silently emptied while value checking is off: a
/// non-blank string that became blank, or an integer that changed to zero or
/// below. Nothing else is reported here.
fn special_value_check(origin: &Value, current: &Value, path: &Path) -> Option<DifferenceRecord> {
    let note = match (origin, current) {
        (Value::Str(o), Value::Str(c)) if !o.trim().is_empty() && c.trim().is_empty() => {
            ValueNote::Blanked
        }
        (Value::Int(o), Value::Int(c)) if o != c && *c <= 0 => ValueNote::NonPositive,
        _ => return None,
    };

    Some(DifferenceRecord::ValueChanged {
        path: path.clone(),
        origin: format_value_capped(origin, SPECIAL_VALUE_MAX_CHARS),
        current: format_value_capped(current, SPECIAL_VALUE_MAX_CHARS),
        note: Some(note),
    })
}

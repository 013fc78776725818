//! List matching for value-checked comparisons.
//!
//! Ordered mode pairs elements by position. Unordered mode binds each origin
//! element to the first unclaimed current element that matches it, so the
//! result does not depend on how the current list is permuted.

use strucmp_types::{Path, Value};
use tracing::debug;

use crate::differ::{Checks, Differ, Leaf};
use crate::equivalence::{is_equivalent, is_same_tag, scalars_equal, type_conversion_allowed};
use crate::error::DiffResult;
use crate::options::DiffOptions;
use crate::record::DifferenceRecord;

/// Compare two lists located at `path` with value checking on.
///
/// Ordering follows `options.equivalence.ignore_order`. The remaining check
/// flags are taken from `options`.
pub fn match_lists(
    origin: &[Value],
    current: &[Value],
    path: &Path,
    options: &DiffOptions,
) -> DiffResult<Vec<DifferenceRecord>> {
    let checks = Checks {
        value: true,
        ..Checks::from_options(options)
    };
    Differ::new(options).match_lists(origin, current, path, checks, 0)
}

impl Differ<'_> {
    pub(crate) fn match_lists(
        &self,
        origin: &[Value],
        current: &[Value],
        path: &Path,
        checks: Checks,
        depth: usize,
    ) -> DiffResult<Vec<DifferenceRecord>> {
        let ignore_order = self.options().equivalence.ignore_order;
        debug!(
            path = %path,
            origin_len = origin.len(),
            current_len = current.len(),
            ignore_order,
            "comparing lists"
        );

        if ignore_order {
            self.match_unordered(origin, current, path, checks, depth)
        } else {
            self.match_ordered(origin, current, path, checks, depth)
        }
    }

    fn match_ordered(
        &self,
        origin: &[Value],
        current: &[Value],
        path: &Path,
        checks: Checks,
        depth: usize,
    ) -> DiffResult<Vec<DifferenceRecord>> {
        let mut records = Vec::new();
        let element_checks = checks.for_list_element();

        for i in 0..origin.len().max(current.len()) {
            let child = path.index(i);
            if self.is_excluded(&child) {
                continue;
            }
            match (origin.get(i), current.get(i)) {
                (Some(o), Some(c)) => {
                    if o.is_container() && c.is_container() {
                        records.extend(self.diff_node(o, c, &child, element_checks, depth + 1)?);
                    } else if let Some(record) = self.diff_leaf(o, c, &child, checks, Leaf::Element) {
                        records.push(record);
                    }
                }
                (Some(_), None) => records.push(DifferenceRecord::ListItemRemoved { path: child }),
                (None, Some(_)) => records.push(DifferenceRecord::ListItemAdded { path: child }),
                (None, None) => {}
            }
        }

        Ok(records)
    }

    fn match_unordered(
        &self,
        origin: &[Value],
        current: &[Value],
        path: &Path,
        checks: Checks,
        depth: usize,
    ) -> DiffResult<Vec<DifferenceRecord>> {
        let mut claimed = vec![false; current.len()];
        let mut pairs = Vec::new();
        let mut unmatched = Vec::new();

        for (i, o) in origin.iter().enumerate() {
            let mut found = None;
            for (j, c) in current.iter().enumerate() {
                if claimed[j] {
                    continue;
                }
                if self.items_match(o, c, &path.index(i), checks, depth + 1)? {
                    found = Some(j);
                    break;
                }
            }
            match found {
                Some(j) => {
                    claimed[j] = true;
                    pairs.push((i, j));
                }
                None => unmatched.push(i),
            }
        }

        debug!(
            path = %path,
            matched = pairs.len(),
            removed = unmatched.len(),
            added = claimed.iter().filter(|c| !**c).count(),
            "list items matched"
        );

        let mut records = Vec::new();
        for i in unmatched {
            let child = path.index(i);
            if !self.is_excluded(&child) {
                records.push(DifferenceRecord::ListItemRemoved { path: child });
            }
        }
        for (j, taken) in claimed.iter().enumerate() {
            let child = path.index(j);
            if !taken && !self.is_excluded(&child) {
                records.push(DifferenceRecord::ListItemAdded { path: child });
            }
        }

        // Matched pairs are re-walked at the origin index.
        let pair_checks = checks.for_list_element();
        for (i, j) in pairs {
            let child = path.index(i);
            if self.is_excluded(&child) {
                continue;
            }
            let (o, c) = (&origin[i], &current[j]);
            if o.is_container() && c.is_container() {
                records.extend(self.diff_node(o, c, &child, pair_checks, depth + 1)?);
            } else if let Some(record) = self.diff_leaf(o, c, &child, pair_checks, Leaf::Element) {
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Whether `current` can stand in for `origin` in an unordered list.
    ///
    /// Excluded map keys and list positions are ignored on both sides, so a
    /// field exempted by a pattern never prevents a match.
    pub(crate) fn items_match(
        &self,
        origin: &Value,
        current: &Value,
        path: &Path,
        checks: Checks,
        depth: usize,
    ) -> DiffResult<bool> {
        self.guard_depth(path, depth)?;
        let config = &self.options().equivalence;

        if checks.types && !is_same_tag(origin, current, config) {
            return Ok(false);
        }

        match (origin, current) {
            (Value::Map(o), Value::Map(c)) => {
                let mut origin_fields = Vec::with_capacity(o.len());
                for (key, val) in o {
                    let child = path.child(key);
                    if !self.is_excluded(&child) {
                        origin_fields.push((key, val, child));
                    }
                }
                let current_count = c.keys().filter(|key| !self.is_excluded(&path.child(key))).count();
                if origin_fields.len() != current_count {
                    return Ok(false);
                }
                for (key, o_val, child) in &origin_fields {
                    let Some(c_val) = c.get(key.as_str()) else {
                        return Ok(false);
                    };
                    if !self.items_match(o_val, c_val, child, checks, depth + 1)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::List(o), Value::List(c)) => {
                if o.len() != c.len() {
                    return Ok(false);
                }
                for (i, (ov, cv)) in o.iter().zip(c).enumerate() {
                    let child = path.index(i);
                    if self.is_excluded(&child) {
                        continue;
                    }
                    if !self.items_match(ov, cv, &child, checks, depth + 1)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (o, c) if o.is_container() || c.is_container() => Ok(false),
            (o, c) => Ok(is_equivalent(o, c, config)
                || type_conversion_allowed(o, c, config)
                || scalars_equal(o, c)),
        }
    }
}

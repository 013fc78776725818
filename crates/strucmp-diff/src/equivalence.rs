//! Cross-type value equivalence.
//!
//! Two data sources often encode the same fact differently: `"100"` versus
//! `100`, `100.0` versus `100`, `""` versus `0`. A [`TypeGroup`] lists scalar
//! kinds that may stand in for one another; only kinds sharing a configured
//! group are ever checked for equivalence. With no groups configured (the
//! default), every cross-type pair is a type conflict.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strucmp_types::{ScalarKind, Value};

use crate::format::float_repr;

/// A set of scalar kinds treated as mutually convertible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeGroup(BTreeSet<ScalarKind>);

impl TypeGroup {
    pub fn new(kinds: impl IntoIterator<Item = ScalarKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    pub fn contains(&self, kind: ScalarKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ScalarKind> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ScalarKind> for TypeGroup {
    fn from_iter<I: IntoIterator<Item = ScalarKind>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// List ordering and cross-type equivalence settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquivalenceConfig {
    /// Match list elements regardless of position.
    pub ignore_order: bool,
    /// Groups of scalar kinds that may be compared across types.
    pub ignore_type_in_groups: Vec<TypeGroup>,
}

impl Default for EquivalenceConfig {
    fn default() -> Self {
        Self {
            ignore_order: true,
            ignore_type_in_groups: Vec::new(),
        }
    }
}

impl EquivalenceConfig {
    /// Compare lists position by position instead of by content.
    pub fn ordered(mut self) -> Self {
        self.ignore_order = false;
        self
    }

    /// Add a type-group.
    pub fn with_type_group(mut self, kinds: impl IntoIterator<Item = ScalarKind>) -> Self {
        self.ignore_type_in_groups.push(TypeGroup::new(kinds));
        self
    }

    pub fn has_type_groups(&self) -> bool {
        !self.ignore_type_in_groups.is_empty()
    }

    /// Returns `true` if some group holds both kinds.
    pub fn unifies(&self, a: ScalarKind, b: ScalarKind) -> bool {
        self.ignore_type_in_groups
            .iter()
            .any(|group| group.contains(a) && group.contains(b))
    }
}

/// Returns `true` when the two values should not be reported as a type
/// conflict: identical tags, or scalar tags sharing a type-group.
pub fn is_same_tag(a: &Value, b: &Value, config: &EquivalenceConfig) -> bool {
    if let (Some(ka), Some(kb)) = (a.scalar_kind(), b.scalar_kind()) {
        if config.unifies(ka, kb) {
            return true;
        }
    }
    a.kind() == b.kind()
}

/// Returns `true` when two scalars of possibly different tags represent the
/// same value.
///
/// Only applies when a type-group holds both tags. The first applicable rule
/// decides:
///
/// 1. `""` against integer `0` is equal.
/// 2. A string of ASCII digits against a number compares as an integer.
/// 3. A string against a number compares as floats if the string parses.
/// 4. A float against an integer compares by widening the integer.
///
/// Parse failures never error; they fall through to the next rule.
pub fn is_equivalent(a: &Value, b: &Value, config: &EquivalenceConfig) -> bool {
    let (Some(ka), Some(kb)) = (a.scalar_kind(), b.scalar_kind()) else {
        return false;
    };
    if !config.unifies(ka, kb) {
        return false;
    }

    if is_empty_and_zero(a, b) || is_empty_and_zero(b, a) {
        return true;
    }

    if let Some(equal) = numeric_text_equivalent(a, b).or_else(|| numeric_text_equivalent(b, a)) {
        return equal;
    }

    match (a, b) {
        (Value::Float(f), Value::Int(i)) | (Value::Int(i), Value::Float(f)) => *f == *i as f64,
        _ => false,
    }
}

fn is_empty_and_zero(text: &Value, number: &Value) -> bool {
    matches!((text, number), (Value::Str(s), Value::Int(0)) if s.is_empty())
}

/// Rules 2 and 3 for a `(string, number)` pair; `None` when they do not apply.
fn numeric_text_equivalent(text: &Value, number: &Value) -> Option<bool> {
    let Value::Str(s) = text else {
        return None;
    };
    if !matches!(number, Value::Int(_) | Value::Float(_)) {
        return None;
    }

    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(parsed) = s.parse::<i64>() {
            return Some(match number {
                Value::Int(i) => parsed == *i,
                _ => scalars_equal(&Value::Int(parsed), number),
            });
        }
    }

    let parsed = s.trim().parse::<f64>().ok()?;
    Some(scalars_equal(&Value::Float(parsed), number))
}

/// Last-chance check before reporting a changed list element: convert both
/// values into one representation and compare.
///
/// Applies only when type-groups are configured, the tags differ and some
/// group holds both. The target representation is the origin's tag if it is
/// a string, integer or float, otherwise the current's. Values that cannot
/// be converted are simply not equal.
pub fn type_conversion_allowed(origin: &Value, current: &Value, config: &EquivalenceConfig) -> bool {
    if !config.has_type_groups() {
        return false;
    }
    let (Some(ko), Some(kc)) = (origin.scalar_kind(), current.scalar_kind()) else {
        return false;
    };
    if ko == kc || !config.unifies(ko, kc) {
        return false;
    }

    let converted = match (origin, current) {
        (Value::Str(o), _) => as_text(current).map(|c| *o == c),
        (Value::Int(o), _) => as_int(current).map(|c| *o == c),
        (Value::Float(o), _) => as_float(current).map(|c| *o == c),
        (_, Value::Str(c)) => as_text(origin).map(|o| o == *c),
        (_, Value::Int(c)) => as_int(origin).map(|o| o == *c),
        (_, Value::Float(c)) => as_float(origin).map(|o| o == *c),
        _ => None,
    };
    converted.unwrap_or(false)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(float_repr(*f)),
        Value::Str(s) => Some(s.clone()),
        Value::List(_) | Value::Map(_) => None,
    }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Value::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Plain equality for the final value check. Integers and floats compare
/// numerically; every other pair needs equal tags and payloads.
pub fn scalars_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => *i as f64 == *f,
        _ => a == b,
    }
}

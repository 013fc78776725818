//! Exclude patterns: paths that are exempt from every check.
//!
//! A pattern is written like a rendered [`Path`], with `[*]` standing for any
//! list position:
//!
//! - `timestamp` skips the top-level `timestamp` field and everything below it
//! - `user.profile` skips `user.profile` and its subtree, but still checks `user.name`
//! - `rows[*].link` skips `link` inside every element of `rows`
//! - `rows[0]` skips only the first element of `rows`
//!
//! A pattern excludes the location it names and every descendant of it
//! (prefix containment). A pattern naming a descendant never excludes the
//! ancestor itself.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strucmp_types::path::split_indexed;
use strucmp_types::{Path, PathSegment};

use crate::error::{DiffError, DiffResult};

/// The pattern applied when the caller supplies none.
pub const DEFAULT_EXCLUDE: &str = "go_article_service";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum PatternSegment {
    Field(String),
    Index(usize),
    AnyIndex,
}

impl PatternSegment {
    fn matches(&self, segment: &PathSegment) -> bool {
        match (self, segment) {
            (PatternSegment::Field(want), PathSegment::Field(got)) => want == got,
            (PatternSegment::Index(want), PathSegment::Index(got)) => want == got,
            (PatternSegment::AnyIndex, PathSegment::Index(_)) => true,
            _ => false,
        }
    }
}

/// A single parsed exclude pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExcludePattern {
    raw: String,
    segments: Vec<PatternSegment>,
}

impl ExcludePattern {
    /// Parse a pattern such as `rows[*].buy_steps[*].link`.
    ///
    /// Rejects empty patterns and parts, bracket groups with no field name in
    /// front of them (`[*]`, `a.[*]`), unbalanced brackets, and bracket bodies
    /// other than `*` or a non-negative integer.
    pub fn parse(raw: &str) -> DiffResult<Self> {
        if raw.is_empty() {
            return Err(DiffError::malformed(raw, "pattern is empty"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (name, brackets) =
                split_indexed(part).map_err(|reason| DiffError::malformed(raw, reason))?;
            if name.is_empty() {
                let reason = if brackets.is_empty() {
                    "empty field name"
                } else {
                    "index wildcard without a base field name"
                };
                return Err(DiffError::malformed(raw, reason));
            }

            segments.push(PatternSegment::Field(name.to_string()));
            for body in brackets {
                let segment = match body {
                    "*" => PatternSegment::AnyIndex,
                    _ => body.parse().map(PatternSegment::Index).map_err(|_| {
                        DiffError::malformed(raw, format!("index {body:?} is neither '*' nor a number"))
                    })?,
                };
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if `path` is the location this pattern names or lies
    /// inside its subtree.
    pub fn matches(&self, path: &Path) -> bool {
        let segments = path.segments();
        self.segments.len() <= segments.len()
            && self
                .segments
                .iter()
                .zip(segments)
                .all(|(pattern, segment)| pattern.matches(segment))
    }
}

impl fmt::Display for ExcludePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ExcludePattern {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The set of exclude patterns for one comparison.
///
/// Serialises as a list of pattern strings; deserialisation validates every
/// entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ExcludeSpec {
    patterns: BTreeSet<ExcludePattern>,
}

impl ExcludeSpec {
    /// Build a spec from pattern strings, failing on the first malformed one.
    ///
    /// # Examples
    ///
    /// ```
    /// use strucmp_diff::ExcludeSpec;
    /// use strucmp_types::Path;
    ///
    /// let spec = ExcludeSpec::new(["rows[*].link"]).unwrap();
    /// assert!(spec.is_excluded(&Path::parse("rows[3].link").unwrap()));
    /// assert!(!spec.is_excluded(&Path::parse("rows[3].title").unwrap()));
    /// assert!(ExcludeSpec::new(["[*].link"]).is_err());
    /// ```
    pub fn new<I, S>(patterns: I) -> DiffResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| ExcludePattern::parse(p.as_ref()))
            .collect::<DiffResult<BTreeSet<_>>>()?;
        Ok(Self { patterns })
    }

    /// A spec that excludes nothing.
    pub fn empty() -> Self {
        Self {
            patterns: BTreeSet::new(),
        }
    }

    /// Add one more pattern.
    pub fn insert(&mut self, pattern: &str) -> DiffResult<()> {
        self.patterns.insert(ExcludePattern::parse(pattern)?);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExcludePattern> {
        self.patterns.iter()
    }

    /// Returns `true` if any pattern matches `path`.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }
}

impl Default for ExcludeSpec {
    fn default() -> Self {
        let pattern = ExcludePattern {
            raw: DEFAULT_EXCLUDE.to_string(),
            segments: vec![PatternSegment::Field(DEFAULT_EXCLUDE.to_string())],
        };
        Self {
            patterns: BTreeSet::from([pattern]),
        }
    }
}

impl TryFrom<Vec<String>> for ExcludeSpec {
    type Error = DiffError;

    fn try_from(patterns: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(patterns)
    }
}

impl From<ExcludeSpec> for Vec<String> {
    fn from(spec: ExcludeSpec) -> Self {
        spec.patterns.into_iter().map(|p| p.raw).collect()
    }
}

/// Returns `true` if `path` is exempt from checking under `excludes`.
pub fn is_excluded(path: &Path, excludes: &ExcludeSpec) -> bool {
    excludes.is_excluded(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    fn spec(patterns: &[&str]) -> ExcludeSpec {
        ExcludeSpec::new(patterns.iter().copied()).unwrap()
    }

    #[test]
    fn exact_field_is_excluded() {
        let excludes = spec(&["timestamp"]);
        assert!(is_excluded(&path("timestamp"), &excludes));
        assert!(!is_excluded(&path("name"), &excludes));
    }

    #[test]
    fn subtree_below_pattern_is_excluded() {
        let excludes = spec(&["user.profile"]);
        assert!(is_excluded(&path("user.profile"), &excludes));
        assert!(is_excluded(&path("user.profile.settings.theme"), &excludes));
        assert!(is_excluded(&path("user.profile.tags[2]"), &excludes));
    }

    #[test]
    fn ancestor_of_pattern_is_not_excluded() {
        let excludes = spec(&["user.profile"]);
        assert!(!is_excluded(&path("user"), &excludes));
        assert!(!is_excluded(&path("user.name"), &excludes));
    }

    #[test]
    fn wildcard_matches_every_index() {
        let excludes = spec(&["rows[*].link"]);
        for i in [0, 1, 17] {
            assert!(is_excluded(&path(&format!("rows[{i}].link")), &excludes));
            assert!(!is_excluded(&path(&format!("rows[{i}].title")), &excludes));
        }
        assert!(!is_excluded(&path("rows"), &excludes));
        assert!(!is_excluded(&path("rows[0]"), &excludes));
    }

    #[test]
    fn wildcard_element_pattern_excludes_elements_not_field() {
        let excludes = spec(&["tags[*]"]);
        assert!(!is_excluded(&path("tags"), &excludes));
        assert!(is_excluded(&path("tags[4]"), &excludes));
    }

    #[test]
    fn literal_index_matches_only_that_index() {
        let excludes = spec(&["rows[1]"]);
        assert!(is_excluded(&path("rows[1].title"), &excludes));
        assert!(!is_excluded(&path("rows[0].title"), &excludes));
    }

    #[test]
    fn literal_field_does_not_cross_list_index() {
        let excludes = spec(&["rows.link"]);
        assert!(!is_excluded(&path("rows[0].link"), &excludes));
        assert!(is_excluded(&path("rows.link"), &excludes));
    }

    #[test]
    fn multiple_wildcards_nested() {
        let excludes = spec(&["rows[*].buy_steps[*].sub_rows[*].redirect_data.link"]);
        assert!(is_excluded(
            &path("rows[0].buy_steps[3].sub_rows[1].redirect_data.link"),
            &excludes
        ));
        assert!(!is_excluded(
            &path("rows[0].buy_steps[3].sub_rows[1].redirect_data.md5_url"),
            &excludes
        ));
        assert!(!is_excluded(&path("rows[0].buy_steps[3]"), &excludes));
    }

    #[test]
    fn mixed_wildcard_and_literal_index() {
        let excludes = spec(&["grid[*][0]"]);
        assert!(is_excluded(&path("grid[5][0]"), &excludes));
        assert!(!is_excluded(&path("grid[5][1]"), &excludes));
    }

    #[test]
    fn any_pattern_in_set_can_match() {
        let excludes = spec(&["a", "b.c"]);
        assert!(is_excluded(&path("a.x"), &excludes));
        assert!(is_excluded(&path("b.c"), &excludes));
        assert!(!is_excluded(&path("b.d"), &excludes));
    }

    #[test]
    fn empty_spec_excludes_nothing() {
        let excludes = ExcludeSpec::empty();
        assert!(!is_excluded(&path("anything"), &excludes));
        assert!(!is_excluded(&Path::root(), &excludes));
    }

    #[test]
    fn default_spec_has_builtin_entry() {
        let excludes = ExcludeSpec::default();
        assert_eq!(excludes.len(), 1);
        assert!(is_excluded(&path("go_article_service.id"), &excludes));
        assert_eq!(excludes, spec(&[DEFAULT_EXCLUDE]));
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        for bad in ["", "[*]", "[*].link", "a.[*]", "a..b", "a.", "a[", "a[]", "a[x]", "a[*]b"] {
            let err = ExcludePattern::parse(bad).unwrap_err();
            assert!(
                matches!(err, DiffError::MalformedExcludePattern { ref pattern, .. } if pattern == bad),
                "pattern {bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn spec_construction_fails_on_any_bad_pattern() {
        assert!(ExcludeSpec::new(["ok", "[*]"]).is_err());
    }

    #[test]
    fn insert_adds_pattern() {
        let mut excludes = ExcludeSpec::empty();
        excludes.insert("meta").unwrap();
        excludes.insert("meta").unwrap();
        assert_eq!(excludes.len(), 1);
        assert!(excludes.insert("meta[").is_err());
    }

    #[test]
    fn serde_roundtrip_validates() {
        let excludes: ExcludeSpec = serde_json::from_str(r#"["rows[*].link","ts"]"#).unwrap();
        assert_eq!(excludes.len(), 2);
        let json = serde_json::to_string(&excludes).unwrap();
        assert_eq!(json, r#"["rows[*].link","ts"]"#);
        assert!(serde_json::from_str::<ExcludeSpec>(r#"["[*]"]"#).is_err());
    }
}

//! Field paths inside a value tree.
//!
//! A path is rendered the way users write it in exclude lists:
//! `rows[0].buy_steps[2].link`. The root path is empty and renders as the
//! empty string; a root-level list element renders as `[0]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// One step in a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// A map key.
    Field(String),
    /// A list position.
    Index(usize),
}

/// Location of a node in a value tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path addressing the tree root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns `true` if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// A new path one map key below this one.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(key.to_string()));
        Self { segments }
    }

    /// A new path one list position below this one.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments (the root has zero).
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parse the rendered form back into a path.
    ///
    /// # Examples
    ///
    /// ```
    /// use strucmp_types::{Path, PathSegment};
    ///
    /// let path = Path::parse("rows[1].title").unwrap();
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(path.segments()[1], PathSegment::Index(1));
    /// assert_eq!(path.to_string(), "rows[1].title");
    /// assert!(Path::parse("").unwrap().is_root());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidPath {
            path: s.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        if s.is_empty() {
            return Ok(Self { segments });
        }

        for (i, part) in s.split('.').enumerate() {
            let (name, brackets) = split_indexed(part).map_err(invalid)?;
            if name.is_empty() && (i > 0 || brackets.is_empty()) {
                return Err(invalid("empty field name"));
            }
            if !name.is_empty() {
                segments.push(PathSegment::Field(name.to_string()));
            }
            for body in brackets {
                let index = body
                    .parse::<usize>()
                    .map_err(|_| invalid("index must be a non-negative integer"))?;
                segments.push(PathSegment::Index(index));
            }
        }

        Ok(Self { segments })
    }
}

/// Split one dot-separated part into its field name and bracket bodies.
///
/// `"rows[*][2]"` yields `("rows", ["*", "2"])`. The name may be empty; the
/// caller decides whether that is acceptable. Bodies are returned verbatim.
pub fn split_indexed(part: &str) -> Result<(&str, Vec<&str>), &'static str> {
    let (name, mut rest) = match part.find('[') {
        Some(pos) => part.split_at(pos),
        None => (part, ""),
    };
    if name.contains(']') {
        return Err("unexpected ']'");
    }

    let mut bodies = Vec::new();
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err("unexpected text after ']'");
        };
        let close = inner.find(']').ok_or("unclosed '['")?;
        let body = &inner[..close];
        if body.is_empty() {
            return Err("empty brackets");
        }
        if body.contains('[') {
            return Err("nested '['");
        }
        bodies.push(body);
        rest = &inner[close + 1..];
    }

    Ok((name, bodies))
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Path::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn root_renders_empty() {
        assert_eq!(Path::root().to_string(), "");
        assert!(Path::root().is_root());
    }

    #[test]
    fn nested_rendering() {
        let path = Path::root().child("a").child("b").index(2).child("c");
        assert_eq!(path.to_string(), "a.b[2].c");
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn root_list_element_rendering() {
        let path = Path::root().index(0).child("id");
        assert_eq!(path.to_string(), "[0].id");
    }

    #[test]
    fn child_does_not_mutate_parent() {
        let parent = Path::root().child("user");
        let _ = parent.child("name");
        assert_eq!(parent.to_string(), "user");
    }

    #[test]
    fn parse_nested_indices() {
        let path = Path::parse("grid[1][2].cell").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Field("grid".into()),
                PathSegment::Index(1),
                PathSegment::Index(2),
                PathSegment::Field("cell".into()),
            ]
        );
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(Path::parse("a..b").is_err());
        assert!(Path::parse(".a").is_err());
        assert!(Path::parse("a[").is_err());
        assert!(Path::parse("a[x]").is_err());
        assert!(Path::parse("a[0]b").is_err());
        assert!(Path::parse("a.[0]").is_err());
    }

    #[test]
    fn serializes_as_rendered_string() {
        let path = Path::root().child("rows").index(3);
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"rows[3]\"");
        let back: Path = serde_json::from_str("\"rows[3]\"").unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn split_indexed_parts() {
        assert_eq!(split_indexed("rows[*]").unwrap(), ("rows", vec!["*"]));
        assert_eq!(split_indexed("plain").unwrap(), ("plain", vec![]));
        assert_eq!(split_indexed("[3]").unwrap(), ("", vec!["3"]));
        assert!(split_indexed("a[]").is_err());
        assert!(split_indexed("a]").is_err());
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(
            fields in proptest::collection::vec("[a-z_]{1,8}", 1..5),
            indices in proptest::collection::vec(proptest::option::of(0usize..50), 1..5),
        ) {
            let mut path = Path::root();
            for (field, index) in fields.iter().zip(indices.iter()) {
                path = path.child(field);
                if let Some(i) = index {
                    path = path.index(*i);
                }
            }
            let parsed = Path::parse(&path.to_string()).unwrap();
            prop_assert_eq!(parsed, path);
        }
    }
}

//! Difference records and the report that collects them.

use std::fmt;

use serde::Serialize;
use strucmp_types::Path;

/// Why a value change was flagged while value checking was off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueNote {
    /// A non-blank origin string became blank.
    Blanked,
    /// An integer changed to zero or a negative number.
    NonPositive,
}

impl ValueNote {
    pub fn describe(self) -> &'static str {
        match self {
            ValueNote::Blanked => "blank value warning",
            ValueNote::NonPositive => "non-positive value warning",
        }
    }
}

/// One difference between the origin and current trees.
///
/// Type descriptions and values are pre-rendered with
/// [`type_detail`](crate::type_detail) and [`format_value`](crate::format_value).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DifferenceRecord {
    /// The origin has a field the current data lacks.
    MissingField { path: Path, origin: String },
    /// The current data has a field the origin lacks.
    RedundantField { path: Path, current: String },
    /// Both sides have the location but with incompatible types.
    TypeConflict {
        path: Path,
        origin: String,
        current: String,
    },
    /// Both sides have compatible types but different values.
    ValueChanged {
        path: Path,
        origin: String,
        current: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<ValueNote>,
    },
    /// A list element exists only in the current data.
    ListItemAdded { path: Path },
    /// A list element exists only in the origin data.
    ListItemRemoved { path: Path },
}

/// Discriminant of a [`DifferenceRecord`], for counting and filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    MissingField,
    RedundantField,
    TypeConflict,
    ValueChanged,
    ListItemAdded,
    ListItemRemoved,
}

impl DifferenceRecord {
    pub fn path(&self) -> &Path {
        match self {
            DifferenceRecord::MissingField { path, .. }
            | DifferenceRecord::RedundantField { path, .. }
            | DifferenceRecord::TypeConflict { path, .. }
            | DifferenceRecord::ValueChanged { path, .. }
            | DifferenceRecord::ListItemAdded { path }
            | DifferenceRecord::ListItemRemoved { path } => path,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            DifferenceRecord::MissingField { .. } => RecordKind::MissingField,
            DifferenceRecord::RedundantField { .. } => RecordKind::RedundantField,
            DifferenceRecord::TypeConflict { .. } => RecordKind::TypeConflict,
            DifferenceRecord::ValueChanged { .. } => RecordKind::ValueChanged,
            DifferenceRecord::ListItemAdded { .. } => RecordKind::ListItemAdded,
            DifferenceRecord::ListItemRemoved { .. } => RecordKind::ListItemRemoved,
        }
    }
}

struct Location<'a>(&'a Path);

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_root() {
            f.write_str("<root>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for DifferenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifferenceRecord::MissingField { path, origin } => {
                write!(f, "[missing field] {} (origin type: {origin})", Location(path))
            }
            DifferenceRecord::RedundantField { path, current } => {
                write!(f, "[redundant field] {} (current type: {current})", Location(path))
            }
            DifferenceRecord::TypeConflict {
                path,
                origin,
                current,
            } => write!(
                f,
                "[type conflict] {} origin type: {origin} -> current type: {current}",
                Location(path)
            ),
            DifferenceRecord::ValueChanged {
                path,
                origin,
                current,
                note,
            } => {
                write!(
                    f,
                    "[value changed] {} origin value: {origin} -> current value: {current}",
                    Location(path)
                )?;
                if let Some(note) = note {
                    write!(f, " ({})", note.describe())?;
                }
                Ok(())
            }
            DifferenceRecord::ListItemAdded { path } => {
                write!(f, "[list item added] {}", Location(path))
            }
            DifferenceRecord::ListItemRemoved { path } => {
                write!(f, "[list item removed] {}", Location(path))
            }
        }
    }
}

/// The ordered result of a comparison.
///
/// Records appear in the order the traversal discovered them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    records: Vec<DifferenceRecord>,
}

impl DiffReport {
    pub fn new(records: Vec<DifferenceRecord>) -> Self {
        Self { records }
    }

    /// Returns `true` when no difference was found.
    pub fn is_identical(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[DifferenceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DifferenceRecord> {
        self.records.iter()
    }

    /// Number of records of one kind.
    pub fn count(&self, kind: RecordKind) -> usize {
        self.records.iter().filter(|r| r.kind() == kind).count()
    }

    /// Records rendered as human-readable lines.
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }

    pub fn into_records(self) -> Vec<DifferenceRecord> {
        self.records
    }
}

impl From<Vec<DifferenceRecord>> for DiffReport {
    fn from(records: Vec<DifferenceRecord>) -> Self {
        Self::new(records)
    }
}

impl IntoIterator for DiffReport {
    type Item = DifferenceRecord;
    type IntoIter = std::vec::IntoIter<DifferenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiffReport {
    type Item = &'a DifferenceRecord;
    type IntoIter = std::slice::Iter<'a, DifferenceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

use serde::{Deserialize, Serialize};

use crate::equivalence::EquivalenceConfig;
use crate::error::DiffResult;
use crate::exclude::ExcludeSpec;

/// Default limit on container nesting before a comparison is aborted.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Configuration for one comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Compare scalar values. When off, only structure, types and the
    /// blank/non-positive warnings are checked.
    pub check_value: bool,
    /// Report origin fields that the current data lacks.
    pub check_missing: bool,
    /// Report current fields that the origin data lacks.
    pub check_redundant: bool,
    /// Report values whose types differ (after type-groups are applied).
    pub check_type: bool,
    /// Paths exempt from every check.
    pub exclude_fields: ExcludeSpec,
    /// List ordering and cross-type equivalence.
    #[serde(alias = "deep_diff_contrast_config")]
    pub equivalence: EquivalenceConfig,
    /// Maximum container nesting depth.
    pub max_depth: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            check_value: true,
            check_missing: true,
            check_redundant: false,
            check_type: true,
            exclude_fields: ExcludeSpec::default(),
            equivalence: EquivalenceConfig::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DiffOptions {
    /// Replace the exclude patterns.
    pub fn excluding<I, S>(mut self, patterns: I) -> DiffResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_fields = ExcludeSpec::new(patterns)?;
        Ok(self)
    }

    pub fn with_equivalence(mut self, equivalence: EquivalenceConfig) -> Self {
        self.equivalence = equivalence;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strucmp_types::ScalarKind;

    #[test]
    fn defaults() {
        let opts = DiffOptions::default();
        assert!(opts.check_value);
        assert!(opts.check_missing);
        assert!(!opts.check_redundant);
        assert!(opts.check_type);
        assert_eq!(opts.exclude_fields, ExcludeSpec::default());
        assert!(opts.equivalence.ignore_order);
        assert_eq!(opts.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let opts: DiffOptions = serde_json::from_str(
            r#"{"check_redundant": true, "deep_diff_contrast_config": {"ignore_order": false}}"#,
        )
        .unwrap();
        assert!(opts.check_redundant);
        assert!(opts.check_value);
        assert!(!opts.equivalence.ignore_order);
        assert_eq!(opts.exclude_fields, ExcludeSpec::default());
    }

    #[test]
    fn bad_exclude_pattern_fails_deserialization() {
        let result = serde_json::from_str::<DiffOptions>(r#"{"exclude_fields": ["a..b"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn builder_helpers() {
        let opts = DiffOptions::default()
            .excluding(["rows[*].link"])
            .unwrap()
            .with_equivalence(EquivalenceConfig::default().with_type_group([ScalarKind::Int, ScalarKind::Str]));
        assert_eq!(opts.exclude_fields.len(), 1);
        assert!(opts.equivalence.unifies(ScalarKind::Str, ScalarKind::Int));
    }
}

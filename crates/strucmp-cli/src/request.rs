//! JSON request/response wrapper around the comparison engine.
//!
//! Every failure, from malformed JSON to an engine error, is folded into a
//! `{"success": false, "error": ..., "differences": []}` response; callers
//! always get a response object back.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use strucmp_diff::{compare_at, DiffOptions, DiffReport, EquivalenceConfig, ExcludeSpec};
use strucmp_types::{Path, Value};
use tracing::debug;

/// Exclude patterns as sent on the wire: a list or one bare string.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExcludeFields {
    One(String),
    Many(Vec<String>),
}

impl ExcludeFields {
    fn into_patterns(self) -> Vec<String> {
        match self {
            ExcludeFields::One(pattern) => vec![pattern],
            ExcludeFields::Many(patterns) => patterns,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompareRequest {
    pub origin_data: Option<serde_json::Value>,
    pub current_data: Option<serde_json::Value>,
    pub check_value: bool,
    pub check_missing: bool,
    pub check_redundant: bool,
    pub check_type: bool,
    pub exclude_fields: Option<ExcludeFields>,
    #[serde(alias = "equivalence_config")]
    pub deep_diff_contrast_config: Option<EquivalenceConfig>,
    pub open_log: bool,
    pub path: String,
}

impl Default for CompareRequest {
    fn default() -> Self {
        Self {
            origin_data: None,
            current_data: None,
            check_value: true,
            check_missing: true,
            check_redundant: false,
            check_type: true,
            exclude_fields: None,
            deep_diff_contrast_config: None,
            open_log: false,
            path: String::new(),
        }
    }
}

impl CompareRequest {
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    /// Build engine options. An absent or empty exclude list keeps the
    /// built-in default exclusions.
    pub fn options(&self) -> anyhow::Result<DiffOptions> {
        let exclude_fields = match self.exclude_fields.clone().map(ExcludeFields::into_patterns) {
            Some(patterns) if !patterns.is_empty() => ExcludeSpec::new(patterns)?,
            _ => ExcludeSpec::default(),
        };

        Ok(DiffOptions {
            check_value: self.check_value,
            check_missing: self.check_missing,
            check_redundant: self.check_redundant,
            check_type: self.check_type,
            exclude_fields,
            equivalence: self.deep_diff_contrast_config.clone().unwrap_or_default(),
            ..DiffOptions::default()
        })
    }

    /// Run the comparison this request describes.
    pub fn execute(&self) -> anyhow::Result<DiffReport> {
        let (Some(origin), Some(current)) = (&self.origin_data, &self.current_data) else {
            bail!("missing required parameters: origin_data and current_data");
        };

        let options = self.options()?;
        let base = Path::parse(&self.path).with_context(|| format!("invalid path `{}`", self.path))?;
        debug!(path = %base, excludes = options.exclude_fields.len(), "executing compare request");

        let origin = Value::from(origin.clone());
        let current = Value::from(current.clone());
        Ok(compare_at(&origin, &current, &base, &options)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompareResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub differences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_identical: Option<bool>,
}

impl CompareResponse {
    pub fn from_report(report: &DiffReport) -> Self {
        Self {
            success: true,
            error: None,
            differences: report.lines(),
            difference_count: Some(report.len()),
            is_identical: Some(report.is_identical()),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            differences: Vec::new(),
            difference_count: None,
            is_identical: None,
        }
    }
}

/// Answer an already parsed request.
pub fn respond(request: &CompareRequest) -> CompareResponse {
    match request.execute() {
        Ok(report) => CompareResponse::from_report(&report),
        Err(e) => CompareResponse::failure(format!("execution error: {e:#}")),
    }
}

/// Parse and answer a raw JSON request.
pub fn handle(input: &str) -> CompareResponse {
    if input.trim().is_empty() {
        return CompareResponse::failure("missing input: a JSON request is required");
    }
    match CompareRequest::from_json(input) {
        Ok(request) => respond(&request),
        Err(e) => CompareResponse::failure(format!("JSON parse error: {e}")),
    }
}

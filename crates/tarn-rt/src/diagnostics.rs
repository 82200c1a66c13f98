use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tarn_contracts::TARN_DIAG_SCHEMA_VERSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Load,
    Validate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Location {
    /// JSON pointer into the layout manifest.
    Manifest { ptr: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Value>,
}

impl Diagnostic {
    pub fn error(code: &str, ptr: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            stage: Stage::Validate,
            message: message.into(),
            loc: Some(Location::Manifest { ptr: ptr.into() }),
            notes: Vec::new(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn ptr(&self) -> &str {
        match &self.loc {
            Some(Location::Manifest { ptr }) => ptr.as_str(),
            None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub schema_version: String,
    pub ok: bool,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, Value>,
}

impl Report {
    pub fn ok() -> Self {
        Self {
            schema_version: TARN_DIAG_SCHEMA_VERSION.to_string(),
            ok: true,
            diagnostics: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn with_diagnostics(mut self, mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by(|a, b| {
            a.ptr()
                .cmp(b.ptr())
                .then_with(|| a.code.cmp(&b.code))
                .then_with(|| a.message.cmp(&b.message))
        });
        self.ok = diagnostics.iter().all(|d| d.severity != Severity::Error);
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.meta.insert(key.to_string(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_not_ok_with_errors_and_sorts_by_pointer() {
        let report = Report::ok().with_diagnostics(vec![
            Diagnostic::error("TARN-LAYOUT-0002", "/tables/b", "second"),
            Diagnostic::error("TARN-LAYOUT-0001", "/tables/a", "first"),
        ]);
        assert!(!report.ok);
        assert_eq!(report.diagnostics[0].ptr(), "/tables/a");
        assert_eq!(report.diagnostics[1].ptr(), "/tables/b");
    }

    #[test]
    fn report_serializes_schema_version() {
        let v = serde_json::to_value(Report::ok()).expect("serialize");
        assert_eq!(v["schema_version"], TARN_DIAG_SCHEMA_VERSION);
        assert_eq!(v["ok"], true);
        assert!(v.get("meta").is_none());
    }
}

//! Layout manifest: the code generator's description of the program's tables.
//!
//! The manifest is read once at startup. Validation reports every problem as a
//! diagnostic so a broken generator run can be fixed in one pass; conversion into a
//! [`ProgramLayout`] refuses a manifest with errors.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tarn_caps::BuildCaps;
use tarn_contracts::{GAP_CODE, TARN_LAYOUT_SCHEMA_VERSION};

use crate::diagnostics::{Diagnostic, Severity};
use crate::table::{Layout, Param, ParamTable, Table};

pub const ENV_CAPS: &str = "TARN_CAPS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamTableDecl {
    pub min: u32,
    pub max: u32,
    #[serde(default)]
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutManifest {
    pub schema_version: String,
    /// Capability profile name or comma separated capability list.
    #[serde(default)]
    pub caps: String,
    pub layout: Layout,
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<u32>>,
    #[serde(default)]
    pub ptables: BTreeMap<String, ParamTableDecl>,
}

/// A validated manifest with its tables ready to share.
#[derive(Debug, Clone)]
pub struct ProgramLayout {
    pub layout: Layout,
    pub caps: BuildCaps,
    pub tables: BTreeMap<String, Arc<Table>>,
    pub ptables: BTreeMap<String, Arc<ParamTable>>,
}

impl LayoutManifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("parse layout manifest JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read manifest: {}", path.display()))?;
        Self::from_slice(&bytes).with_context(|| format!("manifest: {}", path.display()))
    }

    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if self.schema_version != TARN_LAYOUT_SCHEMA_VERSION {
            diagnostics.push(
                Diagnostic::error(
                    "TARN-LAYOUT-0001",
                    "/schema_version",
                    format!(
                        "unsupported schema_version {:?}",
                        self.schema_version
                    ),
                )
                .with_note(format!("expected {TARN_LAYOUT_SCHEMA_VERSION:?}")),
            );
        }

        if let Err(err) = BuildCaps::parse_list(&self.caps) {
            diagnostics.push(Diagnostic::error("TARN-LAYOUT-0002", "/caps", err.to_string()));
        }

        self.validate_layout(&mut diagnostics);
        for (name, codes) in &self.tables {
            validate_table(name, codes, &mut diagnostics);
        }
        for (name, decl) in &self.ptables {
            validate_ptable(name, decl, &mut diagnostics);
        }
        diagnostics
    }

    fn validate_layout(&self, diagnostics: &mut Vec<Diagnostic>) {
        let layout = &self.layout;
        let mut owners: BTreeMap<u32, &str> = BTreeMap::new();
        for (name, slot) in layout.slots() {
            if slot.code == GAP_CODE {
                diagnostics.push(Diagnostic::error(
                    "TARN-LAYOUT-0003",
                    format!("/layout/{name}/code"),
                    format!("special attribute {name:?} has the gap code"),
                ));
                continue;
            }
            if let Some(other) = owners.insert(slot.code, name) {
                diagnostics.push(Diagnostic::error(
                    "TARN-LAYOUT-0005",
                    format!("/layout/{name}/code"),
                    format!("special attributes {other:?} and {name:?} share code {}", slot.code),
                ));
            }
        }
        for (name, slot) in [("args", layout.args), ("fn", layout.func)] {
            if slot.pos >= layout.function_instance_size {
                diagnostics.push(Diagnostic::error(
                    "TARN-LAYOUT-0004",
                    format!("/layout/{name}/pos"),
                    format!(
                        "{name} position {} lies outside the function instance (size {})",
                        slot.pos, layout.function_instance_size
                    ),
                ));
            }
        }
    }

    /// Validates and builds shareable tables.
    ///
    /// `TARN_CAPS`, when set, replaces the manifest's capability list.
    pub fn into_program(self) -> Result<ProgramLayout> {
        let errors: Vec<String> = self
            .validate()
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| format!("{}: {} ({})", d.code, d.message, d.ptr()))
            .collect();
        if !errors.is_empty() {
            anyhow::bail!("invalid layout manifest:\n{}", errors.join("\n"));
        }

        let caps_src = std::env::var(ENV_CAPS).unwrap_or_else(|_| self.caps.clone());
        let caps = BuildCaps::parse_list(&caps_src).with_context(|| format!("{ENV_CAPS}/caps"))?;

        let tables = self
            .tables
            .into_iter()
            .map(|(name, codes)| (name, Arc::new(Table::new(codes))))
            .collect();
        let ptables = self
            .ptables
            .into_iter()
            .map(|(name, decl)| {
                (
                    name,
                    Arc::new(ParamTable::new(decl.min, decl.max, decl.params)),
                )
            })
            .collect();
        tracing::debug!(?caps, "layout manifest loaded");
        Ok(ProgramLayout {
            layout: self.layout,
            caps,
            tables,
            ptables,
        })
    }
}

fn validate_table(name: &str, codes: &[u32], diagnostics: &mut Vec<Diagnostic>) {
    let mut seen = BTreeSet::new();
    for (pos, &code) in codes.iter().enumerate() {
        if code != GAP_CODE && !seen.insert(code) {
            diagnostics.push(Diagnostic::error(
                "TARN-LAYOUT-0010",
                format!("/tables/{name}/{pos}"),
                format!("attribute code {code} appears more than once"),
            ));
        }
    }
}

fn validate_ptable(name: &str, decl: &ParamTableDecl, diagnostics: &mut Vec<Diagnostic>) {
    if decl.min > decl.max {
        diagnostics.push(Diagnostic::error(
            "TARN-LAYOUT-0020",
            format!("/ptables/{name}/min"),
            format!("min {} exceeds max {}", decl.min, decl.max),
        ));
    }
    let mut codes = BTreeSet::new();
    let mut positions = BTreeSet::new();
    for (slot, param) in decl.params.iter().enumerate() {
        if param.is_gap() {
            continue;
        }
        let ptr = format!("/ptables/{name}/params/{slot}");
        if u32::from(param.pos) >= decl.max {
            diagnostics.push(Diagnostic::error(
                "TARN-LAYOUT-0021",
                format!("{ptr}/pos"),
                format!("parameter position {} is not below max {}", param.pos, decl.max),
            ));
        }
        if param.pos == 0 {
            diagnostics.push(Diagnostic::error(
                "TARN-LAYOUT-0024",
                format!("{ptr}/pos"),
                "parameter position 0 is reserved for the context",
            ));
        }
        if !codes.insert(param.code) {
            diagnostics.push(Diagnostic::error(
                "TARN-LAYOUT-0022",
                format!("{ptr}/code"),
                format!("parameter code {} appears more than once", param.code),
            ));
        }
        if !positions.insert(param.pos) {
            diagnostics.push(Diagnostic::error(
                "TARN-LAYOUT-0023",
                format!("{ptr}/pos"),
                format!("two parameters bind position {}", param.pos),
            ));
        }
    }
}

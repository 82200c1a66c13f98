use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use tarn_rt::diagnostics::{Diagnostic, Report, Stage};
use tarn_rt::LayoutManifest;

use crate::util;

#[derive(Debug, Args)]
pub struct LayoutArgs {
    #[command(subcommand)]
    pub cmd: Option<LayoutCommand>,
}

#[derive(clap::Subcommand, Debug)]
pub enum LayoutCommand {
    /// Validate a layout manifest and print a diagnostics report.
    Check(LayoutCheckArgs),
}

#[derive(Debug, Args)]
pub struct LayoutCheckArgs {
    /// Path to the layout manifest (JSON).
    #[arg(value_name = "PATH")]
    pub manifest: PathBuf,

    /// Write the report to a file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

pub fn cmd_layout(args: LayoutArgs) -> Result<std::process::ExitCode> {
    let Some(cmd) = args.cmd else {
        anyhow::bail!("missing layout subcommand (try --help)");
    };
    match cmd {
        LayoutCommand::Check(args) => cmd_layout_check(args),
    }
}

fn cmd_layout_check(args: LayoutCheckArgs) -> Result<std::process::ExitCode> {
    let bytes = std::fs::read(&args.manifest)
        .with_context(|| format!("read manifest: {}", args.manifest.display()))?;

    let report = match LayoutManifest::from_slice(&bytes) {
        Ok(manifest) => {
            tracing::debug!(
                tables = manifest.tables.len(),
                ptables = manifest.ptables.len(),
                "checking layout manifest"
            );
            Report::ok()
                .with_diagnostics(manifest.validate())
                .with_meta("tables", json!(manifest.tables.len()))
                .with_meta("ptables", json!(manifest.ptables.len()))
        }
        Err(err) => {
            let mut diag = Diagnostic::error("TARN-LAYOUT-0000", "", format!("{err:#}"));
            diag.stage = Stage::Load;
            Report::ok().with_diagnostics(vec![diag])
        }
    };
    let report = report.with_meta("manifest_sha256", json!(util::sha256_hex(&bytes)));

    util::emit_json(&report, args.out.as_deref())?;
    Ok(if report.ok {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::from(1)
    })
}

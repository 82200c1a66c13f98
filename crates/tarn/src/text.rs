use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tarn_contracts::TARN_TEXT_REPORT_SCHEMA_VERSION;
use tarn_rt::unicode;

use crate::util;

#[derive(Debug, Args)]
pub struct TextArgs {
    #[command(subcommand)]
    pub cmd: Option<TextCommand>,
}

#[derive(clap::Subcommand, Debug)]
pub enum TextCommand {
    /// Count the code points of a string.
    Len(TextLenArgs),
    /// Select code points `start, start+step, ...` before `end`.
    Substr(TextSubstrArgs),
}

#[derive(Debug, Args)]
pub struct TextLenArgs {
    pub text: String,
}

#[derive(Debug, Args)]
pub struct TextSubstrArgs {
    pub text: String,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub start: i64,

    /// Defaults to the code-point length.
    #[arg(long, allow_negative_numbers = true)]
    pub end: Option<i64>,

    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub step: i64,
}

#[derive(Debug, Serialize)]
struct TextReport {
    schema_version: &'static str,
    op: &'static str,
    ok: bool,
    bytes: usize,
    code_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TextReport {
    fn new(op: &'static str, text: &str) -> Self {
        Self {
            schema_version: TARN_TEXT_REPORT_SCHEMA_VERSION,
            op,
            ok: true,
            bytes: text.len(),
            code_points: unicode::length(text.as_bytes()),
            result: None,
            error: None,
        }
    }
}

pub fn cmd_text(args: TextArgs) -> Result<std::process::ExitCode> {
    let Some(cmd) = args.cmd else {
        anyhow::bail!("missing text subcommand (try --help)");
    };
    match cmd {
        TextCommand::Len(args) => {
            util::emit_json(&TextReport::new("len", &args.text), None)?;
            Ok(std::process::ExitCode::SUCCESS)
        }
        TextCommand::Substr(args) => cmd_text_substr(args),
    }
}

fn cmd_text_substr(args: TextSubstrArgs) -> Result<std::process::ExitCode> {
    let mut report = TextReport::new("substr", &args.text);
    let end = args.end.unwrap_or(report.code_points as i64);
    match unicode::substring(args.text.as_bytes(), args.start, end, args.step) {
        Ok(out) => {
            // Whole code points only, so the selection is valid UTF-8.
            report.result = Some(String::from_utf8_lossy(&out).into_owned());
        }
        Err(raised) => {
            report.ok = false;
            report.error = Some(raised.to_string());
        }
    }
    util::emit_json(&report, None)?;
    Ok(if report.ok {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::from(1)
    })
}

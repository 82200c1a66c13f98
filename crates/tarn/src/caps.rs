use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tarn_caps::{BuildCaps, Capability, Profile};
use tarn_contracts::TARN_CAPS_REPORT_SCHEMA_VERSION;
use tarn_rt::manifest::ENV_CAPS;

use crate::util;

#[derive(Debug, Args)]
pub struct CapsArgs {
    #[command(subcommand)]
    pub cmd: Option<CapsCommand>,
}

#[derive(clap::Subcommand, Debug)]
pub enum CapsCommand {
    /// List capability profiles and the capabilities each one enables.
    List(CapsListArgs),
}

#[derive(Debug, Args)]
pub struct CapsListArgs {
    /// Only show this profile.
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Serialize)]
struct CapsReport {
    schema_version: &'static str,
    capabilities: Vec<&'static str>,
    profiles: Vec<ProfileEntry>,
    /// Capabilities selected by `TARN_CAPS`, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
struct ProfileEntry {
    name: &'static str,
    caps: Vec<&'static str>,
}

fn names(caps: BuildCaps) -> Vec<&'static str> {
    caps.iter().map(Capability::as_str).collect()
}

pub fn cmd_caps(args: CapsArgs) -> Result<std::process::ExitCode> {
    let Some(cmd) = args.cmd else {
        anyhow::bail!("missing caps subcommand (try --help)");
    };
    match cmd {
        CapsCommand::List(args) => cmd_caps_list(args),
    }
}

fn cmd_caps_list(args: CapsListArgs) -> Result<std::process::ExitCode> {
    let profiles = [Profile::Core, Profile::Io, Profile::Full]
        .into_iter()
        .filter(|p| args.profile.is_none() || args.profile == Some(*p))
        .map(|p| ProfileEntry {
            name: p.as_str(),
            caps: names(p.caps()),
        })
        .collect();

    let env = match std::env::var(ENV_CAPS) {
        Ok(raw) => Some(names(
            BuildCaps::parse_list(&raw).with_context(|| format!("{ENV_CAPS}={raw:?}"))?,
        )),
        Err(_) => None,
    };

    let report = CapsReport {
        schema_version: TARN_CAPS_REPORT_SCHEMA_VERSION,
        capabilities: Capability::ALL.iter().map(|c| c.as_str()).collect(),
        profiles,
        env,
    };
    util::emit_json(&report, None)?;
    Ok(std::process::ExitCode::SUCCESS)
}

// Author: Lukas Bower
// Purpose: Host CLI that runs the stubby command line merge outside firmware.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use stubby_cmdline::{merge_and_report, validate, CmdlinePolicy, MergedCmdline, SecurityMode};

#[derive(Debug, Parser)]
#[command(author, version, about = "Check stubby builtin/runtime kernel command lines")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge a runtime line into a builtin line and print the result
    Merge {
        /// Evaluate as if secure boot were disabled.
        #[arg(long)]
        insecure: bool,
        /// Builtin command line text.
        #[arg(long, default_value = "", conflicts_with = "builtin_file")]
        builtin: String,
        /// Read the builtin command line from a file (trailing newline dropped).
        #[arg(long)]
        builtin_file: Option<PathBuf>,
        /// Runtime command line as a loader would pass it.
        #[arg(default_value = "")]
        runtime: String,
    },
    /// Validate a runtime line against the allowlist only
    Check {
        /// Runtime command line to validate.
        #[arg(default_value = "")]
        runtime: String,
    },
    /// Print the compiled-in allowlist
    Allowlist,
}

fn read_builtin(path: &Path) -> Result<Vec<u8>> {
    let mut bytes =
        fs::read(path).with_context(|| format!("reading builtin cmdline {}", path.display()))?;
    if bytes.ends_with(b"\n") {
        bytes.pop();
        if bytes.ends_with(b"\r") {
            bytes.pop();
        }
    }
    Ok(bytes)
}

/// Merge and report; `None` when the line was rejected (already logged).
fn run_merge(mode: SecurityMode, builtin: &[u8], runtime: &str) -> Option<Vec<u8>> {
    info!("stubby loaded with secureboot={}", mode.is_secure());
    merge_and_report(mode, builtin, runtime.as_bytes())
        .ok()
        .map(MergedCmdline::into_bytes)
}

fn run_check(runtime: &str) -> Result<ExitCode> {
    let policy = CmdlinePolicy::STUBBY;
    if let Err(violation) = validate(&policy.allowlist, runtime.as_bytes()) {
        bail!("{violation}");
    }
    println!("ok");
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Merge {
            insecure,
            builtin,
            builtin_file,
            runtime,
        } => {
            let builtin = match builtin_file {
                Some(path) => read_builtin(&path)?,
                None => builtin.into_bytes(),
            };
            match run_merge(SecurityMode::from(!insecure), &builtin, &runtime) {
                Some(merged) => {
                    println!("{}", String::from_utf8_lossy(&merged));
                    Ok(ExitCode::SUCCESS)
                }
                None => Ok(ExitCode::FAILURE),
            }
        }
        Command::Check { runtime } => run_check(&runtime),
        Command::Allowlist => {
            for entry in CmdlinePolicy::STUBBY.allowlist.entries() {
                println!("{entry}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

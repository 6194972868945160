// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! edison - workflow orchestration for LLM-driven agents

mod commands;
mod context;
mod exit_error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{compose, qa, session, task};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "edison",
    version,
    about = "Edison - durable, inspectable workflows for coding agents"
)]
struct Cli {
    /// Change to <dir> before doing anything
    #[arg(short = 'C', global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Session management
    Session(session::SessionArgs),
    /// Task management
    Task(task::TaskArgs),
    /// Validation and promotion
    Qa(qa::QaArgs),
    /// Compose generated artifacts
    Compose(compose::ComposeArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("EDISON_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        let code = exit_code_for(&e);
        let msg = e.to_string();
        if !msg.is_empty() {
            eprintln!("Error: {msg}");
        }
        std::process::exit(code);
    }
}

/// Exit codes: 0 success, 1 user/logic error, 2 internal failure,
/// 3 blocked by a guard.
fn exit_code_for(e: &anyhow::Error) -> i32 {
    if let Some(exit) = e.downcast_ref::<exit_error::ExitError>() {
        return exit.code;
    }
    if let Some(core) = e.downcast_ref::<edison_core::Error>() {
        return core.exit_code();
    }
    1
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)
            .map_err(|e| anyhow::anyhow!("cannot change to {}: {e}", dir.display()))?;
    }
    match cli.command {
        Commands::Session(args) => session::handle(args, cli.output),
        Commands::Task(args) => task::handle(args, cli.output),
        Commands::Qa(args) => qa::handle(args, cli.output),
        Commands::Compose(args) => compose::handle(args, cli.output),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[test]
    fn command_tree_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[parameterized(
        blocked = {
            edison_core::Error::TransitionBlocked {
                guard: "hasBundleApproval".into(),
                reason: "missing".into(),
            },
            3
        },
        deps = {
            edison_core::Error::DependenciesUnsatisfied {
                task: "X".into(),
                unmet: vec!["Y".into()],
            },
            3
        },
        not_found = { edison_core::Error::not_found("task", "T1"), 1 },
        io = { edison_core::Error::io("/tmp/x", std::io::Error::other("disk")), 2 },
    )]
    fn maps_core_errors_to_exit_codes(err: edison_core::Error, code: i32) {
        assert_eq!(exit_code_for(&anyhow::Error::from(err)), code);
    }

    #[test]
    fn explicit_exit_error_wins() {
        let err = anyhow::Error::from(exit_error::ExitError::new(3, "round not approved"));
        assert_eq!(exit_code_for(&err), 3);
    }
}

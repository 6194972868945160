// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison compose` - regenerate derived artifacts

use crate::context::AppContext;
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};
use anyhow::Result;
use clap::{Args, Subcommand};
use edison_compose::{ComposePipeline, ComposeReport, ContentType};
use edison_core::cancel::CancelToken;

#[derive(Args)]
pub struct ComposeArgs {
    #[command(subcommand)]
    pub command: ComposeCommand,
}

#[derive(Subcommand)]
pub enum ComposeCommand {
    /// Compose every content type
    All,
    /// Compose one content type (agents, validators, constitutions,
    /// prompts, skills)
    Type {
        content_type: String,
    },
}

pub fn handle(args: ComposeArgs, format: OutputFormat) -> Result<()> {
    let app = AppContext::init()?;
    let pipeline = ComposePipeline::new(
        &app.layout,
        &app.config_manager,
        &app.clock,
        env!("CARGO_PKG_VERSION"),
    );
    let report = match args.command {
        ComposeCommand::All => pipeline.compose_all(&CancelToken::new())?,
        ComposeCommand::Type { content_type } => {
            let content_type: ContentType = content_type.parse()?;
            pipeline.compose_type(content_type, &CancelToken::new())?
        }
    };
    render(&report, format)?;
    if !report.is_success() {
        return Err(ExitError::new(1, "composition finished with errors".to_string()).into());
    }
    Ok(())
}

fn render(report: &ComposeReport, format: OutputFormat) -> Result<()> {
    if format.is_json() {
        print_json(report)?;
        return Ok(());
    }
    println!(
        "files: {}  includes: {}  sections: {}  vars: {}",
        report.files_written,
        report.includes_resolved,
        report.sections_processed,
        report.variables_substituted
    );
    for missing in &report.variables_missing {
        println!("missing: {missing}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        println!("error: {error}");
    }
    Ok(())
}

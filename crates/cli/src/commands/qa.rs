// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison qa` - validation rounds and promotion

use crate::context::AppContext;
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};
use anyhow::Result;
use clap::{Args, Subcommand};
use edison_core::cancel::CancelToken;
use edison_engine::promote;
use edison_graph::TaskGraph;
use edison_qa::{build_cluster, BundleScope, CommandExecutor, ValidationRunner};

#[derive(Args)]
pub struct QaArgs {
    #[command(subcommand)]
    pub command: QaCommand,
}

#[derive(Subcommand)]
pub enum QaCommand {
    /// Show the validation cluster for a task
    Bundle {
        /// Root (or member) task
        root: String,
        /// hierarchy, bundle, or auto
        #[arg(long, default_value = "auto")]
        scope: String,
    },
    /// Plan (and optionally execute) a validation round
    Validate {
        /// Root (or member) task
        root: String,
        #[arg(long, default_value = "auto")]
        scope: String,
        /// Execute the round (default is a dry run)
        #[arg(long, conflicts_with = "dry_run")]
        execute: bool,
        /// Show the plan without executing
        #[arg(long)]
        dry_run: bool,
        /// Changed files for preset inference (repeatable)
        #[arg(long = "file")]
        files: Vec<String>,
        /// Explicit preset (honored only if it does not downgrade)
        #[arg(long)]
        preset: Option<String>,
    },
    /// Promote a cluster's done members to validated
    Promote {
        /// Any member of the cluster
        id: String,
        #[arg(long, default_value = "auto")]
        scope: String,
    },
}

pub fn handle(args: QaArgs, format: OutputFormat) -> Result<()> {
    let app = AppContext::init()?;
    match args.command {
        QaCommand::Bundle { root, scope } => {
            let scope: BundleScope = scope.parse()?;
            let graph = TaskGraph::load(&app.tasks)?;
            let cluster = build_cluster(&graph, &root, scope)?;
            if format.is_json() {
                print_json(&serde_json::json!({
                    "root": cluster.root,
                    "scope": cluster.scope,
                    "members": cluster.members,
                }))?;
            } else {
                println!("root: {}  scope: {}", cluster.root, cluster.scope);
                for member in &cluster.members {
                    println!("{member}");
                }
            }
        }
        QaCommand::Validate {
            root,
            scope,
            execute,
            dry_run: _,
            files,
            preset,
        } => {
            let scope: BundleScope = scope.parse()?;
            let runner = ValidationRunner::new(
                &app.layout,
                &app.tasks,
                &app.qa,
                app.config(),
                &app.clock,
            );
            let plan = runner.plan(&root, scope, &files, preset.as_deref())?;
            if !execute {
                if format.is_json() {
                    print_json(&plan)?;
                } else {
                    println!(
                        "round {} for {} ({}; preset {})",
                        plan.round, plan.root, plan.scope, plan.policy.preset
                    );
                    println!("roster: {}", plan.roster.join(", "));
                    println!("required evidence: {}", plan.policy.required_evidence.join(", "));
                }
                return Ok(());
            }

            let executor = CommandExecutor::new(&app.clock);
            let summary = runner.execute(&plan, &executor, &CancelToken::new(), &app.actor)?;
            if format.is_json() {
                print_json(&summary)?;
            } else {
                println!(
                    "round {} for {}: approved={}  missing=[{}]",
                    summary.round,
                    summary.root_task,
                    summary.approved,
                    summary.missing.join(", ")
                );
            }
            if !summary.approved {
                return Err(ExitError::new(
                    3,
                    format!(
                        "validation round {} for {} was not approved",
                        summary.round, summary.root_task
                    ),
                )
                .into());
            }
        }
        QaCommand::Promote { id, scope } => {
            let scope: BundleScope = scope.parse()?;
            let outcome = promote(&app.engine(), &id, scope)?;
            if format.is_json() {
                print_json(&outcome)?;
            } else {
                println!(
                    "promoted {} task(s) in bundle {}",
                    outcome.promoted.len(),
                    outcome.root
                );
                for (member, reason) in &outcome.skipped {
                    println!("skipped {member}: {reason}");
                }
            }
        }
    }
    Ok(())
}

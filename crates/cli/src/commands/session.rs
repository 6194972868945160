// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison session` - session lifecycle, identity, and continuation

use crate::context::AppContext;
use crate::output::{format_time_ago, print_json, OutputFormat};
use anyhow::Result;
use clap::{Args, Subcommand};
use edison_core::session::ContinuationSettings;
use edison_engine::session_next;

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Create a session for the current process
    Create {
        /// Explicit session name (defaults to the derived process prefix)
        #[arg(long)]
        name: Option<String>,
        /// Client platform hint (claude, cursor, codex, opencode, pal)
        #[arg(long)]
        platform: Option<String>,
    },
    /// Show a session's record and staleness
    Status {
        /// Session ID (resolved from context when omitted)
        #[arg(long)]
        session: Option<String>,
    },
    /// Compute the next actionable step and continuation payload
    Next {
        #[arg(long)]
        session: Option<String>,
    },
    /// Print the resolved session id and actor identity
    Whoami,
    /// Show or change continuation settings
    Continuation {
        #[command(subcommand)]
        command: ContinuationCommand,
    },
    /// Re-enter an existing session
    Resume {
        /// Session ID
        id: String,
    },
    /// List stale sessions
    Stale {
        /// List them (default behavior; kept for interface stability)
        #[arg(long)]
        list: bool,
    },
    /// Restore a stale session's claims and archive it
    CleanupStale {
        /// Session ID
        id: String,
    },
    /// Alias of cleanup-stale
    CleanupExpired {
        /// Session ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ContinuationCommand {
    /// Show the effective continuation settings
    Show {
        #[arg(long)]
        session: Option<String>,
    },
    /// Set per-session continuation overrides
    Set {
        #[arg(long)]
        session: Option<String>,
        /// off, soft, or hard
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        max_iterations: Option<u32>,
        #[arg(long)]
        cooldown_seconds: Option<u64>,
        #[arg(long)]
        stop_on_blocked: Option<bool>,
    },
    /// Clear per-session continuation overrides
    Clear {
        #[arg(long)]
        session: Option<String>,
    },
}

pub fn handle(args: SessionArgs, format: OutputFormat) -> Result<()> {
    let app = AppContext::init()?;
    match args.command {
        SessionCommand::Create { name, platform } => {
            let prefix = match name {
                Some(name) => edison_core::SessionId::parse(&name)?.to_string(),
                None => app
                    .resolver()
                    .derive_prefix()
                    .unwrap_or_else(|| format!("edison-pid-{}", std::process::id())),
            };
            let owner_pid = app.resolver().ancestors().last().copied();
            let session = app
                .session_manager()
                .create(&prefix, platform, owner_pid, &app.actor)?;
            if format.is_json() {
                print_json(&session)?;
            } else {
                println!("Created session {}", session.id);
            }
        }
        SessionCommand::Status { session } => {
            let id = app.resolve_session(session.as_deref())?;
            let session = app.sessions.load(&id)?;
            let stale = app.session_manager().is_stale(&session);
            if format.is_json() {
                print_json(&serde_json::json!({
                    "session": session,
                    "stale": stale,
                }))?;
            } else {
                let last_active = session.last_active.timestamp_millis().max(0) as u64;
                println!(
                    "{}  state={}  last_active={}{}",
                    session.id,
                    session.state,
                    format_time_ago(last_active),
                    if stale { "  (stale)" } else { "" }
                );
            }
        }
        SessionCommand::Next { session } => {
            let id = app.resolve_session(session.as_deref())?;
            let payload = session_next(&app.engine(), &id);
            if format.is_json() {
                print_json(&payload)?;
            } else {
                for action in &payload.actions {
                    println!("next: {}  ({})", action.command, action.reason);
                }
                for blocker in &payload.blockers {
                    println!("blocked: {blocker}");
                }
                for missing in &payload.reports_missing {
                    println!("missing: {missing}");
                }
                println!(
                    "complete: {}  continue: {}",
                    payload.completion.is_complete, payload.continuation.should_continue
                );
                if let Some(prompt) = &payload.continuation.prompt {
                    println!("{prompt}");
                }
            }
        }
        SessionCommand::Whoami => {
            let env_session = std::env::var("AGENTS_SESSION").ok();
            let resolution = app.resolver().resolve(None, env_session.as_deref())?;
            if format.is_json() {
                print_json(&serde_json::json!({
                    "resolution": resolution,
                    "actor": app.actor,
                }))?;
            } else {
                match resolution.id() {
                    Some(id) => println!("session: {id}"),
                    None => println!("session: (unresolved)"),
                }
                println!("actor: {}", app.actor);
            }
        }
        SessionCommand::Continuation { command } => handle_continuation(&app, command, format)?,
        SessionCommand::Resume { id } => {
            let session = app.session_manager().resume(&id)?;
            if format.is_json() {
                print_json(&session)?;
            } else {
                println!("Resumed session {}", session.id);
                println!("export AGENTS_SESSION={}", session.id);
            }
        }
        SessionCommand::Stale { list: _ } => {
            let stale = app.session_manager().stale_sessions()?;
            if format.is_json() {
                print_json(&stale)?;
            } else if stale.is_empty() {
                println!("No stale sessions");
            } else {
                for session in stale {
                    let last_active = session.last_active.timestamp_millis().max(0) as u64;
                    println!("{}  last_active={}", session.id, format_time_ago(last_active));
                }
            }
        }
        SessionCommand::CleanupStale { id } | SessionCommand::CleanupExpired { id } => {
            let report = app.session_manager().cleanup_stale(&id, &app.actor)?;
            if format.is_json() {
                print_json(&report)?;
            } else {
                println!(
                    "Cleaned up {}: restored {} task(s), state={}",
                    report.session,
                    report.restored.len(),
                    report.state
                );
            }
        }
    }
    Ok(())
}

fn handle_continuation(
    app: &AppContext,
    command: ContinuationCommand,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ContinuationCommand::Show { session } => {
            let id = app.resolve_session(session.as_deref())?;
            let session = app.sessions.load(&id)?;
            if format.is_json() {
                print_json(&serde_json::json!({
                    "default_mode": app.config().continuation.default_mode,
                    "session_override": session.continuation,
                }))?;
            } else {
                println!("default mode: {}", app.config().continuation.default_mode);
                match session.continuation.mode {
                    Some(mode) => println!("session override: {mode}"),
                    None => println!("session override: (none)"),
                }
            }
        }
        ContinuationCommand::Set {
            session,
            mode,
            max_iterations,
            cooldown_seconds,
            stop_on_blocked,
        } => {
            let id = app.resolve_session(session.as_deref())?;
            let mut record = app.sessions.load(&id)?;
            if let Some(mode) = mode {
                record.continuation.mode = Some(mode.parse()?);
            }
            if max_iterations.is_some() {
                record.continuation.max_iterations = max_iterations;
            }
            if cooldown_seconds.is_some() {
                record.continuation.cooldown_seconds = cooldown_seconds;
            }
            if stop_on_blocked.is_some() {
                record.continuation.stop_on_blocked = stop_on_blocked;
            }
            app.sessions.save(&record)?;
            if format.is_json() {
                print_json(&record.continuation)?;
            } else {
                println!("Updated continuation settings for {id}");
            }
        }
        ContinuationCommand::Clear { session } => {
            let id = app.resolve_session(session.as_deref())?;
            let mut record = app.sessions.load(&id)?;
            record.continuation = ContinuationSettings::default();
            app.sessions.save(&record)?;
            println!("Cleared continuation overrides for {id}");
        }
    }
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison task` - task lifecycle and relationships

use crate::context::AppContext;
use crate::output::{print_json, OutputFormat};
use anyhow::Result;
use clap::{Args, Subcommand};
use edison_core::relationship::RelationKind;
use edison_core::task::Task;
use edison_engine::{claim_task, complete_task, release_task};
use edison_graph::{ready_tasks, RelationshipGraph, TaskGraph};
use edison_storage::EventLog;

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a task in todo
    Create {
        /// Task ID (stable, globally unique)
        id: String,
        /// Title
        #[arg(long)]
        title: String,
        /// Task type hint
        #[arg(long = "type")]
        task_type: Option<String>,
        /// Priority (lower is earlier)
        #[arg(long)]
        priority: Option<i64>,
    },
    /// List todo tasks whose dependencies are satisfied
    Ready,
    /// Claim a ready task into a session
    Claim {
        /// Task ID
        id: String,
        #[arg(long)]
        session: Option<String>,
    },
    /// Show one task (or all tasks)
    Status {
        /// Task ID (all tasks when omitted)
        id: Option<String>,
    },
    /// Mark a claimed task done
    Done {
        /// Task ID
        id: String,
        #[arg(long)]
        session: Option<String>,
    },
    /// Release a claimed task back to todo
    Release {
        /// Task ID
        id: String,
    },
    /// Add or remove a dependency or parent edge
    Link {
        /// Source task
        from: String,
        /// Target task
        to: String,
        /// Edge type: depends_on or parent
        #[arg(long = "type", default_value = "depends_on")]
        edge: String,
        /// Remove the edge instead of adding it
        #[arg(long)]
        remove: bool,
    },
    /// Add or remove a symmetric related edge
    Relate {
        a: String,
        b: String,
        #[arg(long)]
        remove: bool,
    },
    /// Bundle membership
    Bundle {
        #[command(subcommand)]
        command: BundleCommand,
    },
    /// Show the transition audit trail for a task
    Audit {
        /// Task ID
        id: String,
    },
    /// Show planner waves over todo tasks
    Waves,
}

#[derive(Subcommand)]
pub enum BundleCommand {
    /// Mark a task as a member of a bundle root
    Add { member: String, root: String },
    /// Remove a task's bundle membership
    Remove { member: String },
    /// Show a bundle's members
    Show { root: String },
}

pub fn handle(args: TaskArgs, format: OutputFormat) -> Result<()> {
    let app = AppContext::init()?;
    match args.command {
        TaskCommand::Create {
            id,
            title,
            task_type,
            priority,
        } => {
            // Ids name files under .project/, so check the slug first.
            let id = edison_core::TaskId::parse(&id)?;
            let mut task = Task::new(id, title, &app.clock);
            task.task_type = task_type;
            task.priority = priority;
            let path = app.tasks.create(&task)?;
            if format.is_json() {
                print_json(&serde_json::json!({
                    "id": task.id,
                    "state": task.state,
                    "path": path,
                }))?;
            } else {
                println!("Created {} at {}", task.id, path.display());
            }
        }
        TaskCommand::Ready => {
            let graph = TaskGraph::load(&app.tasks)?;
            let ready = ready_tasks(&graph, &app.config().validation.dependency_satisfied_states);
            if format.is_json() {
                print_json(&ready)?;
            } else if ready.is_empty() {
                println!("No ready tasks");
            } else {
                for task in ready {
                    println!("{}  {}", task.id, task.title);
                }
            }
        }
        TaskCommand::Claim { id, session } => {
            let session_id = app.resolve_session(session.as_deref())?;
            let outcome = claim_task(&app.engine(), &session_id, &id)?;
            if format.is_json() {
                print_json(&outcome)?;
            } else {
                println!("Claimed {} into {} ({})", outcome.id, outcome.session, outcome.path);
            }
        }
        TaskCommand::Status { id } => match id {
            Some(id) => {
                let task = app.tasks.load(&id)?;
                if format.is_json() {
                    print_json(&task)?;
                } else {
                    println!("{}  state={}  {}", task.id, task.state, task.title);
                    for edge in &task.relationships {
                        println!("  {} -> {}", edge.kind, edge.target);
                    }
                }
            }
            None => {
                let tasks = app.tasks.list()?;
                if format.is_json() {
                    print_json(&tasks)?;
                } else {
                    for task in tasks {
                        println!("{}  state={}  {}", task.id, task.state, task.title);
                    }
                }
            }
        },
        TaskCommand::Done { id, session } => {
            let session_id = app.resolve_session(session.as_deref())?;
            let outcome = complete_task(&app.engine(), &session_id, &id)?;
            if format.is_json() {
                print_json(&outcome)?;
            } else {
                println!("Done: {} ({})", outcome.id, outcome.path);
            }
        }
        TaskCommand::Release { id } => {
            let outcome = release_task(&app.engine(), &id)?;
            if format.is_json() {
                print_json(&outcome)?;
            } else {
                println!("Released {} to {}", outcome.id, outcome.path);
            }
        }
        TaskCommand::Link {
            from,
            to,
            edge,
            remove,
        } => {
            let kind: RelationKind = edge.parse()?;
            let graph = RelationshipGraph::new(&app.tasks);
            if remove {
                graph.remove(kind, &from, &to)?;
                println!("Removed {from} {kind} {to}");
            } else {
                graph.add(kind, &from, &to)?;
                println!("Linked {from} {kind} {to}");
            }
        }
        TaskCommand::Relate { a, b, remove } => {
            let graph = RelationshipGraph::new(&app.tasks);
            if remove {
                graph.remove(RelationKind::Related, &a, &b)?;
                println!("Unrelated {a} and {b}");
            } else {
                graph.add(RelationKind::Related, &a, &b)?;
                println!("Related {a} and {b}");
            }
        }
        TaskCommand::Bundle { command } => handle_bundle(&app, command, format)?,
        TaskCommand::Audit { id } => {
            let log = EventLog::new(
                app.layout
                    .stream_file(edison_core::event::EventKind::Transition),
            );
            let events: Vec<_> = log
                .read_all()?
                .into_iter()
                .filter(|e| e.subject == id)
                .collect();
            let chain_ok = log.verify_chain()?;
            if format.is_json() {
                print_json(&serde_json::json!({
                    "task": id,
                    "chain_verified": chain_ok,
                    "events": events,
                }))?;
            } else {
                for event in &events {
                    println!(
                        "{}  {} -> {}  by {}",
                        event.ts.to_rfc3339(),
                        event.payload["from"].as_str().unwrap_or("?"),
                        event.payload["to"].as_str().unwrap_or("?"),
                        event.actor
                    );
                }
                println!("chain verified: {chain_ok}");
            }
        }
        TaskCommand::Waves => {
            let graph = TaskGraph::load(&app.tasks)?;
            let waves = graph.waves(&app.config().validation.dependency_satisfied_states);
            if format.is_json() {
                print_json(&waves)?;
            } else {
                for (index, wave) in waves.iter().enumerate() {
                    println!("wave {}: {}", index + 1, wave.join(", "));
                }
            }
        }
    }
    Ok(())
}

fn handle_bundle(app: &AppContext, command: BundleCommand, format: OutputFormat) -> Result<()> {
    let graph = RelationshipGraph::new(&app.tasks);
    match command {
        BundleCommand::Add { member, root } => {
            graph.add(RelationKind::BundleRoot, &member, &root)?;
            println!("Added {member} to bundle {root}");
        }
        BundleCommand::Remove { member } => {
            let task = app.tasks.load(&member)?;
            match task.bundle_root().map(|r| r.to_string()) {
                Some(root) => {
                    graph.remove(RelationKind::BundleRoot, &member, &root)?;
                    println!("Removed {member} from bundle {root}");
                }
                None => println!("{member} has no bundle"),
            }
        }
        BundleCommand::Show { root } => {
            let graph = TaskGraph::load(&app.tasks)?;
            let members = graph.bundle_members(&root);
            if format.is_json() {
                print_json(&serde_json::json!({"root": root, "members": members}))?;
            } else if members.is_empty() {
                println!("Bundle {root} has no members");
            } else {
                for member in members {
                    println!("{member}");
                }
            }
        }
    }
    Ok(())
}

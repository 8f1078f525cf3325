/*
[INPUT]:  CLI arguments, YAML configuration file, backend credentials
[OUTPUT]: Board listings, task moves and task creation against the live backend
[POS]:    Binary entry point
[UPDATE]: When changing CLI commands, startup flow, or notification output
*/

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use taskboard_adapter::{
    AuthManager, BoardId, ColumnId, ColumnWithTasks, ProjectId, TaskId, TaskboardClient,
};
use taskboard_core::{
    AppConfig, MoveOutcome, Notification, NotificationLevel, Notifier, ProjectWorkspace,
};

mod logging;

mod cli {
    pub mod init;
}

#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about = "Kanban board client for a hosted Postgres backend")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    /// Overrides logging.level from the config file
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a configuration file interactively
    Init {
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// List projects visible to the signed-in user
    Projects,
    /// List the boards of a project, newest first
    Boards { project_id: ProjectId },
    /// Print a board's columns and tasks
    Show {
        board_id: BoardId,
        #[arg(long)]
        json: bool,
    },
    /// Drop a task onto another task or onto a column
    Move {
        board_id: BoardId,
        task_id: TaskId,
        over_id: Uuid,
    },
    /// Add a task to a column; multi-line text adds one task per line
    AddTask {
        board_id: BoardId,
        column_id: ColumnId,
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if let Command::Init { output } = &args.command {
        let output = output
            .clone()
            .or_else(AppConfig::default_path)
            .context("no config directory on this platform; pass --output")?;
        return cli::init::run_init(&output);
    }

    let config = AppConfig::load(args.config_path.as_deref()).context("load config")?;
    let log_level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let _log_guard = logging::init_tracing(log_level, config.logging.directory.as_deref())?;
    config.validate().context("validate config")?;

    let client = TaskboardClient::with_config(
        &config.backend.url,
        config.backend.anon_key.clone(),
        config.backend.client_config(),
    )
    .context("create backend client")?;

    if let Some((email, password)) = config.auth.credentials() {
        let auth = AuthManager::new(client.clone());
        auth.sign_in_with_password(email, password)
            .await
            .context("sign in")?;
        auth.ensure_approved().await.context("check account approval")?;
    } else {
        warn!("no credentials configured; requests run as the anonymous role");
    }

    let (notifier, mut notifications) = Notifier::channel();
    let printer = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            print_notification(&notification);
        }
    });

    let workspace = ProjectWorkspace::new(Arc::new(client), notifier, config.board.clone());
    let outcome = run(&workspace, args.command).await;

    // last notifier handle goes with the workspace; the printer drains and exits
    drop(workspace);
    if let Err(err) = printer.await {
        warn!(error = %err, "notification printer stopped");
    }
    outcome
}

async fn run(workspace: &ProjectWorkspace<TaskboardClient>, command: Command) -> Result<()> {
    match command {
        // handled before configuration is loaded
        Command::Init { .. } => Ok(()),
        Command::Projects => {
            let projects = workspace.list_projects().await.context("list projects")?;
            for project in projects {
                println!("{}  {}", style(project.id).dim(), project.name);
            }
            Ok(())
        }
        Command::Boards { project_id } => {
            let boards = workspace.list_boards(project_id).await.context("list boards")?;
            for board in boards {
                println!("{}  {}", style(board.id).dim(), board.name);
            }
            Ok(())
        }
        Command::Show { board_id, json } => {
            workspace.select_board(board_id).await.context("load board")?;
            print_board(workspace, json)
        }
        Command::Move {
            board_id,
            task_id,
            over_id,
        } => {
            workspace.select_board(board_id).await.context("load board")?;
            match workspace
                .move_task_raw(task_id, over_id)
                .await
                .context("move task")?
            {
                MoveOutcome::Cancelled(reason) => {
                    println!("{} {reason}", style("nothing to do:").yellow());
                }
                MoveOutcome::Persisted { updates, .. } => {
                    info!(task_id = %task_id, updates = updates.len(), "move finished");
                    println!("{} {} task(s) repositioned", style("moved:").green(), updates.len());
                }
            }
            Ok(())
        }
        Command::AddTask {
            board_id,
            column_id,
            text,
        } => {
            workspace.select_board(board_id).await.context("load board")?;
            let created = workspace
                .create_tasks(column_id, &text)
                .await
                .context("create tasks")?;
            for task in created {
                println!("{}  {}", style(task.id).dim(), task.title);
            }
            Ok(())
        }
    }
}

fn print_board(workspace: &ProjectWorkspace<TaskboardClient>, json: bool) -> Result<()> {
    let snapshot = workspace
        .store()
        .snapshot()
        .ok_or_else(|| anyhow!("board was not loaded"))?;

    if json {
        let rows: Vec<ColumnWithTasks> = snapshot
            .columns()
            .iter()
            .map(|column| ColumnWithTasks {
                column: column.clone(),
                tasks: snapshot.tasks_in(column.id).to_vec(),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("serialize board")?
        );
        return Ok(());
    }

    let today = Local::now().date_naive();
    for column in snapshot.columns() {
        let tasks = snapshot.tasks_in(column.id);
        println!(
            "\n{} {}  {}",
            style(&column.name).bold(),
            style(format!("({})", tasks.len())).dim(),
            style(column.id).dim()
        );
        for task in tasks {
            let checklist = snapshot.checklist(task.id);
            let mut line = format!("  {}. {} [{}]", task.position, task.title, task.priority);
            if !checklist.is_empty() {
                let done = checklist.iter().filter(|item| item.completed).count();
                line.push_str(&format!(" {done}/{}", checklist.len()));
            }
            if let Some(due) = task.due_date {
                let due = if due < today && !task.completed {
                    style(format!(" due {due}")).red().to_string()
                } else {
                    format!(" due {due}")
                };
                line.push_str(&due);
            }
            if task.completed {
                println!("{}  {}", style(line).dim(), style(task.id).dim());
            } else {
                println!("{line}  {}", style(task.id).dim());
            }
        }
    }
    Ok(())
}

fn print_notification(notification: &Notification) {
    let title = match notification.level {
        NotificationLevel::Error => style(&notification.title).red().bold(),
        NotificationLevel::Success => style(&notification.title).green().bold(),
    };
    eprintln!("{title}: {}", notification.description);
}

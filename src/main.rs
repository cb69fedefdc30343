use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::path::PathBuf;
use todolist::{Backend, Config, Filter, PersistenceStore, Task, TaskList, now_ms, status_text};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todolist")]
#[command(about = "Todo list with deadlines, stored in a single local slot")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the task storage (default: from config, then platform data dir)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Storage backend (default: from config, then file)
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        title: String,

        /// Deadline, e.g. 2099-01-01T09:30 (local time) or 2099-01-01
        #[arg(short, long)]
        deadline: String,
    },

    /// Flip a task between active and completed
    Toggle { id: String },

    /// Delete a task
    Delete { id: String },

    /// List tasks
    List {
        /// all, active or completed; anything else lists all
        #[arg(short, long)]
        filter: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let store_path = match cli.store_path {
        Some(path) => path,
        None => config.storage_dir()?,
    };
    let backend = cli.backend.unwrap_or(config.backend);

    let storage = backend.open(&store_path)?;
    let mut list = TaskList::new(PersistenceStore::new(storage));

    match cli.command {
        Commands::Add { title, deadline } => {
            let title = check_new_task(&title, &deadline)?;
            let task = list.add(title, &deadline)?;
            if task.deadline.is_none() {
                eprintln!("{}", "warning: deadline not recognised, stored as invalid date".yellow());
            }
            println!("{}", task.id);
        }
        Commands::Toggle { id } => {
            list.toggle(&id)?;
        }
        Commands::Delete { id } => {
            list.delete(&id)?;
        }
        Commands::List { filter } => {
            let filter = filter.as_deref().map(Filter::parse).unwrap_or(config.default_filter);
            let now = now_ms();
            let tasks = list.get_filtered(filter);
            if tasks.is_empty() {
                println!("No {} tasks", filter);
            }
            for task in tasks {
                println!("{}", render_task(task, now));
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Presence checks for new tasks; returns the trimmed title
fn check_new_task<'a>(title: &'a str, deadline: &str) -> Result<&'a str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(eyre!("Title cannot be empty"));
    }
    if deadline.trim().is_empty() {
        return Err(eyre!("Deadline cannot be empty"));
    }
    Ok(title)
}

fn render_task(task: &Task, now: i64) -> String {
    let mark = if task.completed { "[x]" } else { "[ ]" };
    let status = status_text(task, now);

    let (title, status) = if task.completed {
        (task.title.dimmed().strikethrough(), status.green())
    } else if task.is_overdue_at(now) {
        (task.title.red().bold(), status.red())
    } else {
        (task.title.bold(), status.normal())
    };

    format!("{} {} {}\n    {}", task.id.dimmed(), mark, title, status)
}

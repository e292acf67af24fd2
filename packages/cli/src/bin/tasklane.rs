// ABOUTME: Entry point of the `tasklane` command-line tool
// ABOUTME: Parses arguments, loads configuration, opens the store and dispatches commands

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use tasklane_cli::logging::init_tracing;
use tasklane_cli::{App, ConsoleNotifier};
use tasklane_config::Config;
use tasklane_reminders::{NoopNotifier, Notifier};

mod cli;

use cli::tags::TagCommands;
use cli::tasks::TaskCommands;

#[derive(Parser)]
#[command(name = "tasklane")]
#[command(about = "Tasklane - tasks, reminders and recurring schedules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommands),
    /// Manage tags
    #[command(subcommand)]
    Tag(TagCommands),
    /// Export due-dated tasks as an iCalendar file
    Export {
        #[arg(default_value = "tasklane-tasks.ics")]
        path: PathBuf,
    },
    /// Suggest due dates and priorities for a new task
    Suggest,
    /// List active tasks past their due date
    Overdue,
    /// List active tasks due today
    Today,
    /// Stay running and deliver reminders until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> Result<()> {
    let config = Config::from_env()?;

    // Only a watching process delivers reminders; one-shot commands would
    // otherwise fire every past-due reminder on each run.
    let notifier: Arc<dyn Notifier> = match command {
        Commands::Watch if config.notifications_enabled => Arc::new(ConsoleNotifier),
        _ => Arc::new(NoopNotifier),
    };

    let mut app = App::open(config, notifier).await?;

    match command {
        Commands::Task(task_cmd) => cli::tasks::handle_task_command(&mut app, task_cmd).await,
        Commands::Tag(tag_cmd) => cli::tags::handle_tag_command(&mut app, tag_cmd).await,
        Commands::Export { path } => cli::agenda::export(&app, &path).await,
        Commands::Suggest => {
            cli::agenda::suggest(&app);
            Ok(())
        }
        Commands::Overdue => cli::agenda::overdue(&mut app).await,
        Commands::Today => cli::agenda::today(&mut app).await,
        Commands::Watch => cli::agenda::watch(&app).await,
    }
}

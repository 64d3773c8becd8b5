//! taskscope - filtered comment task lists from the command line
//!
//! Drives a [`TaskSession`] over JSON files standing in for the host editor.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tracing::{debug, info};

use taskscope::tokens::is_builtin;
use taskscope::{
    EditorEvent, JsonProjectFiles, JsonTaskSource, Providers, Result, Scope, SessionConfig,
    StaticActiveFile, TaskRecord, TaskScopeError, TaskSession, TokenRegistry, ValidationReport,
};

#[derive(Parser)]
#[command(name = "taskscope")]
#[command(version)]
#[command(about = "Filtered, debounced view over TODO/HACK comment tasks", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory used for settings lookup (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Explicit settings file (.json or .toml), skipping the lookup layers
    #[arg(short, long, global = true, env = "TASKSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Files standing in for the host's providers.
#[derive(Args)]
struct SourceArgs {
    /// JSON array of raw tasks ({category, description, file, line})
    #[arg(long, value_name = "FILE")]
    tasks: PathBuf,

    /// JSON array of paths in the active project (omit for no project)
    #[arg(long, value_name = "FILE")]
    project_files: Option<PathBuf>,

    /// Path of the file open in the editor
    #[arg(long, value_name = "PATH", default_value = "")]
    active_file: String,

    /// Token to select (case-insensitive)
    #[arg(short, long)]
    token: Option<String>,

    /// Scope to select
    #[arg(short, long, value_enum)]
    scope: Option<Scope>,

    /// Print views as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reload once and print the filtered view
    Filter {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List registered tokens
    Tokens,

    /// Watch the task file and print the view whenever it refreshes
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        /// How often to check the task file for changes, in milliseconds
        #[arg(long, default_value = "500", value_name = "MS")]
        poll_ms: u64,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate the effective configuration
    Validate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "taskscope=debug,info"
    } else {
        "taskscope=info,warn"
    };

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Filter { source } => {
            let session = open_session(&config, &source)?;
            print_view(&session, &session.filtered_tasks(), source.json)?;
        }

        Commands::Tokens => {
            config.validate()?;
            let mut registry = TokenRegistry::new();
            for token in &config.custom_tokens {
                match registry.add(token) {
                    Ok(()) | Err(TaskScopeError::DuplicateToken { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
            for token in registry.tokens() {
                if is_builtin(token) {
                    println!("{} {}", token.bold(), "(built-in)".dimmed());
                } else {
                    println!("{}", token.bold());
                }
            }
        }

        Commands::Watch { source, poll_ms } => {
            watch(&config, &source, Duration::from_millis(poll_ms.max(1))).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Validate => {
                let report = ValidationReport::check(&config);
                for issue in &report.errors {
                    println!("{} {}", "error:".red().bold(), issue);
                }
                for issue in &report.warnings {
                    println!("{} {}", "warning:".yellow().bold(), issue);
                }
                if report.is_valid() {
                    println!("{}", report.summary().green());
                } else {
                    println!("{}", report.summary().red());
                    std::process::exit(report.exit_code());
                }
            }
        },
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<SessionConfig> {
    match &cli.config {
        Some(path) => SessionConfig::load_from(path),
        None => {
            let project = cli.project.canonicalize().unwrap_or_else(|_| cli.project.clone());
            SessionConfig::load(&project)
        }
    }
}

/// Build a session over the given files and apply the requested criteria.
fn open_session(config: &SessionConfig, source: &SourceArgs) -> Result<TaskSession> {
    // A missing task file is a usage error here, not an empty reload.
    std::fs::metadata(&source.tasks)?;

    let mut config = config.clone();
    if let Some(scope) = source.scope {
        config.default_scope = scope;
    }

    let providers = Providers::new(
        Arc::new(JsonTaskSource::new(&source.tasks)),
        Arc::new(JsonProjectFiles::new(source.project_files.clone())),
        Arc::new(StaticActiveFile::new(source.active_file.clone())),
    );
    let session = TaskSession::new(&config, providers)?;
    if let Some(token) = &source.token {
        session.select_token(token)?;
    }
    Ok(session)
}

async fn watch(config: &SessionConfig, source: &SourceArgs, poll: Duration) -> Result<()> {
    let session = open_session(config, source)?;
    let mut view = session.subscribe();
    let initial = view.borrow_and_update().clone();
    print_view(&session, &initial, source.json)?;

    let (tx, rx) = mpsc::channel(64);
    let pump = {
        let session = session.clone();
        tokio::spawn(async move { session.pump(rx).await })
    };
    send(&tx, EditorEvent::SolutionOpened).await?;
    info!("Watching {} (Ctrl-C to stop)", source.tasks.display());

    let mut last_modified = modified(&source.tasks);
    let mut ticker = tokio::time::interval(poll);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = view.borrow_and_update().clone();
                print_view(&session, &current, source.json)?;
            }
            _ = ticker.tick() => {
                let current = modified(&source.tasks);
                if current != last_modified {
                    debug!("Task file changed");
                    last_modified = current;
                    send(&tx, EditorEvent::LineChanged).await?;
                }
            }
        }
    }

    send(&tx, EditorEvent::SolutionBeforeClosing).await?;
    drop(tx);
    pump.await.map_err(anyhow::Error::from)?;
    Ok(())
}

async fn send(tx: &mpsc::Sender<EditorEvent>, event: EditorEvent) -> Result<()> {
    tx.send(event).await.map_err(anyhow::Error::from)?;
    Ok(())
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn print_view(session: &TaskSession, view: &[TaskRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    let snapshot = session.snapshot();
    println!(
        "{} {} of {} tasks (token {}, scope {})",
        "==>".blue().bold(),
        snapshot.visible_tasks,
        snapshot.total_tasks,
        snapshot.selected_token.cyan(),
        snapshot.selected_scope.to_string().cyan()
    );
    for task in view {
        println!(
            "  {} {:<32} {}",
            format!("{:<12}", task.token()).yellow().bold(),
            task.location(),
            task.description()
        );
    }
    Ok(())
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use crate::capture::{self, GitCaptureOptions};
use crate::clipboard::copy_to_clipboard;
use crate::generate::{self, GenerateOptions, format_context, list_models};
use crate::store::SqliteStore;
use crate::utils::{
    ensure_initialized, format_path_with_tilde, get_home_dir, project_name, resolve_output_path,
    truncate,
};

const SHOW_CONTENT_LIMIT: usize = 200;

#[derive(Parser, Debug)]
#[command(name = "ctxsave")]
#[command(version)]
#[command(about = "Carry project context between AI sessions", long_about = None)]
pub struct Cli {
    /// Project directory holding .ctxsave/ (defaults to the current directory)
    #[arg(long, global = true, env = "CTXSAVE_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. `info`, `ctxsave=trace`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the context database in the project directory
    Init,
    /// Capture context from a source
    #[command(subcommand)]
    Capture(CaptureCommand),
    /// Build a context prompt sized for a target model
    Generate {
        /// Target model key (see `ctxsave models`)
        #[arg(long, default_value = generate::prompt::DEFAULT_MODEL)]
        model: String,
        /// Token budget; 0 uses the model's context window
        #[arg(long, default_value_t = 0)]
        budget: usize,
        /// Only use entries from this session
        #[arg(long)]
        session: Option<String>,
        /// Copy the prompt to the clipboard instead of printing it
        #[arg(long)]
        copy: bool,
        /// Write the prompt to a file instead of printing it
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List captured sessions, newest first
    Sessions {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Show the entries of one session
    Show { id: String },
    /// List supported target models
    Models,
}

#[derive(Subcommand, Debug)]
pub enum CaptureCommand {
    /// Parse agent transcripts (every new one for this project when no path is given)
    Cursor { path: Option<PathBuf> },
    /// Capture recent git history
    Git {
        /// Passed to `git log --since` (e.g. `4h`, `1d`)
        #[arg(long)]
        since: Option<String>,
        /// Maximum number of commits
        #[arg(long, default_value_t = 10)]
        commits: usize,
    },
    /// Add a free-text note
    Note {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Capture a file's content
    File {
        path: PathBuf,
        #[arg(long)]
        tag: Option<String>,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    debug!(project_dir = %project_dir.display(), "resolved project directory");

    match cli.command {
        Commands::Init => init(&project_dir),
        Commands::Models => {
            show_models();
            Ok(())
        }
        Commands::Capture(command) => run_capture(&project_dir, command),
        Commands::Generate { model, budget, session, copy, out } => {
            let options = GenerateOptions { model_key: model, budget, session };
            run_generate(&project_dir, &options, copy, out.as_deref())
        }
        Commands::Sessions { limit } => show_sessions(&project_dir, limit),
        Commands::Show { id } => show_session(&project_dir, &id),
    }
}

fn init(project_dir: &Path) -> Result<()> {
    let db_path = SqliteStore::db_path(project_dir);
    if db_path.exists() {
        println!("Already initialized - {} exists", format_path_with_tilde(&db_path));
        return Ok(());
    }

    SqliteStore::open(project_dir).context("init failed")?;
    println!("Initialized ctxsave in {}", format_path_with_tilde(project_dir));
    println!("Context database created at {}", format_path_with_tilde(&db_path));
    Ok(())
}

/// Opens the store of an initialized project along with its label
fn open_store(project_dir: &Path) -> Result<(SqliteStore, String)> {
    ensure_initialized(project_dir)?;
    let store = SqliteStore::open(project_dir)?;
    Ok((store, project_name(project_dir)))
}

fn run_capture(project_dir: &Path, command: CaptureCommand) -> Result<()> {
    let (store, project) = open_store(project_dir)?;

    match command {
        CaptureCommand::Cursor { path: Some(path) } => {
            let (session, _) = capture::capture_transcript(&store, &path, &project)?;
            let count = store.count_entries(&session.id)?;
            println!("Captured {} entries from Cursor transcript -> session {}", count, session.id);
        }
        CaptureCommand::Cursor { path: None } => {
            let home = get_home_dir()?;
            let result = capture::capture_all(&store, &home, project_dir, &project)?;
            println!(
                "Auto-captured {} new transcripts ({} already processed)",
                result.captured, result.skipped
            );
            for error in &result.errors {
                println!("  warning: {}", error);
            }
            if result.captured == 0 && result.skipped == 0 && result.errors.is_empty() {
                println!("No Cursor transcripts found for this project.");
            }
        }
        CaptureCommand::Git { since, commits } => {
            let options = GitCaptureOptions { since, max_commits: commits };
            let session = capture::capture_git(&store, project_dir, &project, &options)?;
            let count = store.count_entries(&session.id)?;
            println!("Captured {} entries from git -> session {}", count, session.id);
        }
        CaptureCommand::Note { text } => {
            let session = capture::capture_note(&store, &project, &text.join(" "))?;
            println!("Note saved -> session {}", session.id);
        }
        CaptureCommand::File { path, tag } => {
            let display = path.display().to_string();
            let session = capture::capture_file(&store, &project, &path, &display, tag.as_deref())?;
            println!("File captured -> session {}", session.id);
        }
    }
    Ok(())
}

fn run_generate(
    project_dir: &Path,
    options: &GenerateOptions,
    copy: bool,
    out: Option<&Path>,
) -> Result<()> {
    let (store, project) = open_store(project_dir)?;
    let prompt = generate::generate(&store, &project, options)?;
    let summary = format!("level {}, ~{} tokens", prompt.level, prompt.token_estimate);

    if copy {
        match copy_to_clipboard(&prompt.text) {
            Ok(()) => println!("Prompt copied to clipboard ({})", summary),
            Err(e) => eprintln!("Warning: could not copy to clipboard: {:#}", e),
        }
    }

    if let Some(out) = out {
        let out_path = resolve_output_path(project_dir, out);
        fs::write(&out_path, &prompt.text)
            .with_context(|| format!("Failed to write prompt to {}", out_path.display()))?;
        println!("Prompt written to {} ({})", format_path_with_tilde(&out_path), summary);
    }

    if !copy && out.is_none() {
        println!("{}", prompt.text);
    }
    Ok(())
}

fn show_sessions(project_dir: &Path, limit: usize) -> Result<()> {
    let (store, _) = open_store(project_dir)?;
    let sessions = store.list_sessions(limit)?;

    if sessions.is_empty() {
        println!("No sessions yet - run 'ctxsave capture' first");
        return Ok(());
    }

    println!("{:<18} {:<17} {:<8} LABEL", "ID", "CREATED", "SOURCE");
    println!("{}", "-".repeat(64));
    for session in sessions {
        let count = store.count_entries(&session.id)?;
        println!(
            "{:<18} {:<17} {:<8} {} ({} entries)",
            session.id,
            session.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            session.source,
            session.label,
            count
        );
    }
    Ok(())
}

fn show_session(project_dir: &Path, id: &str) -> Result<()> {
    let (store, _) = open_store(project_dir)?;
    let Some(session) = store.get_session(id)? else {
        anyhow::bail!("session '{}' not found", id);
    };
    let entries = store.get_entries(&session.id)?;

    println!("Session: {}", session.id);
    println!("Created: {}", session.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"));
    println!("Source:  {}", session.source);
    println!("Project: {}", session.project);
    println!("Label:   {}", session.label);
    println!("Entries: {}", entries.len());
    println!();

    for entry in entries {
        println!("[{}] {}", entry.entry_type, truncate(&entry.content, SHOW_CONTENT_LIMIT));
        if entry.metadata != Value::Null {
            println!("  meta: {}", entry.metadata);
        }
        println!();
    }
    Ok(())
}

fn show_models() {
    println!("{:<10} {:<22} {:<8} {:<10} DESCRIPTION", "KEY", "MODEL", "FAMILY", "CONTEXT");
    println!("{}", "-".repeat(81));
    for model in list_models() {
        println!(
            "{:<10} {:<22} {:<8} {:<10} {}",
            model.key,
            model.name,
            model.family,
            format_context(model.context_limit),
            model.description
        );
    }
}

pub mod actions;
pub mod config;
pub mod entries;
pub mod git;
pub mod hooks;
pub mod model;
pub mod project_index;
pub mod search;
pub mod shell;
pub mod ui;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use actions::{ActionContext, ActionError, Outcome};
use config::Config;
use hooks::HookRunner;
use model::types::{HookName, RankedEntry};
use project_index::ProjectIndex;
use search::ScoringEngine;
use shell::ShellKind;
use ui::selector::{SelectorSession, SessionOptions};

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "try",
    version,
    about = "Fuzzy-find, create and tidy dated scratch directories"
)]
pub struct Cli {
    /// Tries root (overrides $TRY_PATH and the config file)
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,

    /// Config file (defaults to $TRY_CONFIG or ~/.config/try/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive picker (the default)
    Exec {
        /// Initial search query
        query: Vec<String>,
    },
    /// Print ranked entries without a terminal UI
    List {
        query: Vec<String>,

        /// Emit JSON instead of `name<TAB>score` lines
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Show at most N entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Clone a repository into a new dated directory
    Clone {
        url: String,
        /// Directory name (defaults to the repository name)
        name: Option<String>,
    },
    /// Add a detached git worktree of the current repository as a new dated directory
    Worktree {
        /// Directory name (defaults to the repository directory name)
        name: Option<String>,
    },
    /// Print the shell wrapper function to `eval` in your shell rc
    Init {
        #[arg(long, value_enum)]
        shell: Option<ShellKind>,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Everything a command needs from configuration, resolved once.
struct Workspace {
    config: Config,
    root: PathBuf,
}

impl Workspace {
    fn load(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let root = config.tries_root(cli.path.as_deref());
        tracing::debug!(root = %root.display(), "resolved tries root");
        Ok(Self { config, root })
    }

    fn project_index(&self) -> Option<ProjectIndex> {
        self.config.project_index_root().map(ProjectIndex::new)
    }

    fn hooks(&self) -> HookRunner {
        HookRunner::new(self.config.hooks.clone())
    }

    fn actions(&self) -> ActionContext {
        ActionContext::new(&self.root, self.hooks()).with_project_index(self.project_index())
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.as_ref();
    match command {
        None => run_exec(&cli, &[]).await,
        Some(Commands::Exec { query }) => run_exec(&cli, query).await,
        Some(Commands::List { query, json, limit }) => run_list(&cli, query, *json, *limit),
        Some(Commands::Clone { url, name }) => run_clone(&cli, url, name.as_deref()).await,
        Some(Commands::Worktree { name }) => run_worktree(&cli, name.as_deref()).await,
        Some(Commands::Init { shell: kind }) => {
            let kind = kind.unwrap_or_else(ShellKind::detect);
            print!("{}", shell::init_script(kind, "try"));
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "try", &mut std::io::stdout());
            Ok(())
        }
    }
}

async fn run_exec(cli: &Cli, query: &[String]) -> Result<()> {
    let ctx = Workspace::load(cli)?;
    let entries = entries::list(&ctx.root)?;
    let options = SessionOptions::new(&ctx.root, ctx.config.archive_root(&ctx.root));
    let mut session = SelectorSession::new(entries, ScoringEngine::new(), options)
        .with_query(query.join(" "));
    if let Some(index) = ctx.project_index() {
        session = session.with_index(Box::new(index));
    }

    let action = ui::tui::run_selector(&mut session)?;
    tracing::info!(?action, "selector returned");
    let outcome = ctx.actions().apply(action).await?;
    emit(&outcome)
}

fn run_list(cli: &Cli, query: &[String], json: bool, limit: Option<usize>) -> Result<()> {
    let ctx = Workspace::load(cli)?;
    let entries = entries::list(&ctx.root)?;
    let mut ranked = ScoringEngine::new().score(&entries, &query.join(" "), Utc::now());
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &ranked).context("serializing entries")?;
        writeln!(out)?;
    } else {
        for entry in &ranked {
            writeln!(out, "{}", list_line(entry))?;
        }
    }
    Ok(())
}

fn list_line(entry: &RankedEntry) -> String {
    format!("{}\t{:.3}", entry.name(), entry.score)
}

async fn run_clone(cli: &Cli, url: &str, name: Option<&str>) -> Result<()> {
    let ctx = Workspace::load(cli)?;
    let base = match name {
        Some(n) => n.to_string(),
        None => git::repo_name_from_url(url)
            .with_context(|| format!("cannot derive a directory name from {url}"))?,
    };
    let cwd = std::env::current_dir().context("reading current directory")?;
    let dest = prepare_destination(&ctx.root, &base)?;
    git::clone(&cwd, url, &dest).await?;
    ctx.hooks().notify(HookName::AfterClone, &dest).await;
    emit(&Outcome::ChangeDir(dest))
}

async fn run_worktree(cli: &Cli, name: Option<&str>) -> Result<()> {
    let ctx = Workspace::load(cli)?;
    let cwd = std::env::current_dir().context("reading current directory")?;
    let repo = git::toplevel(&cwd).await?;
    let base = match name {
        Some(n) => n.to_string(),
        None => repo
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("cannot derive a directory name from {}", repo.display()))?,
    };
    let dest = prepare_destination(&ctx.root, &base)?;
    git::worktree_add(&repo, &dest).await?;
    ctx.hooks().notify(HookName::AfterWorktree, &dest).await;
    emit(&Outcome::ChangeDir(dest))
}

/// `<root>/<dated name>`, with the root created and the destination still free.
fn prepare_destination(root: &Path, base: &str) -> Result<PathBuf> {
    let dir_name = entries::create_dir_name(base);
    if dir_name.contains('/') {
        bail!(ActionError::InvalidName(dir_name));
    }
    let dest = root.join(&dir_name);
    if dest.exists() {
        bail!(ActionError::AlreadyExists(dest));
    }
    std::fs::create_dir_all(root).with_context(|| format!("creating {}", root.display()))?;
    Ok(dest)
}

/// Print the single shell line for the wrapper to `eval`; nothing on cancel.
fn emit(outcome: &Outcome) -> Result<()> {
    if let Outcome::ChangeDir(dir) = outcome {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", shell::cd_command(dir))?;
        out.flush()?;
    }
    Ok(())
}

mod print;
mod worker;

use bb_core::bootstrap::{bootstrap, register_repo};
use bb_core::config::{self, Config};
use bb_core::error::{ConfigError, ReportError};
use bb_core::exclusions::ExclusionRepository;
use bb_core::{BackboardError, StateStore, Store, Synchronizer, branch_report};
use bb_db::{DbStore, schema};
use bb_github::GithubClient;
use bb_vcs::{Fingerprint, GitMirror};
use clap::{Parser, Subcommand};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "backboard", version, about = "Tracks which changes have been backported")]
struct Cli {
    /// Config file; defaults to $BACKBOARD_CONFIG, then ./backboard.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the read API and keep every repository synced.
    Serve,
    /// Sync every configured repository once.
    Sync,
    /// Exclude a fingerprint from backport reports.
    Exclude { fingerprint: String },
    /// Print the backport report of a release branch.
    Report {
        /// `owner/name` of a configured repository.
        repo: String,
        branch: String,
    },
    /// Print the OpenAPI document.
    Openapi,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), BackboardError> {
    match cli.command {
        Command::Openapi => {
            println!("{}", bb_serve::openapi::pretty_json());
            Ok(())
        }
        Command::Serve => serve(load_config(cli.config)?).await,
        Command::Sync => sync_once(&load_config(cli.config)?).await,
        Command::Exclude { fingerprint } => exclude(&load_config(cli.config)?, &fingerprint),
        Command::Report { repo, branch } => report(&load_config(cli.config)?, &repo, &branch),
    }
}

fn load_config(flag: Option<PathBuf>) -> Result<Config, BackboardError> {
    let explicit = flag.or_else(|| std::env::var_os(config::CONFIG_ENV).map(PathBuf::from));
    let mut config = match &explicit {
        Some(path) => Config::load(path)?,
        None => {
            let path = PathBuf::from(config::DEFAULT_CONFIG_PATH);
            if path.exists() {
                Config::load(&path)?
            } else {
                Config::from_toml("")?
            }
        }
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn open_store(config: &Config) -> Result<DbStore, BackboardError> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| BackboardError::Internal {
            message: format!("failed to create {}: {err}", parent.display()),
        })?;
    }
    let conn = schema::open_and_migrate(&config.db_path).map_err(|err| BackboardError::Internal {
        message: err.to_string(),
    })?;
    Ok(DbStore::new(conn))
}

async fn serve(config: Config) -> Result<(), BackboardError> {
    let states = Arc::new(StateStore::new());
    let targets = bootstrap(&open_store(&config)?, &states, &config)?;
    info!(repos = targets.len(), "bootstrapped");

    let store = open_store(&config)?;
    let source = GithubClient::from_config(&config.github)?;
    worker::spawn(config.clone(), store, source, Arc::clone(&states), targets)?;

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), config.listen_port);
    let state = bb_serve::AppState {
        db_path: config.db_path.clone(),
        states,
    };
    bb_serve::serve(state, addr)
        .await
        .map_err(|err| BackboardError::Internal {
            message: format!("serve error: {err}"),
        })
}

async fn sync_once(config: &Config) -> Result<(), BackboardError> {
    let store = open_store(config)?;
    let states = StateStore::new();
    let targets = bootstrap(&store, &states, config)?;
    let source = GithubClient::from_config(&config.github)?;
    let synchronizer = Synchronizer::new(&store, &source, &states, &config.tracking);

    let results = synchronizer.sync_all(&targets).await;
    let mut failed = 0;
    for (target, result) in targets.iter().zip(&results) {
        match result {
            Ok(summary) => print::summary(&target.repo, summary),
            Err(_) => failed += 1,
        }
    }
    if failed > 0 {
        return Err(BackboardError::Internal {
            message: format!("{failed} of {} repositories failed to sync", targets.len()),
        });
    }
    Ok(())
}

fn exclude(config: &Config, fingerprint: &str) -> Result<(), BackboardError> {
    let fingerprint = Fingerprint::parse(fingerprint)?;
    let added = open_store(config)?.exclusions().add(&fingerprint)?;
    if added {
        println!("excluded {fingerprint}");
    } else {
        println!("{fingerprint} was already excluded");
    }
    Ok(())
}

fn report(config: &Config, repo: &str, branch: &str) -> Result<(), BackboardError> {
    let unknown = || ReportError::UnknownRepo {
        name: repo.to_string(),
    };
    let (owner, name) = repo.split_once('/').ok_or_else(|| ConfigError::Invalid {
        message: format!("expected owner/name, got {repo}"),
    })?;
    let repo_config = config
        .repos
        .iter()
        .find(|candidate| candidate.owner == owner && candidate.name == name)
        .ok_or_else(unknown)?;

    let store = open_store(config)?;
    let states = StateStore::new();
    let path = config.mirror_path(repo_config);
    let mirror = GitMirror::open_or_clone(&repo_config.clone_url(), &path)?;
    let registered = register_repo(&store, &states, &mirror, repo_config, &config.tracking)?;
    let snapshot = states.get(registered.id).ok_or_else(unknown)?;
    let exclusions = store.exclusions().list()?;
    let report = branch_report(&snapshot, branch, &exclusions)?;
    print::report(&registered, &report);
    Ok(())
}

// Composition root: wires the adapters into the store and drives it from
// the command line.

use anyhow::{Context, Result};
use clap::Parser;
use githerd::adapters::{FsScanner, JsonRepoStore, SystemCommandRunner, TomlConfigStore};
use githerd::cli::{CliArgs, Command, SortOrder};
use githerd::services::{BatchAction, RepoStore, SortKey};
use githerd_core::domain::Repo;
use githerd_core::ports::{CommandRunner, ConfigStore, RepoListStore, RepoScanner};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = CliArgs::parse();

    let config_store = match &args.config {
        Some(path) => TomlConfigStore::with_path(path),
        None => TomlConfigStore::new()?,
    };
    let mut config = config_store.load()?;
    if let Some(git) = &args.git {
        config.git_program = git.clone();
    }
    if let Some(repo_list) = &args.repo_list {
        config.repo_list_path = Some(repo_list.clone());
    }
    info!("Using git program: {}", config.git_program);

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());
    let scanner: Arc<dyn RepoScanner> = Arc::new(FsScanner::new());
    let list_store: Arc<dyn RepoListStore> = match &config.repo_list_path {
        Some(path) => Arc::new(JsonRepoStore::with_path(path)),
        None => Arc::new(JsonRepoStore::new()?),
    };

    let store = RepoStore::new(runner, scanner, list_store, &config)?;

    run(store, args).await
}

async fn run(store: RepoStore, args: CliArgs) -> Result<()> {
    let filter = args.repos;

    match args.command {
        Command::List { sort, json } => {
            store.refresh_all().await;
            store.sort_by(sort_key(sort)).await;
            let mut rows = store.repos().await;
            if !filter.is_empty() {
                rows.retain(|repo| filter.contains(&repo.name));
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_table(&rows);
            }
        }
        Command::Add { path } => {
            let path = std::fs::canonicalize(&path)
                .with_context(|| format!("No such directory: {}", path.display()))?;
            match store.add_repository(&path).await? {
                Some(_) => println!("Tracking {}", path.display()),
                None => println!("Already tracking {}", path.display()),
            }
        }
        Command::Remove { name } => {
            let repo = resolve(&store, &name).await?;
            store.remove_repository(repo.id).await?;
            println!("Untracked {} (working tree left in place)", repo.name);
        }
        Command::Import { path, all } => {
            let path = std::fs::canonicalize(&path)
                .with_context(|| format!("No such directory: {}", path.display()))?;
            let mut candidates = store.import_scan(&[path.clone()]).await?;
            if all {
                for candidate in candidates.iter_mut() {
                    candidate.selected = true;
                }
            }
            let added = store.confirm_import(&candidates).await?;
            if store.repos().await.iter().any(|repo| repo.path == path) {
                println!("Tracking {}", path.display());
            }
            println!("Imported {} repositories", added);
            for skipped in candidates.iter().filter(|candidate| !candidate.selected) {
                println!("Skipped {} (rerun with --all to include it)", skipped.name);
            }
        }
        Command::Commit { message, push } => {
            select_targets(&store, &filter).await?;
            store.batch_commit_push(&message, push).await;
            report(&store, &filter).await;
        }
        Command::Push => run_batch(&store, &filter, BatchAction::Push).await?,
        Command::Pull => run_batch(&store, &filter, BatchAction::Pull).await?,
        Command::Sync => run_batch(&store, &filter, BatchAction::Sync).await?,
        Command::ForceSync => run_batch(&store, &filter, BatchAction::ForceSync).await?,
        Command::Clean => run_batch(&store, &filter, BatchAction::CleanBuild).await?,
        Command::Tag { name, version } => {
            let repo = resolve(&store, &name).await?;
            store.refresh_single(repo.id).await;
            let version = match version {
                Some(version) => version,
                None => store.suggest_next_version(repo.id).await?.to_string(),
            };
            if store.tag_and_refresh(repo.id, &version).await? {
                println!("Tagged {} as {}", repo.name, version);
            } else {
                anyhow::bail!("Tagging {} as {} failed", repo.name, version);
            }
        }
        Command::NextVersion { name } => {
            let repo = resolve(&store, &name).await?;
            store.refresh_single(repo.id).await;
            println!("{}", store.suggest_next_version(repo.id).await?);
        }
    }

    Ok(())
}

async fn run_batch(store: &RepoStore, filter: &[String], action: BatchAction) -> Result<()> {
    select_targets(store, filter).await?;
    store.batch(action).await;
    report(store, filter).await;
    Ok(())
}

/// Select the named repositories, or everything when no filter was given
async fn select_targets(store: &RepoStore, filter: &[String]) -> Result<()> {
    if filter.is_empty() {
        let all: Vec<_> = store.repos().await.iter().map(|repo| repo.id).collect();
        store.select(&all).await;
        return Ok(());
    }
    let mut ids = Vec::new();
    for name in filter {
        ids.push(resolve(store, name).await?.id);
    }
    store.select(&ids).await;
    Ok(())
}

async fn resolve(store: &RepoStore, name: &str) -> Result<Repo> {
    store
        .find_by_name(name)
        .await
        .with_context(|| format!("No tracked repository named '{}'", name))
}

async fn report(store: &RepoStore, filter: &[String]) {
    let mut rows = store.repos().await;
    if !filter.is_empty() {
        rows.retain(|repo| filter.contains(&repo.name));
    }
    print_table(&rows);
}

fn sort_key(order: SortOrder) -> SortKey {
    match order {
        SortOrder::Name => SortKey::Name,
        SortOrder::Branch => SortKey::Branch,
        SortOrder::Status => SortKey::Status,
    }
}

fn print_table(repos: &[Repo]) {
    if repos.is_empty() {
        println!("No repositories tracked yet - add one with `githerd add <path>`");
        return;
    }

    let name_width = column_width(repos.iter().map(|repo| repo.name.len()), "NAME".len());
    let branch_width = column_width(repos.iter().map(|repo| repo.branch.len()), "BRANCH".len());
    let status_width = column_width(
        repos.iter().map(|repo| repo.status.to_string().len()),
        "STATUS".len(),
    );
    let tag_width = column_width(repos.iter().map(|repo| tag_cell(repo).len()), "TAG".len());

    println!(
        "{:<nw$}  {:<bw$}  {:<sw$}  {:<tw$}  MESSAGE",
        "NAME",
        "BRANCH",
        "STATUS",
        "TAG",
        nw = name_width,
        bw = branch_width,
        sw = status_width,
        tw = tag_width
    );
    for repo in repos {
        // a running operation label takes the message column over
        let message = repo
            .operation
            .clone()
            .unwrap_or_else(|| repo.status_message.clone());
        println!(
            "{:<nw$}  {:<bw$}  {:<sw$}  {:<tw$}  {}",
            repo.name,
            repo.branch,
            repo.status.to_string(),
            tag_cell(repo),
            message,
            nw = name_width,
            bw = branch_width,
            sw = status_width,
            tw = tag_width
        );
    }
}

/// Tag column cell; `*` marks a tag that points at HEAD
fn tag_cell(repo: &Repo) -> String {
    if repo.tag_at_head {
        format!("{}*", repo.latest_tag)
    } else {
        repo.latest_tag.clone()
    }
}

fn column_width(lengths: impl Iterator<Item = usize>, header: usize) -> usize {
    lengths.max().unwrap_or(0).max(header)
}

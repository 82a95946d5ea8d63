use anyhow::Result;
use githerd_core::domain::{ImportCandidate, PersistedRepo, Repo, RepoId, RepoStatus, Version};
use githerd_core::error::CoreError;
use githerd_core::git::{GitCli, RepoActions, StatusFetcher};
use githerd_core::ports::{AppConfig, CommandRunner, RepoListStore, RepoScanner};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Batch actions that run once per selected repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Pull,
    Push,
    Sync,
    ForceSync,
    CleanBuild,
}

impl BatchAction {
    /// Progress label shown on a repository while the action runs
    fn label(self) -> &'static str {
        match self {
            BatchAction::Pull => "Pulling",
            BatchAction::Push => "Pushing",
            BatchAction::Sync => "Syncing",
            BatchAction::ForceSync => "Force syncing",
            BatchAction::CleanBuild => "Cleaning",
        }
    }
}

/// Keys the repository list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Branch,
    Status,
}

/// A tracked repository plus the ticket of the newest merged status
struct Tracked {
    repo: Repo,
    stamp: u64,
}

#[derive(Default)]
struct State {
    repos: HashMap<RepoId, Tracked>,
    order: Vec<RepoId>,
    selected: HashSet<RepoId>,
}

impl State {
    fn in_order(&self) -> Vec<Repo> {
        self.order
            .iter()
            .filter_map(|id| self.repos.get(id).map(|tracked| tracked.repo.clone()))
            .collect()
    }

    fn selected_in_order(&self) -> Vec<Repo> {
        self.order
            .iter()
            .filter(|id| self.selected.contains(id))
            .filter_map(|id| self.repos.get(id).map(|tracked| tracked.repo.clone()))
            .collect()
    }

    fn set_operation(&mut self, id: RepoId, operation: Option<String>) {
        if let Some(tracked) = self.repos.get_mut(&id) {
            tracked.repo.operation = operation;
        }
    }

    fn contains_path(&self, path: &Path) -> bool {
        self.repos.values().any(|tracked| tracked.repo.path == path)
    }

    fn insert(&mut self, repo: Repo) {
        self.order.push(repo.id);
        self.repos.insert(repo.id, Tracked { repo, stamp: 0 });
    }

    fn persisted(&self) -> Vec<PersistedRepo> {
        self.order
            .iter()
            .filter_map(|id| self.repos.get(id).map(|tracked| PersistedRepo::from(&tracked.repo)))
            .collect()
    }
}

struct Inner {
    fetcher: StatusFetcher,
    actions: RepoActions,
    scanner: Arc<dyn RepoScanner>,
    list_store: Arc<dyn RepoListStore>,
    state: Mutex<State>,
    refreshing: AtomicBool,
    tickets: AtomicU64,
    tag_ceiling: u64,
    favorites: Vec<String>,
}

impl Inner {
    /// Tickets order merges: taken under the state lock at dispatch time so
    /// a later dispatch always carries a larger ticket
    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Merge a fetched record back into the store. Looked up by id so
    /// results for repositories removed mid-flight fall away; fenced by
    /// ticket so an older fetch never overwrites a newer one; the in-store
    /// operation label is carried over untouched.
    async fn merge(&self, ticket: u64, updated: Repo) {
        let mut state = self.state.lock().await;
        let Some(tracked) = state.repos.get_mut(&updated.id) else {
            info!("Dropping status for removed repository {}", updated.name);
            return;
        };
        if ticket <= tracked.stamp {
            warn!(
                "Dropping stale status for {} (ticket {} <= {})",
                updated.name, ticket, tracked.stamp
            );
            return;
        }
        let operation = tracked.repo.operation.clone();
        tracked.repo = updated;
        tracked.repo.operation = operation;
        tracked.stamp = ticket;
    }

    /// Run one status fetch off the runtime and merge the result
    async fn refresh_one(&self, snapshot: Repo, ticket: u64) {
        let fetcher = self.fetcher.clone();
        let name = snapshot.name.clone();
        match tokio::task::spawn_blocking(move || fetcher.fetch_status(&snapshot)).await {
            Ok(updated) => self.merge(ticket, updated).await,
            Err(e) => error!("Status task panicked for {}: {}", name, e),
        }
    }

    /// Mark a repository loading (unless a progress label is showing) and
    /// snapshot it together with a fresh ticket
    async fn snapshot_one(&self, id: RepoId) -> Option<(Repo, u64)> {
        let mut state = self.state.lock().await;
        let tracked = state.repos.get_mut(&id)?;
        if tracked.repo.operation.is_none() {
            tracked.repo.status = RepoStatus::Loading;
        }
        Some((tracked.repo.clone(), self.next_ticket()))
    }

    async fn refresh_by_id(&self, id: RepoId) {
        let Some((snapshot, ticket)) = self.snapshot_one(id).await else {
            return;
        };
        self.refresh_one(snapshot, ticket).await;
    }

    /// Clear the progress label, then refresh the repository
    async fn finish_batch_step(&self, id: RepoId) {
        {
            let mut state = self.state.lock().await;
            state.set_operation(id, None);
        }
        self.refresh_by_id(id).await;
    }

    async fn commit_push_step(&self, repo: Repo, message: String, push: bool) {
        {
            let mut state = self.state.lock().await;
            state.set_operation(repo.id, Some("Committing...".to_string()));
        }
        let committed = if repo.status == RepoStatus::Dirty {
            let actions = self.actions.clone();
            let target = repo.clone();
            match tokio::task::spawn_blocking(move || actions.commit(&target, &message)).await {
                Ok(committed) => committed,
                Err(e) => {
                    error!("Commit task panicked for {}: {}", repo.name, e);
                    false
                }
            }
        } else {
            // nothing to commit counts as a pass so pending commits still push
            true
        };

        if push && committed {
            {
                let mut state = self.state.lock().await;
                state.set_operation(repo.id, Some("Pushing...".to_string()));
            }
            let actions = self.actions.clone();
            let target = repo.clone();
            match tokio::task::spawn_blocking(move || actions.push(&target)).await {
                Ok(true) => {}
                Ok(false) => warn!("Push failed for {}", repo.name),
                Err(e) => error!("Push task panicked for {}: {}", repo.name, e),
            }
        }

        self.finish_batch_step(repo.id).await;
    }

    /// Persist the current list. Runs on the blocking pool while the caller
    /// keeps the state lock, which serializes writers.
    async fn save_list(&self, state: &State) -> Result<(), CoreError> {
        let repos = state.persisted();
        let list_store = self.list_store.clone();
        match tokio::task::spawn_blocking(move || list_store.save(&repos)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(CoreError::Persistence { source }),
            Err(e) => Err(CoreError::Persistence {
                source: anyhow::Error::new(e),
            }),
        }
    }
}

/// Owner of the tracked repository list and everything that mutates it.
///
/// All git work fans out through tasks; results come back through
/// [`Inner::merge`], so a record can never be clobbered by a fetch that was
/// dispatched before the one already applied.
#[derive(Clone)]
pub struct RepoStore {
    inner: Arc<Inner>,
}

impl RepoStore {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        scanner: Arc<dyn RepoScanner>,
        list_store: Arc<dyn RepoListStore>,
        config: &AppConfig,
    ) -> Result<Self> {
        let git = GitCli::new(runner, config.git_program.clone());
        let fetcher = StatusFetcher::new(git.clone(), config.project_manifests.clone());
        let actions = RepoActions::new(git);

        let mut state = State::default();
        for persisted in list_store.load()? {
            state.insert(Repo::from(persisted));
        }
        info!("Loaded {} tracked repositories", state.order.len());

        Ok(Self {
            inner: Arc::new(Inner {
                fetcher,
                actions,
                scanner,
                list_store,
                state: Mutex::new(state),
                refreshing: AtomicBool::new(false),
                tickets: AtomicU64::new(0),
                tag_ceiling: config.tag_ceiling,
                favorites: config.favorites.clone(),
            }),
        })
    }

    /// Refresh every tracked repository concurrently. A second call while
    /// one is in flight returns immediately.
    pub async fn refresh_all(&self) {
        if self.inner.refreshing.swap(true, Ordering::SeqCst) {
            info!("Refresh already running, skipping");
            return;
        }

        let batch: Vec<(Repo, u64)> = {
            let mut state = self.inner.state.lock().await;
            for tracked in state.repos.values_mut() {
                if tracked.repo.operation.is_none() {
                    tracked.repo.status = RepoStatus::Loading;
                }
            }
            state
                .in_order()
                .into_iter()
                .map(|repo| (repo, self.inner.next_ticket()))
                .collect()
        };
        info!("Refreshing {} repositories", batch.len());

        let mut tasks = JoinSet::new();
        for (repo, ticket) in batch {
            let inner = self.inner.clone();
            tasks.spawn(async move {
                inner.refresh_one(repo, ticket).await;
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Refresh task failed: {}", e);
            }
        }

        self.inner.refreshing.store(false, Ordering::SeqCst);
    }

    /// Refresh a single repository; unknown ids are ignored
    pub async fn refresh_single(&self, id: RepoId) {
        self.inner.refresh_by_id(id).await;
    }

    /// Run `action` across the current selection, one task per repository:
    /// progress label first, then the action, then a status refresh
    pub async fn batch(&self, action: BatchAction) {
        let targets = self.begin_batch(&format!("{}...", action.label())).await;
        if targets.is_empty() {
            return;
        }
        info!("Running {:?} across {} repositories", action, targets.len());

        self.inner.refreshing.store(true, Ordering::SeqCst);
        let mut tasks = JoinSet::new();
        for repo in targets {
            let inner = self.inner.clone();
            tasks.spawn(async move {
                let actions = inner.actions.clone();
                let target = repo.clone();
                let outcome = tokio::task::spawn_blocking(move || match action {
                    BatchAction::Pull => actions.pull(&target),
                    BatchAction::Push => actions.push(&target),
                    BatchAction::Sync => actions.sync(&target),
                    BatchAction::ForceSync => actions.force_sync(&target),
                    BatchAction::CleanBuild => actions.clean_build_dir(&target),
                })
                .await;
                match outcome {
                    Ok(true) => {}
                    Ok(false) => warn!("{:?} failed for {}", action, repo.name),
                    Err(e) => error!("{:?} task panicked for {}: {}", action, repo.name, e),
                }
                inner.finish_batch_step(repo.id).await;
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Batch task failed: {}", e);
            }
        }
        self.inner.refreshing.store(false, Ordering::SeqCst);
    }

    /// Commit across the selection and optionally push afterwards. Clean
    /// repositories pass the commit stage trivially, so a plain push of
    /// already-committed work still goes out.
    pub async fn batch_commit_push(&self, message: &str, push: bool) {
        let targets = self.begin_batch("Preparing...").await;
        if targets.is_empty() {
            return;
        }
        info!(
            "Committing across {} repositories (push: {})",
            targets.len(),
            push
        );

        self.inner.refreshing.store(true, Ordering::SeqCst);
        let mut tasks = JoinSet::new();
        for repo in targets {
            let inner = self.inner.clone();
            let message = message.to_string();
            tasks.spawn(async move {
                inner.commit_push_step(repo, message, push).await;
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Commit task failed: {}", e);
            }
        }
        self.inner.refreshing.store(false, Ordering::SeqCst);
    }

    /// Tag the repository and push the tag, then refresh it
    pub async fn tag_and_refresh(&self, id: RepoId, version: &str) -> Result<bool, CoreError> {
        let snapshot = {
            let mut state = self.inner.state.lock().await;
            let Some(tracked) = state.repos.get_mut(&id) else {
                return Err(CoreError::RepositoryNotFound { id: id.to_string() });
            };
            tracked.repo.operation = Some("Tagging...".to_string());
            tracked.repo.clone()
        };

        let actions = self.inner.actions.clone();
        let target = snapshot.clone();
        let version = version.to_string();
        let created =
            match tokio::task::spawn_blocking(move || actions.create_tag(&target, &version)).await
            {
                Ok(created) => created,
                Err(e) => {
                    error!("Tag task panicked for {}: {}", snapshot.name, e);
                    false
                }
            };

        self.inner.finish_batch_step(id).await;
        Ok(created)
    }

    /// Suggested version for the repository's next tag, derived from the
    /// latest fetched tag
    pub async fn suggest_next_version(&self, id: RepoId) -> Result<Version, CoreError> {
        let state = self.inner.state.lock().await;
        let Some(tracked) = state.repos.get(&id) else {
            return Err(CoreError::RepositoryNotFound { id: id.to_string() });
        };
        let current = Version::parse(&tracked.repo.latest_tag).unwrap_or(Version::ZERO);
        Ok(current.next(self.inner.tag_ceiling))
    }

    /// Track a new repository and fetch its first status. `Ok(None)` means
    /// the path was already tracked.
    pub async fn add_repository(&self, path: &Path) -> Result<Option<RepoId>, CoreError> {
        let path = path.to_path_buf();
        let scanner = self.inner.scanner.clone();
        let probe = path.clone();
        let is_repo = match tokio::task::spawn_blocking(move || scanner.is_git_repository(&probe))
            .await
        {
            Ok(found) => found,
            Err(e) => {
                error!("Repository probe panicked: {}", e);
                false
            }
        };
        if !is_repo {
            return Err(CoreError::NotARepository {
                path: path.display().to_string(),
            });
        }

        let Some(id) = self.track(path).await? else {
            return Ok(None);
        };
        self.refresh_single(id).await;
        Ok(Some(id))
    }

    /// Stop tracking a repository; the working tree is left in place
    pub async fn remove_repository(&self, id: RepoId) -> Result<(), CoreError> {
        let mut state = self.inner.state.lock().await;
        if state.repos.remove(&id).is_none() {
            return Err(CoreError::RepositoryNotFound { id: id.to_string() });
        }
        state.order.retain(|other| *other != id);
        state.selected.remove(&id);
        info!("Untracked repository {}", id);
        self.inner.save_list(&state).await
    }

    /// Resolve dropped paths. A path that is itself a repository is tracked
    /// immediately; anything else is scanned one level down for candidates.
    /// Already-tracked paths never become candidates; favorites come
    /// pre-selected and sort first.
    pub async fn import_scan(&self, paths: &[PathBuf]) -> Result<Vec<ImportCandidate>, CoreError> {
        let scanner = self.inner.scanner.clone();
        let favorites = self.inner.favorites.clone();
        let roots = paths.to_vec();

        let scan = tokio::task::spawn_blocking(move || {
            let mut direct = Vec::new();
            let mut candidates = Vec::new();
            for root in roots {
                if scanner.is_git_repository(&root) {
                    direct.push(root);
                    continue;
                }
                for found in scanner.scan_subdirectories(&root) {
                    let selected = found
                        .file_name()
                        .map(|name| favorites.iter().any(|favorite| name == favorite.as_str()))
                        .unwrap_or(false);
                    candidates.push(ImportCandidate::new(found, selected));
                }
            }
            (direct, candidates)
        })
        .await;
        let (direct, mut candidates) = match scan {
            Ok(found) => found,
            Err(e) => {
                error!("Import scan panicked: {}", e);
                return Ok(Vec::new());
            }
        };

        for path in direct {
            if let Some(id) = self.track(path).await? {
                self.refresh_single(id).await;
            }
        }

        let tracked: HashSet<PathBuf> = {
            let state = self.inner.state.lock().await;
            state
                .repos
                .values()
                .map(|tracked| tracked.repo.path.clone())
                .collect()
        };
        candidates.retain(|candidate| !tracked.contains(&candidate.path));
        candidates.sort_by(|a, b| {
            b.selected
                .cmp(&a.selected)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(candidates)
    }

    /// Track every selected candidate; returns how many were newly added
    pub async fn confirm_import(
        &self,
        candidates: &[ImportCandidate],
    ) -> Result<usize, CoreError> {
        let mut added = 0;
        for candidate in candidates.iter().filter(|candidate| candidate.selected) {
            if let Some(id) = self.track(candidate.path.clone()).await? {
                self.refresh_single(id).await;
                added += 1;
            }
        }
        Ok(added)
    }

    /// Replace the selection; unknown ids are dropped
    pub async fn select(&self, ids: &[RepoId]) {
        let mut state = self.inner.state.lock().await;
        let keep: HashSet<RepoId> = ids
            .iter()
            .copied()
            .filter(|id| state.repos.contains_key(id))
            .collect();
        state.selected = keep;
    }

    /// Select everything, or clear the selection when everything is already
    /// selected
    pub async fn toggle_select_all(&self) {
        let mut state = self.inner.state.lock().await;
        if state.selected.len() == state.repos.len() {
            state.selected.clear();
        } else {
            let all: HashSet<RepoId> = state.repos.keys().copied().collect();
            state.selected = all;
        }
    }

    pub async fn selected(&self) -> Vec<RepoId> {
        let state = self.inner.state.lock().await;
        state
            .order
            .iter()
            .filter(|id| state.selected.contains(id))
            .copied()
            .collect()
    }

    /// Reorder the display order; status sorts most urgent first
    pub async fn sort_by(&self, key: SortKey) {
        let mut state = self.inner.state.lock().await;
        let mut order = std::mem::take(&mut state.order);
        order.sort_by(|a, b| {
            let (Some(a), Some(b)) = (state.repos.get(a), state.repos.get(b)) else {
                return std::cmp::Ordering::Equal;
            };
            match key {
                SortKey::Name => a.repo.name.cmp(&b.repo.name),
                SortKey::Branch => a.repo.branch.cmp(&b.repo.branch),
                SortKey::Status => a
                    .repo
                    .status
                    .cmp(&b.repo.status)
                    .then_with(|| a.repo.name.cmp(&b.repo.name)),
            }
        });
        state.order = order;
    }

    /// Current records in display order
    pub async fn repos(&self) -> Vec<Repo> {
        self.inner.state.lock().await.in_order()
    }

    pub async fn repo(&self, id: RepoId) -> Option<Repo> {
        self.inner
            .state
            .lock()
            .await
            .repos
            .get(&id)
            .map(|tracked| tracked.repo.clone())
    }

    /// First repository with the given display name
    pub async fn find_by_name(&self, name: &str) -> Option<Repo> {
        let state = self.inner.state.lock().await;
        state
            .order
            .iter()
            .filter_map(|id| state.repos.get(id))
            .map(|tracked| &tracked.repo)
            .find(|repo| repo.name == name)
            .cloned()
    }

    /// Label every selected repository and snapshot them in display order
    async fn begin_batch(&self, label: &str) -> Vec<Repo> {
        let mut state = self.inner.state.lock().await;
        let ids: Vec<RepoId> = state
            .order
            .iter()
            .filter(|id| state.selected.contains(id))
            .copied()
            .collect();
        for id in &ids {
            state.set_operation(*id, Some(label.to_string()));
        }
        state.selected_in_order()
    }

    /// Insert without validation and persist; `None` when already tracked
    async fn track(&self, path: PathBuf) -> Result<Option<RepoId>, CoreError> {
        let mut state = self.inner.state.lock().await;
        if state.contains_path(&path) {
            info!("Already tracking {}", path.display());
            return Ok(None);
        }
        let repo = Repo::new(path);
        let id = repo.id;
        info!("Tracking {} ({})", repo.name, repo.path.display());
        state.insert(repo);
        self.inner.save_list(&state).await?;
        Ok(Some(id))
    }
}

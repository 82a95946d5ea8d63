use super::status::RepoStatus;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for a tracked repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoId(pub Uuid);

impl RepoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RepoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracked repository: persisted identity plus the volatile state derived
/// by the most recent status fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repo {
    pub id: RepoId,
    pub path: PathBuf,
    pub name: String,

    // Volatile - recomputed by every status fetch, never persisted
    pub branch: String,
    pub status: RepoStatus,
    pub status_message: String,
    pub latest_tag: String,
    pub tag_at_head: bool,
    pub project_file: Option<PathBuf>,
    pub remote_url: String,

    /// Progress label set by the store while a batch action is in flight,
    /// independent of `status`
    pub operation: Option<String>,
}

impl Repo {
    /// Start tracking the repository rooted at `path`; the name defaults to
    /// the last path component
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self::fresh(RepoId::new(), path, name)
    }

    fn fresh(id: RepoId, path: PathBuf, name: String) -> Self {
        Self {
            id,
            path,
            name,
            branch: "-".to_string(),
            status: RepoStatus::Loading,
            status_message: String::new(),
            latest_tag: "-".to_string(),
            tag_at_head: false,
            project_file: None,
            remote_url: String::new(),
            operation: None,
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// The subset of a repository record that survives restarts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRepo {
    pub id: RepoId,
    pub path: PathBuf,
    pub name: String,
}

impl From<&Repo> for PersistedRepo {
    fn from(repo: &Repo) -> Self {
        Self {
            id: repo.id,
            path: repo.path.clone(),
            name: repo.name.clone(),
        }
    }
}

impl From<PersistedRepo> for Repo {
    fn from(persisted: PersistedRepo) -> Self {
        Self::fresh(persisted.id, persisted.path, persisted.name)
    }
}

/// A repository found during an import scan, awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCandidate {
    pub path: PathBuf,
    pub name: String,
    pub selected: bool,
}

impl ImportCandidate {
    pub fn new(path: PathBuf, selected: bool) -> Self {
        let name = display_name(&path);
        Self {
            path,
            name,
            selected,
        }
    }

    /// Flip the whole list: select everything unless everything is already
    /// selected, in which case clear the selection
    pub fn toggle_all(candidates: &mut [ImportCandidate]) {
        let all_selected = candidates.iter().all(|candidate| candidate.selected);
        for candidate in candidates.iter_mut() {
            candidate.selected = !all_selected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_repo_starts_loading_with_sentinels() {
        let repo = Repo::new(PathBuf::from("/work/herd-demo"));
        assert_eq!(repo.name, "herd-demo");
        assert_eq!(repo.branch, "-");
        assert_eq!(repo.latest_tag, "-");
        assert_eq!(repo.status, RepoStatus::Loading);
        assert!(repo.operation.is_none());
        assert!(!repo.tag_at_head);
    }

    #[test]
    fn test_persisted_roundtrip_keeps_identity_and_resets_state() {
        let mut repo = Repo::new(PathBuf::from("/work/herd-demo"));
        repo.branch = "main".to_string();
        repo.status = RepoStatus::Dirty;
        repo.operation = Some("Pulling...".to_string());

        let persisted = PersistedRepo::from(&repo);
        let restored = Repo::from(persisted);

        assert_eq!(restored.id, repo.id);
        assert_eq!(restored.path, repo.path);
        assert_eq!(restored.name, repo.name);
        assert_eq!(restored.branch, "-");
        assert_eq!(restored.status, RepoStatus::Loading);
        assert!(restored.operation.is_none());
    }

    #[test]
    fn test_distinct_repos_get_distinct_ids() {
        let a = Repo::new(PathBuf::from("/work/a"));
        let b = Repo::new(PathBuf::from("/work/a"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_toggle_all_selects_then_clears() {
        let mut candidates = vec![
            ImportCandidate::new(PathBuf::from("/work/a"), true),
            ImportCandidate::new(PathBuf::from("/work/b"), false),
        ];

        ImportCandidate::toggle_all(&mut candidates);
        assert!(candidates.iter().all(|c| c.selected));

        ImportCandidate::toggle_all(&mut candidates);
        assert!(candidates.iter().all(|c| !c.selected));
    }
}

use crate::domain::repo::PersistedRepo;
use anyhow::Result;
use std::path::PathBuf;

/// Store for the tracked repository list
pub trait RepoListStore: Send + Sync {
    /// Load the persisted list (empty when nothing has been saved yet)
    fn load(&self) -> Result<Vec<PersistedRepo>>;

    /// Save the full repository list
    fn save(&self, repos: &[PersistedRepo]) -> Result<()>;
}

/// Configuration store interface
pub trait ConfigStore: Send + Sync {
    /// Load configuration from storage
    fn load(&self) -> Result<AppConfig>;

    /// Save configuration to storage
    fn save(&self, config: &AppConfig) -> Result<()>;
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Git executable to shell out to
    pub git_program: String,
    /// Component ceiling for suggested version bumps
    pub tag_ceiling: u64,
    /// Manifest names probed for the project-file hint, first match wins
    pub project_manifests: Vec<String>,
    /// Repository names pre-selected when importing
    pub favorites: Vec<String>,
    /// Override for where the repository list is stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_list_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            tag_ceiling: 99,
            project_manifests: vec![
                "Package.swift".to_string(),
                "Cargo.toml".to_string(),
                "package.json".to_string(),
                "go.mod".to_string(),
                "pyproject.toml".to_string(),
            ],
            favorites: Vec::new(),
            repo_list_path: None,
        }
    }
}

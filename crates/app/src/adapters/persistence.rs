use anyhow::{Context, Result};
use directories::ProjectDirs;
use githerd_core::domain::PersistedRepo;
use githerd_core::ports::{AppConfig, ConfigStore, RepoListStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// JSON-backed store for the tracked repository list
///
/// Only identity lives on disk; branch, status and tags are re-fetched on
/// every launch.
pub struct JsonRepoStore {
    list_path: PathBuf,
}

impl JsonRepoStore {
    pub fn new() -> Result<Self> {
        Ok(Self {
            list_path: default_data_dir()?.join("repos.json"),
        })
    }

    pub fn with_path<P: AsRef<Path>>(list_path: P) -> Self {
        Self {
            list_path: list_path.as_ref().to_path_buf(),
        }
    }
}

impl RepoListStore for JsonRepoStore {
    fn load(&self) -> Result<Vec<PersistedRepo>> {
        if !self.list_path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.list_path).with_context(|| {
            format!("Failed to read repository list: {}", self.list_path.display())
        })?;

        let repos: Vec<PersistedRepo> = serde_json::from_str(&contents).with_context(|| {
            format!("Failed to parse repository list: {}", self.list_path.display())
        })?;

        Ok(repos)
    }

    fn save(&self, repos: &[PersistedRepo]) -> Result<()> {
        if let Some(parent) = self.list_path.parent() {
            fs::create_dir_all(parent).context("Failed to create data directory")?;
        }

        let contents =
            serde_json::to_string_pretty(repos).context("Failed to serialize repository list")?;

        fs::write(&self.list_path, contents).with_context(|| {
            format!("Failed to write repository list: {}", self.list_path.display())
        })?;

        Ok(())
    }
}

/// TOML configuration store that implements ConfigStore
pub struct TomlConfigStore {
    config_path: PathBuf,
}

impl TomlConfigStore {
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: default_config_path()?,
        })
    }

    pub fn with_path<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Write a default config on first run so users have a file to edit
    fn ensure_config_exists(&self) -> Result<()> {
        if !self.config_path.exists() {
            if let Some(parent) = self.config_path.parent() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
            self.save(&AppConfig::default())?;
            info!("Wrote default configuration to {}", self.config_path.display());
        }
        Ok(())
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<AppConfig> {
        self.ensure_config_exists()?;

        let contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {}", self.config_path.display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", self.config_path.display()))?;

        Ok(config)
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        let contents = toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;

        fs::write(&self.config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", self.config_path.display()))?;

        Ok(())
    }
}

fn default_data_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "githerd") {
        return Ok(proj_dirs.data_dir().to_path_buf());
    }
    let home = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(".githerd"))
}

fn default_config_path() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "githerd") {
        return Ok(proj_dirs.config_dir().join("githerd.toml"));
    }
    let home = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(".githerd").join("githerd.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use githerd_core::domain::Repo;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_repo_list_is_empty() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = JsonRepoStore::with_path(temp_dir.path().join("repos.json"));

        assert!(store.load()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_repo_list_round_trip_keeps_identity() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = JsonRepoStore::with_path(temp_dir.path().join("nested/dir/repos.json"));

        let alpha = Repo::new("/work/alpha");
        let beta = Repo::new("/work/beta");
        let saved = vec![PersistedRepo::from(&alpha), PersistedRepo::from(&beta)];
        store.save(&saved)?;

        let loaded = store.load()?;
        assert_eq!(loaded, saved);
        assert_eq!(loaded[0].id, alpha.id);
        Ok(())
    }

    #[test]
    fn test_config_load_nonexistent_creates_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("githerd.toml");

        let store = TomlConfigStore::with_path(&config_path);
        let config = store.load()?;

        assert!(config_path.exists());
        assert_eq!(config.git_program, "git");
        assert_eq!(config.tag_ceiling, 99);
        assert!(config.project_manifests.contains(&"Cargo.toml".to_string()));
        Ok(())
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = TomlConfigStore::with_path(temp_dir.path().join("githerd.toml"));

        let mut config = AppConfig::default();
        config.git_program = "/opt/git/bin/git".to_string();
        config.favorites = vec!["infra".to_string(), "api".to_string()];
        config.repo_list_path = Some(PathBuf::from("/tmp/repos.json"));
        store.save(&config)?;

        assert_eq!(store.load()?, config);
        Ok(())
    }

    #[test]
    fn test_partial_config_fills_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("githerd.toml");
        fs::write(&config_path, "tag_ceiling = 9\n")?;

        let config = TomlConfigStore::with_path(&config_path).load()?;
        assert_eq!(config.tag_ceiling, 9);
        assert_eq!(config.git_program, "git");
        assert!(config.favorites.is_empty());
        Ok(())
    }
}

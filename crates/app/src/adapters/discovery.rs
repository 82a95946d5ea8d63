use githerd_core::ports::RepoScanner;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File system scanner that implements RepoScanner
///
/// A directory counts as a repository when it carries a `.git` directory.
/// Worktrees and submodules keep `.git` as a file and are deliberately not
/// picked up here.
pub struct FsScanner;

impl FsScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FsScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl RepoScanner for FsScanner {
    fn is_git_repository(&self, path: &Path) -> bool {
        path.join(".git").is_dir()
    }

    /// One level deep only: hidden entries, plain files and unreadable
    /// directories are skipped without an error
    fn scan_subdirectories(&self, path: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();

        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            if !entry.file_type().is_dir() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if self.is_git_repository(entry.path()) {
                found.push(entry.path().to_path_buf());
            }
        }

        found.sort();
        debug!("Found {} repositories under {}", found.len(), path.display());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::TempDir;

    fn fake_repo(base: &Path, name: &str) -> Result<PathBuf> {
        let repo = base.join(name);
        fs::create_dir_all(repo.join(".git"))?;
        Ok(repo)
    }

    #[test]
    fn test_detects_git_repositories_by_git_dir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let repo = fake_repo(temp_dir.path(), "project")?;

        let scanner = FsScanner::new();
        assert!(scanner.is_git_repository(&repo));
        assert!(!scanner.is_git_repository(temp_dir.path()));
        Ok(())
    }

    #[test]
    fn test_git_file_does_not_count_as_repository() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let worktree = temp_dir.path().join("linked");
        fs::create_dir_all(&worktree)?;
        fs::write(worktree.join(".git"), "gitdir: ../somewhere\n")?;

        let scanner = FsScanner::new();
        assert!(!scanner.is_git_repository(&worktree));
        Ok(())
    }

    #[test]
    fn test_scan_returns_only_immediate_repositories() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path();
        let alpha = fake_repo(base, "alpha")?;
        let beta = fake_repo(base, "beta")?;
        fs::create_dir_all(base.join("plain"))?;
        fs::write(base.join("notes.txt"), "not a directory\n")?;
        // nested one level too deep
        fake_repo(&base.join("plain"), "nested")?;

        let scanner = FsScanner::new();
        let found = scanner.scan_subdirectories(base);
        assert_eq!(found, vec![alpha, beta]);
        Ok(())
    }

    #[test]
    fn test_scan_skips_hidden_directories() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path();
        fake_repo(base, ".cache")?;
        let visible = fake_repo(base, "visible")?;

        let scanner = FsScanner::new();
        assert_eq!(scanner.scan_subdirectories(base), vec![visible]);
        Ok(())
    }

    #[test]
    fn test_scan_of_empty_directory_is_empty() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let scanner = FsScanner::new();
        assert!(scanner.scan_subdirectories(temp_dir.path()).is_empty());
        Ok(())
    }
}

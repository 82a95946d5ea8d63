use std::path::{Path, PathBuf};

/// Port for finding git repositories on disk
/// This is blocking - caller should run in spawn_blocking
pub trait RepoScanner: Send + Sync {
    /// Whether `path` has a `.git` directory directly underneath it
    fn is_git_repository(&self, path: &Path) -> bool;

    /// Git repositories exactly one level below `path`; hidden and
    /// unreadable entries are skipped
    fn scan_subdirectories(&self, path: &Path) -> Vec<PathBuf>;
}

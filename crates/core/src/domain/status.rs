use serde::{Deserialize, Serialize};

/// Repository status classification
///
/// Variants are declared from most to least urgent, so the derived ordering
/// doubles as the default sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoStatus {
    /// Status could not be determined (no upstream, connection failure)
    Error,
    /// HEAD points at a commit instead of a branch
    Detached,
    /// Local and upstream have both moved
    Diverged,
    /// Uncommitted changes in the worktree
    Dirty,
    /// Upstream commits not yet pulled
    Behind,
    /// Local commits not yet pushed
    Ahead,
    /// In sync with the upstream
    Clean,
    /// A status fetch is in flight
    Loading,
}

impl std::fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RepoStatus::Error => "error",
            RepoStatus::Detached => "detached",
            RepoStatus::Diverged => "diverged",
            RepoStatus::Dirty => "dirty",
            RepoStatus::Behind => "behind",
            RepoStatus::Ahead => "ahead",
            RepoStatus::Clean => "clean",
            RepoStatus::Loading => "loading",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_ordering_sorts_errors_first() {
        let mut statuses = vec![
            RepoStatus::Clean,
            RepoStatus::Loading,
            RepoStatus::Dirty,
            RepoStatus::Error,
            RepoStatus::Ahead,
            RepoStatus::Behind,
            RepoStatus::Diverged,
            RepoStatus::Detached,
        ];
        statuses.sort();
        assert_eq!(
            statuses,
            vec![
                RepoStatus::Error,
                RepoStatus::Detached,
                RepoStatus::Diverged,
                RepoStatus::Dirty,
                RepoStatus::Behind,
                RepoStatus::Ahead,
                RepoStatus::Clean,
                RepoStatus::Loading,
            ]
        );
    }
}

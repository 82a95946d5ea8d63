use super::cli::GitCli;
use crate::domain::repo::Repo;
use std::fs;
use tracing::error;

/// Mutating git operations on a single repository
///
/// Every action reports plain success or failure; detail lands in the log
/// and in the status refresh that follows the action.
#[derive(Clone)]
pub struct RepoActions {
    git: GitCli,
}

impl RepoActions {
    pub fn new(git: GitCli) -> Self {
        Self { git }
    }

    /// Stage everything and commit; only the commit's exit code decides
    pub fn commit(&self, repo: &Repo, message: &str) -> bool {
        self.git.run(&repo.path, &["add", "."]);
        let commit = self.git.run(&repo.path, &["commit", "-m", message]);
        if !commit.ok() {
            error!("commit failed for {}: {}", repo.name, commit.output);
        }
        commit.ok()
    }

    pub fn push(&self, repo: &Repo) -> bool {
        let push = self.git.run(&repo.path, &["push"]);
        if !push.ok() {
            error!("push failed for {}: {}", repo.name, push.output);
        }
        push.ok()
    }

    /// Rebase pull to keep history linear
    pub fn pull(&self, repo: &Repo) -> bool {
        let pull = self.git.run(&repo.path, &["pull", "--rebase"]);
        if !pull.ok() {
            error!("pull failed for {}: {}", repo.name, pull.output);
        }
        pull.ok()
    }

    /// Pull then push; the push is skipped when the pull fails
    pub fn sync(&self, repo: &Repo) -> bool {
        self.pull(repo) && self.push(repo)
    }

    /// Fetch everything and hard-reset onto the remote branch
    ///
    /// The branch is re-resolved right before the reset so a stale record
    /// cannot aim the reset at the wrong ref; a detached or unresolvable
    /// HEAD falls back to the recorded branch.
    pub fn force_sync(&self, repo: &Repo) -> bool {
        self.git.run(&repo.path, &["fetch", "--all"]);

        let resolved = self
            .git
            .run(&repo.path, &["rev-parse", "--abbrev-ref", "HEAD"]);
        let branch = if resolved.ok() && !resolved.output.is_empty() && resolved.output != "HEAD"
        {
            resolved.output
        } else {
            repo.branch.clone()
        };
        if !usable_branch(&branch) {
            error!("force sync for {} has no usable branch", repo.name);
            return false;
        }

        let target = format!("origin/{}", branch);
        let reset = self.git.run(&repo.path, &["reset", "--hard", &target]);
        if !reset.ok() {
            error!("reset failed for {}: {}", repo.name, reset.output);
        }
        reset.ok()
    }

    /// Create a tag and push it to origin
    pub fn create_tag(&self, repo: &Repo, version: &str) -> bool {
        let tag = self.git.run(&repo.path, &["tag", version]);
        if !tag.ok() {
            error!("tag {} failed for {}: {}", version, repo.name, tag.output);
            return false;
        }
        let push = self.git.run(&repo.path, &["push", "origin", version]);
        if !push.ok() {
            error!("tag push failed for {}: {}", repo.name, push.output);
        }
        push.ok()
    }

    /// Remove the repository's .build directory; absent counts as success
    pub fn clean_build_dir(&self, repo: &Repo) -> bool {
        let build_dir = repo.path.join(".build");
        if !build_dir.exists() {
            return true;
        }
        match fs::remove_dir_all(&build_dir) {
            Ok(()) => true,
            Err(e) => {
                error!("failed to remove {}: {}", build_dir.display(), e);
                false
            }
        }
    }
}

fn usable_branch(branch: &str) -> bool {
    !(branch.is_empty()
        || branch == "-"
        || branch == "HEAD"
        || branch == "Unknown"
        || branch.starts_with("HEAD ("))
}

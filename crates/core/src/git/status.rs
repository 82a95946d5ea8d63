use super::cli::GitCli;
use crate::domain::repo::Repo;
use crate::domain::status::RepoStatus;
use std::path::{Path, PathBuf};
use tracing::warn;

const CURRENT_BRANCH: &[&str] = &["rev-parse", "--abbrev-ref", "HEAD"];
const SHORT_HEAD: &[&str] = &["rev-parse", "--short", "HEAD"];
const HEAD_COMMIT: &[&str] = &["rev-parse", "HEAD"];
const LATEST_TAG: &[&str] = &["describe", "--tags", "--abbrev=0"];
const PORCELAIN: &[&str] = &["status", "--porcelain"];
const AHEAD_BEHIND: &[&str] = &["rev-list", "--left-right", "--count", "HEAD...@{u}"];
const REMOTE_URL: &[&str] = &["remote", "get-url", "origin"];
const FETCH: &[&str] = &["fetch"];

/// Derives a repository's status from a fixed sequence of git commands
///
/// `fetch_status` returns a fresh record and never mutates its input; the
/// only side effect is the `git fetch` it runs along the way.
#[derive(Clone)]
pub struct StatusFetcher {
    git: GitCli,
    project_manifests: Vec<String>,
}

impl StatusFetcher {
    pub fn new(git: GitCli, project_manifests: Vec<String>) -> Self {
        Self {
            git,
            project_manifests,
        }
    }

    pub fn fetch_status(&self, repo: &Repo) -> Repo {
        let mut next = repo.clone();
        next.operation = None;

        next.project_file = self.find_project_file(&repo.path);
        next.remote_url = self.remote_url(&repo.path);

        let (latest_tag, tag_at_head) = self.tag_state(&repo.path);
        next.latest_tag = latest_tag;
        next.tag_at_head = tag_at_head;

        // rev-parse prints literally "HEAD" when the head is detached
        let branch = self.git.run(&repo.path, CURRENT_BRANCH);
        if branch.output == "HEAD" {
            let short = self.git.run(&repo.path, SHORT_HEAD);
            next.branch = format!("HEAD ({})", short.output);
            next.status = RepoStatus::Detached;
            let porcelain = self.git.run(&repo.path, PORCELAIN);
            next.status_message = if porcelain.output.is_empty() {
                "detached".to_string()
            } else {
                "detached with uncommitted changes".to_string()
            };
            // no upstream to compare against while detached
            return next;
        }
        next.branch = if branch.output.is_empty() {
            "Unknown".to_string()
        } else {
            branch.output
        };

        let fetch = self.git.run(&repo.path, FETCH);
        if !fetch.ok() {
            warn!("fetch failed for {}: {}", next.name, fetch.output);
        }

        let porcelain = self.git.run(&repo.path, PORCELAIN);
        if !porcelain.output.is_empty() {
            next.status = RepoStatus::Dirty;
            next.status_message = "uncommitted changes".to_string();
            return next;
        }

        let counts = self.git.run(&repo.path, AHEAD_BEHIND);
        if !counts.ok() {
            next.status = RepoStatus::Error;
            next.status_message = "no upstream / connection failed".to_string();
            return next;
        }

        let fields: Vec<u64> = counts
            .output
            .split_whitespace()
            .filter_map(|field| field.parse().ok())
            .collect();
        match fields.as_slice() {
            [ahead, behind] if *ahead > 0 && *behind > 0 => {
                next.status = RepoStatus::Diverged;
                next.status_message = format!("diverged ({} ahead, {} behind)", ahead, behind);
            }
            [ahead, _] if *ahead > 0 => {
                next.status = RepoStatus::Ahead;
                next.status_message = format!("ahead by {}", ahead);
            }
            [_, behind] if *behind > 0 => {
                next.status = RepoStatus::Behind;
                next.status_message = format!("behind by {}", behind);
            }
            _ => {
                next.status = RepoStatus::Clean;
                next.status_message = "synced".to_string();
            }
        }
        next
    }

    /// First configured manifest present at the repository root, if any
    fn find_project_file(&self, repo: &Path) -> Option<PathBuf> {
        self.project_manifests
            .iter()
            .map(|name| repo.join(name))
            .find(|candidate| candidate.exists())
    }

    fn remote_url(&self, repo: &Path) -> String {
        let remote = self.git.run(repo, REMOTE_URL);
        if remote.ok() {
            remote.output
        } else {
            String::new()
        }
    }

    fn tag_state(&self, repo: &Path) -> (String, bool) {
        let describe = self.git.run(repo, LATEST_TAG);
        if !describe.ok() || describe.output.is_empty() {
            return ("-".to_string(), false);
        }
        let tag = describe.output;
        let head = self.git.run(repo, HEAD_COMMIT);
        let tag_commit = self.git.run(repo, &["rev-list", "-n1", &tag]);
        let at_head = !head.output.is_empty() && head.output == tag_commit.output;
        (tag, at_head)
    }
}

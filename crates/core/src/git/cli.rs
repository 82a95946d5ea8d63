use crate::ports::command::{CmdOutput, CommandRunner};
use std::path::Path;
use std::sync::Arc;

/// Handle for issuing git commands inside a repository working directory
#[derive(Clone)]
pub struct GitCli {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl GitCli {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// Run `git <args>` with `repo` as the working directory
    pub fn run(&self, repo: &Path, args: &[&str]) -> CmdOutput {
        self.runner.run(&self.program, args, repo)
    }
}

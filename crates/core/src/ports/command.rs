use std::path::Path;

/// Combined result of a finished subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdOutput {
    /// stdout followed by stderr, whitespace-trimmed
    pub output: String,
    /// Exit code, or -1 when the process could not be launched
    pub code: i32,
}

impl CmdOutput {
    pub fn new(output: impl Into<String>, code: i32) -> Self {
        Self {
            output: output.into(),
            code,
        }
    }

    pub fn ok(&self) -> bool {
        self.code == 0
    }
}

/// Port for running external commands
///
/// Implementations capture stdout and stderr, combine them, and trim the
/// result. A command that cannot be launched at all yields a synthetic
/// failure (code -1) rather than an error - callers never see a fault from
/// this boundary. Blocking - caller should run in spawn_blocking.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> CmdOutput;
}

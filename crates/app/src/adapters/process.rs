use githerd_core::ports::{CmdOutput, CommandRunner};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Subprocess adapter that implements CommandRunner through std::process
///
/// Launch failures are folded into the output instead of surfacing as
/// errors, so a missing binary reads like any other failed command.
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> CmdOutput {
        debug!("Running {} {:?} in {}", program, args, cwd.display());

        let output = match Command::new(program).args(args).current_dir(cwd).output() {
            Ok(output) => output,
            Err(e) => {
                return CmdOutput::new(format!("failed to launch {}: {}", program, e), -1);
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        // None means the process died to a signal
        let code = output.status.code().unwrap_or(-1);

        CmdOutput::new(combined.trim(), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout_and_exit_code() {
        let runner = SystemCommandRunner::new();
        let out = runner.run("sh", &["-c", "echo hello"], Path::new("."));
        assert!(out.ok());
        assert_eq!(out.output, "hello");
    }

    #[test]
    fn test_combines_stderr_with_stdout() {
        let runner = SystemCommandRunner::new();
        let out = runner.run("sh", &["-c", "echo out; echo err 1>&2"], Path::new("."));
        assert!(out.ok());
        assert!(out.output.contains("out"));
        assert!(out.output.contains("err"));
    }

    #[test]
    fn test_reports_nonzero_exit_codes() {
        let runner = SystemCommandRunner::new();
        let out = runner.run("sh", &["-c", "echo fatal 1>&2; exit 3"], Path::new("."));
        assert!(!out.ok());
        assert_eq!(out.code, 3);
        assert_eq!(out.output, "fatal");
    }

    #[test]
    fn test_launch_failure_yields_synthetic_code() {
        let runner = SystemCommandRunner::new();
        let out = runner.run("githerd-no-such-binary", &["status"], Path::new("."));
        assert_eq!(out.code, -1);
        assert!(out.output.contains("failed to launch"));
    }
}

//! Command execution
//!
//! Every OS interaction goes through [`CommandRunner`] so controllers can be
//! exercised without a shell or network privileges. Commands are argv vectors
//! and never pass through `sh -c`.

use crate::error::{WifiError, WifiResult};
use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error};

/// A program plus its discrete arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Prefix the command with `sudo` when elevation is requested
    pub fn elevated(self, use_sudo: bool) -> Self {
        if !use_sudo {
            return self;
        }
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: "sudo".to_string(),
            args,
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Raw result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Successful output with the given stdout lines
    pub fn success<I, S>(stdout: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stdout: stdout.into_iter().map(Into::into).collect(),
            stderr: Vec::new(),
            code: Some(0),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Capability for running OS commands
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion and collect its output line by line
    async fn run(&self, command: &CommandLine) -> WifiResult<CommandOutput>;
}

/// Runs real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandLine) -> WifiResult<CommandOutput> {
        debug!("Running: {}", command);

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| WifiError::CommandExecution {
                command: command.to_string(),
                code: None,
                stderr: e.to_string(),
            })?;

        Ok(CommandOutput {
            stdout: split_lines(&output.stdout),
            stderr: split_lines(&output.stderr),
            code: output.status.code(),
        })
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}

/// Run a command and return its stdout lines.
///
/// Any stderr output is a failure, whatever the exit status and stdout say.
/// A non-zero or missing exit code is a failure too.
pub async fn run_checked(runner: &dyn CommandRunner, command: &CommandLine) -> WifiResult<Vec<String>> {
    let output = runner.run(command).await?;

    if !output.stderr.is_empty() {
        error!("An error occurred while attempting to run: {}", command);
        for line in &output.stderr {
            error!("{}", line);
        }
        return Err(WifiError::CommandExecution {
            command: command.to_string(),
            code: output.code,
            stderr: output.stderr.join("\n"),
        });
    }

    if !output.is_success() {
        error!("`{}` exited with {:?}", command, output.code);
        return Err(WifiError::CommandExecution {
            command: command.to_string(),
            code: output.code,
            stderr: String::new(),
        });
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_display() {
        let cmd = CommandLine::new("ping", ["-c", "4", "1.1.1.1"]);
        assert_eq!(cmd.to_string(), "ping -c 4 1.1.1.1");
    }

    #[test]
    fn test_elevated() {
        let cmd = CommandLine::new("ifconfig", ["wlan0", "down"]).elevated(true);
        assert_eq!(cmd.program, "sudo");
        assert_eq!(cmd.args, vec!["ifconfig", "wlan0", "down"]);

        let plain = CommandLine::new("ifconfig", ["wlan0", "down"]).elevated(false);
        assert_eq!(plain.program, "ifconfig");
    }

    #[tokio::test]
    async fn test_stderr_fails_regardless_of_stdout() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Ok(CommandOutput {
                stdout: vec!["all good".to_string()],
                stderr: vec!["wlan0: ERROR while getting interface flags".to_string()],
                code: Some(0),
            })
        });

        let cmd = CommandLine::new("ifconfig", ["wlan0"]);
        match run_checked(&runner, &cmd).await {
            Err(WifiError::CommandExecution { command, stderr, .. }) => {
                assert_eq!(command, "ifconfig wlan0");
                assert!(stderr.contains("ERROR while getting interface flags"));
            }
            other => panic!("expected CommandExecution, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_fails() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Ok(CommandOutput {
                stdout: Vec::new(),
                stderr: Vec::new(),
                code: Some(1),
            })
        });

        let cmd = CommandLine::new("iwlist", ["wlan0", "scanning"]);
        assert!(matches!(
            run_checked(&runner, &cmd).await,
            Err(WifiError::CommandExecution { code: Some(1), .. })
        ));
    }

    #[tokio::test]
    async fn test_clean_output_returns_stdout() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok(CommandOutput::success(["line one", "line two"])));

        let cmd = CommandLine::new("true", Vec::<String>::new());
        let lines = run_checked(&runner, &cmd).await.unwrap();
        assert_eq!(lines, vec!["line one", "line two"]);
    }

    #[tokio::test]
    async fn test_system_runner_captures_streams() {
        let runner = SystemRunner::new();
        let cmd = CommandLine::new("sh", ["-c", "echo out; echo err 1>&2"]);
        let output = runner.run(&cmd).await.unwrap();
        assert_eq!(output.stdout, vec!["out"]);
        assert_eq!(output.stderr, vec!["err"]);
        assert!(output.is_success());
    }

    #[tokio::test]
    async fn test_system_runner_missing_program() {
        let runner = SystemRunner::new();
        let cmd = CommandLine::new("definitely-not-a-real-binary-wifilink", Vec::<String>::new());
        assert!(matches!(
            runner.run(&cmd).await,
            Err(WifiError::CommandExecution { code: None, .. })
        ));
    }
}

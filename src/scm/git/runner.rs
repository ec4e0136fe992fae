//! Subprocess execution for repository commands.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::ShellError;
use crate::{log_debug, log_warning};

/// Captured output of a completed subprocess.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs a command in a fixed working directory.
///
/// The indirection exists so workflows can be exercised against scripted
/// output without spawning processes.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[&str]) -> Result<ProcessOutput, ShellError>;
}

/// Executes commands in a repository directory, capturing both streams.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    path: PathBuf,
}

impl ShellRunner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, args: &[&str]) -> Result<ProcessOutput, ShellError> {
        let command = args.join(" ");
        log_debug!("{} [{}]", command, self.path.display());

        let Some((program, rest)) = args.split_first() else {
            return Err(ShellError {
                command,
                status: -1,
                output: "empty command".to_string(),
            });
        };

        let output = tokio::process::Command::new(program)
            .args(rest)
            .current_dir(&self.path)
            .output()
            .await
            .map_err(|e| ShellError {
                command: command.clone(),
                status: -1,
                output: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        log_stream(&command, "STDOUT", &stdout);
        log_stream(&command, "STDERR", &stderr);

        if output.status.success() {
            Ok(ProcessOutput { stdout, stderr })
        } else {
            let status = output.status.code().unwrap_or(-1);
            log_warning!(
                "{} [{}]: exited with status {}",
                command,
                self.path.display(),
                status
            );
            let mut combined = stderr;
            if !stdout.is_empty() {
                if !combined.is_empty() {
                    combined.push('\n');
                }
                combined.push_str(&stdout);
            }
            Err(ShellError {
                command,
                status,
                output: combined,
            })
        }
    }
}

fn log_stream(command: &str, label: &str, out: &str) {
    let normalized = out.trim();
    if normalized.is_empty() {
        log_debug!("{command} {label}: <EMPTY>");
    } else if normalized.contains('\n') {
        log_debug!("{command} {label}:\n{normalized}");
    } else {
        log_debug!("{command} {label}: {normalized}");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    struct Rule {
        prefix: String,
        response: Result<ProcessOutput, ShellError>,
    }

    /// Replies to commands from canned rules and records every invocation.
    ///
    /// Rules are matched against the joined command line in registration
    /// order, so register the more specific prefix first.
    pub struct ScriptedRunner {
        rules: Mutex<Vec<Rule>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self {
                rules: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn ok(self, prefix: &str, stdout: &str, stderr: &str) -> Self {
            self.rules.lock().unwrap().push(Rule {
                prefix: prefix.to_string(),
                response: Ok(ProcessOutput {
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                }),
            });
            self
        }

        pub fn fail(self, prefix: &str, status: i32, output: &str) -> Self {
            self.rules.lock().unwrap().push(Rule {
                prefix: prefix.to_string(),
                response: Err(ShellError {
                    command: prefix.to_string(),
                    status,
                    output: output.to_string(),
                }),
            });
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, args: &[&str]) -> Result<ProcessOutput, ShellError> {
            let command = args.join(" ");
            self.calls.lock().unwrap().push(command.clone());
            for rule in self.rules.lock().unwrap().iter() {
                if command.starts_with(&rule.prefix) {
                    return rule.response.clone();
                }
            }
            Err(ShellError {
                command,
                status: -1,
                output: "no scripted response".to_string(),
            })
        }
    }
}

//! Invocation of the external VM-management tool.
//!
//! The tool is a black box: the only signals interpreted here are whether it
//! could be launched and whether it exited successfully. Child stdio is
//! captured rather than inherited, so the terminal stays owned by the
//! progress renderer and the stderr tail can be folded into diagnostics.

use std::io;
use std::process::{ExitStatus, Output};

use tokio::process::Command;

use crate::errors::TemplateError;

/// How a single invocation terminated abnormally.
#[derive(Debug)]
pub enum InvokeFailure {
    /// The tool ran and exited with a non-success status.
    Status {
        status: ExitStatus,
        stderr_tail: String,
    },
    /// The program could not be located or launched at all.
    NotFound { program: String },
    /// Unexpected I/O or environment error while running the tool.
    Io(io::Error),
}

impl InvokeFailure {
    /// Map this failure onto the run-level error taxonomy, attaching the
    /// step and VM the invocation belonged to.
    pub fn classify(self, step: &str, vmid: u32) -> TemplateError {
        match self {
            InvokeFailure::Status {
                status,
                stderr_tail,
            } => {
                let detail = if stderr_tail.is_empty() {
                    status.to_string()
                } else {
                    format!("{status}: {stderr_tail}")
                };
                TemplateError::CommandFailed {
                    step: step.to_string(),
                    vmid,
                    detail,
                }
            }
            InvokeFailure::NotFound { program } => TemplateError::ExecutableMissing(program),
            InvokeFailure::Io(err) => TemplateError::Unclassified(err.to_string()),
        }
    }
}

/// Run `<program> <args...>` to completion with captured stdio.
///
/// Blocks (awaits) until the child exits; no timeout is applied. The tool is
/// trusted to terminate.
pub async fn invoke(program: &str, args: &[String]) -> Result<(), InvokeFailure> {
    tracing::debug!(program, ?args, "invoking management tool");

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => InvokeFailure::NotFound {
                program: program.to_string(),
            },
            _ => InvokeFailure::Io(err),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(InvokeFailure::Status {
            stderr_tail: stderr_tail(&output),
            status: output.status,
        })
    }
}

/// Last non-empty stderr line, trimmed; `qm` reports its reason there.
fn stderr_tail(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn invoke_success() {
        assert!(invoke("sh", &args("exit 0")).await.is_ok());
    }

    #[tokio::test]
    async fn invoke_nonzero_exit_carries_status_and_stderr() {
        let failure = invoke("sh", &args("echo import failed >&2; exit 3"))
            .await
            .unwrap_err();
        match failure {
            InvokeFailure::Status {
                status,
                stderr_tail,
            } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr_tail, "import failed");
            }
            other => panic!("expected Status failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invoke_missing_program_is_not_found() {
        let failure = invoke("pvetpl-no-such-tool", &[]).await.unwrap_err();
        assert!(matches!(failure, InvokeFailure::NotFound { ref program } if program == "pvetpl-no-such-tool"));
    }

    #[tokio::test]
    async fn classify_keeps_kinds_distinct() {
        let status = invoke("sh", &args("exit 1")).await.unwrap_err();
        let missing = invoke("pvetpl-no-such-tool", &[]).await.unwrap_err();

        assert!(matches!(
            status.classify("Setting ISO", 9001),
            TemplateError::CommandFailed { vmid: 9001, .. }
        ));
        assert!(matches!(
            missing.classify("Creating VM", 9001),
            TemplateError::ExecutableMissing(_)
        ));
    }
}

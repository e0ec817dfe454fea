//! Strictly sequential fail-fast step execution.

use crate::errors::TemplateResult;
use crate::pipeline::report::{DiagnosticSink, ProgressSink};
use crate::pipeline::step::Step;
use crate::qm;

/// Runs a step sequence to completion or to first failure.
///
/// Invocation is synchronous from the pipeline's point of view: the executor
/// waits for the external command to finish before moving on, no two steps
/// ever run concurrently, and no timeout is applied to an individual step.
pub struct StepExecutor<'a> {
    program: &'a str,
    vmid: u32,
}

impl<'a> StepExecutor<'a> {
    /// Create an executor driving `program` against the VM `vmid`.
    ///
    /// `program` is almost always `qm`; tests point it at stub commands.
    pub fn new(program: &'a str, vmid: u32) -> Self {
        Self { program, vmid }
    }

    /// Execute `steps` in order.
    ///
    /// Every step advances the progress sink exactly once, skipped and
    /// failing steps included, so total progress always reflects the full
    /// declared step count. The first abnormal termination is classified,
    /// reported through the diagnostic sink, and ends the run: later steps
    /// are never invoked and effects of completed steps are not undone.
    pub async fn run(
        &self,
        steps: &[Step],
        progress: &mut dyn ProgressSink,
        diag: &mut dyn DiagnosticSink,
    ) -> TemplateResult<()> {
        for step in steps {
            match step {
                Step::Executable { description, args } => {
                    diag.line(&format!("{description} for VM {}", self.vmid));
                    let outcome = qm::invoke(self.program, args).await;
                    progress.advance();
                    if let Err(failure) = outcome {
                        let error = failure.classify(description, self.vmid);
                        diag.line(&error.to_string());
                        return Err(error);
                    }
                }
                Step::Skipped { .. } => progress.advance(),
            }
        }

        diag.line(&format!(
            "Template creation for VM {} completed successfully",
            self.vmid
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TemplateError;
    use crate::pipeline::MemorySink;
    use std::path::Path;

    fn shell_step(description: &'static str, script: String) -> Step {
        Step::executable(description, vec!["-c".to_string(), script])
    }

    fn touch_step(description: &'static str, dir: &Path, marker: &str) -> Step {
        shell_step(
            description,
            format!("touch {}", dir.join(marker).display()),
        )
    }

    #[tokio::test]
    async fn all_steps_succeed_and_progress_reaches_full_count() {
        let steps = vec![
            shell_step("Creating VM", "exit 0".to_string()),
            Step::skipped("Setting Cloud-Init Customization"),
            shell_step("Creating Template", "exit 0".to_string()),
        ];

        let mut progress = MemorySink::default();
        let mut diag = MemorySink::default();
        let result = StepExecutor::new("sh", 9002)
            .run(&steps, &mut progress, &mut diag)
            .await;

        assert!(result.is_ok());
        assert_eq!(progress.ticks, steps.len());
        // One line per executable step, plus the completion line.
        assert_eq!(diag.lines.len(), 3);
        assert_eq!(diag.lines[0], "Creating VM for VM 9002");
        assert!(diag.lines.last().unwrap().contains("completed successfully"));
    }

    #[tokio::test]
    async fn failure_stops_the_run_and_later_steps_never_execute() {
        let scratch = tempfile::tempdir().unwrap();
        let steps = vec![
            touch_step("Creating VM", scratch.path(), "step1"),
            touch_step("Configuring Network", scratch.path(), "step2"),
            shell_step("Setting ISO", "exit 2".to_string()),
            touch_step("Configuring Boot", scratch.path(), "step4"),
            touch_step("Configuring Cloud-Init", scratch.path(), "step5"),
            Step::skipped("Setting Cloud-Init Customization"),
            touch_step("Creating Template", scratch.path(), "step7"),
        ];

        let mut progress = MemorySink::default();
        let mut diag = MemorySink::default();
        let error = StepExecutor::new("sh", 9001)
            .run(&steps, &mut progress, &mut diag)
            .await
            .unwrap_err();

        // Progress covers the failed step, then stops: exactly 3 of 7.
        assert_eq!(progress.ticks, 3);
        match error {
            TemplateError::CommandFailed { step, vmid, .. } => {
                assert_eq!(step, "Setting ISO");
                assert_eq!(vmid, 9001);
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }

        assert!(scratch.path().join("step1").exists());
        assert!(scratch.path().join("step2").exists());
        for never_ran in ["step4", "step5", "step7"] {
            assert!(!scratch.path().join(never_ran).exists());
        }

        // The failure diagnostic is the last line emitted.
        assert!(diag.lines.last().unwrap().contains("Setting ISO failed for VM 9001"));
    }

    #[tokio::test]
    async fn missing_tool_is_reported_as_executable_missing() {
        let steps = vec![Step::executable(
            "Creating VM",
            vec!["create".to_string(), "9001".to_string()],
        )];

        let mut progress = MemorySink::default();
        let mut diag = MemorySink::default();
        let error = StepExecutor::new("pvetpl-no-such-tool", 9001)
            .run(&steps, &mut progress, &mut diag)
            .await
            .unwrap_err();

        assert!(matches!(error, TemplateError::ExecutableMissing(_)));
        assert_eq!(progress.ticks, 1);
    }

    #[tokio::test]
    async fn skipped_steps_advance_progress_without_diagnostics() {
        let steps = vec![
            Step::skipped("Setting Cloud-Init Customization"),
            Step::skipped("Setting Cloud-Init Customization"),
        ];

        let mut progress = MemorySink::default();
        let mut diag = MemorySink::default();
        let result = StepExecutor::new("sh", 100)
            .run(&steps, &mut progress, &mut diag)
            .await;

        assert!(result.is_ok());
        assert_eq!(progress.ticks, 2);
        // Only the completion line; skipped slots are silent.
        assert_eq!(diag.lines.len(), 1);
    }

    #[tokio::test]
    async fn command_failure_detail_includes_stderr_tail() {
        let steps = vec![shell_step(
            "Setting ISO",
            "echo unable to import volume >&2; exit 1".to_string(),
        )];

        let mut progress = MemorySink::default();
        let mut diag = MemorySink::default();
        let error = StepExecutor::new("sh", 9001)
            .run(&steps, &mut progress, &mut diag)
            .await
            .unwrap_err();

        match error {
            TemplateError::CommandFailed { detail, .. } => {
                assert!(detail.contains("unable to import volume"), "detail: {detail}");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }
}

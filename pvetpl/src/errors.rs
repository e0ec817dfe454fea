//! Error taxonomy for template provisioning.

use thiserror::Error;

/// Closed set of failure kinds for a provisioning run.
///
/// Every variant is terminal for the current run: nothing is retried and
/// nothing is rolled back. `Validation` is produced only by the resolver,
/// before any external command runs; the other three classify how a single
/// `qm` invocation terminated abnormally.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Request validation failed; the orchestrator was never started.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The management tool ran but exited with a non-success status.
    #[error("{step} failed for VM {vmid}: {detail}")]
    CommandFailed {
        step: String,
        vmid: u32,
        detail: String,
    },

    /// The management tool could not be located or launched at all.
    #[error("executable not found: {0}")]
    ExecutableMissing(String),

    /// Abnormal condition outside the kinds above (unexpected I/O or
    /// environment error).
    #[error("{0}")]
    Unclassified(String),
}

pub type TemplateResult<T> = Result<T, TemplateError>;

//! Request resolution: flag validation and media path resolution.
//!
//! Everything here runs before the orchestrator. A failure in this module
//! means `qm` is never invoked and the process aborts with a validation
//! error; resolver errors never reach the step pipeline.

use std::path::{Path, PathBuf};

use crate::constants::paths;
use crate::errors::{TemplateError, TemplateResult};
use crate::request::TemplateRequest;

/// Raw flag values as parsed from the CLI, prior to validation.
#[derive(Debug, Clone)]
pub struct TemplateInput {
    pub vmid: u32,
    pub name: String,
    pub vlan: u16,
    pub memory_mib: u32,
    pub cores: u32,
    pub cinit: Option<String>,
    pub iso: PathBuf,
    pub ostype: String,
}

/// Validates a [`TemplateInput`] into a [`TemplateRequest`].
///
/// The system directories are fields so tests can point them at scratch
/// locations; production code uses [`Resolver::default`].
#[derive(Debug, Clone)]
pub struct Resolver {
    /// Directory searched when the ISO is not found at the given path.
    pub iso_dir: PathBuf,
    /// Directory cloud-init snippets must live in.
    pub snippets_dir: PathBuf,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            iso_dir: PathBuf::from(paths::ISO_DIR),
            snippets_dir: PathBuf::from(paths::SNIPPETS_DIR),
        }
    }
}

impl Resolver {
    /// Validate `input` and resolve its media paths.
    pub fn resolve(&self, input: TemplateInput) -> TemplateResult<TemplateRequest> {
        if input.vmid == 0 {
            return Err(TemplateError::Validation(
                "VM ID must be a positive integer".to_string(),
            ));
        }

        if input.name.is_empty() || input.name.chars().any(char::is_whitespace) {
            return Err(TemplateError::Validation(format!(
                "VM name {:?} must be non-empty and contain no whitespace",
                input.name
            )));
        }

        if input.memory_mib == 0 {
            return Err(TemplateError::Validation(
                "memory size must be positive".to_string(),
            ));
        }

        if input.cores == 0 {
            return Err(TemplateError::Validation(
                "core count must be positive".to_string(),
            ));
        }

        let cwd = std::env::current_dir()
            .map_err(|err| TemplateError::Unclassified(format!("working directory: {err}")))?;
        let iso = self.resolve_iso(input.iso, &cwd)?;

        // An empty snippet name means "no customization", same as omitting it.
        let cinit = input.cinit.filter(|snippet| !snippet.is_empty());
        if let Some(snippet) = &cinit {
            let candidate = self.snippets_dir.join(snippet);
            if !candidate.exists() {
                return Err(TemplateError::Validation(format!(
                    "cloud-init snippet {:?} does not exist in {}",
                    snippet,
                    self.snippets_dir.display()
                )));
            }
        }

        Ok(TemplateRequest {
            vmid: input.vmid,
            name: input.name,
            vlan: input.vlan,
            memory_mib: input.memory_mib,
            cores: input.cores,
            iso,
            cinit,
            ostype: input.ostype,
        })
    }

    /// Resolve the ISO location: the given path (made absolute against
    /// `cwd`), falling back to the same file name under the system ISO
    /// directory.
    fn resolve_iso(&self, iso: PathBuf, cwd: &Path) -> TemplateResult<PathBuf> {
        let absolute = if iso.is_absolute() {
            iso
        } else {
            let joined = cwd.join(iso);
            tracing::info!(path = %joined.display(), "resolved ISO path against working directory");
            joined
        };

        if absolute.exists() {
            return Ok(absolute);
        }

        if let Some(file_name) = absolute.file_name() {
            let candidate = self.iso_dir.join(file_name);
            if candidate.exists() {
                tracing::info!(path = %candidate.display(), "ISO found in system ISO directory");
                return Ok(candidate);
            }
        }

        Err(TemplateError::Validation(format!(
            "ISO file must be located in the working directory or {}",
            self.iso_dir.display()
        )))
    }
}

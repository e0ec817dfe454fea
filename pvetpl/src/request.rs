use std::path::PathBuf;

/// Validated provisioning parameters for one template run.
///
/// Built once by the resolver and read-only afterwards; the orchestrator
/// owns it for the duration of a single run. All shape constraints (positive
/// VM ID, whitespace-free name, existing ISO and snippet) are enforced
/// before construction, so consumers never re-validate.
#[derive(Debug, Clone)]
pub struct TemplateRequest {
    // === Identity ===
    /// VM identifier, unique within the hypervisor.
    pub vmid: u32,
    /// Display name (no whitespace).
    pub name: String,

    // === Hardware ===
    /// VLAN tag for the first NIC; 0 means untagged.
    pub vlan: u16,
    /// Memory size in MiB.
    pub memory_mib: u32,
    /// CPU core count.
    pub cores: u32,

    // === Installation media ===
    /// Absolute path to the installer ISO.
    pub iso: PathBuf,
    /// Cloud-init user-data snippet name, if any (existence already
    /// verified against the snippets directory).
    pub cinit: Option<String>,
    /// OS type tag understood by the hypervisor.
    pub ostype: String,
}

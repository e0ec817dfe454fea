//! Step-table construction and the top-level provisioning run.
//!
//! The plan is built fresh for every request and is purely data: the only
//! branch is the optional cloud-init customization slot, which degrades to
//! [`Step::Skipped`] so the sequence always keeps its full length.

use crate::constants::{net, storage};
use crate::errors::TemplateResult;
use crate::pipeline::{DiagnosticSink, ProgressSink, Step, StepExecutor};
use crate::request::TemplateRequest;

/// Number of slots in every provisioning plan, skipped steps included.
pub const STEP_COUNT: usize = 7;

/// The management tool driven by the orchestrator.
pub const QM: &str = "qm";

/// Build the ordered step table for one request.
///
/// Always yields exactly [`STEP_COUNT`] steps in a fixed order; the order
/// encodes the hypervisor's dependency constraints and templating is
/// strictly last because it freezes the VM.
pub fn provisioning_plan(request: &TemplateRequest) -> Vec<Step> {
    let vmid = request.vmid.to_string();

    let mut net0 = format!("{},bridge={}", net::NIC_MODEL, net::DEFAULT_BRIDGE);
    if request.vlan != 0 {
        net0.push_str(&format!(",tag={}", request.vlan));
    }

    let customization = match &request.cinit {
        Some(snippet) => Step::executable(
            "Setting Cloud-Init Customization",
            vec![
                "set".to_string(),
                vmid.clone(),
                "--cicustom".to_string(),
                format!("user={}/{}", storage::SNIPPETS_VOLUME, snippet),
            ],
        ),
        None => Step::skipped("Setting Cloud-Init Customization"),
    };

    vec![
        Step::executable(
            "Creating VM",
            vec![
                "create".to_string(),
                vmid.clone(),
                "--name".to_string(),
                request.name.clone(),
                "--ostype".to_string(),
                request.ostype.clone(),
                "--tablet".to_string(),
                "0".to_string(),
            ],
        ),
        Step::executable(
            "Configuring Network",
            vec![
                "set".to_string(),
                vmid.clone(),
                "--net0".to_string(),
                net0,
                "--memory".to_string(),
                request.memory_mib.to_string(),
                "--cores".to_string(),
                request.cores.to_string(),
                "--cpu".to_string(),
                "host".to_string(),
            ],
        ),
        Step::executable(
            "Setting ISO",
            vec![
                "set".to_string(),
                vmid.clone(),
                "--scsi0".to_string(),
                format!(
                    "{}:0,import-from={},discard=on,ssd=1",
                    storage::LOCAL_LVM,
                    request.iso.display()
                ),
            ],
        ),
        Step::executable(
            "Configuring Boot",
            vec![
                "set".to_string(),
                vmid.clone(),
                "--boot".to_string(),
                "order=scsi0".to_string(),
                "--scsihw".to_string(),
                storage::SCSI_CONTROLLER.to_string(),
                "--agent".to_string(),
                "enabled=1,fstrim_cloned_disks=1".to_string(),
            ],
        ),
        Step::executable(
            "Configuring Cloud-Init",
            vec![
                "set".to_string(),
                vmid.clone(),
                "--ide2".to_string(),
                format!("{}:cloudinit", storage::LOCAL_LVM),
                "--ipconfig0".to_string(),
                "ip=dhcp".to_string(),
            ],
        ),
        customization,
        Step::executable("Creating Template", vec!["template".to_string(), vmid]),
    ]
}

/// Run the full provisioning sequence for `request` against `program`.
///
/// Fail-fast with no rollback: re-running after a partial failure is
/// expected to fail at the first step because the VM already exists, unless
/// the caller cleans up first.
pub async fn run(
    program: &str,
    request: &TemplateRequest,
    progress: &mut dyn ProgressSink,
    diag: &mut dyn DiagnosticSink,
) -> TemplateResult<()> {
    let plan = provisioning_plan(request);
    debug_assert_eq!(plan.len(), STEP_COUNT);

    StepExecutor::new(program, request.vmid)
        .run(&plan, progress, diag)
        .await
}

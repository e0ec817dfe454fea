//! pvetpl - Proxmox VE template provisioning.
//!
//! Drives the `qm` management tool through a fixed sequence of configuration
//! steps and converts the result into a reusable template.
//!
//! ## Architecture
//!
//! ```text
//! Resolver → Orchestrator → qm (one invocation per step)
//!
//! Provisioning plan (fixed order):
//!   1. Creating VM                        (allocate the VM resource)
//!   2. Configuring Network                (NIC, memory, cores, cpu host)
//!   3. Setting ISO                        (import ISO as scsi0)
//!   4. Configuring Boot                   (boot order, controller, agent)
//!   5. Configuring Cloud-Init             (cloudinit device, DHCP)
//!   6. Setting Cloud-Init Customization   (optional; skipped slot otherwise)
//!   7. Creating Template                  (freeze the VM, must be last)
//! ```
//!
//! The order encodes real dependency constraints of the hypervisor: a disk
//! cannot be attached before the VM exists, boot order cannot be set before
//! the disk exists, and templating freezes the VM so it is strictly last.
//!
//! Execution is strictly sequential and fail-fast. Completed steps have
//! already taken effect on the VM when a later step fails; nothing is rolled
//! back, and re-running the sequence against the same VM ID will fail at the
//! first step because the VM already exists. Cleaning up a half-provisioned
//! VM is the caller's job.

pub mod constants;
mod errors;
pub mod pipeline;
pub mod provision;
pub mod qm;
pub mod request;
pub mod resolve;
pub mod ui;

pub use errors::{TemplateError, TemplateResult};
pub use request::TemplateRequest;

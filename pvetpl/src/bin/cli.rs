use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use pvetpl::pipeline::Step;
use pvetpl::provision::{self, QM, STEP_COUNT};
use pvetpl::resolve::{Resolver, TemplateInput};
use pvetpl::ui::{TermDiagnostics, TermProgress};

/// Create a Proxmox VE template from an ISO file.
#[derive(Debug, Parser)]
#[command(name = "pvetpl", version, about)]
struct Cli {
    /// Virtual machine ID
    #[arg(long)]
    vmid: u32,

    /// Virtual machine name (no whitespace)
    #[arg(long)]
    name: String,

    /// VLAN tag for the first NIC (0 = untagged)
    #[arg(long, default_value_t = 0)]
    vlan: u16,

    /// Memory size in MiB
    #[arg(long, default_value_t = 2046)]
    memory: u32,

    /// Number of CPU cores
    #[arg(long, default_value_t = 2)]
    cores: u32,

    /// Cloud-init user-data snippet file name
    #[arg(long)]
    cinit: Option<String>,

    /// Path to the installer ISO
    #[arg(long)]
    iso: PathBuf,

    /// Operating system type tag
    #[arg(long, default_value = "l26")]
    ostype: String,

    /// Print the step table without invoking the management tool
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|err| anyhow::anyhow!("install tracing subscriber: {err}"))?;

    let cli = Cli::parse();
    let dry_run = cli.dry_run;

    let input = TemplateInput {
        vmid: cli.vmid,
        name: cli.name,
        vlan: cli.vlan,
        memory_mib: cli.memory,
        cores: cli.cores,
        cinit: cli.cinit,
        iso: cli.iso,
        ostype: cli.ostype,
    };

    // Validation failures abort before any qm invocation.
    let request = match Resolver::default().resolve(input) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{} {}", style("error:").red().bold(), err);
            return Ok(ExitCode::from(2));
        }
    };

    if dry_run {
        for step in provision::provisioning_plan(&request) {
            match step {
                Step::Executable { args, .. } => {
                    println!("{} {} {}", style("run").green(), QM, args.join(" "));
                }
                Step::Skipped { description } => {
                    println!("{} {}", style("skip").yellow(), style(description).dim());
                }
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut progress = TermProgress::new(STEP_COUNT as u64, "Creating Template");
    let mut diag = TermDiagnostics::new(&progress);

    // The run's failure has already been reported through the diagnostic
    // sink; here it only decides the exit code.
    match provision::run(QM, &request, &mut progress, &mut diag).await {
        Ok(()) => {
            progress.finish();
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => {
            progress.abandon();
            Ok(ExitCode::FAILURE)
        }
    }
}

mod config;
mod failure;
mod handoff;
mod orchestrator;
mod render;
mod report;
mod tasks;

use std::sync::{mpsc, Arc};
use std::thread;

use clap::Parser;
use pinnacle_core::{Platform, ProgressTracker};
use pinnacle_installer::WorkingLayout;
use pinnacle_remote::{HttpFetcher, MetadataEndpoints};
use tracing_subscriber::EnvFilter;

use crate::config::{default_release_version, BootstrapConfig, Cli};
use crate::failure::{TaskFailure, TaskKind, Trail, TrailResultExt};
use crate::orchestrator::{HostSignal, Orchestrator};
use crate::render::{resolve_output_style, run_progress_host};
use crate::report::{DiagnosticTags, LogReporter, Reporter};
use crate::tasks::Acquisition;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut tags = DiagnosticTags::collect(default_release_version());
    if let Err(failure) = run(&cli, &mut tags) {
        LogReporter::new(tags).report(&failure);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();
}

fn run(cli: &Cli, tags: &mut DiagnosticTags) -> Result<(), TaskFailure> {
    let mut trail = Trail::new(TaskKind::Startup);

    let platform = Platform::current().fail_with(&trail, || {
        format!(
            "checking platform: {}/{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        )
    })?;
    trail.crumb(format!("detected {}/{}", platform.os, platform.arch));

    let config = BootstrapConfig::resolve(cli, platform)
        .fail_with(&trail, || "resolving configuration".to_string())?;
    *tags = DiagnosticTags::collect(config.release_version());
    let layout = WorkingLayout::new(&config.working_dir);
    layout
        .ensure_root()
        .fail_with(&trail, || format!("mkdir {}", layout.root().display()))?;
    trail.crumb(format!("working directory {}", layout.root().display()));

    let fetcher = HttpFetcher::for_platform(config.release_version(), platform)
        .fail_with(&trail, || "building HTTP client".to_string())?;
    let progress = ProgressTracker::default();
    let orchestrator = Orchestrator::new(
        Acquisition {
            layout,
            endpoints: MetadataEndpoints::new(config.metadata_url.clone()),
            platform,
            fetcher: Arc::new(fetcher),
            progress: progress.clone(),
        },
        config.launch_version.clone(),
    );

    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("bootstrap-handoff".to_string())
        .spawn(move || {
            let _ = tx.send(HostSignal::from(orchestrator.run_to_handoff()));
        })
        .fail_with(&trail, || "spawning handoff thread".to_string())?;

    match run_progress_host(resolve_output_style(cli.plain), &progress, &rx) {
        HostSignal::Close { pid } => {
            tracing::info!(pid, "launcher started; exiting");
            Ok(())
        }
        HostSignal::Failed(failure) => Err(failure),
    }
}

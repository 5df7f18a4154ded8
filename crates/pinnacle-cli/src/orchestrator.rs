use std::sync::mpsc;
use std::thread;

use anyhow::anyhow;

use crate::failure::{TaskFailure, TaskKind, Trail, TrailResultExt};
use crate::handoff::LaunchCommand;
use crate::tasks::{acquire_bundle, acquire_runtime, Acquisition, TaskOutcome};

type AcquireFn = fn(&Acquisition) -> Result<TaskOutcome, TaskFailure>;

const ACQUISITION_TASKS: [(TaskKind, AcquireFn); 2] = [
    (TaskKind::Runtime, acquire_runtime),
    (TaskKind::Bundle, acquire_bundle),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AcquisitionSummary {
    pub(crate) bundle: TaskOutcome,
    pub(crate) runtime: TaskOutcome,
}

/// What the coordinator tells the hosting UI once it is done.
#[derive(Debug)]
pub(crate) enum HostSignal {
    Close { pid: u32 },
    Failed(TaskFailure),
}

impl From<Result<u32, TaskFailure>> for HostSignal {
    fn from(result: Result<u32, TaskFailure>) -> Self {
        match result {
            Ok(pid) => Self::Close { pid },
            Err(failure) => Self::Failed(failure),
        }
    }
}

pub(crate) struct Orchestrator {
    env: Acquisition,
    launch_version: Option<String>,
}

impl Orchestrator {
    pub(crate) fn new(env: Acquisition, launch_version: Option<String>) -> Self {
        Self {
            env,
            launch_version,
        }
    }

    /// Runs both acquisition tasks on their own threads and waits for both.
    ///
    /// The first failure is returned as soon as it arrives; the other task is not
    /// waited for, since the caller terminates the process on any failure.
    pub(crate) fn acquire_all(&self) -> Result<AcquisitionSummary, TaskFailure> {
        let (tx, rx) = mpsc::channel();
        for (task, acquire) in ACQUISITION_TASKS {
            let env = self.env.clone();
            let tx = tx.clone();
            thread::Builder::new()
                .name(format!("acquire-{task}"))
                .spawn(move || {
                    let _ = tx.send((task, acquire(&env)));
                })
                .map_err(|err| {
                    TaskFailure::new(task, "spawning acquisition thread", err.into())
                })?;
        }
        drop(tx);

        let mut bundle = None;
        let mut runtime = None;
        for _ in 0..ACQUISITION_TASKS.len() {
            let (task, result) = rx.recv().map_err(|_| {
                TaskFailure::new(
                    TaskKind::Handoff,
                    "waiting for acquisition tasks",
                    anyhow!("an acquisition task exited without reporting"),
                )
            })?;
            let outcome = result?;
            tracing::info!(task = %task, outcome = outcome.as_str(), "acquisition task finished");
            match task {
                TaskKind::Bundle => bundle = Some(outcome),
                _ => runtime = Some(outcome),
            }
        }

        match (bundle, runtime) {
            (Some(bundle), Some(runtime)) => Ok(AcquisitionSummary { bundle, runtime }),
            _ => Err(TaskFailure::new(
                TaskKind::Handoff,
                "waiting for acquisition tasks",
                anyhow!("acquisition tasks reported an incomplete set of results"),
            )),
        }
    }

    pub(crate) fn launch_command(&self) -> LaunchCommand {
        LaunchCommand::build(
            &self.env.layout,
            self.env.platform.os,
            self.launch_version.as_deref(),
        )
    }

    /// Waits for both artifacts, then starts the launcher. Returns the child pid.
    pub(crate) fn run_to_handoff(&self) -> Result<u32, TaskFailure> {
        self.run_to_handoff_with(LaunchCommand::spawn_detached)
    }

    pub(crate) fn run_to_handoff_with<Spawn>(&self, spawn: Spawn) -> Result<u32, TaskFailure>
    where
        Spawn: FnOnce(&LaunchCommand) -> anyhow::Result<u32>,
    {
        let summary = self.acquire_all()?;

        let mut trail = Trail::new(TaskKind::Handoff);
        trail.crumb(format!(
            "artifacts ready (bundle {}, runtime {})",
            summary.bundle.as_str(),
            summary.runtime.as_str()
        ));

        let command = self.launch_command();
        let pid = spawn(&command).fail_with(&trail, || "starting launcher process".to_string())?;
        trail.crumb(format!("released launcher process {pid}"));
        Ok(pid)
    }
}

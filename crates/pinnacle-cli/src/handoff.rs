use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use pinnacle_core::OperatingSystem;
use pinnacle_installer::WorkingLayout;

const HEAP_FLAGS: [&str; 2] = ["-Xms512M", "-Xmx512M"];

/// The downstream launcher invocation: the managed runtime running `launcher.jar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaunchCommand {
    program: PathBuf,
    args: Vec<OsString>,
    working_dir: PathBuf,
}

impl LaunchCommand {
    pub(crate) fn build(
        layout: &WorkingLayout,
        os: OperatingSystem,
        launch_version: Option<&str>,
    ) -> Self {
        let mut args: Vec<OsString> = HEAP_FLAGS.into_iter().map(OsString::from).collect();

        // AWT/GLFW windows must live on the main thread on macOS.
        if os == OperatingSystem::Mac {
            args.push("-XstartOnFirstThread".into());
        }

        args.push("-jar".into());
        args.push(layout.bundle_path().into_os_string());

        if let Some(version) = launch_version.filter(|value| !value.is_empty()) {
            args.push("--pinnacle-version".into());
            args.push(version.into());
        }

        Self {
            program: layout.runtime_executable(os),
            args,
            working_dir: layout.root().to_path_buf(),
        }
    }

    pub(crate) fn program(&self) -> &Path {
        &self.program
    }

    pub(crate) fn args(&self) -> &[OsString] {
        &self.args
    }

    pub(crate) fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }

    /// Starts the launcher and gives up ownership of it. The child is never
    /// waited on or killed; it outlives this process. Returns its pid.
    pub(crate) fn spawn_detached(&self) -> Result<u32> {
        let child = self.to_command().spawn().with_context(|| {
            format!(
                "starting launcher process {} in {}",
                self.program.display(),
                self.working_dir.display()
            )
        })?;
        let pid = child.id();
        drop(child);
        Ok(pid)
    }
}

use anyhow::{Context, Result};
use pinnacle_core::{OperatingSystem, RUNTIME_MAJOR_VERSION};
use std::fs;
use std::path::{Path, PathBuf};

/// Every path the bootstrap reads or writes, derived from one working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingLayout {
    root: PathBuf,
}

impl WorkingLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bundle_path(&self) -> PathBuf {
        self.root.join("launcher.jar")
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.root.join("jre").join(RUNTIME_MAJOR_VERSION)
    }

    pub fn runtime_manifest_path(&self) -> PathBuf {
        self.runtime_dir().join("version.json")
    }

    pub fn runtime_archive_path(&self) -> PathBuf {
        self.runtime_dir().join("jre.zip")
    }

    pub fn runtime_extracted_dir(&self) -> PathBuf {
        self.runtime_dir().join("extracted")
    }

    pub fn runtime_executable(&self, os: OperatingSystem) -> PathBuf {
        self.runtime_extracted_dir()
            .join("bin")
            .join(os.runtime_executable())
    }

    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("mkdir {}", self.root.display()))
    }

    pub fn ensure_runtime_dir(&self) -> Result<PathBuf> {
        let dir = self.runtime_dir();
        fs::create_dir_all(&dir).with_context(|| format!("mkdir {}", dir.display()))?;
        Ok(dir)
    }
}

/// Data directory of the client for the given operating system.
///
/// - Windows: `%AppData%\.alpineclient`
/// - Mac: `$HOME/Library/Application Support/alpineclient` (no leading dot)
/// - Linux: `$HOME/.alpineclient`
pub fn default_working_dir(os: OperatingSystem) -> Result<PathBuf> {
    match os {
        OperatingSystem::Windows => {
            let app_data = std::env::var("AppData")
                .context("AppData is not set; cannot resolve Windows working directory")?;
            Ok(PathBuf::from(app_data).join(".alpineclient"))
        }
        OperatingSystem::Mac => {
            let home = std::env::var("HOME")
                .context("HOME is not set; cannot resolve working directory")?;
            Ok(PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("alpineclient"))
        }
        OperatingSystem::Linux => {
            let home = std::env::var("HOME")
                .context("HOME is not set; cannot resolve working directory")?;
            Ok(PathBuf::from(home).join(".alpineclient"))
        }
    }
}

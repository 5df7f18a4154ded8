use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use pinnacle_core::Platform;
use pinnacle_installer::default_working_dir;
use pinnacle_remote::DEFAULT_METADATA_URL;
use serde::Deserialize;

/// Version baked in at build time with `PINNACLE_VERSION=... cargo build`.
pub(crate) const BUILD_VERSION: Option<&str> = option_env!("PINNACLE_VERSION");

/// Release reported before the configuration is known.
pub(crate) fn default_release_version() -> &'static str {
    BUILD_VERSION.unwrap_or(env!("CARGO_PKG_VERSION"))
}

pub(crate) const CONFIG_FILE_NAME: &str = "bootstrap.toml";

#[derive(Parser, Debug, Default)]
#[command(name = "pinnacle-bootstrap")]
#[command(about = "Keeps the client runtime and launcher current, then starts the launcher", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Base URL of the metadata service.
    #[arg(long, env = "PINNACLE_METADATA_URL")]
    pub(crate) metadata_url: Option<String>,
    /// Directory holding the launcher, the runtime and its manifest.
    #[arg(long, env = "PINNACLE_WORKING_DIR")]
    pub(crate) working_dir: Option<PathBuf>,
    /// Passed to the launcher as `--pinnacle-version`.
    #[arg(long, env = "PINNACLE_LAUNCH_VERSION")]
    pub(crate) launch_version: Option<String>,
    /// Print plain progress lines instead of an animated bar.
    #[arg(long)]
    pub(crate) plain: bool,
    #[arg(long, short)]
    pub(crate) verbose: bool,
}

/// Optional overrides read from `bootstrap.toml` in the working directory.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) metadata_url: Option<String>,
    pub(crate) launch_version: Option<String>,
}

impl FileConfig {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BootstrapConfig {
    pub(crate) metadata_url: String,
    pub(crate) working_dir: PathBuf,
    pub(crate) launch_version: Option<String>,
}

impl BootstrapConfig {
    /// Command line and environment win over `bootstrap.toml`, which wins over the
    /// built-in defaults.
    pub(crate) fn resolve(cli: &Cli, platform: Platform) -> Result<Self> {
        let working_dir = match &cli.working_dir {
            Some(dir) => dir.clone(),
            None => default_working_dir(platform.os)?,
        };
        let file = FileConfig::load(&working_dir.join(CONFIG_FILE_NAME))?;
        Ok(Self::merge(cli, file, working_dir, BUILD_VERSION))
    }

    pub(crate) fn merge(
        cli: &Cli,
        file: FileConfig,
        working_dir: PathBuf,
        build_version: Option<&str>,
    ) -> Self {
        let metadata_url = non_empty(cli.metadata_url.clone())
            .or_else(|| non_empty(file.metadata_url))
            .unwrap_or_else(|| DEFAULT_METADATA_URL.to_string());
        let launch_version = non_empty(cli.launch_version.clone())
            .or_else(|| non_empty(file.launch_version))
            .or_else(|| non_empty(build_version.map(str::to_string)));

        Self {
            metadata_url,
            working_dir,
            launch_version,
        }
    }

    /// Version reported in the user agent and diagnostics.
    pub(crate) fn release_version(&self) -> &str {
        self.launch_version
            .as_deref()
            .unwrap_or_else(|| default_release_version())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

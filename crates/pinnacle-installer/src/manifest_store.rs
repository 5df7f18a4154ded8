use anyhow::{Context, Result};
use pinnacle_core::InstalledManifest;
use std::fs;
use std::path::Path;

/// Reads the side-record of the installed runtime. Missing, unreadable and
/// malformed files all mean there is no usable cache.
pub fn read_installed_manifest(path: &Path) -> Option<InstalledManifest> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(err) => {
            tracing::debug!(
                path = %path.display(),
                error = %err,
                "installed manifest unavailable"
            );
            return None;
        }
    };

    match serde_json::from_slice::<InstalledManifest>(&content) {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            tracing::debug!(
                path = %path.display(),
                error = %err,
                "installed manifest is malformed"
            );
            None
        }
    }
}

pub fn write_installed_manifest(path: &Path, manifest: &InstalledManifest) -> Result<()> {
    let content = serde_json::to_vec(manifest).context("marshaling manifest")?;
    fs::write(path, content)
        .with_context(|| format!("writing manifest to {}", path.display()))
}

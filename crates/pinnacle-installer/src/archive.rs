use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

use crate::fs_utils::{remove_dir_if_exists, remove_file_if_exists};

/// Runtime archives wrap their contents in a single top-level directory.
pub(crate) const STRIP_COMPONENTS: usize = 1;

/// Unpacks the zip at `archive_path` into `dst` so that `dst` holds exactly the
/// archive's contents, minus the wrapping directory. Anything previously at `dst`
/// is removed first. Returns the number of files written.
pub fn extract_zip(archive_path: &Path, dst: &Path) -> Result<usize> {
    remove_dir_if_exists(dst)
        .with_context(|| format!("cleaning up path: {}", dst.display()))?;
    fs::create_dir_all(dst).with_context(|| format!("failed to create {}", dst.display()))?;

    let file = File::open(archive_path)
        .with_context(|| format!("failed to open {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive {}", archive_path.display()))?;

    let mut extracted = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).with_context(|| {
            format!(
                "failed to read entry {index} of {}",
                archive_path.display()
            )
        })?;
        let name = entry.name().to_string();
        let enclosed = entry
            .enclosed_name()
            .ok_or_else(|| anyhow!("zip entry escapes extraction root: {name}"))?;
        let Some(stripped) = strip_rel_components(&enclosed, STRIP_COMPONENTS) else {
            continue;
        };

        let out_path = dst.join(&stripped);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .with_context(|| format!("failed to create {}", out_path.display()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        if entry.is_symlink() {
            let mut target = String::new();
            entry
                .read_to_string(&mut target)
                .with_context(|| format!("failed to read link target of {name}"))?;
            let target = PathBuf::from(target);
            if !link_stays_within(&stripped, &target) {
                return Err(anyhow!(
                    "zip entry {name} links outside extraction root: {}",
                    target.display()
                ));
            }
            remove_file_if_exists(&out_path)
                .with_context(|| format!("failed to replace {}", out_path.display()))?;
            create_symlink(&target, &out_path).with_context(|| {
                format!(
                    "failed to link {} -> {}",
                    out_path.display(),
                    target.display()
                )
            })?;
            extracted += 1;
            continue;
        }

        let mut out_file = File::create(&out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?;
        io::copy(&mut entry, &mut out_file)
            .with_context(|| format!("failed to extract {name} to {}", out_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&out_path, fs::Permissions::from_mode(restored_mode(mode)))
                    .with_context(|| format!("failed to set mode on {}", out_path.display()))?;
            }
        }

        extracted += 1;
    }

    if extracted == 0 {
        return Err(anyhow!(
            "no files extracted from {}; strip_components={} may be too large",
            archive_path.display(),
            STRIP_COMPONENTS
        ));
    }

    tracing::debug!(
        archive = %archive_path.display(),
        dst = %dst.display(),
        files = extracted,
        "extracted zip archive"
    );
    Ok(extracted)
}

/// Keeps only the rwx bits; setuid, setgid and sticky bits from an archive are
/// never applied.
pub(crate) fn restored_mode(mode: u32) -> u32 {
    mode & 0o777
}

/// Resolves `target` against the directory holding `link` (both relative to the
/// extraction root) and checks the result never climbs above the root.
pub(crate) fn link_stays_within(link: &Path, target: &Path) -> bool {
    let mut depth: usize = link
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter(|component| matches!(component, Component::Normal(_)))
                .count()
        })
        .unwrap_or(0);

    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(next) => depth = next,
                None => return false,
            },
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

pub(crate) fn strip_rel_components(path: &Path, strip_components: usize) -> Option<PathBuf> {
    let components: Vec<_> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(v) => Some(v.to_os_string()),
            _ => None,
        })
        .collect();

    if components.len() <= strip_components {
        return None;
    }

    let mut out = PathBuf::new();
    for component in components.into_iter().skip(strip_components) {
        out.push(component);
    }
    Some(out)
}

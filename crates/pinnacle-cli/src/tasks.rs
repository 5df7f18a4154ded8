use std::sync::Arc;

use anyhow::anyhow;
use pinnacle_core::{ArtifactDescriptor, InstalledManifest, Platform, ProgressTracker};
use pinnacle_installer::{
    extract_zip, read_installed_manifest, remove_dir_if_exists, remove_file_if_exists,
    write_installed_manifest, WorkingLayout,
};
use pinnacle_remote::{download_to_file, resolve_descriptor, Fetch, MetadataEndpoints};
use pinnacle_security::file_hash_matches;

use crate::failure::{TaskFailure, TaskKind, Trail, TrailResultExt};

/// Everything an acquisition task needs. Cheap to clone into worker threads.
#[derive(Clone)]
pub(crate) struct Acquisition {
    pub(crate) layout: WorkingLayout,
    pub(crate) endpoints: MetadataEndpoints,
    pub(crate) platform: Platform,
    pub(crate) fetcher: Arc<dyn Fetch>,
    pub(crate) progress: ProgressTracker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskOutcome {
    CacheHit,
    Downloaded,
}

impl TaskOutcome {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::CacheHit => "cache-hit",
            Self::Downloaded => "downloaded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ManifestCheck {
    Hit,
    Miss(ManifestMiss),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ManifestMiss {
    /// Missing, unreadable or malformed.
    Unusable,
    Stale { recorded: String },
}

pub(crate) fn check_installed_manifest(
    layout: &WorkingLayout,
    descriptor: &ArtifactDescriptor,
) -> ManifestCheck {
    match read_installed_manifest(&layout.runtime_manifest_path()) {
        Some(manifest) if manifest.matches(descriptor) => ManifestCheck::Hit,
        Some(manifest) => ManifestCheck::Miss(ManifestMiss::Stale {
            recorded: manifest.checksum,
        }),
        None => ManifestCheck::Miss(ManifestMiss::Unusable),
    }
}

/// Makes sure `launcher.jar` matches the published bundle. Advances progress by
/// exactly three steps on success.
pub(crate) fn acquire_bundle(env: &Acquisition) -> Result<TaskOutcome, TaskFailure> {
    let mut trail = Trail::new(TaskKind::Bundle);

    let url = env.endpoints.bundle_url();
    let descriptor = resolve_descriptor(env.fetcher.as_ref(), &url)
        .fail_with(&trail, || format!("fetching metadata from {url}"))?;
    trail.crumb(format!("fetched metadata from {url}"));
    env.progress.advance(1);

    let target = env.layout.bundle_path();
    if file_hash_matches(&descriptor.sha1, &target) {
        env.progress.advance(2);
        trail.crumb("finished (jar existed)");
        return Ok(TaskOutcome::CacheHit);
    }

    env.progress.advance(1);
    download_to_file(env.fetcher.as_ref(), &descriptor.url, &target)
        .fail_with(&trail, || format!("downloading from {}", descriptor.url))?;
    trail.crumb(format!("downloaded {}", descriptor.url));
    env.progress.advance(1);

    if !file_hash_matches(&descriptor.sha1, &target) {
        return Err(trail.fail(
            "failed checksum validation after download",
            anyhow!(
                "sha1 mismatch for {} (expected {})",
                target.display(),
                descriptor.sha1
            ),
        ));
    }

    trail.crumb("finished (jar downloaded)");
    Ok(TaskOutcome::Downloaded)
}

/// Makes sure the extracted runtime matches the published distribution for this
/// platform. Advances progress by exactly seven steps on success.
///
/// The cache check trusts `version.json`; files under `extracted/` are never
/// re-hashed.
pub(crate) fn acquire_runtime(env: &Acquisition) -> Result<TaskOutcome, TaskFailure> {
    let mut trail = Trail::new(TaskKind::Runtime);

    let base = env
        .layout
        .ensure_runtime_dir()
        .fail_with(&trail, || format!("mkdir {}", env.layout.runtime_dir().display()))?;
    trail.crumb(format!("created {}", base.display()));
    env.progress.advance(1);

    let url = env.endpoints.runtime_url(env.platform);
    let descriptor = resolve_descriptor(env.fetcher.as_ref(), &url)
        .fail_with(&trail, || format!("fetching manifest from {url}"))?;
    trail.crumb(format!("fetched manifest from {url}"));
    env.progress.advance(1);

    let check = check_installed_manifest(&env.layout, &descriptor);
    env.progress.advance(1);

    match check {
        ManifestCheck::Hit => {
            env.progress.advance(4);
            trail.crumb("finished (runtime existed)");
            Ok(TaskOutcome::CacheHit)
        }
        ManifestCheck::Miss(ManifestMiss::Unusable) => {
            trail.crumb("missing or unreadable manifest");
            install_runtime(env, &descriptor, &mut trail)
        }
        ManifestCheck::Miss(ManifestMiss::Stale { recorded }) => {
            trail.crumb(format!(
                "checksum from file {recorded} does not match expected {}",
                descriptor.sha1
            ));
            install_runtime(env, &descriptor, &mut trail)
        }
    }
}

fn install_runtime(
    env: &Acquisition,
    descriptor: &ArtifactDescriptor,
    trail: &mut Trail,
) -> Result<TaskOutcome, TaskFailure> {
    let archive = env.layout.runtime_archive_path();
    download_to_file(env.fetcher.as_ref(), &descriptor.url, &archive)
        .fail_with(trail, || format!("downloading from {}", descriptor.url))?;
    trail.crumb(format!("downloaded {}", descriptor.url));
    env.progress.advance(1);

    let extracted = env.layout.runtime_extracted_dir();
    remove_dir_if_exists(&extracted)
        .fail_with(trail, || format!("cleaning up path: {}", extracted.display()))?;
    env.progress.advance(1);

    extract_zip(&archive, &extracted).fail_with(trail, || "extracting zip".to_string())?;
    trail.crumb(format!("extracted into {}", extracted.display()));
    env.progress.advance(1);

    write_installed_manifest(
        &env.layout.runtime_manifest_path(),
        &InstalledManifest::from_descriptor(descriptor),
    )
    .fail_with(trail, || "writing manifest to file".to_string())?;
    env.progress.advance(1);

    // The archive is disposable once extracted.
    if let Err(err) = remove_file_if_exists(&archive) {
        tracing::debug!(path = %archive.display(), error = %err, "leaving runtime archive behind");
    }

    trail.crumb("finished (runtime downloaded)");
    Ok(TaskOutcome::Downloaded)
}

use std::thread;

use super::*;

#[test]
fn parse_descriptor_from_metadata_json() {
    let raw = r#"{"url":"https://cdn.example.test/launcher.jar","sha1":"da39a3ee5e6b4b0d3255bfef95601890afd80709","size":1234}"#;
    let descriptor: ArtifactDescriptor =
        serde_json::from_str(raw).expect("descriptor should parse");
    assert_eq!(descriptor.url, "https://cdn.example.test/launcher.jar");
    assert_eq!(descriptor.sha1, "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    assert_eq!(descriptor.size, 1234);
}

#[test]
fn parse_descriptor_rejects_missing_hash() {
    let raw = r#"{"url":"https://cdn.example.test/launcher.jar","size":1234}"#;
    assert!(serde_json::from_str::<ArtifactDescriptor>(raw).is_err());
}

#[test]
fn installed_manifest_uses_checksum_field_name() {
    let descriptor = ArtifactDescriptor {
        url: "https://cdn.example.test/jre.zip".to_string(),
        sha1: "abc123".to_string(),
        size: 42,
    };
    let manifest = InstalledManifest::from_descriptor(&descriptor);
    let json = serde_json::to_value(&manifest).expect("manifest should serialize");
    assert_eq!(json["checksum"], "abc123");
    assert_eq!(json["size"], 42);
    assert!(manifest.matches(&descriptor));
}

#[test]
fn installed_manifest_mismatch_is_detected() {
    let manifest = InstalledManifest {
        checksum: "old".to_string(),
        size: 1,
    };
    let descriptor = ArtifactDescriptor {
        url: "https://cdn.example.test/jre.zip".to_string(),
        sha1: "new".to_string(),
        size: 1,
    };
    assert!(!manifest.matches(&descriptor));
}

#[test]
fn platform_from_rust_host_identifiers() {
    let platform = Platform::from_host("macos", "aarch64").expect("must map host");
    assert_eq!(platform.os, OperatingSystem::Mac);
    assert_eq!(platform.arch, Architecture::Arm64);

    let platform = Platform::from_host("windows", "x86_64").expect("must map host");
    assert_eq!(platform.os.as_str(), "windows");
    assert_eq!(platform.arch.as_str(), "x86");
}

#[test]
fn platform_rejects_unsupported_hosts() {
    let err = Platform::from_host("freebsd", "x86_64").expect_err("freebsd is unsupported");
    assert!(err.to_string().contains("unsupported operating system"));

    let err = Platform::from_host("linux", "riscv64").expect_err("riscv64 is unsupported");
    assert!(err.to_string().contains("unsupported system architecture"));
}

#[test]
fn runtime_executable_is_platform_specific() {
    assert_eq!(OperatingSystem::Windows.runtime_executable(), "javaw.exe");
    assert_eq!(OperatingSystem::Linux.runtime_executable(), "java");
    assert_eq!(OperatingSystem::Mac.runtime_executable(), "java");
}

#[test]
fn progress_starts_empty_with_fixed_total() {
    let progress = ProgressTracker::default();
    assert_eq!(progress.snapshot(), (0, TOTAL_STEPS));
    assert_eq!(progress.fraction(), 0.0);
}

#[test]
fn progress_clones_share_one_counter() {
    let progress = ProgressTracker::new(4);
    let observer = progress.clone();
    progress.advance(1);
    progress.advance(3);
    assert_eq!(observer.snapshot(), (4, 4));
    assert_eq!(observer.fraction(), 1.0);
}

#[test]
fn progress_fraction_is_clamped() {
    let progress = ProgressTracker::new(2);
    progress.advance(5);
    assert_eq!(progress.fraction(), 1.0);
}

#[test]
fn progress_concurrent_advances_are_not_lost() {
    let progress = ProgressTracker::new(TOTAL_STEPS);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let progress = progress.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    progress.advance(1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker must not panic");
    }
    assert_eq!(progress.completed(), 8000);
}

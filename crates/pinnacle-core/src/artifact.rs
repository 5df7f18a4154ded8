use serde::{Deserialize, Serialize};

/// Remote description of the current version of an artifact, as served by the
/// metadata service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub url: String,
    pub sha1: String,
    pub size: u32,
}

/// Side-record persisted next to an extracted runtime. The extracted tree cannot be
/// re-hashed as a single file, so this is what later runs compare against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstalledManifest {
    pub checksum: String,
    pub size: u32,
}

impl InstalledManifest {
    pub fn from_descriptor(descriptor: &ArtifactDescriptor) -> Self {
        Self {
            checksum: descriptor.sha1.clone(),
            size: descriptor.size,
        }
    }

    pub fn matches(&self, descriptor: &ArtifactDescriptor) -> bool {
        self.checksum == descriptor.sha1
    }
}

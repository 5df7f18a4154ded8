mod artifact;
mod platform;
mod progress;

pub use artifact::{ArtifactDescriptor, InstalledManifest};
pub use platform::{Architecture, OperatingSystem, Platform};
pub use progress::{ProgressTracker, TOTAL_STEPS};

/// Major version of the managed runtime this bootstrap installs.
pub const RUNTIME_MAJOR_VERSION: &str = "17";

#[cfg(test)]
mod tests;

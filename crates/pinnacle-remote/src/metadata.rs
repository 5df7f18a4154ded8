use anyhow::{Context, Result};
use pinnacle_core::{ArtifactDescriptor, Platform, RUNTIME_MAJOR_VERSION};

use crate::fetch::Fetch;

pub const DEFAULT_METADATA_URL: &str = "https://metadata.alpineclientprod.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEndpoints {
    base: String,
}

impl MetadataEndpoints {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn bundle_url(&self) -> String {
        format!("{}/pinnacle", self.base)
    }

    pub fn runtime_url(&self, platform: Platform) -> String {
        format!(
            "{}/jre?version={RUNTIME_MAJOR_VERSION}&os={}&arch={}",
            self.base, platform.os, platform.arch
        )
    }
}

/// Fetches and decodes the descriptor served at `url`. The response stream is
/// consumed by the decoder and closed on every path.
pub fn resolve_descriptor<F>(fetcher: &F, url: &str) -> Result<ArtifactDescriptor>
where
    F: Fetch + ?Sized,
{
    let body = fetcher
        .get(url)
        .with_context(|| format!("making request to {url}"))?;
    serde_json::from_reader(body).with_context(|| format!("decoding response from {url}"))
}

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use pinnacle_core::Platform;
use reqwest::blocking::Client;
use reqwest::StatusCode;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Source of remote byte streams.
pub trait Fetch: Send + Sync {
    /// Issues a GET against `url` and returns the body of a `200 OK` response.
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>>;
}

pub fn user_agent(version: &str, platform: Platform) -> String {
    format!("Pinnacle/{version} ({}; {})", platform.os, platform.arch)
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub fn for_platform(version: &str, platform: Platform) -> Result<Self> {
        Self::new(&user_agent(version, platform))
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>> {
        tracing::debug!(url, "sending request");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(anyhow!(
                "request to {url} received status code: {}",
                status.as_u16()
            ));
        }

        Ok(Box::new(response))
    }
}

/// Streams the body of `url` into `path`, creating or truncating the file.
/// Returns the number of bytes written.
pub fn download_to_file<F>(fetcher: &F, url: &str, path: &Path) -> Result<u64>
where
    F: Fetch + ?Sized,
{
    let mut body = fetcher.get(url)?;
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let written = io::copy(&mut body, &mut file)
        .with_context(|| format!("failed to write {} from {url}", path.display()))?;
    file.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    tracing::debug!(url, path = %path.display(), bytes = written, "download complete");
    Ok(written)
}

mod fetch;
mod metadata;

pub use fetch::{download_to_file, user_agent, Fetch, HttpFetcher};
pub use metadata::{resolve_descriptor, MetadataEndpoints, DEFAULT_METADATA_URL};

#[cfg(test)]
mod tests;

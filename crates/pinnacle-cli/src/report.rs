use crate::failure::TaskFailure;

/// Receives every fatal failure exactly once, right before the process exits.
pub(crate) trait Reporter {
    fn report(&self, failure: &TaskFailure);
}

/// Context attached to every report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DiagnosticTags {
    pub(crate) os: String,
    pub(crate) arch: String,
    pub(crate) host: String,
    pub(crate) release: String,
}

impl DiagnosticTags {
    pub(crate) fn collect(version: &str) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            host: host_name(),
            release: format!("pinnacle@{version}"),
        }
    }
}

fn host_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok().filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Reports failures as a single structured `error` event.
#[derive(Debug, Clone)]
pub(crate) struct LogReporter {
    tags: DiagnosticTags,
}

impl LogReporter {
    pub(crate) fn new(tags: DiagnosticTags) -> Self {
        Self { tags }
    }
}

impl Reporter for LogReporter {
    fn report(&self, failure: &TaskFailure) {
        tracing::error!(
            task = %failure.task,
            os = %self.tags.os,
            arch = %self.tags.arch,
            host = %self.tags.host,
            release = %self.tags.release,
            breadcrumbs = ?failure.breadcrumbs,
            error = %format!("{:#}", failure.source),
            "{}",
            failure.description
        );
    }
}

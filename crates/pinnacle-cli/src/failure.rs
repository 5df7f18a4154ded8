use std::fmt;

/// Unit of work a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TaskKind {
    Startup,
    Bundle,
    Runtime,
    Handoff,
}

impl TaskKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Bundle => "bundle",
            Self::Runtime => "runtime",
            Self::Handoff => "handoff",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Steps a task has completed so far, attached to any failure it reports.
#[derive(Debug, Clone)]
pub(crate) struct Trail {
    task: TaskKind,
    crumbs: Vec<String>,
}

impl Trail {
    pub(crate) fn new(task: TaskKind) -> Self {
        Self {
            task,
            crumbs: Vec::new(),
        }
    }

    pub(crate) fn crumb(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(task = %self.task, "{message}");
        self.crumbs.push(message);
    }

    pub(crate) fn fail(
        &self,
        description: impl Into<String>,
        source: anyhow::Error,
    ) -> TaskFailure {
        TaskFailure {
            task: self.task,
            description: description.into(),
            breadcrumbs: self.crumbs.clone(),
            source,
        }
    }
}

/// A fatal bootstrap failure. Every one of these ends the process once reported.
#[derive(Debug)]
pub(crate) struct TaskFailure {
    pub(crate) task: TaskKind,
    pub(crate) description: String,
    pub(crate) breadcrumbs: Vec<String>,
    pub(crate) source: anyhow::Error,
}

impl TaskFailure {
    pub(crate) fn new(
        task: TaskKind,
        description: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        Trail::new(task).fail(description, source)
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} task failed {}: {:#}",
            self.task, self.description, self.source
        )
    }
}

impl std::error::Error for TaskFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

pub(crate) trait TrailResultExt<T> {
    fn fail_with<D>(self, trail: &Trail, description: D) -> Result<T, TaskFailure>
    where
        D: FnOnce() -> String;
}

impl<T, E> TrailResultExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn fail_with<D>(self, trail: &Trail, description: D) -> Result<T, TaskFailure>
    where
        D: FnOnce() -> String,
    {
        self.map_err(|err| trail.fail(description(), err.into()))
    }
}

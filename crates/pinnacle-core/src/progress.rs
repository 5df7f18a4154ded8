use std::sync::{Arc, Mutex, PoisonError};

/// Steps across both acquisition tasks: three for the bundle, seven for the
/// runtime, whichever branch each one takes.
pub const TOTAL_STEPS: usize = 10;

/// Shared step counter observed by the progress renderer.
///
/// Clones share the same counter. Only [`ProgressTracker::advance`] mutates it,
/// and the lock is held for the increment alone.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    completed: Arc<Mutex<usize>>,
    total: usize,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(TOTAL_STEPS)
    }
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(Mutex::new(0)),
            total,
        }
    }

    pub fn advance(&self, steps: usize) {
        // A panicked holder cannot leave a half-written integer behind.
        let mut completed = self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *completed += steps;
    }

    pub fn completed(&self) -> usize {
        *self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn snapshot(&self) -> (usize, usize) {
        (self.completed(), self.total)
    }

    pub fn fraction(&self) -> f32 {
        let (completed, total) = self.snapshot();
        if total == 0 {
            return 1.0;
        }
        completed.min(total) as f32 / total as f32
    }
}

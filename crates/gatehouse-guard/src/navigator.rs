//! The navigation collaborator.

use std::sync::{Arc, Mutex, PoisonError};

/// Moves the client to another page. Fire-and-forget: the guard never
/// looks at what happens next.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

/// Any `Fn(&str)` closure is a navigator, so a router's navigate function
/// can be passed in directly.
impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn navigate(&self, path: &str) {
        self(path);
    }
}

/// Remembers every path it was asked to navigate to, in order.
///
/// Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All navigations so far.
    pub fn paths(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

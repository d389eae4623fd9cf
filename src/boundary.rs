use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// RenderError
///
/// A failure while rendering a resolved view. `trace` lists the enclosing views from the
/// innermost outwards, so the log shows where in the tree the failure originated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to render `{view}`: {message}")]
pub struct RenderError {
    pub view: String,
    pub message: String,
    pub trace: Vec<String>,
}

impl RenderError {
    pub fn new(view: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            message: message.into(),
            trace: Vec::new(),
        }
    }

    /// Records an enclosing view the failure propagated through.
    pub fn within(mut self, parent: impl Into<String>) -> Self {
        self.trace.push(parent.into());
        self
    }
}

/// Caught
///
/// Outcome of a render that passed through an active boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Caught<T> {
    Rendered(T),
    /// The failure was logged; the caller shows the static fallback view instead.
    Fallback(RenderError),
}

/// ErrorBoundary
///
/// Catches render failures for everything below it. The active flag is shared by all
/// clones so a route can remove the boundary ("let my failures reach the parent boundary")
/// and restore it later; the state lives as long as the mount that created it.
#[derive(Debug, Clone, Default)]
pub struct ErrorBoundary {
    removed: Arc<AtomicBool>,
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.removed.load(Ordering::Acquire)
    }

    pub fn remove(&self) {
        self.removed.store(true, Ordering::Release);
    }

    pub fn restore(&self) {
        self.removed.store(false, Ordering::Release);
    }

    /// capture
    ///
    /// While active, a failure is reported and turned into `Caught::Fallback`.
    /// Once removed, the failure is handed back to the caller untouched.
    pub fn capture<T>(&self, outcome: Result<T, RenderError>) -> Result<Caught<T>, RenderError> {
        match outcome {
            Ok(value) => Ok(Caught::Rendered(value)),
            Err(error) if self.is_active() => {
                tracing::error!(
                    view = %error.view,
                    trace = ?error.trace,
                    error = %error.message,
                    "ErrorBoundary caught a render failure"
                );
                Ok(Caught::Fallback(error))
            }
            Err(error) => Err(error),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// DiagnosticMode
///
/// Controls the severity of configuration diagnostics. Passed explicitly into every
/// resolution pass rather than read from the process environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticMode {
    /// Log, then fail the pass so misconfiguration is caught before release.
    #[default]
    Development,
    /// Log and keep resolving with the degraded behaviour.
    Production,
}

/// DiagnosticKind
///
/// Every structural problem the resolver detects in a route tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    DuplicateIndex,
    DuplicatePath,
    IndexWithPath,
    IndexWithChildren,
    IndexRedirect,
    MissingPath,
    MissingRenderable,
    ElementAndRedirect,
    RedirectWithChildren,
    EmptyRedirectTarget,
    SelfRedirect,
    RootAccessType,
    InvalidAccessType,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateIndex => "duplicate-index",
            DiagnosticKind::DuplicatePath => "duplicate-path",
            DiagnosticKind::IndexWithPath => "index-with-path",
            DiagnosticKind::IndexWithChildren => "index-with-children",
            DiagnosticKind::IndexRedirect => "index-redirect",
            DiagnosticKind::MissingPath => "missing-path",
            DiagnosticKind::MissingRenderable => "missing-renderable",
            DiagnosticKind::ElementAndRedirect => "element-and-redirect",
            DiagnosticKind::RedirectWithChildren => "redirect-with-children",
            DiagnosticKind::EmptyRedirectTarget => "empty-redirect-target",
            DiagnosticKind::SelfRedirect => "self-redirect",
            DiagnosticKind::RootAccessType => "root-access-type",
            DiagnosticKind::InvalidAccessType => "invalid-access-type",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic
///
/// One reported configuration problem, located by the route key it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (at {})", self.kind, self.message, self.location)
    }
}

/// ConfigError
///
/// Raised for the first diagnostic of a pass in development mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route configuration: {0}")]
pub struct ConfigError(pub Diagnostic);

impl ConfigError {
    pub fn kind(&self) -> DiagnosticKind {
        self.0.kind
    }
}

/// Diagnostics
///
/// The diagnostic channel of one resolution pass. Every report is logged through
/// `tracing` and recorded; the mode decides whether it also aborts the pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    mode: DiagnosticMode,
    reported: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(mode: DiagnosticMode) -> Self {
        Self {
            mode,
            reported: Vec::new(),
        }
    }

    pub fn development() -> Self {
        Self::new(DiagnosticMode::Development)
    }

    pub fn production() -> Self {
        Self::new(DiagnosticMode::Production)
    }

    pub fn mode(&self) -> DiagnosticMode {
        self.mode
    }

    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        location: impl fmt::Display,
        message: impl Into<String>,
    ) -> Result<(), ConfigError> {
        let diagnostic = Diagnostic {
            kind,
            location: location.to_string(),
            message: message.into(),
        };

        tracing::warn!(
            kind = %diagnostic.kind,
            location = %diagnostic.location,
            "{}",
            diagnostic.message
        );
        self.reported.push(diagnostic.clone());

        match self.mode {
            DiagnosticMode::Development => Err(ConfigError(diagnostic)),
            DiagnosticMode::Production => Ok(()),
        }
    }

    pub fn reported(&self) -> &[Diagnostic] {
        &self.reported
    }

    pub fn is_clean(&self) -> bool {
        self.reported.is_empty()
    }

    pub fn into_reported(self) -> Vec<Diagnostic> {
        self.reported
    }
}

use std::{path::PathBuf, sync::Arc};

use crate::{boundary::RenderError, models::Renderable};

/// DefaultScreen
///
/// The placeholder screens used whenever the caller does not supply its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultScreen {
    Loading,
    /// Shown at `/` to unauthenticated visitors.
    LandingFallback,
    NotFound,
    Unauthorized,
    /// Shown by the error boundary after a render failure.
    ErrorFallback,
}

impl DefaultScreen {
    pub fn name(&self) -> &'static str {
        match self {
            DefaultScreen::Loading => "LoadingScreen",
            DefaultScreen::LandingFallback => "LandingFallback",
            DefaultScreen::NotFound => "NotFound",
            DefaultScreen::Unauthorized => "Unauthorized",
            DefaultScreen::ErrorFallback => "ErrorFallback",
        }
    }

    pub fn markup(&self) -> &'static str {
        match self {
            DefaultScreen::Loading => {
                r#"<div class="loading-screen"><div class="spinner"></div><p class="loading-text">Loading, please wait...</p></div>"#
            }
            DefaultScreen::LandingFallback => {
                r#"<div class="landing"><h1>Welcome to Route Keeper</h1><p>Provide your landing page as the <code>privateFallback</code> to replace this default page.</p></div>"#
            }
            DefaultScreen::NotFound => {
                r#"<div class="not-found"><h1>404</h1><h2>Oops! Page Not Found</h2><p>The page you are looking for doesn't exist or has been moved.</p><a href="/">Go Home</a></div>"#
            }
            DefaultScreen::Unauthorized => {
                r#"<div class="unauthorized"><h1>401</h1><h2>Unauthorized Access</h2><a href="/">Go Home</a></div>"#
            }
            DefaultScreen::ErrorFallback => {
                r#"<div class="error-boundary"><h1>Something went wrong. Please try again later.</h1></div>"#
            }
        }
    }
}

// The core test suites render plain strings; these give them the same defaults.
impl From<DefaultScreen> for &'static str {
    fn from(screen: DefaultScreen) -> Self {
        screen.name()
    }
}

impl From<DefaultScreen> for String {
    fn from(screen: DefaultScreen) -> Self {
        screen.name().to_string()
    }
}

/// View
///
/// The renderable value served by the HTTP host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Markup held in memory (eager pages, inline snippets).
    Html { name: String, markup: Arc<str> },
    /// A page read from disk on every render; the asynchronous reference.
    Lazy { name: String, source: PathBuf },
    Screen(DefaultScreen),
}

impl View {
    pub fn html(name: impl Into<String>, markup: impl Into<Arc<str>>) -> Self {
        View::Html {
            name: name.into(),
            markup: markup.into(),
        }
    }

    pub fn lazy(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        View::Lazy {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            View::Html { name, .. } | View::Lazy { name, .. } => name.as_str(),
            View::Screen(screen) => screen.name(),
        }
    }

    /// render
    ///
    /// Produces the view's markup. Only lazy views can fail (their source is read here).
    pub async fn render(&self) -> Result<String, RenderError> {
        match self {
            View::Html { markup, .. } => Ok(markup.to_string()),
            View::Screen(screen) => Ok(screen.markup().to_string()),
            View::Lazy { name, source } => tokio::fs::read_to_string(source)
                .await
                .map_err(|e| RenderError::new(name.as_str(), format!("{}: {e}", source.display()))),
        }
    }
}

impl Renderable for View {
    fn is_async_reference(&self) -> bool {
        matches!(self, View::Lazy { .. })
    }
}

impl From<DefaultScreen> for View {
    fn from(screen: DefaultScreen) -> Self {
        View::Screen(screen)
    }
}

/// document
///
/// Wraps a view's markup into a complete HTML page.
pub fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>{body}</body>\n</html>\n",
        escape(title)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Redirect target used for unauthenticated visitors of private routes.
pub const DEFAULT_PRIVATE_REDIRECT: &str = "/login";
/// Redirect target used for authenticated visitors of public routes.
pub const DEFAULT_PUBLIC_REDIRECT: &str = "/";

/// PathParts
///
/// A navigation target split into its three URL components.
/// `search` and `hash` are stored normalized: empty, or prefixed with `?` / `#`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathParts {
    #[serde(default)]
    pub pathname: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub hash: String,
}

impl PathParts {
    /// parse
    ///
    /// Splits a `pathname?search#hash` string. The hash is split off first, so a `?`
    /// appearing after `#` belongs to the fragment.
    pub fn parse(to: &str) -> Self {
        let to = to.trim();
        let (rest, hash) = match to.find('#') {
            Some(at) => (&to[..at], &to[at..]),
            None => (to, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(at) => (&rest[..at], &rest[at..]),
            None => (rest, ""),
        };
        Self {
            pathname: pathname.to_string(),
            search: search.to_string(),
            hash: hash.to_string(),
        }
        .normalized()
    }

    pub fn normalized(self) -> Self {
        Self {
            pathname: self.pathname.trim().to_string(),
            search: with_prefix(&self.search, '?'),
            hash: with_prefix(&self.hash, '#'),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pathname.trim().is_empty()
    }

    pub fn href(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }
}

// A lone prefix character carries no information and is dropped.
fn with_prefix(value: &str, prefix: char) -> String {
    let value = value.trim();
    if value.is_empty() || (value.len() == 1 && value.starts_with(prefix)) {
        String::new()
    } else if value.starts_with(prefix) {
        value.to_string()
    } else {
        format!("{prefix}{value}")
    }
}

/// non_blank_or
///
/// Returns the override when it holds something other than whitespace, otherwise the default.
pub fn non_blank_or(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

/// Relative
///
/// How a relative redirect target is resolved by the host router:
/// against the route hierarchy or against the URL path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relative {
    Route,
    Path,
}

/// RedirectTarget
///
/// The redirect a route declares in place of an element. Deserializes either from a plain
/// string (`"/login?next=/admin"`) or from an object with a `to` field and navigation options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawRedirect")]
pub struct RedirectTarget {
    pub to: PathParts,
    /// `None` means the default, replacing the current history entry.
    pub replace: Option<bool>,
    pub state: Option<Value>,
    pub relative: Option<Relative>,
    pub prevent_scroll_reset: bool,
}

impl RedirectTarget {
    pub fn to(to: &str) -> Self {
        Self::from_parts(PathParts::parse(to))
    }

    pub fn from_parts(to: PathParts) -> Self {
        Self {
            to: to.normalized(),
            replace: None,
            state: None,
            relative: None,
            prevent_scroll_reset: false,
        }
    }

    /// Push a new history entry instead of replacing the current one.
    pub fn push(mut self) -> Self {
        self.replace = Some(false);
        self
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    pub fn relative(mut self, relative: Relative) -> Self {
        self.relative = Some(relative);
        self
    }

    pub fn prevent_scroll_reset(mut self) -> Self {
        self.prevent_scroll_reset = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.to.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRedirect {
    Path(String),
    Detailed(DetailedRedirect),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTo {
    Path(String),
    Parts(PathParts),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailedRedirect {
    to: RawTo,
    #[serde(default)]
    replace: Option<bool>,
    #[serde(default)]
    state: Option<Value>,
    #[serde(default)]
    relative: Option<Relative>,
    #[serde(default)]
    prevent_scroll_reset: bool,
}

impl From<RawRedirect> for RedirectTarget {
    fn from(raw: RawRedirect) -> Self {
        match raw {
            RawRedirect::Path(to) => RedirectTarget::to(&to),
            RawRedirect::Detailed(detailed) => {
                let to = match detailed.to {
                    RawTo::Path(to) => PathParts::parse(&to),
                    RawTo::Parts(parts) => parts.normalized(),
                };
                RedirectTarget {
                    to,
                    replace: detailed.replace,
                    state: detailed.state,
                    relative: detailed.relative,
                    prevent_scroll_reset: detailed.prevent_scroll_reset,
                }
            }
        }
    }
}

/// Navigate
///
/// A resolved redirect instruction handed to the host router.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigate {
    pub to: PathParts,
    pub replace: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative: Option<Relative>,
    pub prevent_scroll_reset: bool,
}

impl Navigate {
    /// A plain replacing redirect, as issued by the access guards.
    pub fn replace_to(to: &str) -> Self {
        Self {
            to: PathParts::parse(to),
            replace: true,
            state: None,
            relative: None,
            prevent_scroll_reset: false,
        }
    }

    pub fn href(&self) -> String {
        self.to.href()
    }
}

impl From<&RedirectTarget> for Navigate {
    fn from(target: &RedirectTarget) -> Self {
        Self {
            to: target.to.clone().normalized(),
            replace: target.replace.unwrap_or(true),
            state: target.state.clone(),
            relative: target.relative,
            prevent_scroll_reset: target.prevent_scroll_reset,
        }
    }
}

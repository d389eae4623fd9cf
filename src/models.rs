use serde::Deserialize;
use std::fmt;

use crate::{
    paths,
    redirect::{DEFAULT_PRIVATE_REDIRECT, DEFAULT_PUBLIC_REDIRECT, Navigate, RedirectTarget, non_blank_or},
    roles::{RoleSet, role_set},
};

// --- Renderable Capability ---

/// Renderable
///
/// The only capability the resolver needs from a UI value: whether it is backed by an
/// asynchronous loader. Everything else about the value is opaque to the core.
pub trait Renderable: Clone {
    fn is_async_reference(&self) -> bool;
}

impl Renderable for &'static str {
    fn is_async_reference(&self) -> bool {
        false
    }
}

impl Renderable for String {
    fn is_async_reference(&self) -> bool {
        false
    }
}

// --- Access Types ---

/// AccessType
///
/// Per-route guarding policy. Unrecognized strings from configuration are kept as
/// `Unknown` so the resolver can diagnose them instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum AccessType {
    /// Redirect away once authenticated (login, signup).
    Public,
    /// Requires authentication, and one of the effective roles when any are set.
    Private,
    /// Never guarded.
    Neutral,
    Unknown(String),
}

impl From<String> for AccessType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "public" => AccessType::Public,
            "private" => AccessType::Private,
            "neutral" => AccessType::Neutral,
            _ => AccessType::Unknown(value),
        }
    }
}

impl From<&str> for AccessType {
    fn from(value: &str) -> Self {
        AccessType::from(value.to_string())
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Public => f.write_str("public"),
            AccessType::Private => f.write_str("private"),
            AccessType::Neutral => f.write_str("neutral"),
            AccessType::Unknown(raw) => f.write_str(raw),
        }
    }
}

// --- Input Configuration ---

/// RouteConfig
///
/// One entry of the caller's route tree. This mirrors the loose shape callers write
/// (every field optional); the resolver classifies each entry into a `RouteShape`
/// and diagnoses illegal combinations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "R: Deserialize<'de>"))]
pub struct RouteConfig<R> {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub index: bool,
    #[serde(default)]
    pub element: Option<R>,
    #[serde(default)]
    pub redirect: Option<RedirectTarget>,
    /// Declared access type; inherited from the parent when absent.
    #[serde(default, rename = "type")]
    pub access: Option<AccessType>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    /// Replace the inherited roles with `roles` instead of extending them.
    #[serde(default, alias = "excludeParentRole")]
    pub exclude_parent_roles: bool,
    /// Forwarded to the host router untouched.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Per-route fallback shown while a lazy element loads.
    #[serde(default)]
    pub loading: Option<R>,
    #[serde(default)]
    pub children: Vec<RouteConfig<R>>,
}

impl<R> RouteConfig<R> {
    /// A path route with nothing declared yet.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::blank()
        }
    }

    /// An index route: rendered at its parent's path.
    pub fn index() -> Self {
        Self {
            index: true,
            ..Self::blank()
        }
    }

    fn blank() -> Self {
        Self {
            path: None,
            index: false,
            element: None,
            redirect: None,
            access: None,
            roles: None,
            exclude_parent_roles: false,
            case_sensitive: false,
            loading: None,
            children: Vec::new(),
        }
    }

    pub fn element(mut self, element: R) -> Self {
        self.element = Some(element);
        self
    }

    pub fn redirect(mut self, target: RedirectTarget) -> Self {
        self.redirect = Some(target);
        self
    }

    pub fn redirect_to(self, to: &str) -> Self {
        self.redirect(RedirectTarget::to(to))
    }

    pub fn access(mut self, access: impl Into<AccessType>) -> Self {
        self.access = Some(access.into());
        self
    }

    pub fn private(self) -> Self {
        self.access(AccessType::Private)
    }

    pub fn public(self) -> Self {
        self.access(AccessType::Public)
    }

    pub fn neutral(self) -> Self {
        self.access(AccessType::Neutral)
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude_parent_roles(mut self) -> Self {
        self.exclude_parent_roles = true;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn loading(mut self, fallback: R) -> Self {
        self.loading = Some(fallback);
        self
    }

    pub fn children(mut self, children: Vec<RouteConfig<R>>) -> Self {
        self.children = children;
        self
    }

    /// try_map
    ///
    /// Converts every element and loading fallback in the subtree, keeping the structure.
    /// Used to turn manifest page references into concrete views.
    pub fn try_map<S, E, F>(self, f: &mut F) -> Result<RouteConfig<S>, E>
    where
        F: FnMut(R) -> Result<S, E>,
    {
        let element = self.element.map(&mut *f).transpose()?;
        let loading = self.loading.map(&mut *f).transpose()?;
        let children = self
            .children
            .into_iter()
            .map(|child| child.try_map(&mut *f))
            .collect::<Result<Vec<_>, E>>()?;

        Ok(RouteConfig {
            path: self.path,
            index: self.index,
            element,
            redirect: self.redirect,
            access: self.access,
            roles: self.roles,
            exclude_parent_roles: self.exclude_parent_roles,
            case_sensitive: self.case_sensitive,
            loading,
            children,
        })
    }
}

// --- Access Context ---

/// AccessContext
///
/// Everything one resolution pass reads besides the route tree itself. Immutable for the
/// duration of a pass.
#[derive(Debug, Clone)]
pub struct AccessContext<R> {
    pub authenticated: bool,
    /// Roles held by the current actor.
    pub roles: RoleSet,
    pub private_redirect: String,
    pub public_redirect: String,
    /// Rendered at `/` for unauthenticated visitors.
    pub private_fallback: R,
    pub unauthorized: R,
    /// Global fallback for lazy elements without their own `loading`.
    pub loading: R,
}

impl<R> AccessContext<R> {
    pub fn new(private_fallback: R, unauthorized: R, loading: R) -> Self {
        Self {
            authenticated: false,
            roles: RoleSet::new(),
            private_redirect: DEFAULT_PRIVATE_REDIRECT.to_string(),
            public_redirect: DEFAULT_PUBLIC_REDIRECT.to_string(),
            private_fallback,
            unauthorized,
            loading,
        }
    }

    pub fn authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = role_set(roles);
        self
    }

    /// Blank overrides keep the default `/login`.
    pub fn private_redirect(mut self, to: &str) -> Self {
        self.private_redirect = non_blank_or(Some(to), DEFAULT_PRIVATE_REDIRECT);
        self
    }

    /// Blank overrides keep the default `/`.
    pub fn public_redirect(mut self, to: &str) -> Self {
        self.public_redirect = non_blank_or(Some(to), DEFAULT_PUBLIC_REDIRECT);
        self
    }
}

// --- Output Tree ---

/// KeySegment
///
/// One step of a route key: a path segment as declared, or the index marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeySegment {
    Path(String),
    Index,
    CatchAll,
}

/// RouteKey
///
/// Stable identity of an emitted node: the declared segments from the root down to it.
/// Two nodes share a key only if they share the whole ancestry, so cousins with the same
/// local path stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RouteKey {
    segments: Vec<KeySegment>,
}

impl RouteKey {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: KeySegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// pattern
    ///
    /// The absolute path pattern this key is reached at. Index segments add nothing,
    /// so an index route shares its parent's pattern.
    pub fn pattern(&self) -> String {
        self.segments
            .iter()
            .fold(String::new(), |acc, segment| match segment {
                KeySegment::Path(path) => paths::join(&acc, path),
                KeySegment::Index => paths::join(&acc, ""),
                KeySegment::CatchAll => paths::join(&acc, "*"),
            })
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 {
                f.write_str(" > ")?;
            }
            match segment {
                KeySegment::Path(path) => write!(f, "{path}")?,
                KeySegment::Index => f.write_str("(index)")?,
                KeySegment::CatchAll => f.write_str("*")?,
            }
        }
        Ok(())
    }
}

/// RouteTarget
///
/// What the host router matches a node against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Index,
    Path(String),
    /// The synthetic not-found node appended by the shell.
    CatchAll,
}

/// Resolved
///
/// The concrete value a node renders once every access decision has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<R> {
    Element(R),
    /// A lazy element and the view shown while it loads.
    Suspense { content: R, fallback: R },
    Redirect(Navigate),
    Unauthorized(R),
    /// The landing placeholder rendered at `/` for unauthenticated visitors.
    Fallback(R),
    /// Nothing to render (invalid or element-less nodes).
    Empty,
}

impl<R> Resolved<R> {
    /// True when this value replaces the node's outlet, hiding any nested routes.
    pub fn blocks_outlet(&self) -> bool {
        matches!(
            self,
            Resolved::Redirect(_) | Resolved::Unauthorized(_) | Resolved::Fallback(_)
        )
    }

    pub fn redirect(&self) -> Option<&Navigate> {
        match self {
            Resolved::Redirect(navigate) => Some(navigate),
            _ => None,
        }
    }
}

/// RenderableNode
///
/// One node of the tree handed to the host router. Isomorphic to the input node it came
/// from, minus dropped siblings and the subtree of a node with an unknown access type.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableNode<R> {
    pub key: RouteKey,
    pub target: RouteTarget,
    pub case_sensitive: bool,
    pub element: Resolved<R>,
    pub children: Vec<RenderableNode<R>>,
}

impl<R> RenderableNode<R> {
    /// The `*` node rendering the not-found view for anything left unmatched.
    pub fn catch_all(not_found: R) -> Self {
        Self {
            key: RouteKey::root().child(KeySegment::CatchAll),
            target: RouteTarget::CatchAll,
            case_sensitive: false,
            element: Resolved::Element(not_found),
            children: Vec::new(),
        }
    }

    /// Depth-first search by key.
    pub fn find(&self, key: &RouteKey) -> Option<&RenderableNode<R>> {
        if &self.key == key {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }
}

use std::{fmt, sync::Arc};

use crate::{
    boundary::ErrorBoundary,
    diagnostics::{ConfigError, Diagnostic, DiagnosticMode, Diagnostics},
    models::{AccessContext, Renderable, RenderableNode, Resolved, RouteConfig, RouteKey, RouteTarget},
    resolver::resolve_route_tree,
    roles::{RoleSet, role_set},
    views::DefaultScreen,
};

// --- Notifications ---

pub type RouteChangeHook = Arc<dyn Fn(&str) + Send + Sync>;
pub type RedirectHook = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// RouteEvents
///
/// Optional caller callbacks. Fire-and-forget: they run after the render that triggered
/// them and their outcome is never observed.
#[derive(Clone, Default)]
pub struct RouteEvents {
    on_route_change: Option<RouteChangeHook>,
    on_redirect: Option<RedirectHook>,
}

impl RouteEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_route_change(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_route_change = Some(Arc::new(hook));
        self
    }

    pub fn on_redirect(mut self, hook: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.on_redirect = Some(Arc::new(hook));
        self
    }

    pub fn route_changed(&self, path: &str) {
        if let Some(hook) = &self.on_route_change {
            hook(path);
        }
    }

    pub fn redirected(&self, from: &str, to: &str) {
        if let Some(hook) = &self.on_redirect {
            hook(from, to);
        }
    }
}

impl fmt::Debug for RouteEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEvents")
            .field("on_route_change", &self.on_route_change.is_some())
            .field("on_redirect", &self.on_redirect.is_some())
            .finish()
    }
}

/// LocationTracker
///
/// Remembers the last location a host rendered so `on_route_change` only fires on an
/// actual change. One tracker per mounted tree.
#[derive(Debug, Default)]
pub struct LocationTracker {
    last: Option<String>,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe<R>(&mut self, events: &RouteEvents, path: &str, resolved: &Resolved<R>) {
        if self.last.as_deref() != Some(path) {
            self.last = Some(path.to_string());
            events.route_changed(path);
        }
        if let Some(navigate) = resolved.redirect() {
            events.redirected(path, &navigate.href());
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

// --- Authentication Flag ---

/// AuthState
///
/// The caller's authentication flag. Accepts a boolean or a string (typically a session
/// token), where any non-empty string counts as authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthState(bool);

impl AuthState {
    pub fn is_authenticated(self) -> bool {
        self.0
    }
}

impl From<bool> for AuthState {
    fn from(value: bool) -> Self {
        AuthState(value)
    }
}

impl From<&str> for AuthState {
    fn from(value: &str) -> Self {
        AuthState(!value.is_empty())
    }
}

impl From<String> for AuthState {
    fn from(value: String) -> Self {
        AuthState::from(value.as_str())
    }
}

impl<T: Into<AuthState>> From<Option<T>> for AuthState {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

// --- Shell ---

/// Rendered
///
/// What the shell hands to the host for one render pass.
#[derive(Debug, Clone)]
pub enum Rendered<R> {
    /// Only the loading screen; the route tree was not resolved.
    Loading(R),
    Routes(RouteOutlet<R>),
}

/// RouteOutlet
///
/// The resolved tree, ending with the catch-all not-found node, plus the boundary the host
/// should render it under (absent when the boundary is disabled).
#[derive(Debug, Clone)]
pub struct RouteOutlet<R> {
    pub routes: Vec<RenderableNode<R>>,
    pub boundary: Option<ErrorBoundary>,
    /// Diagnostics recorded while resolving (production mode only; development mode fails).
    pub diagnostics: Vec<Diagnostic>,
}

impl<R> RouteOutlet<R> {
    pub fn find(&self, key: &RouteKey) -> Option<&RenderableNode<R>> {
        self.routes.iter().find_map(|node| node.find(key))
    }

    pub fn not_found(&self) -> Option<&R> {
        self.routes
            .iter()
            .rev()
            .find(|node| node.target == RouteTarget::CatchAll)
            .and_then(|node| match &node.element {
                Resolved::Element(view) => Some(view),
                _ => None,
            })
    }
}

/// RouteKeeper
///
/// The caller-facing component. Collects the configuration surface, fills in defaults and
/// runs one resolution pass per `render`.
pub struct RouteKeeper<R> {
    routes: Arc<[RouteConfig<R>]>,
    auth: AuthState,
    user_roles: RoleSet,
    loading: bool,
    loading_screen: Option<R>,
    public_redirect: Option<String>,
    private_redirect: Option<String>,
    private_fallback: Option<R>,
    not_found: Option<R>,
    unauthorized: Option<R>,
    disable_error_boundary: bool,
    boundary: ErrorBoundary,
    events: RouteEvents,
    mode: DiagnosticMode,
}

impl<R> RouteKeeper<R>
where
    R: Renderable + From<DefaultScreen>,
{
    pub fn new(routes: impl Into<Arc<[RouteConfig<R>]>>) -> Self {
        Self {
            routes: routes.into(),
            auth: AuthState::default(),
            user_roles: RoleSet::new(),
            loading: false,
            loading_screen: None,
            public_redirect: None,
            private_redirect: None,
            private_fallback: None,
            not_found: None,
            unauthorized: None,
            disable_error_boundary: false,
            boundary: ErrorBoundary::new(),
            events: RouteEvents::new(),
            mode: DiagnosticMode::default(),
        }
    }

    pub fn auth(mut self, auth: impl Into<AuthState>) -> Self {
        self.auth = auth.into();
        self
    }

    pub fn user_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_roles = role_set(roles);
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn loading_screen(mut self, screen: R) -> Self {
        self.loading_screen = Some(screen);
        self
    }

    pub fn public_redirect(mut self, to: impl Into<String>) -> Self {
        self.public_redirect = Some(to.into());
        self
    }

    pub fn private_redirect(mut self, to: impl Into<String>) -> Self {
        self.private_redirect = Some(to.into());
        self
    }

    pub fn private_fallback(mut self, fallback: R) -> Self {
        self.private_fallback = Some(fallback);
        self
    }

    pub fn not_found(mut self, view: R) -> Self {
        self.not_found = Some(view);
        self
    }

    pub fn unauthorized(mut self, view: R) -> Self {
        self.unauthorized = Some(view);
        self
    }

    pub fn disable_error_boundary(mut self, disable: bool) -> Self {
        self.disable_error_boundary = disable;
        self
    }

    /// Shares an existing boundary (and its active flag) instead of a fresh one.
    pub fn with_boundary(mut self, boundary: ErrorBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_events(mut self, events: RouteEvents) -> Self {
        self.events = events;
        self
    }

    pub fn on_route_change(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.events = self.events.on_route_change(hook);
        self
    }

    pub fn on_redirect(mut self, hook: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.events = self.events.on_redirect(hook);
        self
    }

    pub fn mode(mut self, mode: DiagnosticMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn events(&self) -> &RouteEvents {
        &self.events
    }

    pub fn boundary(&self) -> &ErrorBoundary {
        &self.boundary
    }

    /// access_context
    ///
    /// The resolver's view of this configuration, with every omitted override defaulted.
    pub fn access_context(&self) -> AccessContext<R> {
        let mut ctx = AccessContext::new(
            or_default(&self.private_fallback, DefaultScreen::LandingFallback),
            or_default(&self.unauthorized, DefaultScreen::Unauthorized),
            or_default(&self.loading_screen, DefaultScreen::Loading),
        )
        .authenticated(self.auth.is_authenticated())
        .roles(self.user_roles.iter().cloned());

        if let Some(to) = &self.private_redirect {
            ctx = ctx.private_redirect(to);
        }
        if let Some(to) = &self.public_redirect {
            ctx = ctx.public_redirect(to);
        }
        ctx
    }

    /// render
    ///
    /// While loading, returns the loading screen without touching the route tree.
    /// Otherwise resolves the tree and appends the catch-all not-found node.
    pub fn render(&self) -> Result<Rendered<R>, ConfigError> {
        if self.loading {
            return Ok(Rendered::Loading(or_default(
                &self.loading_screen,
                DefaultScreen::Loading,
            )));
        }

        let mut diagnostics = Diagnostics::new(self.mode);
        let mut routes = resolve_route_tree(&self.routes, &self.access_context(), &mut diagnostics)?;
        routes.push(RenderableNode::catch_all(or_default(
            &self.not_found,
            DefaultScreen::NotFound,
        )));

        tracing::debug!(
            authenticated = self.auth.is_authenticated(),
            roles = ?self.user_roles,
            nodes = routes.len(),
            "route tree resolved"
        );

        Ok(Rendered::Routes(RouteOutlet {
            routes,
            boundary: (!self.disable_error_boundary).then(|| self.boundary.clone()),
            diagnostics: diagnostics.into_reported(),
        }))
    }

    /// validate
    ///
    /// Resolves the tree once, ignoring `loading`, and returns every diagnostic.
    /// Structural diagnostics do not depend on the access context, so hosts can run this
    /// at startup to reject a bad configuration early.
    pub fn validate(&self) -> Result<Vec<Diagnostic>, ConfigError> {
        let mut diagnostics = Diagnostics::new(self.mode);
        resolve_route_tree(&self.routes, &self.access_context(), &mut diagnostics)?;
        Ok(diagnostics.into_reported())
    }
}

fn or_default<R: Clone + From<DefaultScreen>>(value: &Option<R>, screen: DefaultScreen) -> R {
    value.clone().unwrap_or_else(|| screen.into())
}

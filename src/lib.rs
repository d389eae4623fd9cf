use axum::{
    Router,
    http::HeaderName,
    routing::get,
};
use std::{any::Any, sync::Arc};

use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Resolution core: configuration model, access policy and the tree resolver.
pub mod diagnostics;
pub mod models;
pub mod paths;
pub mod redirect;
pub mod resolver;
pub mod roles;

// Shell: defaults, loading short-circuit, error boundary, notifications.
pub mod boundary;
pub mod shell;
pub mod views;

// HTTP host: configuration, principal extraction, manifest loading and the axum mount.
pub mod auth;
pub mod config;
pub mod handlers;
pub mod manifest;
pub mod routes;

// --- Public Re-exports ---

pub use boundary::{ErrorBoundary, RenderError};
pub use config::AppConfig;
pub use diagnostics::{ConfigError, Diagnostic, DiagnosticKind, DiagnosticMode, Diagnostics};
pub use models::{AccessContext, AccessType, Renderable, RenderableNode, Resolved, RouteConfig, RouteKey};
pub use redirect::{Navigate, RedirectTarget};
pub use resolver::resolve_route_tree;
pub use shell::{Rendered, RouteEvents, RouteKeeper, RouteOutlet};
pub use views::{DefaultScreen, View};

use auth::Principal;

/// AppState
///
/// Shared, immutable state of the HTTP host. The route tree is loaded once; every request
/// resolves it against its own principal.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<[RouteConfig<View>]>,
    pub config: AppConfig,
    /// One boundary for the lifetime of the server; its active flag is shared by all requests.
    pub boundary: ErrorBoundary,
    pub events: RouteEvents,
}

impl AppState {
    pub fn new(routes: Vec<RouteConfig<View>>, config: AppConfig) -> Self {
        Self {
            routes: routes.into(),
            config,
            boundary: ErrorBoundary::new(),
            events: RouteEvents::new(),
        }
    }

    pub fn with_events(mut self, events: RouteEvents) -> Self {
        self.events = events;
        self
    }

    /// keeper_for
    ///
    /// The route keeper for one request, configured from the host settings and the
    /// requesting principal.
    pub fn keeper_for(&self, principal: &Principal) -> RouteKeeper<View> {
        let mut keeper = RouteKeeper::new(self.routes.clone())
            .auth(principal.is_authenticated())
            .user_roles(principal.roles.iter().cloned())
            .mode(self.config.diagnostic_mode())
            .disable_error_boundary(self.config.disable_error_boundary)
            .with_boundary(self.boundary.clone())
            .with_events(self.events.clone());

        if let Some(to) = &self.config.private_redirect {
            keeper = keeper.private_redirect(to.as_str());
        }
        if let Some(to) = &self.config.public_redirect {
            keeper = keeper.public_redirect(to.as_str());
        }
        keeper
    }
}

/// create_router
///
/// Assembles the host's router: the health endpoint, the route-tree fallback, the panic
/// boundary (unless disabled) and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");
    let boundary = state.boundary.clone();
    let disable_error_boundary = state.config.disable_error_boundary;

    let router = Router::new()
        // GET /health
        // Liveness probe; never routed through the route tree.
        .route("/health", get(|| async { "ok" }))
        // Everything else is answered by the resolved route tree.
        .fallback(handlers::serve_route)
        .with_state(state);

    let router = if disable_error_boundary {
        router
    } else {
        router.layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| handlers::panic_response(&boundary, panic),
        ))
    };

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span for every request, carrying the `x-request-id` set above so all log lines of one
/// request (diagnostics, redirects, render failures) correlate.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

use axum::{
    extract::{Request, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::{any::Any, sync::Arc};
use tower::ServiceExt;

use crate::{
    AppState,
    auth::Principal,
    boundary::{Caught, ErrorBoundary, RenderError},
    models::Resolved,
    routes,
    shell::{Rendered, RouteEvents},
    views::{self, DefaultScreen, View},
};

// --- Handlers ---

/// serve_route
///
/// Fallback handler for every request that is not a service endpoint. Resolves the route
/// tree for the requesting principal, mounts the result on a fresh axum router and lets
/// that router answer the request.
pub async fn serve_route(
    State(state): State<AppState>,
    principal: Principal,
    request: Request,
) -> Response {
    let keeper = state.keeper_for(&principal);

    match keeper.render() {
        Ok(Rendered::Routes(outlet)) => {
            let router = routes::mount(&outlet, keeper.events());
            match router.oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            }
        }
        Ok(Rendered::Loading(screen)) => render_view(&screen, StatusCode::OK, None, request.uri().path()).await,
        Err(error) => {
            tracing::error!(%error, "route configuration rejected");
            (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
        }
    }
}

/// Endpoint
///
/// One mounted route: the resolved value it serves plus what it needs to report on.
#[derive(Clone)]
pub struct Endpoint {
    pub pattern: String,
    pub resolved: Arc<Resolved<View>>,
    pub status: StatusCode,
    pub boundary: Option<ErrorBoundary>,
    pub events: RouteEvents,
}

impl Endpoint {
    pub async fn respond(self, uri: Uri) -> Response {
        let path = uri.path();
        self.events.route_changed(path);

        match self.resolved.as_ref() {
            Resolved::Redirect(navigate) => {
                let href = navigate.href();
                tracing::debug!(from = %path, to = %href, "redirecting");
                self.events.redirected(path, &href);
                Redirect::to(&href).into_response()
            }
            // Suspense resolves on the server: the request waits for the lazy view.
            Resolved::Element(view) | Resolved::Suspense { content: view, .. } | Resolved::Fallback(view) => {
                render_view(view, self.status, self.boundary.as_ref(), &self.pattern).await
            }
            Resolved::Unauthorized(view) => {
                render_view(view, StatusCode::UNAUTHORIZED, self.boundary.as_ref(), &self.pattern).await
            }
            Resolved::Empty => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// render_view
///
/// Renders a view into a full HTML document. Failures go through the boundary when one is
/// mounted; otherwise (or once the boundary is removed) they surface as a plain 500.
pub async fn render_view(
    view: &View,
    status: StatusCode,
    boundary: Option<&ErrorBoundary>,
    origin: &str,
) -> Response {
    let outcome = view.render().await.map_err(|error| error.within(origin));
    let outcome = match boundary {
        Some(boundary) => boundary.capture(outcome),
        None => outcome.map(Caught::Rendered),
    };

    match outcome {
        Ok(Caught::Rendered(markup)) => (status, Html(views::document(view.name(), &markup))).into_response(),
        Ok(Caught::Fallback(_)) => error_fallback(),
        Err(error) => uncaught(error),
    }
}

/// panic_response
///
/// Response for a panic caught by the `CatchPanicLayer`. Reported through the boundary like
/// any render failure.
pub fn panic_response(boundary: &ErrorBoundary, panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|message| message.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    match boundary.capture::<()>(Err(RenderError::new("handler", message))) {
        Ok(_) => error_fallback(),
        Err(error) => uncaught(error),
    }
}

fn error_fallback() -> Response {
    let screen = DefaultScreen::ErrorFallback;
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(views::document(screen.name(), screen.markup())),
    )
        .into_response()
}

fn uncaught(error: RenderError) -> Response {
    tracing::error!(view = %error.view, trace = ?error.trace, "render failure reached the top level");
    (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
}

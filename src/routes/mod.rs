//! Router Mount Module
//!
//! Hands a resolved route tree to axum, the external router. Every access decision has
//! already been made by the resolver; this module only flattens the tree into absolute
//! patterns and registers one endpoint per pattern.
//!
//! Nesting semantics: a node whose ancestor resolved to a redirect, the unauthorized view
//! or the landing fallback serves that ancestor's outcome, since the ancestor never renders
//! its outlet. An index route shadows its parent layout at the shared pattern.
use axum::{
    Router,
    http::{StatusCode, Uri},
    routing::get,
};
use std::{collections::HashMap, sync::Arc};

use crate::{
    boundary::ErrorBoundary,
    handlers::Endpoint,
    models::{RenderableNode, Resolved, RouteTarget},
    shell::{RouteEvents, RouteOutlet},
    views::{DefaultScreen, View},
};

pub mod pattern;

/// mount
///
/// Builds the axum router for one resolved outlet. The catch-all node becomes the router
/// fallback and answers 404.
pub fn mount(outlet: &RouteOutlet<View>, events: &RouteEvents) -> Router {
    let mut mount = Mount {
        probe: matchit::Router::new(),
        depths: HashMap::new(),
        entries: Vec::new(),
        boundary: outlet.boundary.clone(),
        events: events.clone(),
    };

    for node in outlet.routes.iter().filter(|node| node.target != RouteTarget::CatchAll) {
        mount.node(node, None);
    }

    let not_found = outlet
        .not_found()
        .cloned()
        .unwrap_or_else(|| DefaultScreen::NotFound.into());
    let fallback = mount.endpoint("*".to_string(), Resolved::Element(not_found), StatusCode::NOT_FOUND);

    mount
        .entries
        .into_iter()
        .fold(Router::new(), |router, (path, endpoint)| {
            router.route(&path, get(move |uri: Uri| endpoint.clone().respond(uri)))
        })
        .fallback(move |uri: Uri| fallback.clone().respond(uri))
}

struct Mount {
    // Mirrors axum's matcher so conflicting patterns are skipped instead of panicking.
    probe: matchit::Router<()>,
    depths: HashMap<String, usize>,
    entries: Vec<(String, Endpoint)>,
    boundary: Option<ErrorBoundary>,
    events: RouteEvents,
}

impl Mount {
    // Children are registered before their parent so an index route claims the shared
    // pattern ahead of the layout it sits in.
    fn node<'a>(&mut self, node: &'a RenderableNode<View>, guard: Option<&'a Resolved<View>>) {
        let served = guard.unwrap_or(&node.element);
        let child_guard = guard.or_else(|| node.element.blocks_outlet().then_some(&node.element));

        for child in &node.children {
            self.node(child, child_guard);
        }
        self.register(node, served);
    }

    fn register(&mut self, node: &RenderableNode<View>, served: &Resolved<View>) {
        let pattern = node.key.pattern();
        let path = pattern::to_axum(&pattern);
        let depth = node.key.depth();

        if let Some(segment) = pattern::unsupported_segment(&path) {
            tracing::warn!(route = %node.key, path = %path, segment, "unmountable path segment, route skipped");
            return;
        }
        if let Some(&existing) = self.depths.get(&path) {
            if existing > depth {
                tracing::debug!(route = %node.key, path = %path, "layout shadowed by its index route");
            } else {
                tracing::warn!(route = %node.key, path = %path, "pattern already mounted, route skipped");
            }
            return;
        }
        if let Err(error) = self.probe.insert(path.clone(), ()) {
            tracing::warn!(route = %node.key, path = %path, %error, "conflicting route pattern skipped");
            return;
        }

        self.depths.insert(path.clone(), depth);
        let endpoint = self.endpoint(pattern, served.clone(), StatusCode::OK);
        self.entries.push((path, endpoint));
    }

    fn endpoint(&self, pattern: String, resolved: Resolved<View>, status: StatusCode) -> Endpoint {
        Endpoint {
            pattern,
            resolved: Arc::new(resolved),
            status,
            boundary: self.boundary.clone(),
            events: self.events.clone(),
        }
    }
}

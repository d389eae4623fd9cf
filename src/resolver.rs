use std::collections::HashSet;

use crate::{
    diagnostics::{ConfigError, DiagnosticKind, Diagnostics},
    models::{
        AccessContext, AccessType, KeySegment, Renderable, RenderableNode, Resolved, RouteConfig,
        RouteKey, RouteTarget,
    },
    paths,
    redirect::{Navigate, RedirectTarget},
    roles::{RoleSet, effective_roles, has_role_access},
};

/// resolve_route_tree
///
/// Resolves a whole route configuration against one access context.
///
/// Every node's access decision is made here; the returned tree only needs URL matching.
/// In development mode the first diagnostic aborts the pass with a `ConfigError`; in
/// production mode invalid nodes are dropped or degraded and the rest of the tree still
/// resolves.
pub fn resolve_route_tree<R: Renderable>(
    routes: &[RouteConfig<R>],
    ctx: &AccessContext<R>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<RenderableNode<R>>, ConfigError> {
    Resolver::new(ctx, diagnostics).resolve(routes, &RouteKey::root(), None, &RoleSet::new())
}

/// RouteShape
///
/// The legal (and one illegal) combinations of index/path and element/redirect a config
/// node can take once its fields have been validated.
#[derive(Debug)]
pub enum RouteShape<'a, R> {
    IndexElement(Option<&'a R>),
    /// Index routes cannot redirect; the target is diagnosed and ignored.
    IndexRedirect(&'a RedirectTarget),
    PathElement { path: &'a str, element: Option<&'a R> },
    PathRedirect { path: &'a str, target: &'a RedirectTarget },
}

impl<'a, R> RouteShape<'a, R> {
    pub fn path(&self) -> Option<&'a str> {
        match self {
            RouteShape::PathElement { path, .. } | RouteShape::PathRedirect { path, .. } => Some(*path),
            _ => None,
        }
    }

    pub fn element(&self) -> Option<&'a R> {
        match self {
            RouteShape::IndexElement(element) | RouteShape::PathElement { element, .. } => *element,
            _ => None,
        }
    }

    fn segment(&self) -> KeySegment {
        match self.path() {
            Some(path) => KeySegment::Path(path.to_string()),
            None => KeySegment::Index,
        }
    }

    fn target(&self) -> RouteTarget {
        match self.path() {
            Some(path) => RouteTarget::Path(path.to_string()),
            None => RouteTarget::Index,
        }
    }
}

/// Resolver
///
/// One resolution pass. Holds only the read-only context and the diagnostic channel;
/// inherited access and roles travel down as arguments of `resolve`.
pub struct Resolver<'a, R> {
    ctx: &'a AccessContext<R>,
    diagnostics: &'a mut Diagnostics,
}

impl<'a, R: Renderable> Resolver<'a, R> {
    pub fn new(ctx: &'a AccessContext<R>, diagnostics: &'a mut Diagnostics) -> Self {
        Self { ctx, diagnostics }
    }

    /// resolve
    ///
    /// Resolves one sibling group under `parent`, then each node's children with the
    /// node's effective access type and roles as their inheritance.
    pub fn resolve(
        &mut self,
        nodes: &[RouteConfig<R>],
        parent: &RouteKey,
        inherited_access: Option<&AccessType>,
        inherited_roles: &RoleSet,
    ) -> Result<Vec<RenderableNode<R>>, ConfigError> {
        // Sibling bookkeeping is scoped to this group.
        let mut used_paths: HashSet<&str> = HashSet::new();
        let mut index_used = false;
        let mut resolved = Vec::with_capacity(nodes.len());

        for node in nodes {
            if node.index {
                if index_used {
                    self.diagnostics.report(
                        DiagnosticKind::DuplicateIndex,
                        parent,
                        "duplicate index route ignored",
                    )?;
                    continue;
                }
                index_used = true;
            } else if let Some(path) = declared_path(node) {
                if !used_paths.insert(path) {
                    self.diagnostics.report(
                        DiagnosticKind::DuplicatePath,
                        parent,
                        format!("duplicate sibling path \"{path}\" ignored"),
                    )?;
                    continue;
                }
            }

            let Some(shape) = self.classify(node, parent)? else {
                continue;
            };
            resolved.push(self.resolve_node(node, shape, parent, inherited_access, inherited_roles)?);
        }

        Ok(resolved)
    }

    fn resolve_node(
        &mut self,
        node: &RouteConfig<R>,
        shape: RouteShape<'_, R>,
        parent: &RouteKey,
        inherited_access: Option<&AccessType>,
        inherited_roles: &RoleSet,
    ) -> Result<RenderableNode<R>, ConfigError> {
        let key = parent.child(shape.segment());
        let is_root = shape.path() == Some("/");

        if let Some(declared) = &node.access {
            if is_root {
                self.diagnostics.report(
                    DiagnosticKind::RootAccessType,
                    &key,
                    format!("type \"{declared}\" is ignored on the root path"),
                )?;
            }
            if let AccessType::Unknown(raw) = declared {
                self.diagnostics.report(
                    DiagnosticKind::InvalidAccessType,
                    &key,
                    format!("unknown route type \"{raw}\", expected public, private or neutral"),
                )?;
            }
        }

        let access = node
            .access
            .clone()
            .or_else(|| inherited_access.cloned())
            .unwrap_or(AccessType::Public);
        let roles = effective_roles(inherited_roles, node.roles.as_deref(), node.exclude_parent_roles);
        let has_access = has_role_access(&self.ctx.roles, &roles);

        let element = match &shape {
            RouteShape::PathRedirect { target, .. } => Resolved::Redirect(Navigate::from(*target)),
            _ if is_root => {
                if self.ctx.authenticated {
                    self.present(shape.element(), node.loading.as_ref())
                } else {
                    Resolved::Fallback(self.ctx.private_fallback.clone())
                }
            }
            _ => match &access {
                AccessType::Private if !self.ctx.authenticated => {
                    Resolved::Redirect(Navigate::replace_to(&self.ctx.private_redirect))
                }
                AccessType::Private if !has_access => Resolved::Unauthorized(self.ctx.unauthorized.clone()),
                AccessType::Public if self.ctx.authenticated => {
                    Resolved::Redirect(Navigate::replace_to(&self.ctx.public_redirect))
                }
                AccessType::Private | AccessType::Public | AccessType::Neutral => {
                    self.present(shape.element(), node.loading.as_ref())
                }
                AccessType::Unknown(_) => Resolved::Empty,
            },
        };

        // Index routes and redirects never render nested routes.
        let mut children = match shape {
            RouteShape::PathElement { .. } if !node.children.is_empty() => {
                self.resolve(&node.children, &key, Some(&access), &roles)?
            }
            _ => Vec::new(),
        };
        // A node with an unknown type renders nothing, outlet included. Its subtree is only
        // walked for diagnostics.
        if matches!(access, AccessType::Unknown(_)) && !children.is_empty() {
            tracing::debug!(route = %key, hidden = children.len(), "subtree hidden by unknown route type");
            children.clear();
        }

        Ok(RenderableNode {
            target: shape.target(),
            key,
            case_sensitive: node.case_sensitive,
            element,
            children,
        })
    }

    /// classify
    ///
    /// Validates one node's fields and decides its shape. `None` drops the node.
    fn classify<'n>(
        &mut self,
        node: &'n RouteConfig<R>,
        parent: &RouteKey,
    ) -> Result<Option<RouteShape<'n, R>>, ConfigError> {
        let path = declared_path(node);
        let element = node.element.as_ref();
        let mut redirect = node.redirect.as_ref();

        if redirect.is_some() && element.is_some() {
            self.diagnostics.report(
                DiagnosticKind::ElementAndRedirect,
                describe(parent, node),
                "route declares both an element and a redirect; the redirect is ignored",
            )?;
            redirect = None;
        }
        if redirect.is_some_and(RedirectTarget::is_empty) {
            self.diagnostics.report(
                DiagnosticKind::EmptyRedirectTarget,
                describe(parent, node),
                "redirect target has an empty pathname",
            )?;
            redirect = None;
        }

        if node.index {
            if let Some(path) = path {
                self.diagnostics.report(
                    DiagnosticKind::IndexWithPath,
                    describe(parent, node),
                    format!("index route must not declare a path (\"{path}\")"),
                )?;
            }
            if !node.children.is_empty() {
                self.diagnostics.report(
                    DiagnosticKind::IndexWithChildren,
                    describe(parent, node),
                    "index route must not declare children",
                )?;
            }
            if let Some(target) = redirect {
                self.diagnostics.report(
                    DiagnosticKind::IndexRedirect,
                    describe(parent, node),
                    "index route cannot redirect",
                )?;
                return Ok(Some(RouteShape::IndexRedirect(target)));
            }
            if element.is_none() {
                self.report_missing_renderable(parent, node)?;
            }
            return Ok(Some(RouteShape::IndexElement(element)));
        }

        let Some(path) = path else {
            self.diagnostics.report(
                DiagnosticKind::MissingPath,
                parent,
                "non-index route requires a non-empty path",
            )?;
            return Ok(None);
        };

        if let Some(target) = redirect {
            let absolute = parent.child(KeySegment::Path(path.to_string())).pattern();
            if paths::same_path(&target.to.pathname, path) || paths::same_path(&target.to.pathname, &absolute) {
                self.diagnostics.report(
                    DiagnosticKind::SelfRedirect,
                    describe(parent, node),
                    format!("route redirects to its own path \"{}\"", target.to.pathname),
                )?;
                redirect = None;
            }
        }

        match redirect {
            Some(target) => {
                if !node.children.is_empty() {
                    self.diagnostics.report(
                        DiagnosticKind::RedirectWithChildren,
                        describe(parent, node),
                        "redirect routes must not declare children; they are ignored",
                    )?;
                }
                Ok(Some(RouteShape::PathRedirect { path, target }))
            }
            None => {
                if element.is_none() {
                    self.report_missing_renderable(parent, node)?;
                }
                Ok(Some(RouteShape::PathElement { path, element }))
            }
        }
    }

    fn report_missing_renderable(&mut self, parent: &RouteKey, node: &RouteConfig<R>) -> Result<(), ConfigError> {
        self.diagnostics.report(
            DiagnosticKind::MissingRenderable,
            describe(parent, node),
            "route declares neither an element nor a redirect",
        )
    }

    /// The element as rendered: lazy ones are wrapped in a loading region.
    fn present(&self, element: Option<&R>, loading: Option<&R>) -> Resolved<R> {
        match element {
            None => Resolved::Empty,
            Some(element) if element.is_async_reference() => Resolved::Suspense {
                content: element.clone(),
                fallback: loading.unwrap_or(&self.ctx.loading).clone(),
            },
            Some(element) => Resolved::Element(element.clone()),
        }
    }
}

fn declared_path<R>(node: &RouteConfig<R>) -> Option<&str> {
    node.path.as_deref().filter(|path| !path.trim().is_empty())
}

// Location string for diagnostics raised before the node's key exists.
fn describe<R>(parent: &RouteKey, node: &RouteConfig<R>) -> RouteKey {
    match (node.index, declared_path(node)) {
        (true, _) => parent.child(KeySegment::Index),
        (false, Some(path)) => parent.child(KeySegment::Path(path.to_string())),
        (false, None) => parent.clone(),
    }
}

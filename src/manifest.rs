use serde::Deserialize;
use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{models::RouteConfig, views::View};

/// ElementRef
///
/// How a manifest names a page: `"Home"`, or `{ "page": "Reports", "lazy": true }`.
/// Pages live in the pages directory as `<name>.html`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ElementRef {
    Page(String),
    Detailed {
        page: String,
        #[serde(default)]
        lazy: bool,
    },
}

impl ElementRef {
    pub fn page(&self) -> &str {
        match self {
            ElementRef::Page(page) | ElementRef::Detailed { page, .. } => page,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, ElementRef::Detailed { lazy: true, .. })
    }
}

/// ManifestError
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid route manifest {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid page name `{0}`: names must not contain path separators")]
    InvalidPageName(String),
}

/// RouteManifest
///
/// The JSON route file served by the HTTP host: `{ "routes": [ ... ] }`, each entry a
/// `RouteConfig` whose elements are page references.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteManifest {
    pub routes: Vec<RouteConfig<ElementRef>>,
}

impl RouteManifest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let json = tokio::fs::read_to_string(path).await.map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ManifestError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// into_views
    ///
    /// Reads every eager page from `pages` once and turns the manifest into routes over
    /// `View`s. Lazy pages are only located here; they are read on each render.
    pub async fn into_views(self, pages: &Path) -> Result<Vec<RouteConfig<View>>, ManifestError> {
        let mut eager = BTreeSet::new();
        for route in &self.routes {
            collect_eager(route, &mut eager)?;
        }

        let mut loaded: HashMap<String, Arc<str>> = HashMap::with_capacity(eager.len());
        for name in eager {
            let path = page_path(pages, &name);
            let markup = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| ManifestError::Io { path, source })?;
            tracing::debug!(page = %name, "loaded page");
            loaded.insert(name, markup.into());
        }

        let mut to_view = |element: ElementRef| -> Result<View, ManifestError> {
            let name = element.page().to_string();
            if element.is_lazy() {
                return Ok(View::lazy(name.clone(), page_path(pages, &name)));
            }
            let markup = loaded.get(&name).cloned().unwrap_or_else(|| Arc::from(""));
            Ok(View::Html { name, markup })
        };

        self.routes
            .into_iter()
            .map(|route| route.try_map(&mut to_view))
            .collect()
    }
}

fn collect_eager(route: &RouteConfig<ElementRef>, eager: &mut BTreeSet<String>) -> Result<(), ManifestError> {
    for element in route.element.iter().chain(route.loading.iter()) {
        let name = element.page();
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(ManifestError::InvalidPageName(name.to_string()));
        }
        if !element.is_lazy() {
            eager.insert(name.to_string());
        }
    }
    route
        .children
        .iter()
        .try_for_each(|child| collect_eager(child, eager))
}

fn page_path(pages: &Path, name: &str) -> PathBuf {
    pages.join(format!("{name}.html"))
}

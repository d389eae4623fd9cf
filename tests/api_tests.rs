use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use route_keeper::{AppConfig, AppState, RouteConfig, RouteEvents, View, config::Env, create_router};
use std::{
    fs,
    sync::{Arc, Mutex},
};
use tempfile::TempDir;
use tower::util::ServiceExt;

// --- Test Fixtures ---

struct TestApp {
    router: Router,
    // Holds the lazy page on disk for the lifetime of the test.
    _pages: TempDir,
}

fn page(name: &str) -> View {
    View::html(name, format!("<main>{name} page</main>"))
}

fn routes(pages: &TempDir) -> Vec<RouteConfig<View>> {
    vec![
        RouteConfig::path("/").element(page("Home")),
        RouteConfig::path("/login").public().element(page("Login")),
        RouteConfig::path("/dashboard").private().element(page("Dashboard")).children(vec![
            RouteConfig::index().element(page("Overview")),
            RouteConfig::path("settings").element(page("Settings")),
        ]),
        RouteConfig::path("/admin").private().roles(["admin"]).element(page("Admin")),
        RouteConfig::path("/help").neutral().element(page("Help")),
        RouteConfig::path("/reports")
            .neutral()
            .element(View::lazy("Reports", pages.path().join("Reports.html"))),
        RouteConfig::path("/broken")
            .neutral()
            .element(View::lazy("Broken", pages.path().join("missing.html"))),
        RouteConfig::path("/old").redirect_to("/help#faq"),
    ]
}

fn app_with(config: AppConfig, events: RouteEvents) -> TestApp {
    let pages = tempfile::tempdir().unwrap();
    fs::write(pages.path().join("Reports.html"), "<main>Quarterly reports</main>").unwrap();

    let state = AppState::new(routes(&pages), config).with_events(events);
    TestApp {
        router: create_router(state),
        _pages: pages,
    }
}

fn app() -> TestApp {
    app_with(AppConfig::default(), RouteEvents::new())
}

async fn get(app: &TestApp, uri: &str, user: Option<(&str, &str)>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some((id, roles)) = user {
        request = request.header("x-user-id", id).header("x-user-roles", roles);
    }
    app.router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

// --- Service Endpoints ---

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let response = get(&app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_text(response).await, "ok");
}

// --- Root & Fallbacks ---

#[tokio::test]
async fn test_root_serves_landing_until_signed_in() {
    let app = app();

    let response = get(&app, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Welcome to Route Keeper"));

    let response = get(&app, "/", Some(("u-1", ""))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Home page"));
}

#[tokio::test]
async fn test_unknown_paths_are_not_found() {
    let app = app();
    let response = get(&app, "/does/not/exist", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page Not Found"));
}

// --- Guards ---

#[tokio::test]
async fn test_private_routes_redirect_to_login() {
    let app = app();

    for uri in ["/dashboard", "/dashboard/settings", "/admin"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login", "{uri}");
    }
}

#[tokio::test]
async fn test_index_route_renders_at_its_parent_path() {
    let app = app();

    let response = get(&app, "/dashboard", Some(("u-1", "user"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Overview page"));

    let response = get(&app, "/dashboard/settings", Some(("u-1", "user"))).await;
    assert!(body_text(response).await.contains("Settings page"));
}

#[tokio::test]
async fn test_admin_requires_the_admin_role() {
    let app = app();

    let response = get(&app, "/admin", Some(("u-1", "user, editor"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response).await.contains("Unauthorized Access"));

    let response = get(&app, "/admin", Some(("u-2", "editor,admin"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Admin page"));
}

#[tokio::test]
async fn test_public_routes_send_signed_in_users_home() {
    let app = app();

    let response = get(&app, "/login", Some(("u-1", ""))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = get(&app, "/login", None).await;
    assert!(body_text(response).await.contains("Login page"));
}

#[tokio::test]
async fn test_configured_redirects_are_used() {
    let config = AppConfig {
        private_redirect: Some("/signin".to_string()),
        ..AppConfig::default()
    };
    let app = app_with(config, RouteEvents::new());

    let response = get(&app, "/dashboard", None).await;
    assert_eq!(location(&response), "/signin");
}

#[tokio::test]
async fn test_redirect_routes_fire_the_redirect_hook() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let events = RouteEvents::new().on_redirect({
        let seen = seen.clone();
        move |from: &str, to: &str| seen.lock().unwrap().push((from.to_string(), to.to_string()))
    });
    let app = app_with(AppConfig::default(), events);

    let response = get(&app, "/old", Some(("u-1", ""))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/help#faq");
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("/old".to_string(), "/help#faq".to_string())]
    );
}

// --- Lazy Pages & Error Boundary ---

#[tokio::test]
async fn test_lazy_pages_are_read_on_request() {
    let app = app();
    let response = get(&app, "/reports", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Quarterly reports"));
}

#[tokio::test]
async fn test_render_failures_show_the_error_fallback() {
    let app = app();
    let response = get(&app, "/broken", None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("Something went wrong"));
}

#[tokio::test]
async fn test_disabled_boundary_surfaces_raw_errors() {
    let config = AppConfig {
        disable_error_boundary: true,
        ..AppConfig::default()
    };
    let app = app_with(config, RouteEvents::new());
    let response = get(&app, "/broken", None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(!body.contains("Something went wrong"));
    assert!(body.contains("missing.html"));
}

// --- Configuration Errors ---

#[tokio::test]
async fn test_invalid_tree_fails_requests_in_development() {
    let state = AppState::new(
        vec![
            RouteConfig::path("/help").neutral().element(page("Help")),
            RouteConfig::path("/help").neutral().element(page("Other")),
        ],
        AppConfig::default(),
    );
    let app = TestApp {
        router: create_router(state),
        _pages: tempfile::tempdir().unwrap(),
    };

    let response = get(&app, "/help", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("duplicate-path"));
}

#[tokio::test]
async fn test_unmountable_routes_do_not_break_siblings() {
    let state = AppState::new(
        vec![
            RouteConfig::path("/help").neutral().element(page("Help")),
            RouteConfig::path("/files/*/raw").neutral().element(page("Raw")),
            RouteConfig::path("/a/:").neutral().element(page("Colon")),
        ],
        AppConfig::default(),
    );
    let app = TestApp {
        router: create_router(state),
        _pages: tempfile::tempdir().unwrap(),
    };

    let response = get(&app, "/help", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Help page"));

    let response = get(&app, "/files/report/raw", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_type_hides_nested_routes() {
    let config = AppConfig {
        env: Env::Production,
        ..AppConfig::default()
    };
    let state = AppState::new(
        vec![
            RouteConfig::path("/vault")
                .access("secret")
                .element(page("Vault"))
                .children(vec![RouteConfig::path("open").neutral().element(page("Open"))]),
        ],
        config,
    );
    let app = TestApp {
        router: create_router(state),
        _pages: tempfile::tempdir().unwrap(),
    };

    let response = get(&app, "/vault", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, "/vault/open", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

use route_keeper::{
    DiagnosticKind, DiagnosticMode, ErrorBoundary, Rendered, RenderError, Resolved, RouteConfig,
    RouteKeeper,
    boundary::Caught,
    models::{KeySegment, RouteKey, RouteTarget},
    shell::{AuthState, LocationTracker, RouteEvents},
};
use std::sync::{Arc, Mutex};

fn malformed() -> Vec<RouteConfig<&'static str>> {
    vec![
        RouteConfig::path("x").element("First"),
        RouteConfig::path("x").element("Second"),
        RouteConfig {
            path: Some("oops".to_string()),
            ..RouteConfig::index()
        },
    ]
}

fn routes_of(rendered: Rendered<&'static str>) -> route_keeper::RouteOutlet<&'static str> {
    match rendered {
        Rendered::Routes(outlet) => outlet,
        Rendered::Loading(screen) => panic!("expected routes, got loading screen {screen}"),
    }
}

// --- Loading ---

#[test]
fn test_loading_short_circuits_resolution() {
    let keeper = RouteKeeper::new(malformed())
        .mode(DiagnosticMode::Development)
        .loading(true);

    let rendered = keeper.render().expect("loading never resolves the tree");
    assert!(matches!(rendered, Rendered::Loading("LoadingScreen")));
}

#[test]
fn test_custom_loading_screen() {
    let keeper = RouteKeeper::new(Vec::<RouteConfig<&'static str>>::new())
        .loading(true)
        .loading_screen("Spinner");

    assert!(matches!(keeper.render(), Ok(Rendered::Loading("Spinner"))));
}

// --- Defaults & Catch-all ---

#[test]
fn test_catch_all_is_appended_last() {
    let keeper = RouteKeeper::new(vec![RouteConfig::path("/").element("Home")]);

    let outlet = routes_of(keeper.render().unwrap());
    let last = outlet.routes.last().unwrap();
    assert_eq!(last.target, RouteTarget::CatchAll);
    assert_eq!(last.element, Resolved::Element("NotFound"));
    assert_eq!(outlet.not_found(), Some(&"NotFound"));
}

#[test]
fn test_nested_nodes_are_found_by_key() {
    let keeper = RouteKeeper::new(vec![
        RouteConfig::path("/settings").neutral().element("Settings").children(vec![
            RouteConfig::index().element("General"),
            RouteConfig::path("profile").element("Profile"),
        ]),
    ]);
    let outlet = routes_of(keeper.render().unwrap());

    let settings = RouteKey::root().child(KeySegment::Path("/settings".to_string()));
    let profile = settings.child(KeySegment::Path("profile".to_string()));
    let node = outlet.find(&profile).expect("profile node");
    assert_eq!(node.element, Resolved::Element("Profile"));
    assert_eq!(node.key.pattern(), "/settings/profile");
    assert_eq!(profile.to_string(), "/settings > profile");

    let index = outlet.find(&settings.child(KeySegment::Index)).expect("index node");
    assert_eq!(index.target, RouteTarget::Index);
    assert_eq!(index.key.pattern(), "/settings");
}

#[test]
fn test_overrides_replace_default_screens() {
    let keeper = RouteKeeper::new(vec![
        RouteConfig::path("/").element("Home"),
        RouteConfig::path("/admin").private().roles(["admin"]).element("Admin"),
    ])
    .auth("session-token")
    .user_roles(["user"])
    .not_found("Missing")
    .unauthorized("Forbidden");

    let outlet = routes_of(keeper.render().unwrap());
    assert_eq!(outlet.routes[0].element, Resolved::Element("Home"));
    assert_eq!(outlet.routes[1].element, Resolved::Unauthorized("Forbidden"));
    assert_eq!(outlet.not_found(), Some(&"Missing"));
}

#[test]
fn test_anonymous_root_uses_private_fallback() {
    let keeper = RouteKeeper::new(vec![RouteConfig::path("/").element("Home")]).auth("");
    let outlet = routes_of(keeper.render().unwrap());
    assert_eq!(outlet.routes[0].element, Resolved::Fallback("LandingFallback"));

    let keeper = RouteKeeper::new(vec![RouteConfig::path("/").element("Home")]).private_fallback("Welcome");
    let outlet = routes_of(keeper.render().unwrap());
    assert_eq!(outlet.routes[0].element, Resolved::Fallback("Welcome"));
}

#[test]
fn test_blank_redirect_overrides_keep_defaults() {
    let keeper = RouteKeeper::new(vec![RouteConfig::path("/me").private().element("Me")])
        .private_redirect("   ")
        .public_redirect("");

    let ctx = keeper.access_context();
    assert_eq!(ctx.private_redirect, "/login");
    assert_eq!(ctx.public_redirect, "/");
}

#[test]
fn test_auth_state_accepts_strings_and_options() {
    assert!(AuthState::from("token").is_authenticated());
    assert!(!AuthState::from("").is_authenticated());
    assert!(!AuthState::from(None::<bool>).is_authenticated());
    assert!(AuthState::from(Some(true)).is_authenticated());
}

// --- Diagnostics ---

#[test]
fn test_development_mode_rejects_malformed_tree() {
    let keeper = RouteKeeper::new(malformed()).mode(DiagnosticMode::Development);

    let error = keeper.render().unwrap_err();
    assert_eq!(error.kind(), DiagnosticKind::DuplicatePath);
}

#[test]
fn test_production_mode_degrades_and_reports() {
    let keeper = RouteKeeper::new(malformed()).mode(DiagnosticMode::Production);

    let outlet = routes_of(keeper.render().unwrap());
    // First "x", the index route, then the catch-all.
    assert_eq!(outlet.routes.len(), 3);
    let kinds: Vec<_> = outlet.diagnostics.iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&DiagnosticKind::DuplicatePath));
    assert!(kinds.contains(&DiagnosticKind::IndexWithPath));

    let validated = keeper.validate().unwrap();
    assert_eq!(validated, outlet.diagnostics);
}

// --- Error Boundary ---

#[test]
fn test_boundary_is_omitted_when_disabled() {
    let keeper = RouteKeeper::new(vec![RouteConfig::path("/").element("Home")]).disable_error_boundary(true);
    assert!(routes_of(keeper.render().unwrap()).boundary.is_none());

    let shared = ErrorBoundary::new();
    let keeper = RouteKeeper::new(vec![RouteConfig::path("/").element("Home")]).with_boundary(shared.clone());
    let boundary = routes_of(keeper.render().unwrap()).boundary.expect("boundary mounted");
    shared.remove();
    assert!(!boundary.is_active());
}

#[test]
fn test_boundary_captures_until_removed() {
    let boundary = ErrorBoundary::new();

    let caught = boundary.capture::<()>(Err(RenderError::new("Reports", "read failed"))).unwrap();
    assert!(matches!(caught, Caught::Fallback(error) if error.view == "Reports"));

    boundary.remove();
    assert!(boundary.capture::<()>(Err(RenderError::new("Reports", "read failed"))).is_err());

    boundary.restore();
    assert!(matches!(boundary.capture(Ok(1)), Ok(Caught::Rendered(1))));
}

// --- Notifications ---

#[test]
fn test_location_tracker_reports_changes_and_redirects() {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let redirects = Arc::new(Mutex::new(Vec::new()));
    let events = RouteEvents::new()
        .on_route_change({
            let changes = changes.clone();
            move |path: &str| changes.lock().unwrap().push(path.to_string())
        })
        .on_redirect({
            let redirects = redirects.clone();
            move |from: &str, to: &str| redirects.lock().unwrap().push((from.to_string(), to.to_string()))
        });

    let keeper = RouteKeeper::new(vec![
        RouteConfig::path("/").element("Home"),
        RouteConfig::path("/dashboard").private().element("Dashboard"),
    ])
    .with_events(events);
    let outlet = routes_of(keeper.render().unwrap());

    let mut tracker = LocationTracker::new();
    tracker.observe(keeper.events(), "/", &outlet.routes[0].element);
    tracker.observe(keeper.events(), "/", &outlet.routes[0].element);
    tracker.observe(keeper.events(), "/dashboard", &outlet.routes[1].element);

    assert_eq!(tracker.current(), Some("/dashboard"));
    assert_eq!(*changes.lock().unwrap(), vec!["/", "/dashboard"]);
    assert_eq!(
        *redirects.lock().unwrap(),
        vec![("/dashboard".to_string(), "/login".to_string())]
    );
}

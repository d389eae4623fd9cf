use route_keeper::{
    AppState, RouteEvents, RouteKeeper,
    config::{AppConfig, Env},
    create_router,
    manifest::RouteManifest,
};
use std::process::ExitCode;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point: configuration, logging, the route manifest and the HTTP
/// server, in that order. Any startup failure is logged and ends the process.
#[tokio::main]
async fn main() -> ExitCode {
    // 1. Configuration & Environment Loading
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate, info for the HTTP stack.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "route_keeper=debug,tower_http=info,axum=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "FATAL: server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // 4. Route Manifest
    let manifest = RouteManifest::load(&config.routes_file).await?;
    let routes = manifest.into_views(&config.pages_dir).await?;

    // Structural problems surface once at startup: fatal locally, logged in production.
    let diagnostics = RouteKeeper::new(routes.clone())
        .mode(config.diagnostic_mode())
        .validate()?;
    tracing::info!(
        routes = routes.len(),
        diagnostics = diagnostics.len(),
        "route manifest loaded from {}",
        config.routes_file.display()
    );

    // 5. Unified State Assembly
    let events = RouteEvents::new()
        .on_route_change(|path| tracing::debug!(path, "route changed"))
        .on_redirect(|from, to| tracing::info!(from, to, "redirect issued"));
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(routes, config).with_events(events);

    // 6. Router and Server Startup
    let app = create_router(app_state);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on {bind_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

use std::{env, path::PathBuf};

use crate::diagnostics::DiagnosticMode;

/// AppConfig
///
/// Holds the host's entire configuration. Loaded once at startup and immutable afterwards;
/// it travels inside `AppState` to every request.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and diagnostic severity.
    pub env: Env,
    // JSON route manifest to serve.
    pub routes_file: PathBuf,
    // Directory holding `<page>.html` files referenced by the manifest.
    pub pages_dir: PathBuf,
    pub bind_addr: String,
    // Overrides for the guard redirects; blank values keep the defaults.
    pub private_redirect: Option<String>,
    pub public_redirect: Option<String>,
    pub disable_error_boundary: bool,
}

/// Env
///
/// Local runs fail fast on route misconfiguration; production degrades and keeps serving.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Test-friendly configuration that needs no environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            routes_file: PathBuf::from("routes.json"),
            pages_dir: PathBuf::from("pages"),
            bind_addr: "127.0.0.1:3000".to_string(),
            private_redirect: None,
            public_redirect: None,
            disable_error_boundary: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables, falling back to defaults for
    /// anything unset.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").unwrap_or_default().as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        Self {
            env,
            routes_file: env::var("ROUTES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("routes.json")),
            pages_dir: env::var("PAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("pages")),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            private_redirect: env::var("PRIVATE_REDIRECT").ok(),
            public_redirect: env::var("PUBLIC_REDIRECT").ok(),
            disable_error_boundary: env::var("DISABLE_ERROR_BOUNDARY")
                .map(|value| matches!(value.trim(), "1" | "true"))
                .unwrap_or(false),
        }
    }

    pub fn diagnostic_mode(&self) -> DiagnosticMode {
        match self.env {
            Env::Local => DiagnosticMode::Development,
            Env::Production => DiagnosticMode::Production,
        }
    }
}

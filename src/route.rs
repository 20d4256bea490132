//! Route definitions for the post page service

use axum::routing::get;
use axum::Router;

use crate::handler::{health, render_post_page, render_root};
use crate::state::AppState;

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /healthz` - Liveness probe
/// - `GET /` - Site root, always 404 (no post lives there)
/// - `GET /{*postpath}` - Post page for an arbitrary-depth slug
///
/// # Example Usage
///
/// ```no_run
/// # use postpage::config::Config;
/// # use postpage::state::AppState;
/// # use postpage::route::create_app;
/// let config = Config::from_env().unwrap();
/// let app = create_app(AppState::from_config(&config).unwrap());
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/", get(render_root))
        .route("/{*postpath}", get(render_post_page))
        .with_state(state)
}

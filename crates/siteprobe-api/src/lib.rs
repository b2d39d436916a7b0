//! siteprobe-api — REST API for siteprobe.
//!
//! Provides axum route handlers for managing probe targets at runtime and
//! the Prometheus scrape endpoint.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/site` | List targets (or `?name=` to fetch one) |
//! | POST | `/api/site` | Add a target |
//! | PUT | `/api/site` | Update a target's address |
//! | DELETE | `/api/site` | Remove a target (`?name=` or `{"name"}` body) |
//! | GET | `/api/site/{name}` | Get a target |
//! | PUT | `/api/site/{name}` | Update a target's address (`{"address"}` body) |
//! | DELETE | `/api/site/{name}` | Remove a target |
//! | GET | `/metrics` | Probe all targets, Prometheus exposition |

pub mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use siteprobe_metrics::Exporter;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub exporter: Arc<Exporter>,
}

/// Build the complete router (target management + metrics).
pub fn build_router(exporter: Arc<Exporter>) -> Router {
    let api_state = ApiState { exporter };

    let api_routes = Router::new()
        .route(
            "/site",
            get(handlers::list_sites)
                .post(handlers::add_site)
                .put(handlers::update_site)
                .delete(handlers::delete_site)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/site/{name}",
            get(handlers::get_site)
                .put(handlers::update_site_by_name)
                .delete(handlers::delete_site_by_name)
                .fallback(handlers::method_not_allowed),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/metrics", get(handlers::prometheus_metrics))
        .with_state(api_state)
}

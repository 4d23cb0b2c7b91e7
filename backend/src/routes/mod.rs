mod config;
mod docs;
mod health;
mod pages;

use aide::axum::{routing as api, ApiRouter};
use axum::routing::{get, post};

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .route("/", get(pages::index))
        .route("/upload", post(pages::upload))
        .route("/results/{*name}", get(pages::show_results))
        .api_route("/health", api::get(health::handler))
        .api_route("/config", api::get(config::handler))
}

use aide::{axum::ApiRouter, openapi::OpenApi, scalar::Scalar};
use axum::{http::StatusCode, routing::get, Extension, Json};

use crate::types::Environment;

/// Scalar UI at `/docs`, backed by the generated document at `/openapi.json`
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .route(
            "/docs",
            Scalar::new("/openapi.json")
                .with_title("Image Labeler Docs")
                .axum_route(),
        )
        .route("/openapi.json", get(openapi_schema))
}

/// The OpenAPI document is only published outside production
#[allow(clippy::unused_async)]
async fn openapi_schema(
    Extension(environment): Extension<Environment>,
    Extension(openapi): Extension<OpenApi>,
) -> Result<Json<OpenApi>, StatusCode> {
    if environment.show_api_docs() {
        Ok(Json(openapi))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

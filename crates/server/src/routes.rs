use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::items::store::ItemCollectionStore;

use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;

pub mod items;

/// Shared handler state: the injected item collection store. Handlers only
/// see the trait, so tests can substitute an in-memory implementation.
#[derive(Clone)]
pub struct ServerState {
    pub items: Arc<dyn ItemCollectionStore>,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn route_not_found() -> JsonApiError {
    JsonApiError::new(StatusCode::NOT_FOUND, "Route not found")
}

async fn method_not_allowed() -> JsonApiError {
    JsonApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Build the full application router: health, docs, and the item collection
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let docs = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    // Item collection routes. Unmatched methods answer with a JSON 405
    // instead of axum's bare default, and the `{id}` fallback still checks
    // the segment first: a malformed id wins over the method error.
    let api = Router::new()
        .route(
            "/items",
            get(items::list_items)
                .post(items::create_item)
                .fallback(method_not_allowed),
        )
        .route(
            "/items/:id",
            put(items::update_item)
                .delete(items::delete_item)
                .fallback(items::items_id_fallback),
        );

    Router::new()
        .merge(docs)
        .route("/health", get(health))
        .merge(api)
        .fallback(route_not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

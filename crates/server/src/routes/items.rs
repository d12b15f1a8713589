use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use service::file::item_store::{Item, ItemInput};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

#[derive(Serialize)]
pub struct ItemsListResponse {
    pub items: Vec<Item>,
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub message: &'static str,
    pub item: Item,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// The trailing path segment must parse as a plain integer id; this is
/// checked before anything else, method dispatch included.
fn parse_id(raw: &str) -> Result<i64, JsonApiError> {
    raw.parse::<i64>().map_err(|_| JsonApiError::invalid_id())
}

/// Accept the body only once it is complete, well-formed JSON; anything
/// else is rejected with a 400 instead of tearing down the connection.
fn parse_body(payload: Result<Json<ItemInput>, JsonRejection>) -> Result<ItemInput, JsonApiError> {
    match payload {
        Ok(Json(input)) => Ok(input),
        Err(_) => Err(JsonApiError::invalid_body()),
    }
}

#[utoipa::path(
    get, path = "/items", tag = "items",
    responses((status = 200, description = "The whole collection"))
)]
pub async fn list_items(
    State(state): State<ServerState>,
) -> Result<Json<ItemsListResponse>, JsonApiError> {
    let items = state.items.list().await?;
    Ok(Json(ItemsListResponse { items }))
}

#[utoipa::path(
    post, path = "/items", tag = "items",
    request_body = crate::openapi::ItemInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Name missing or body malformed")
    )
)]
pub async fn create_item(
    State(state): State<ServerState>,
    payload: Result<Json<ItemInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemResponse>), JsonApiError> {
    let input = parse_body(payload)?;
    let item = state.items.create(input).await?;
    info!(id = item.id, name = %item.name, "item created");
    Ok((
        StatusCode::CREATED,
        Json(ItemResponse { message: "Item created", item }),
    ))
}

#[utoipa::path(
    put, path = "/items/{id}", tag = "items",
    params(("id" = i64, Path, description = "Item id")),
    request_body = crate::openapi::ItemInputDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Invalid id or malformed body"),
        (status = 404, description = "No item with that id")
    )
)]
pub async fn update_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<ItemInput>, JsonRejection>,
) -> Result<Json<ItemResponse>, JsonApiError> {
    let id = parse_id(&id)?;
    let input = parse_body(payload)?;
    let item = state.items.update(id, input).await?;
    info!(id = item.id, name = %item.name, "item updated");
    Ok(Json(ItemResponse { message: "Item updated", item }))
}

#[utoipa::path(
    delete, path = "/items/{id}", tag = "items",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "No item with that id")
    )
)]
pub async fn delete_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, JsonApiError> {
    let id = parse_id(&id)?;
    state.items.delete(id).await?;
    info!(id, "item deleted");
    Ok(Json(MessageResponse { message: "Item deleted" }))
}

/// Unmatched method on `/items/{id}`: a malformed id segment still answers
/// 400 before the method error.
pub async fn items_id_fallback(Path(id): Path<String>) -> JsonApiError {
    match parse_id(&id) {
        Err(e) => e,
        Ok(_) => JsonApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
    }
}

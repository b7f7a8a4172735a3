use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::session::ActiveUser,
    items::{
        dto::{ItemCreate, ItemResponse, ItemUpdate, ItemWithOwner, MessageResponse},
        repo::Item,
    },
    listing::ListParams,
    state::AppState,
    users::{dto::UserResponse, repo::User},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/my-items", get(my_items))
}

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ItemResponse>>, (StatusCode, String)> {
    let (skip, limit) = params.clamped();
    let items = Item::list(&state.db, skip, limit, params.search.as_deref())
        .await
        .map_err(internal)?;

    if items.is_empty() {
        return Err((StatusCode::NOT_FOUND, "No items found".into()));
    }

    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemWithOwner>, (StatusCode, String)> {
    let item = Item::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Item not found".to_string()))?;

    let owner = User::find_by_id(&state.db, item.owner_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            error!(item_id = %id, owner_id = %item.owner_id, "item owner missing");
            (StatusCode::INTERNAL_SERVER_ERROR, "Owner not found".to_string())
        })?;

    Ok(Json(ItemWithOwner {
        item: ItemResponse::from(item),
        owner: UserResponse::from(owner),
    }))
}

#[instrument(skip(state, caller, payload))]
pub async fn create_item(
    State(state): State<AppState>,
    ActiveUser(caller): ActiveUser,
    Json(payload): Json<ItemCreate>,
) -> Result<(StatusCode, Json<ItemResponse>), (StatusCode, String)> {
    if let Err(msg) = payload.validate() {
        warn!(reason = msg, "invalid item payload");
        return Err((StatusCode::BAD_REQUEST, msg.into()));
    }

    if let Ok(Some(_)) = Item::find_by_owner_and_name(&state.db, caller.id, &payload.name).await {
        return Err((
            StatusCode::CONFLICT,
            "You already have an item with this name".into(),
        ));
    }

    let item = Item::create(&state.db, caller.id, &payload)
        .await
        .map_err(|e| {
            error!(error = %e, "create item failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    info!(item_id = %item.id, owner_id = %caller.id, "item created");
    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

#[instrument(skip(state, caller))]
pub async fn my_items(
    State(state): State<AppState>,
    ActiveUser(caller): ActiveUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ItemResponse>>, (StatusCode, String)> {
    let (skip, limit) = params.clamped();
    let items = Item::list_by_owner(&state.db, caller.id, skip, limit, params.search.as_deref())
        .await
        .map_err(internal)?;

    if items.is_empty() {
        return Err((StatusCode::NOT_FOUND, "You have no items yet".into()));
    }

    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

#[instrument(skip(state, caller, changes))]
pub async fn update_item(
    State(state): State<AppState>,
    ActiveUser(caller): ActiveUser,
    Path(id): Path<Uuid>,
    Json(changes): Json<ItemUpdate>,
) -> Result<Json<ItemResponse>, (StatusCode, String)> {
    if let Err(msg) = changes.validate() {
        warn!(reason = msg, "invalid item payload");
        return Err((StatusCode::BAD_REQUEST, msg.into()));
    }

    let item = Item::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Item not found".to_string()))?;

    if item.owner_id != caller.id {
        warn!(caller = %caller.id, item_id = %id, "item update by non-owner");
        return Err((
            StatusCode::FORBIDDEN,
            "You can only edit your own items".into(),
        ));
    }

    let item = Item::update(&state.db, id, &changes).await.map_err(|e| {
        error!(error = %e, item_id = %id, "update item failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(ItemResponse::from(item)))
}

#[instrument(skip(state, caller))]
pub async fn delete_item(
    State(state): State<AppState>,
    ActiveUser(caller): ActiveUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let item = Item::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Item not found".to_string()))?;

    if item.owner_id != caller.id {
        warn!(caller = %caller.id, item_id = %id, "item delete by non-owner");
        return Err((
            StatusCode::FORBIDDEN,
            "You can only delete your own items".into(),
        ));
    }

    Item::delete(&state.db, id).await.map_err(internal)?;

    info!(item_id = %id, owner_id = %caller.id, "item deleted");
    Ok(Json(MessageResponse::success(format!(
        "Item '{}' deleted",
        item.name
    ))))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

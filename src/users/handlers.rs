use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::handlers::is_valid_email,
    auth::session::ActiveUser,
    items::{dto::ItemResponse, repo::Item},
    listing::ListParams,
    state::AppState,
    users::{
        dto::{UserResponse, UserUpdate, UserWithItems},
        repo::User,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).put(update_user))
}

#[instrument(skip(state, _caller))]
pub async fn list_users(
    State(state): State<AppState>,
    ActiveUser(_caller): ActiveUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserResponse>>, (StatusCode, String)> {
    let (skip, limit) = params.clamped();
    let users = User::list(&state.db, skip, limit, params.search.as_deref())
        .await
        .map_err(internal)?;

    if users.is_empty() {
        return Err((StatusCode::NOT_FOUND, "No users found".into()));
    }

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state, _caller))]
pub async fn get_user(
    State(state): State<AppState>,
    ActiveUser(_caller): ActiveUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserWithItems>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;

    let items = Item::all_by_owner(&state.db, user.id)
        .await
        .map_err(internal)?;

    Ok(Json(UserWithItems {
        user: UserResponse::from(user),
        items: items.into_iter().map(ItemResponse::from).collect(),
    }))
}

/// Self-service account update; deactivation (`is_active: false`) happens
/// here as well.
#[instrument(skip(state, caller, changes))]
pub async fn update_user(
    State(state): State<AppState>,
    ActiveUser(caller): ActiveUser,
    Path(id): Path<Uuid>,
    Json(changes): Json<UserUpdate>,
) -> Result<Json<UserResponse>, (StatusCode, String)> {
    if caller.id != id {
        warn!(caller = %caller.id, target = %id, "account update on another user");
        return Err((
            StatusCode::FORBIDDEN,
            "You can only update your own account".into(),
        ));
    }

    if let Some(name) = &changes.name {
        if name.len() < 2 || name.len() > 100 {
            return Err((
                StatusCode::BAD_REQUEST,
                "Name must be 2-100 characters".into(),
            ));
        }
    }
    if let Some(age) = changes.age {
        if !(18..=120).contains(&age) {
            return Err((StatusCode::BAD_REQUEST, "Age must be 18-120".into()));
        }
    }
    if let Some(email) = &changes.email {
        if !is_valid_email(email) {
            return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
        }
        if *email != caller.email {
            if let Ok(Some(_)) = User::find_by_email(&state.db, email).await {
                warn!(email = %email, "email already registered");
                return Err((StatusCode::CONFLICT, "Email already registered".into()));
            }
        }
    }

    let user = User::update(&state.db, id, &changes).await.map_err(|e| {
        error!(error = %e, user_id = %id, "update user failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(UserResponse::from(user)))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

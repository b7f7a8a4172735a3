use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::session::ActiveUser,
    items::repo::Item,
    state::AppState,
    users::repo::User,
};

#[derive(Debug, Serialize)]
pub struct PublicStats {
    pub total_users: i64,
    pub total_items: i64,
}

#[derive(Debug, Serialize)]
pub struct MyStats {
    pub user: String,
    pub email: String,
    pub my_items_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub member_since: OffsetDateTime,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(public_stats))
        .route("/my-stats", get(my_stats))
}

#[instrument(skip(state))]
pub async fn public_stats(
    State(state): State<AppState>,
) -> Result<Json<PublicStats>, (StatusCode, String)> {
    let total_users = User::count(&state.db).await.map_err(internal)?;
    let total_items = Item::count(&state.db).await.map_err(internal)?;
    Ok(Json(PublicStats {
        total_users,
        total_items,
    }))
}

#[instrument(skip(state, caller))]
pub async fn my_stats(
    State(state): State<AppState>,
    ActiveUser(caller): ActiveUser,
) -> Result<Json<MyStats>, (StatusCode, String)> {
    let my_items_count = Item::count_by_owner(&state.db, caller.id)
        .await
        .map_err(internal)?;
    Ok(Json(MyStats {
        user: caller.name,
        email: caller.email,
        my_items_count,
        member_since: caller.created_at,
    }))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn my_stats_serializes_member_since_rfc3339() {
        let stats = MyStats {
            user: "Ada".into(),
            email: "ada@x.com".into(),
            my_items_count: 3,
            member_since: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("1970-01-01T00:00:00Z"));
        assert!(json.contains(r#""my_items_count":3"#));
    }
}

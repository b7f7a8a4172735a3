use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::items::dto::ItemResponse;
use crate::users::repo::User;

/// Public view of an account; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            age: u.age,
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserWithItems {
    #[serde(flatten)]
    pub user: UserResponse,
    pub items: Vec<ItemResponse>,
}

/// Partial account update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_serializes_rfc3339_timestamps() {
        let resp = UserResponse {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@x.com".into(),
            age: 30,
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("1970-01-01T00:00:00Z"));
        assert!(json.contains(r#""updated_at":null"#));
    }

    #[test]
    fn user_update_tolerates_missing_fields() {
        let upd: UserUpdate = serde_json::from_str(r#"{"is_active": false}"#).unwrap();
        assert!(upd.name.is_none());
        assert!(upd.email.is_none());
        assert!(upd.age.is_none());
        assert_eq!(upd.is_active, Some(false));
    }
}

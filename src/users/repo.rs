use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::dto::UserUpdate;

/// Account record. Lookups by email are exact-match; the email column is the
/// case-sensitive comparison key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: i32,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        age: i32,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, age, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, age, is_active, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(age)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Paged listing, optionally filtered by a substring of name or email.
    pub async fn list(
        db: &PgPool,
        skip: i64,
        limit: i64,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<User>> {
        let users = match search {
            Some(term) => {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, name, email, password_hash, age, is_active, created_at, updated_at
                    FROM users
                    WHERE name ILIKE $1 OR email ILIKE $1
                    ORDER BY created_at
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(format!("%{}%", term))
                .bind(limit)
                .bind(skip)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, name, email, password_hash, age, is_active, created_at, updated_at
                    FROM users
                    ORDER BY created_at
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(skip)
                .fetch_all(db)
                .await?
            }
        };
        Ok(users)
    }

    /// Partial update; absent fields keep their stored value. `updated_at`
    /// stays NULL until the first update.
    pub async fn update(db: &PgPool, id: Uuid, changes: &UserUpdate) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                age = COALESCE($4, age),
                is_active = COALESCE($5, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, age, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.age)
        .bind(changes.is_active)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn count(db: &PgPool) -> anyhow::Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            age: 30,
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("ada@x.com"));
    }
}

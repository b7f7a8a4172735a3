use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::items::dto::{ItemCreate, ItemUpdate};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub tax: Option<f64>,
    pub owner_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
}

impl Item {
    /// Paged listing over all items, optionally filtered by a substring of
    /// name or description.
    pub async fn list(
        db: &PgPool,
        skip: i64,
        limit: i64,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<Item>> {
        let items = match search {
            Some(term) => {
                sqlx::query_as::<_, Item>(
                    r#"
                    SELECT id, name, description, price, tax, owner_id, created_at, updated_at
                    FROM items
                    WHERE name ILIKE $1 OR description ILIKE $1
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
                sqlx::query_as::<_, Item>(
                    r#"
                    SELECT id, name, description, price, tax, owner_id, created_at, updated_at
                    FROM items
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
        Ok(items)
    }

    /// Same listing restricted to one owner.
    pub async fn list_by_owner(
        db: &PgPool,
        owner_id: Uuid,
        skip: i64,
        limit: i64,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<Item>> {
        let items = match search {
            Some(term) => {
                sqlx::query_as::<_, Item>(
                    r#"
                    SELECT id, name, description, price, tax, owner_id, created_at, updated_at
                    FROM items
                    WHERE owner_id = $1 AND (name ILIKE $2 OR description ILIKE $2)
                    ORDER BY created_at
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(owner_id)
                .bind(format!("%{}%", term))
                .bind(limit)
                .bind(skip)
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Item>(
                    r#"
                    SELECT id, name, description, price, tax, owner_id, created_at, updated_at
                    FROM items
                    WHERE owner_id = $1
                    ORDER BY created_at
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(owner_id)
                .bind(limit)
                .bind(skip)
                .fetch_all(db)
                .await?
            }
        };
        Ok(items)
    }

    pub async fn all_by_owner(db: &PgPool, owner_id: Uuid) -> anyhow::Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, price, tax, owner_id, created_at, updated_at
            FROM items
            WHERE owner_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(owner_id)
        .fetch_all(db)
        .await?;
        Ok(items)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, price, tax, owner_id, created_at, updated_at
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(item)
    }

    pub async fn find_by_owner_and_name(
        db: &PgPool,
        owner_id: Uuid,
        name: &str,
    ) -> anyhow::Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, price, tax, owner_id, created_at, updated_at
            FROM items
            WHERE owner_id = $1 AND name = $2
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(item)
    }

    pub async fn create(db: &PgPool, owner_id: Uuid, new: &ItemCreate) -> anyhow::Result<Item> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, description, price, tax, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, tax, owner_id, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(new.description.as_deref())
        .bind(new.price)
        .bind(new.tax)
        .bind(owner_id)
        .fetch_one(db)
        .await?;
        Ok(item)
    }

    /// Partial update; absent fields keep their stored value.
    pub async fn update(db: &PgPool, id: Uuid, changes: &ItemUpdate) -> anyhow::Result<Item> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                tax = COALESCE($5, tax),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, price, tax, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.tax)
        .fetch_one(db)
        .await?;
        Ok(item)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn count(db: &PgPool) -> anyhow::Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items")
            .fetch_one(db)
            .await?;
        Ok(total)
    }

    pub async fn count_by_owner(db: &PgPool, owner_id: Uuid) -> anyhow::Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(db)
            .await?;
        Ok(total)
    }
}

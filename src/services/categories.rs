use sqlx::{PgPool, Row};

use crate::models::category::{Category, CategoryItem};
use crate::models::pagination::{calculate_metadata, Filters, Metadata};
use crate::services::storage::FileStorage;
use crate::services::StoreError;

pub struct CategoryService;

impl CategoryService {
    pub async fn insert(
        pool: &PgPool,
        name: &str,
        description: &str,
    ) -> Result<Category, StoreError> {
        let row = sqlx::query(
            "INSERT INTO categories (name, description)
             VALUES ($1, $2)
             RETURNING id, created_at, version",
        )
        .bind(name)
        .bind(description)
        .fetch_one(pool)
        .await?;

        Ok(Category {
            id: row.try_get("id")?,
            name: name.to_string(),
            description: description.to_string(),
            created_at: row.try_get("created_at")?,
            version: row.try_get("version")?,
            items: None,
            items_count: 0,
        })
    }

    /// Single category with its item count and the items it contains.
    pub async fn get(
        pool: &PgPool,
        storage: &FileStorage,
        id: i64,
    ) -> Result<Category, StoreError> {
        if id < 1 {
            return Err(StoreError::RecordNotFound);
        }

        let row = sqlx::query(
            "SELECT categories.id, categories.name, categories.description,
                    categories.created_at, categories.version, COUNT(items.id) AS items_count
             FROM categories
             LEFT JOIN items ON categories.id = items.category_id
             WHERE categories.id = $1
             GROUP BY categories.id",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::RecordNotFound)?;

        let mut category = Category {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            version: row.try_get("version")?,
            items: None,
            items_count: row.try_get("items_count")?,
        };

        let item_rows = sqlx::query(
            "SELECT items.id, items.name, items.description, items.created_at,
                    items.version, COALESCE(item_attachments.key, '') AS key
             FROM items
             LEFT JOIN item_attachments ON items.id = item_attachments.item_id
             WHERE items.category_id = $1
             ORDER BY items.created_at DESC",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            let key: String = row.try_get("key")?;
            items.push(CategoryItem {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                created_at: row.try_get("created_at")?,
                version: row.try_get("version")?,
                image_url: storage.file_url(&key),
            });
        }
        category.items = Some(items);

        Ok(category)
    }

    /// Optimistic update: the row version must still match what the caller
    /// read, otherwise someone got there first.
    pub async fn update(pool: &PgPool, category: &mut Category) -> Result<(), StoreError> {
        let new_version: Option<i32> = sqlx::query_scalar(
            "UPDATE categories
             SET name = $1, description = $2, version = version + 1
             WHERE id = $3 AND version = $4
             RETURNING version",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.id)
        .bind(category.version)
        .fetch_optional(pool)
        .await?;

        match new_version {
            Some(version) => {
                category.version = version;
                Ok(())
            }
            None => Err(StoreError::EditConflict),
        }
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::RecordNotFound);
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RecordNotFound);
        }

        Ok(())
    }

    pub async fn list(
        pool: &PgPool,
        name: &str,
        filters: &Filters,
    ) -> Result<(Vec<Category>, Metadata), StoreError> {
        let query = format!(
            "SELECT count(*) OVER() AS total_records, categories.id, categories.name,
                    categories.description, categories.created_at, categories.version,
                    COUNT(items.id) AS items_count
             FROM categories
             LEFT JOIN items ON categories.id = items.category_id
             WHERE (to_tsvector('simple', categories.name) @@ plainto_tsquery('simple', $1) OR $1 = '')
             GROUP BY categories.id
             ORDER BY {} {}, id ASC
             LIMIT $2 OFFSET $3",
            filters.sort_column(),
            filters.sort_direction(),
        );

        let rows = sqlx::query(&query)
            .bind(name)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(pool)
            .await?;

        let mut total_records: i64 = 0;
        let mut categories = Vec::with_capacity(rows.len());
        for row in rows {
            total_records = row.try_get("total_records")?;
            categories.push(Category {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                created_at: row.try_get("created_at")?,
                version: row.try_get("version")?,
                items: None,
                items_count: row.try_get("items_count")?,
            });
        }

        let metadata = calculate_metadata(total_records, filters.page, filters.page_size);
        Ok((categories, metadata))
    }
}

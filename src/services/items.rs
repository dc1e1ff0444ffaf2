use sqlx::{PgPool, Row};

use crate::models::item::{Item, ItemAttachment};
use crate::models::pagination::{calculate_metadata, Filters, Metadata};
use crate::services::storage::FileStorage;
use crate::services::StoreError;

pub struct ItemService;

impl ItemService {
    pub async fn insert(
        pool: &PgPool,
        name: &str,
        description: &str,
        category_id: i64,
    ) -> Result<Item, StoreError> {
        let row = sqlx::query(
            "INSERT INTO items (name, description, category_id)
             VALUES ($1, $2, $3)
             RETURNING id, created_at, version",
        )
        .bind(name)
        .bind(description)
        .bind(category_id)
        .fetch_one(pool)
        .await?;

        Ok(Item {
            id: row.try_get("id")?,
            name: name.to_string(),
            description: description.to_string(),
            created_at: row.try_get("created_at")?,
            category_id,
            version: row.try_get("version")?,
            category_name: None,
            image_url: None,
            item_attachment: ItemAttachment::default(),
        })
    }

    pub async fn insert_attachment(
        pool: &PgPool,
        key: &str,
        filename: &str,
        content_type: &str,
        byte_size: i64,
        item_id: i64,
    ) -> Result<ItemAttachment, StoreError> {
        let row = sqlx::query(
            "INSERT INTO item_attachments (key, filename, content_type, byte_size, item_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(key)
        .bind(filename)
        .bind(content_type)
        .bind(byte_size)
        .bind(item_id)
        .fetch_one(pool)
        .await?;

        Ok(ItemAttachment {
            id: Some(row.try_get("id")?),
            key: key.to_string(),
            filename: filename.to_string(),
            content_type: Some(content_type.to_string()),
            byte_size: Some(byte_size),
            item_id: Some(item_id),
        })
    }

    pub async fn get(pool: &PgPool, storage: &FileStorage, id: i64) -> Result<Item, StoreError> {
        if id < 1 {
            return Err(StoreError::RecordNotFound);
        }

        let row = sqlx::query(
            "SELECT items.id, items.name, items.description, items.created_at, items.version,
                    items.category_id, categories.name AS category_name,
                    COALESCE(item_attachments.filename, '') AS filename,
                    COALESCE(item_attachments.key, '') AS key
             FROM items
             INNER JOIN categories ON categories.id = items.category_id
             LEFT JOIN item_attachments ON items.id = item_attachments.item_id
             WHERE items.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::RecordNotFound)?;

        Self::item_from_row(&row, storage)
    }

    pub async fn update(pool: &PgPool, item: &mut Item) -> Result<(), StoreError> {
        let new_version: Option<i32> = sqlx::query_scalar(
            "UPDATE items
             SET name = $1, description = $2, category_id = $3, version = version + 1
             WHERE id = $4 AND version = $5
             RETURNING version",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.category_id)
        .bind(item.id)
        .bind(item.version)
        .fetch_optional(pool)
        .await?;

        match new_version {
            Some(version) => {
                item.version = version;
                Ok(())
            }
            None => Err(StoreError::EditConflict),
        }
    }

    /// Delete an item and the stored attachment file it owns, if any.
    pub async fn delete(pool: &PgPool, storage: &FileStorage, id: i64) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::RecordNotFound);
        }

        let key: Option<String> = sqlx::query_scalar(
            "SELECT key FROM item_attachments WHERE item_id = $1 LIMIT 1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        if let Some(key) = key {
            storage.delete(&key).await?;
        }

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
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
        storage: &FileStorage,
        name: &str,
        category_id: i64,
        filters: &Filters,
    ) -> Result<(Vec<Item>, Metadata), StoreError> {
        let query = format!(
            "SELECT count(*) OVER() AS total_records, items.id, items.name, items.description,
                    items.created_at, items.category_id, items.version,
                    categories.name AS category_name,
                    COALESCE(item_attachments.filename, '') AS filename,
                    COALESCE(item_attachments.key, '') AS key
             FROM items
             INNER JOIN categories ON categories.id = items.category_id
             LEFT JOIN item_attachments ON items.id = item_attachments.item_id
             WHERE (to_tsvector('simple', items.name) @@ plainto_tsquery('simple', $1) OR $1 = '')
             AND (items.category_id = $2 OR $2 = 0)
             ORDER BY {} {}, id ASC
             LIMIT $3 OFFSET $4",
            filters.sort_column(),
            filters.sort_direction(),
        );

        let rows = sqlx::query(&query)
            .bind(name)
            .bind(category_id)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(pool)
            .await?;

        let mut total_records: i64 = 0;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            total_records = row.try_get("total_records")?;
            items.push(Self::item_from_row(&row, storage)?);
        }

        let metadata = calculate_metadata(total_records, filters.page, filters.page_size);
        Ok((items, metadata))
    }

    fn item_from_row(
        row: &sqlx::postgres::PgRow,
        storage: &FileStorage,
    ) -> Result<Item, StoreError> {
        let key: String = row.try_get("key")?;
        let filename: String = row.try_get("filename")?;

        Ok(Item {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            category_id: row.try_get("category_id")?,
            version: row.try_get("version")?,
            category_name: row.try_get("category_name")?,
            image_url: storage.file_url(&key),
            item_attachment: ItemAttachment {
                key,
                filename,
                ..ItemAttachment::default()
            },
        })
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::Validator;

#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub category_id: i64,
    pub version: i32,
    /// Joined from the categories table on reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    /// Public URL for the stored attachment, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "ItemAttachment::is_empty")]
    pub item_attachment: ItemAttachment,
}

/// File attached to an item. Reads only join in the key and filename;
/// the remaining fields are filled when the attachment row is created.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemAttachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
}

impl ItemAttachment {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.key.is_empty()
    }
}

// Request DTOs
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: String,
    pub category_id: i64,
}

/// Option fields support partial update
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
}

pub fn validate_item(v: &mut Validator, name: &str, description: &str) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(name.len() <= 100, "name", "must not be more than 100 bytes long");

    v.check(!description.is_empty(), "description", "must be provided");
    v.check(
        description.len() <= 500,
        "description",
        "must not be more than 500 bytes long",
    );
}

pub fn validate_item_category_id(v: &mut Validator, category_id: i64) {
    v.check(category_id != 0, "category_id", "must be provided");
}

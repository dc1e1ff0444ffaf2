use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::Validator;

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub version: i32,
    /// Only populated when fetching a single category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<CategoryItem>>,
    pub items_count: i64,
}

/// Item projection embedded in a single-category response.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub version: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// Request DTOs
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: String,
}

/// Option fields support partial update
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub fn validate_category(v: &mut Validator, name: &str, description: &str) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(name.len() <= 100, "name", "must not be more than 100 bytes long");

    v.check(!description.is_empty(), "description", "must be provided");
    v.check(
        description.len() <= 500,
        "description",
        "must not be more than 500 bytes long",
    );
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::auth::AuthenticatedAdmin;
use crate::models::category::{validate_category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::models::pagination::{validate_filters, Filters};
use crate::routes::{failed_validation_response, store_error_response};
use crate::services::categories::CategoryService;
use crate::validation::Validator;
use crate::AppState;

const SORT_SAFELIST: &[&str] = &["id", "name", "created_at", "-id", "-name", "-created_at"];

#[derive(Debug, Deserialize)]
pub struct ListCategoriesParams {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort: Option<String>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<ListCategoriesParams>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let filters = Filters {
        page: params.page.unwrap_or(1),
        page_size: params.page_size.unwrap_or(20),
        sort: params.sort.unwrap_or_else(|| "id".into()),
        sort_safelist: SORT_SAFELIST,
    };

    let mut v = Validator::new();
    validate_filters(&mut v, &filters);
    if !v.valid() {
        return Err(failed_validation_response(v));
    }

    let name = params.name.unwrap_or_default();
    let (categories, metadata) = CategoryService::list(&state.db, &name, &filters)
        .await
        .map_err(store_error_response)?;

    Ok(Json(json!({ "categories": categories, "metadata": metadata })))
}

pub async fn create_category(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let mut v = Validator::new();
    validate_category(&mut v, &body.name, &body.description);
    if !v.valid() {
        return Err(failed_validation_response(v));
    }

    let category = CategoryService::insert(&state.db, &body.name, &body.description)
        .await
        .map_err(store_error_response)?;

    Ok((StatusCode::CREATED, Json(json!({ "category": category }))))
}

pub async fn show_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let category = CategoryService::get(&state.db, &state.storage, id)
        .await
        .map_err(store_error_response)?;

    Ok(Json(json!({ "category": category })))
}

pub async fn update_category(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut category = CategoryService::get(&state.db, &state.storage, id)
        .await
        .map_err(store_error_response)?;

    if let Some(name) = body.name {
        category.name = name;
    }
    if let Some(description) = body.description {
        category.description = description;
    }

    let mut v = Validator::new();
    validate_category(&mut v, &category.name, &category.description);
    if !v.valid() {
        return Err(failed_validation_response(v));
    }

    CategoryService::update(&state.db, &mut category)
        .await
        .map_err(store_error_response)?;

    Ok(Json(json!({ "category": category })))
}

pub async fn delete_category(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    CategoryService::delete(&state.db, id)
        .await
        .map_err(store_error_response)?;

    Ok(Json(json!({ "message": "category successfully deleted" })))
}

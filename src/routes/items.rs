use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::auth::AuthenticatedAdmin;
use crate::models::item::{
    validate_item, validate_item_category_id, CreateItemRequest, UpdateItemRequest,
};
use crate::models::pagination::{validate_filters, Filters};
use crate::routes::{
    bad_request_response, failed_validation_response, server_error_response, store_error_response,
};
use crate::services::items::ItemService;
use crate::validation::Validator;
use crate::AppState;

const SORT_SAFELIST: &[&str] = &["id", "name", "created_at", "-id", "-name", "-created_at"];

#[derive(Debug, Deserialize)]
pub struct ListItemsParams {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort: Option<String>,
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ListItemsParams>,
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
    let category_id = params.category_id.unwrap_or(0);
    let (items, metadata) =
        ItemService::list(&state.db, &state.storage, &name, category_id, &filters)
            .await
            .map_err(store_error_response)?;

    Ok(Json(json!({ "items": items, "metadata": metadata })))
}

pub async fn create_item(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Value>), (StatusCode, Json<Value>)>
{
    let mut v = Validator::new();
    validate_item(&mut v, &body.name, &body.description);
    validate_item_category_id(&mut v, body.category_id);
    if !v.valid() {
        return Err(failed_validation_response(v));
    }

    let item = ItemService::insert(&state.db, &body.name, &body.description, body.category_id)
        .await
        .map_err(store_error_response)?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/v1/items/{}", item.id))],
        Json(json!({ "item": item })),
    ))
}

/// Create an item together with its image in one multipart request.
/// Fields: name, description, category_id and the item_file blob.
pub async fn multipart_create_item(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    mut multipart: Multipart,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<Value>), (StatusCode, Json<Value>)>
{
    let mut name = String::new();
    let mut description = String::new();
    let mut category_id: i64 = 0;
    let mut file: Option<(Vec<u8>, String, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request_response(&e.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "name" => {
                name = field
                    .text()
                    .await
                    .map_err(|e| bad_request_response(&e.to_string()))?;
            }
            "description" => {
                description = field
                    .text()
                    .await
                    .map_err(|e| bad_request_response(&e.to_string()))?;
            }
            "category_id" => {
                category_id = field
                    .text()
                    .await
                    .map_err(|e| bad_request_response(&e.to_string()))?
                    .parse()
                    .unwrap_or(0);
            }
            "item_file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string).unwrap_or_else(|| {
                    mime_guess::from_path(&filename)
                        .first_or_octet_stream()
                        .to_string()
                });
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request_response(&e.to_string()))?
                    .to_vec();
                file = Some((bytes, filename, content_type));
            }
            _ => {}
        }
    }

    let (bytes, filename, content_type) =
        file.ok_or_else(|| bad_request_response("no item_file field in upload"))?;

    if content_type != "image/jpeg" && content_type != "image/png" {
        return Err(bad_request_response(&format!(
            "File format {content_type} not allowed. Please upload a JPEG or PNG image"
        )));
    }

    let mut v = Validator::new();
    validate_item(&mut v, &name, &description);
    validate_item_category_id(&mut v, category_id);
    if !v.valid() {
        return Err(failed_validation_response(v));
    }

    let mut item = ItemService::insert(&state.db, &name, &description, category_id)
        .await
        .map_err(store_error_response)?;

    let key = state
        .storage
        .save(&bytes)
        .await
        .map_err(server_error_response)?;

    let attachment = ItemService::insert_attachment(
        &state.db,
        &key,
        &filename,
        &content_type,
        bytes.len() as i64,
        item.id,
    )
    .await
    .map_err(store_error_response)?;

    item.image_url = state.storage.file_url(&key);
    item.item_attachment = attachment;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/v1/items/{}", item.id))],
        Json(json!({ "item": item })),
    ))
}

pub async fn show_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let item = ItemService::get(&state.db, &state.storage, id)
        .await
        .map_err(store_error_response)?;

    Ok(Json(json!({ "item": item })))
}

pub async fn update_item(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut item = ItemService::get(&state.db, &state.storage, id)
        .await
        .map_err(store_error_response)?;

    if let Some(name) = body.name {
        item.name = name;
    }
    if let Some(description) = body.description {
        item.description = description;
    }
    if let Some(category_id) = body.category_id {
        item.category_id = category_id;
    }

    let mut v = Validator::new();
    validate_item(&mut v, &item.name, &item.description);
    if !v.valid() {
        return Err(failed_validation_response(v));
    }

    ItemService::update(&state.db, &mut item)
        .await
        .map_err(store_error_response)?;

    Ok(Json(json!({ "item": item })))
}

pub async fn delete_item(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ItemService::delete(&state.db, &state.storage, id)
        .await
        .map_err(store_error_response)?;

    Ok(Json(json!({ "message": "item successfully deleted" })))
}

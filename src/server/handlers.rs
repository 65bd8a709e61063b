use super::auth::{AdminUser, AuthUser};
use super::AppState;
use crate::db::DEFAULT_HISTORY_LIMIT;
use crate::models::{InspirationUpdate, NewInspiration};
use crate::Result;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// Request bodies default missing fields to empty so the pipeline reports
// which field is invalid.

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    pub api_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditRequest {
    pub image_url: String,
    pub edit_prompt: String,
    pub api_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: String,
    pub file_data: String,
    pub mime_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidateKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub image_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub success: bool,
    pub edited_image_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub file_key: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn generate(
    State(pipeline): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let image = pipeline
        .run_generate(&user.id, &req.prompt, &req.api_key)
        .await?;
    Ok(Json(GenerateResponse {
        success: true,
        image_url: image.image_url,
    }))
}

pub async fn edit(
    State(pipeline): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<EditRequest>,
) -> Result<Json<EditResponse>> {
    let edited = pipeline
        .run_edit(&user.id, &req.image_url, &req.edit_prompt, &req.api_key)
        .await?;
    Ok(Json(EditResponse {
        success: true,
        edited_image_url: edited.image_url,
    }))
}

pub async fn upload(
    State(pipeline): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>> {
    let stored = pipeline
        .upload_user_image(
            &user.id,
            &req.file_name,
            &req.file_data,
            req.mime_type.as_deref(),
        )
        .await?;
    Ok(Json(UploadResponse {
        success: true,
        url: stored.url,
        file_key: stored.key,
    }))
}

pub async fn generation_history(
    State(pipeline): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>> {
    let limit = query.limit.unwrap_or(i64::from(DEFAULT_HISTORY_LIMIT));
    let generations = pipeline.generation_history(&user.id, limit).await?;
    Ok(Json(json!({ "success": true, "generations": generations })))
}

pub async fn edit_history(
    State(pipeline): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>> {
    let limit = query.limit.unwrap_or(i64::from(DEFAULT_HISTORY_LIMIT));
    let edits = pipeline.edit_history(&user.id, limit).await?;
    Ok(Json(json!({ "success": true, "edits": edits })))
}

pub async fn validate_key(
    State(pipeline): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<ValidateKeyRequest>,
) -> Result<Json<Value>> {
    let valid = pipeline.validate_key(&user.id, &req.api_key).await?;
    Ok(Json(json!({ "valid": valid })))
}

pub async fn list_inspirations(
    State(pipeline): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Value>> {
    let inspirations = pipeline
        .list_inspirations(query.category.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "inspirations": inspirations })))
}

pub async fn list_categories(State(pipeline): State<AppState>) -> Json<Value> {
    Json(json!({ "success": true, "categories": pipeline.list_categories() }))
}

pub async fn get_inspiration(
    State(pipeline): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let inspiration = pipeline.get_inspiration(&id).await?;
    Ok(Json(json!({ "success": true, "inspiration": inspiration })))
}

pub async fn create_inspiration(
    State(pipeline): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(new): Json<NewInspiration>,
) -> Result<Json<Value>> {
    let id = pipeline.create_inspiration(&new).await?;
    tracing::info!("Admin {} created inspiration {}", admin.id, id);
    Ok(Json(json!({ "success": true, "id": id })))
}

pub async fn update_inspiration(
    State(pipeline): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
    Json(update): Json<InspirationUpdate>,
) -> Result<Json<Value>> {
    let inspiration = pipeline.update_inspiration(&id, &update).await?;
    Ok(Json(json!({ "success": true, "inspiration": inspiration })))
}

pub async fn delete_inspiration(
    State(pipeline): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    pipeline.delete_inspiration(&id).await?;
    tracing::info!("Admin {} deactivated inspiration {}", admin.id, id);
    Ok(Json(json!({ "success": true })))
}

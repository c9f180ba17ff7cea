use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::identity::RequestContext;
use crate::models::{NewStorageFile, StorageFile, StorageFileChanges};
use crate::permissions::{authorize, Operation};
use crate::state::AppState;
use crate::store::StoreError;

pub const DEFAULT_FILETYPE: &str = "pdf";

fn default_filetype() -> String {
    DEFAULT_FILETYPE.to_string()
}

#[derive(Debug, Deserialize, Validate)]
pub struct StorageFileInput {
    #[validate(length(min = 2, max = 100, message = "title must be 2 to 100 characters"))]
    pub title: String,
    #[serde(default = "default_filetype")]
    #[validate(length(min = 1, max = 32, message = "filetype must be 1 to 32 characters"))]
    pub filetype: String,
    #[validate(length(min = 1, message = "filename is required"))]
    pub filename: String,
}

impl StorageFileInput {
    fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            filetype: self.filetype.trim().to_lowercase(),
            filename: self.filename.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StorageFileResponse {
    pub id: Uuid,
    pub title: String,
    pub filetype: String,
    pub filename: String,
    pub modified_time: DateTime<Utc>,
    pub creation_time: DateTime<Utc>,
}

impl From<StorageFile> for StorageFileResponse {
    fn from(file: StorageFile) -> Self {
        Self {
            id: file.id,
            title: file.title,
            filetype: file.filetype,
            filename: file.filename,
            modified_time: file.modified_time.and_utc(),
            creation_time: file.creation_time.and_utc(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FiletypeQuery {
    pub filetype: String,
}

fn title_conflict(err: StoreError) -> AppError {
    match err {
        StoreError::Conflict => AppError::duplicate_title(),
        other => other.into(),
    }
}

pub async fn list_storage_files(
    State(state): State<AppState>,
    Query(query): Query<FiletypeQuery>,
) -> AppResult<Json<Vec<StorageFileResponse>>> {
    let filetype = query.filetype.trim().to_lowercase();
    let files = state.storage_files.list_by_filetype(&filetype).await?;
    Ok(Json(files.into_iter().map(StorageFileResponse::from).collect()))
}

pub async fn get_storage_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StorageFileResponse>> {
    let file = state
        .storage_files
        .get(id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(file.into()))
}

pub async fn create_storage_file(
    State(state): State<AppState>,
    context: RequestContext,
    AppJson(input): AppJson<StorageFileInput>,
) -> AppResult<Json<StorageFileResponse>> {
    authorize(Operation::CreateStorageFile, &context)?;
    let input = input.normalized();
    input.validate()?;

    if state
        .storage_files
        .find_by_title(&input.title, None)
        .await?
        .is_some()
    {
        return Err(AppError::duplicate_title());
    }

    let now = Utc::now().naive_utc();
    let file = state
        .storage_files
        .insert(NewStorageFile {
            id: Uuid::new_v4(),
            title: input.title,
            filetype: input.filetype,
            filename: input.filename,
            modified_time: now,
            creation_time: now,
        })
        .await
        .map_err(title_conflict)?;

    info!(file_id = %file.id, title = %file.title, "created storage file");
    Ok(Json(file.into()))
}

pub async fn update_storage_file(
    State(state): State<AppState>,
    context: RequestContext,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<StorageFileInput>,
) -> AppResult<Json<StorageFileResponse>> {
    authorize(Operation::UpdateStorageFile, &context)?;
    let input = input.normalized();
    input.validate()?;

    if state.storage_files.get(id).await?.is_none() {
        return Err(AppError::not_found());
    }
    if state
        .storage_files
        .find_by_title(&input.title, Some(id))
        .await?
        .is_some()
    {
        return Err(AppError::duplicate_title());
    }

    let file = state
        .storage_files
        .update(
            id,
            StorageFileChanges {
                title: input.title,
                filetype: input.filetype,
                filename: input.filename,
                modified_time: Utc::now().naive_utc(),
            },
        )
        .await
        .map_err(title_conflict)?
        .ok_or_else(AppError::not_found)?;

    info!(file_id = %file.id, title = %file.title, "updated storage file");
    Ok(Json(file.into()))
}

pub async fn delete_storage_file(
    State(state): State<AppState>,
    context: RequestContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<bool>> {
    authorize(Operation::DeleteStorageFile, &context)?;

    let file = state
        .storage_files
        .get(id)
        .await?
        .ok_or_else(AppError::not_found)?;

    if let Err(err) = state.files.delete_file(&file.filename).await {
        warn!(file_id = %id, filename = %file.filename, error = %err, "asset deletion failed");
        return Err(err.into());
    }

    if !state.storage_files.delete(id).await? {
        return Err(AppError::not_found());
    }

    info!(file_id = %id, filename = %file.filename, "deleted storage file");
    Ok(Json(true))
}

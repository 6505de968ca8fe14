//! HTTP handlers for uploads, the file listing, and download links.
//! Storage concerns are delegated to `StorageService`.

use crate::{
    errors::AppError, models::file_record::FileRecord, services::storage_service::StorageService,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use bytes::Bytes;
use serde::Serialize;

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const DEFAULT_FILE_NAME: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file: FileRecord,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub url: String,
}

struct FilePart {
    name: String,
    content_type: String,
    body: Bytes,
}

/// `POST /upload` — store the multipart field `file` and register it.
pub async fn upload_file(
    State(service): State<StorageService>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let part = read_file_part(multipart).await?;

    let record = service
        .upload(&part.name, &part.content_type, part.body)
        .await
        .map_err(|err| AppError::store("Error uploading file", err))?;

    Ok(Json(UploadResponse {
        message: format!("File '{}' uploaded successfully.", record.original_name),
        file: record,
    }))
}

/// `GET /files/db` — every registered file, in registry order.
pub async fn list_files(State(service): State<StorageService>) -> Json<Vec<FileRecord>> {
    Json(service.list_files().await)
}

/// `GET /file/{key}/url` — a presigned download link as JSON.
pub async fn file_url(
    State(service): State<StorageService>,
    Path(key): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let url = service
        .issue_link(&key)
        .await
        .map_err(|err| AppError::store("Error generating URL", err))?;
    Ok(Json(LinkResponse { url }))
}

/// `GET /file/{key}` — redirect straight to a presigned download link.
pub async fn file_redirect(
    State(service): State<StorageService>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let url = service
        .issue_link(&key)
        .await
        .map_err(|err| AppError::store("Error generating URL", err))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]))
}

/// Pull exactly one non-empty `file` field out of the form; other fields are ignored.
async fn read_file_part(mut multipart: Multipart) -> Result<FilePart, AppError> {
    let mut found: Option<FilePart> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if found.is_some() {
            return Err(AppError::bad_request("Only one file may be uploaded per request."));
        }

        let name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let body = field.bytes().await?;

        found = Some(FilePart {
            name,
            content_type,
            body,
        });
    }

    match found {
        Some(part) if !part.body.is_empty() => Ok(part),
        Some(_) => Err(AppError::bad_request("Uploaded file is empty.")),
        None => Err(AppError::bad_request("No file uploaded.")),
    }
}

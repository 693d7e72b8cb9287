//! Upload API endpoint
//!
//! POST /upload - multipart upload of images and credential PDFs.
//!
//! The request carries a `file` field and an optional `folder` field that
//! picks the subdirectory under the upload root. Folder names are
//! sanitized to `[a-z0-9_-]` so a crafted name can never escape the
//! upload directory. Stored filenames are fresh UUIDs.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

use crate::api::middleware::{ApiError, AppState, AuthenticatedAccount};

const DEFAULT_FOLDER: &str = "misc";

/// Response for successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub content_type: String,
}

/// POST /upload - Upload a single file
///
/// Requires authentication. Accepts multipart/form-data with a `file`
/// field and an optional `folder` field.
pub async fn upload_file(
    State(state): State<AppState>,
    _account: AuthenticatedAccount,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let config = &state.upload_config;

    let mut folder = DEFAULT_FOLDER.to_string();
    let mut file: Option<(String, String, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "folder" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation_error(format!("Invalid folder: {}", e)))?;
                folder = sanitize_folder(&raw);
            }
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|e| {
                    ApiError::validation_error(format!("Failed to read file: {}", e))
                })?;
                file = Some((filename, content_type, data));
            }
            _ => {}
        }
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| ApiError::validation_error("No file provided"))?;

    if !config.is_type_allowed(&content_type) {
        return Err(ApiError::validation_error(format!(
            "Invalid file type: {}. Allowed types: {:?}",
            content_type, config.allowed_types
        )));
    }

    if data.len() as u64 > config.max_file_size {
        return Err(ApiError::validation_error(format!(
            "File too large. Maximum size: {} bytes ({} MB)",
            config.max_file_size,
            config.max_file_size / 1024 / 1024
        )));
    }

    let target_dir = config.path.join(&folder);
    ensure_upload_dir(&target_dir).await?;

    let ext = get_extension(&filename, &content_type);
    let new_filename = format!("{}.{}", Uuid::new_v4(), ext);
    let file_path = target_dir.join(&new_filename);

    fs::write(&file_path, &data)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to save file: {}", e)))?;

    tracing::info!(folder = %folder, filename = %new_filename, size = data.len(), "File uploaded");

    Ok(Json(UploadResponse {
        url: format!("/uploads/{}/{}", folder, new_filename),
        filename: new_filename,
        size: data.len() as u64,
        content_type,
    }))
}

/// Ensure upload directory exists
async fn ensure_upload_dir(path: &Path) -> Result<(), ApiError> {
    if !path.exists() {
        fs::create_dir_all(path)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to create upload dir: {}", e)))?;
    }
    Ok(())
}

/// Reduce a client-supplied folder name to `[a-z0-9_-]`
///
/// Everything else is dropped, so path separators and dot segments can
/// never survive. An empty result falls back to the default folder.
fn sanitize_folder(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        cleaned
    }
}

/// Get file extension from filename or content type
fn get_extension(filename: &str, content_type: &str) -> String {
    if let Some(ext) = filename.rsplit('.').next() {
        if ext != filename && !ext.is_empty() && ext.len() < 10 {
            return ext.to_lowercase();
        }
    }

    match content_type {
        "image/jpeg" => "jpg".to_string(),
        "image/png" => "png".to_string(),
        "image/gif" => "gif".to_string(),
        "image/webp" => "webp".to_string(),
        "application/pdf" => "pdf".to_string(),
        _ => "bin".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_folder_keeps_allowed_chars() {
        assert_eq!(sanitize_folder("credentials"), "credentials");
        assert_eq!(sanitize_folder("dental_docs-2"), "dental_docs-2");
    }

    #[test]
    fn test_sanitize_folder_lowercases() {
        assert_eq!(sanitize_folder("Credentials"), "credentials");
    }

    #[test]
    fn test_sanitize_folder_strips_path_traversal() {
        assert_eq!(sanitize_folder("../../etc"), "etc");
        assert_eq!(sanitize_folder("a/b\\c"), "abc");
    }

    #[test]
    fn test_sanitize_folder_empty_falls_back() {
        assert_eq!(sanitize_folder(""), DEFAULT_FOLDER);
        assert_eq!(sanitize_folder("../.."), DEFAULT_FOLDER);
    }

    #[test]
    fn test_get_extension_from_filename() {
        assert_eq!(get_extension("scan.PDF", "application/pdf"), "pdf");
        assert_eq!(get_extension("photo.jpeg", "image/jpeg"), "jpeg");
    }

    #[test]
    fn test_get_extension_falls_back_to_content_type() {
        assert_eq!(get_extension("noext", "image/png"), "png");
        assert_eq!(get_extension("noext", "application/pdf"), "pdf");
        assert_eq!(get_extension("noext", "text/unknown"), "bin");
    }
}

//! CSV file upload.
//!
//! POST /api/upload?type=realtime|forecast  (admin, multipart field `file`)

use axum::extract::{Multipart, Query, State};
use domain::models::{IngestKind, IngestSummary};
use serde::Deserialize;
use std::str::FromStr;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::response::ApiResponse;
use crate::services::IngestionService;

pub const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub async fn upload_csv(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<ApiResponse<IngestSummary>, ApiError> {
    let kind = query
        .kind
        .as_deref()
        .ok_or_else(|| ApiError::Validation("type is required".to_string()))
        .and_then(|k| IngestKind::from_str(k).map_err(ApiError::Validation))?;

    let mut contents = None;
    let mut file_name = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Could not read uploaded file: {}", e)))?;
        contents = Some(bytes);
        break;
    }

    let contents = contents.ok_or_else(|| ApiError::Validation("No file uploaded".to_string()))?;
    if contents.is_empty() {
        return Err(ApiError::Validation("Uploaded file is empty".to_string()));
    }

    let summary = IngestionService::new(state.pool.clone(), state.config.limits.clone())
        .ingest_csv(kind, &contents)
        .await?;

    tracing::info!(
        admin_id = admin.id,
        kind = %kind,
        file = ?file_name,
        bytes = contents.len(),
        inserted = summary.inserted,
        errors = summary.errors.len(),
        "CSV upload processed"
    );
    Ok(ApiResponse::ok(summary))
}

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;

use crate::api::{error::ApiError, state::AppState};
use crate::domain::DocumentSource;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub chunks: usize,
}

const NO_INPUT: &str = "No file or URL provided";

/// `POST /upload`: multipart with a `file` field or a `url` field. A file
/// wins when both are sent.
pub async fn upload_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::bad_request(NO_INPUT))?;

    let mut file = None;
    let mut url = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid file field: {e}")))?;
                if filename.as_deref().is_some_and(|f| !f.is_empty()) || !bytes.is_empty() {
                    file = Some(DocumentSource::file(filename, bytes));
                }
            }
            Some("url") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid url field: {e}")))?;
                let value = value.trim();
                if !value.is_empty() {
                    url = Some(DocumentSource::url(value));
                }
            }
            _ => {}
        }
    }

    let source = file.or(url).ok_or_else(|| ApiError::bad_request(NO_INPUT))?;

    let report = state
        .ingestion
        .ingest(source)
        .await
        .map_err(|e| ApiError::from_domain(e, "Error: "))?;

    Ok(Json(UploadResponse {
        message: "Document successfully uploaded and embedded!".to_string(),
        chunks: report.chunks_upserted,
    }))
}

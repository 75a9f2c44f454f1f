use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{DomainError, QueryInput};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

const NO_INPUT: &str = "No text or audio provided";

/// `POST /query`: multipart with an `audio` field, or JSON `{"text": ...}`.
pub async fn query_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<AnswerResponse>, ApiError> {
    let input = read_input(&state, request).await?;

    let answer = state.query.handle(input).await.map_err(|e| match e {
        DomainError::Transcription(_) => {
            tracing::error!(error = %e, "query rejected");
            ApiError::internal("Failed to transcribe audio")
        }
        other => ApiError::from_domain(other, "RAG query failed: "),
    })?;

    if answer.is_degraded() {
        tracing::warn!(outcome = answer.outcome.as_str(), "returning degraded answer");
    }

    Ok(Json(AnswerResponse {
        answer: answer.text,
    }))
}

async fn read_input(state: &AppState, request: Request) -> Result<QueryInput, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
        {
            if field.name() == Some("audio") {
                let audio = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid audio field: {e}")))?;
                return Ok(QueryInput::Audio(audio.to_vec()));
            }
        }
        return Err(ApiError::bad_request(NO_INPUT));
    }

    if is_json(&content_type) {
        let Json(body) = Json::<QueryRequest>::from_request(request, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        return Ok(QueryInput::Text(body.text.unwrap_or_default()));
    }

    Err(ApiError::bad_request(NO_INPUT))
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

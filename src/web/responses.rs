use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::modules::itinerary::export::ExportedFile;

/// Canonical JSON payload for error responses.
#[derive(Debug, Serialize, Clone)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Helper for handlers that need to return `(StatusCode, Json<ApiMessage>)`.
pub fn json_error(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiMessage>) {
    (status, Json(ApiMessage::new(message)))
}

/// Serve an in-memory export with an attachment disposition.
pub fn attachment(file: ExportedFile) -> Result<Response, (StatusCode, Json<ApiMessage>)> {
    let ExportedFile {
        file_name,
        content_type,
        bytes,
    } = file;

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&content_type).map_err(|err| {
        error!(?err, %content_type, "invalid export content type");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "Invalid download headers.")
    })?;
    headers.insert(header::CONTENT_TYPE, content_type);

    let disposition = format!("attachment; filename=\"{file_name}\"");
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|_| json_error(StatusCode::INTERNAL_SERVER_ERROR, "Invalid download headers."))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((headers, bytes).into_response())
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use data_model::{Blob, TextStatistics};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::analyzer::AnalysisOutcome;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(skip)]
    status_code: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status_code: StatusCode, message: &str) -> Self {
        Self {
            status_code,
            message: message.to_string(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_error(e: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string().as_str())
    }

    pub fn internal_error_str(e: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("API Error: {} - {}", self.status_code, self.message);
        (self.status_code, self.message).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    pub display_name: String,
}

impl From<Blob> for UploadResponse {
    fn from(blob: Blob) -> Self {
        Self {
            id: blob.id.to_string(),
            display_name: blob.display_name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub id: String,
    pub content_hash: String,
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub storage_path: String,
    pub uploaded_at: u64,
}

impl From<Blob> for BlobMetadata {
    fn from(blob: Blob) -> Self {
        Self {
            id: blob.id.to_string(),
            content_hash: blob.content_hash,
            display_name: blob.display_name,
            mime_type: blob.mime_type,
            size_bytes: blob.size_bytes,
            storage_path: blob.storage_path,
            uploaded_at: blob.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextStatisticsResponse {
    pub paragraph_count: u32,
    pub word_count: u32,
    pub character_count: u32,
}

impl From<TextStatistics> for TextStatisticsResponse {
    fn from(statistics: TextStatistics) -> Self {
        Self {
            paragraph_count: statistics.paragraph_count,
            word_count: statistics.word_count,
            character_count: statistics.character_count,
        }
    }
}

/// Analysis result as returned to clients. `word_cloud_ref` is the blob id
/// of the rendered image, or an empty string when no cloud was produced.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub text_statistics: TextStatisticsResponse,
    pub word_cloud_ref: String,
}

impl From<AnalysisOutcome> for AnalysisResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        Self {
            text_statistics: outcome.statistics.into(),
            word_cloud_ref: outcome
                .word_cloud_ref
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}

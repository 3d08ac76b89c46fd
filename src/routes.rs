use std::sync::Arc;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath, Multipart, Path, Request, State},
    http::{Method, Response, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use blob_store::BlobStore;
use data_model::BlobId;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    analyzer::Analyzer,
    http_objects::{AnalysisResponse, ApiError, BlobMetadata, UploadResponse},
};

#[derive(Clone)]
pub struct RouteState {
    pub blob_store: Arc<BlobStore>,
    pub analyzer: Arc<Analyzer>,
}

pub fn create_routes(route_state: RouteState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/store", post(upload_file).with_state(route_state.clone()))
        .route(
            "/store/{id}",
            get(download_file).with_state(route_state.clone()),
        )
        .route(
            "/store/{id}/metadata",
            get(file_metadata).with_state(route_state.clone()),
        )
        .route(
            "/analyze/{document_id}",
            get(analyze_document).with_state(route_state.clone()),
        )
        .route(
            "/analyze/wordcloud/{reference}",
            get(download_word_cloud).with_state(route_state.clone()),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    let method = req.method();
                    let uri = req.uri();

                    let matched_path = req
                        .extensions()
                        .get::<MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::debug_span!("request", %method, %uri, matched_path)
                })
                .on_failure(()),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(usize::MAX))
}

async fn index() -> &'static str {
    "Papyrine Server"
}

fn parse_blob_id(raw: &str) -> Result<BlobId, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::bad_request(&format!("malformed id: {}", raw)))?;
    Ok(BlobId::from(raw))
}

/// Upload a document. The same bytes uploaded twice come back with the same
/// id, whatever the file names.
#[axum::debug_handler]
async fn upload_file(
    State(state): State<RouteState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(&e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let display_name = field.file_name().unwrap_or("file").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(&e.to_string()))?;
        if data.is_empty() {
            return Err(ApiError::bad_request("file is empty"));
        }

        let blob = state
            .blob_store
            .put(data, &display_name, &mime_type)
            .await
            .map_err(|e| {
                ApiError::internal_error_str(&format!(
                    "could not store file {}: {}",
                    display_name, e
                ))
            })?;
        info!("uploaded file {} as blob {}", display_name, blob.id);
        return Ok((StatusCode::CREATED, Json(UploadResponse::from(blob))));
    }
    Err(ApiError::bad_request("multipart field \"file\" is required"))
}

#[axum::debug_handler]
async fn download_file(
    Path(id): Path<String>,
    State(state): State<RouteState>,
) -> Result<Response<Body>, ApiError> {
    let id = parse_blob_id(&id)?;
    let blob = state
        .blob_store
        .metadata(&id)
        .ok_or_else(|| ApiError::not_found("file not found"))?;
    let stream = state
        .blob_store
        .get(&id)
        .await
        .map_err(|e| ApiError::internal_error(e.into()))?
        .ok_or_else(|| ApiError::not_found("file not found"))?;

    Response::builder()
        .header(hyper::header::CONTENT_TYPE, blob.mime_type.as_str())
        .header(hyper::header::CONTENT_LENGTH, blob.size_bytes.to_string())
        .header(
            hyper::header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", blob.display_name),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::internal_error_str(&e.to_string()))
}

#[axum::debug_handler]
async fn file_metadata(
    Path(id): Path<String>,
    State(state): State<RouteState>,
) -> Result<Json<BlobMetadata>, ApiError> {
    let id = parse_blob_id(&id)?;
    state
        .blob_store
        .metadata(&id)
        .map(|blob| Json(blob.into()))
        .ok_or_else(|| ApiError::not_found("file not found"))
}

/// Analyze a stored document. Partial failures degrade to partial results;
/// only a structurally invalid id is rejected.
#[axum::debug_handler]
async fn analyze_document(
    Path(document_id): Path<String>,
    State(state): State<RouteState>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    parse_blob_id(&document_id)?;
    let outcome = state.analyzer.analyze(&document_id).await;
    Ok(Json(outcome.into()))
}

#[axum::debug_handler]
async fn download_word_cloud(
    Path(reference): Path<String>,
    State(state): State<RouteState>,
) -> Result<Response<Body>, ApiError> {
    let id = parse_blob_id(&reference)?;
    let blob = state
        .blob_store
        .metadata(&id)
        .ok_or_else(|| ApiError::not_found("word cloud not found"))?;
    let stream = state
        .blob_store
        .get(&id)
        .await
        .map_err(|e| ApiError::internal_error(e.into()))?
        .ok_or_else(|| ApiError::not_found("word cloud not found"))?;

    Response::builder()
        .header(hyper::header::CONTENT_TYPE, blob.mime_type.as_str())
        .header(hyper::header::CONTENT_LENGTH, blob.size_bytes.to_string())
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::internal_error_str(&e.to_string()))
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! HTTP surface for the triage UI

pub mod page;

use axum::{
    extract::{Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post, MethodRouter},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Instrument};

use crate::buckets::BucketGroups;
use crate::catalog::{file_extension, ImageId};
use crate::config::AppConfig;
use crate::engine::{SortStats, Sorter};
use crate::SortError;
use page::Templates;

/// Shared application state
pub struct AppState {
    pub sorter: Sorter,
    pub config: AppConfig,
    pub templates: Templates,
}

impl AppState {
    pub fn new(sorter: Sorter, config: AppConfig) -> crate::Result<Self> {
        Ok(Self {
            sorter,
            config,
            templates: Templates::new()?,
        })
    }
}

/// Handler-level error: engine failures plus malformed requests
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Sort(#[from] SortError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

type ApiResult<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Sort(err) => match err {
                SortError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                SortError::AlreadyAssigned { .. } => (StatusCode::BAD_REQUEST, "ALREADY_ASSIGNED"),
                SortError::PathMismatch { .. } => (StatusCode::BAD_REQUEST, "PATH_MISMATCH"),
                SortError::UnknownBucket(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_BUCKET"),
                SortError::DirectoryCreateFailed { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "DIRECTORY_CREATE_FAILED")
                }
                SortError::MoveFailed { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "MOVE_FAILED"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = self.to_string();
        if status.is_server_error() {
            error!(code = code, "{}", message);
        } else {
            warn!(code = code, "{}", message);
        }

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.web.static_dir.clone();

    Router::new()
        .route("/", tagged(get(index_page), "index"))
        .route("/img/get", tagged(get(image_get), "image_get"))
        .route("/img/next", tagged(get(image_next), "image_next"))
        .route("/bucket/set", tagged(post(bucket_set), "bucket_set"))
        .route("/bucket/undo", tagged(post(bucket_undo), "bucket_undo"))
        .route("/info/get", tagged(get(info_get), "info_get"))
        .route("/info/stats", tagged(get(info_stats), "info_stats"))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Attach an explicit name to a route for logging
fn tagged(route: MethodRouter<Arc<AppState>>, tag: &'static str) -> MethodRouter<Arc<AppState>> {
    route.layer(middleware::from_fn_with_state(tag, log_route))
}

async fn log_route(State(tag): State<&'static str>, request: Request, next: Next) -> Response {
    let span = info_span!("route", handler = tag);
    info!(parent: &span, "Route handler called: {}", tag);
    next.run(request).instrument(span).await
}

fn parse_id(raw: &str) -> ApiResult<ImageId> {
    if raw.is_empty() {
        return Err(ApiError::BadRequest("UUID is empty".to_string()));
    }
    // a malformed id cannot be in the catalog
    raw.parse()
        .map_err(|_| ApiError::Sort(SortError::NotFound(raw.to_string())))
}

/// Content type served for each catalogued extension
pub fn content_type(path: &Path) -> Option<&'static str> {
    match file_extension(path)? {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "apng" => Some("image/apng"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Run an engine call off the async workers. Reads go through here too,
/// since they take the same blocking catalog lock as assign and undo.
async fn run_engine<F, T>(state: &Arc<AppState>, op: F) -> ApiResult<T>
where
    F: FnOnce(&Sorter) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(|| op(&state.sorter)))
        .await
        .map_err(|e| ApiError::Internal(format!("engine task failed: {}", e)))?
        .map_err(ApiError::from)
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let stats = run_engine(&state, |sorter| sorter.stats()).await?;
    let html = state
        .templates
        .render_index(&state.sorter.list_buckets(), &stats)?;
    Ok(Html(html))
}

// === API Handlers ===

#[derive(Deserialize)]
struct IdQuery {
    #[serde(default)]
    uuid: String,
}

/// Raw bytes of an image at its current location
async fn image_get(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Response> {
    let id = parse_id(&query.uuid)?;
    let record = run_engine(&state, move |sorter| sorter.get(&id)).await?;
    info!("Serving image: {}", record);

    let content_type = content_type(&record.current_path).ok_or_else(|| {
        ApiError::Internal(format!("unsupported image type: {:?}", record.current_path))
    })?;

    let data = tokio::fs::read(&record.current_path).await.map_err(|e| {
        warn!("File not found (path: {:?}): {}", record.current_path, e);
        ApiError::Sort(SortError::NotFound(record.current_path.display().to_string()))
    })?;

    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct NextImage {
    /// Empty when every image has a bucket
    pub uuid: String,
}

async fn image_next(State(state): State<Arc<AppState>>) -> ApiResult<Json<NextImage>> {
    let next = run_engine(&state, |sorter| sorter.first_unassigned()).await?;
    let uuid = next.map(|r| r.id.to_string()).unwrap_or_default();
    info!("Next image: {:?}", uuid);
    Ok(Json(NextImage { uuid }))
}

#[derive(Deserialize)]
struct BucketSetForm {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    bucket: String,
}

async fn bucket_set(
    State(state): State<Arc<AppState>>,
    Form(form): Form<BucketSetForm>,
) -> ApiResult<&'static str> {
    if form.uuid.is_empty() {
        return Err(ApiError::BadRequest("UUID is empty".to_string()));
    }
    if form.bucket.is_empty() {
        return Err(ApiError::BadRequest("Bucket is empty".to_string()));
    }
    if !state.sorter.registry().is_valid_bucket(&form.bucket) {
        return Err(SortError::UnknownBucket(form.bucket).into());
    }
    let id = parse_id(&form.uuid)?;

    let bucket = form.bucket;
    run_engine(&state, move |sorter| sorter.assign(&id, &bucket)).await?;
    Ok("ok")
}

#[derive(Deserialize)]
struct BucketUndoForm {
    #[serde(default)]
    uuid: String,
}

async fn bucket_undo(
    State(state): State<Arc<AppState>>,
    Form(form): Form<BucketUndoForm>,
) -> ApiResult<&'static str> {
    let id = parse_id(&form.uuid)?;
    run_engine(&state, move |sorter| sorter.undo(&id)).await?;
    Ok("ok")
}

async fn info_get(State(state): State<Arc<AppState>>) -> Json<BucketGroups> {
    Json(state.sorter.list_buckets())
}

async fn info_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<SortStats>> {
    Ok(Json(run_engine(&state, |sorter| sorter.stats()).await?))
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

/// Start the web server and serve until a shutdown signal arrives
pub async fn start_server(state: AppState) -> crate::Result<()> {
    let addr = format!("{}:{}", state.config.web.host, state.config.web.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Web UI available at http://{}", addr);

    let router = create_router(Arc::new(state));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SortError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

//! HTTP ingest server for sidebar-index.
//!
//! Accepts sidebar scripts and rustdoc JSON for ingestion and serves the
//! stored sidebars back as scripts for the site renderer.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Json, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use sidebar_core::control::{
    ControlError,
    RustdocIngestReport,
    RustdocIngestRequest,
    SidebarControlPlane,
    SidebarIngestReport,
    SidebarIngestRequest,
};
use sidebar_core::render::SidebarScriptStyle;
use sidebar_core::store::StoreError;
use sidebar_store::models::{SidebarEntryRecord, SidebarIndex, SidebarModule};
use surrealdb::Connection;
use tracing::info;

const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Configuration for the ingest HTTP server.
#[derive(Debug, Clone)]
pub struct IngestServerConfig {
    pub addr: SocketAddr,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl IngestServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            max_body_bytes: 25 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// HTTP ingest server wrapper.
pub struct IngestServer<C: Connection> {
    config: IngestServerConfig,
    state: AppState<C>,
}

impl<C: Connection> IngestServer<C> {
    #[must_use]
    pub const fn new(control: SidebarControlPlane<C>, config: IngestServerConfig) -> Self {
        let state = AppState {
            control,
            request_timeout: config.request_timeout,
        };
        Self { config, state }
    }
}

impl<C> IngestServer<C>
where
    C: Connection + Send + Sync + 'static,
{
    /// Runs the HTTP server until shutdown.
    ///
    /// # Errors
    /// Returns any listener or server error.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.config.addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let app = build_router(self.state, self.config.max_body_bytes);

        info!("sidebar-ingest listening on {addr}");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

struct AppState<C: Connection> {
    control: SidebarControlPlane<C>,
    request_timeout: Duration,
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            control: self.control.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn timeout() -> Self {
        Self {
            status: StatusCode::REQUEST_TIMEOUT,
            message: "ingest request timed out".to_string(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::Store(StoreError::InvalidInput(message)) => Self::bad_request(message),
            ControlError::Parse(parse_err) => Self::bad_request(parse_err.to_string()),
            ControlError::RustdocParse(parse_err) => Self::bad_request(parse_err.to_string()),
            ControlError::Validation(validation_err) => {
                Self::bad_request(validation_err.to_string())
            }
            ControlError::Render(render_err) => Self::internal(render_err.to_string()),
            ControlError::Store(StoreError::Surreal(err)) => Self::internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse { error: self.message });
        (self.status, payload).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct RenderParams {
    style: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    name: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<usize>,
}

fn build_router<C>(state: AppState<C>, max_body_bytes: usize) -> Router
where
    C: Connection + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/ingest/sidebar", post(ingest_sidebar::<C>))
        .route("/ingest/rustdoc", post(ingest_rustdoc::<C>))
        .route("/sidebar/:project_id/:module_path", get(render_sidebar::<C>))
        .route(
            "/sidebar/:project_id/:module_path/entries",
            get(sidebar_entries::<C>),
        )
        .route("/search/:project_id", get(search_entries::<C>))
        .route("/modules/:project_id", get(list_modules::<C>))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn ingest_sidebar<C>(
    State(state): State<AppState<C>>,
    Json(request): Json<SidebarIngestRequest>,
) -> Result<Json<SidebarIngestReport>, ApiError>
where
    C: Connection + Send + Sync + 'static,
{
    let ingest = tokio::time::timeout(
        state.request_timeout,
        state.control.ingest_sidebar_js(request),
    )
    .await
    .map_err(|_| ApiError::timeout())??;

    Ok(Json(ingest))
}

async fn ingest_rustdoc<C>(
    State(state): State<AppState<C>>,
    Json(request): Json<RustdocIngestRequest>,
) -> Result<Json<RustdocIngestReport>, ApiError>
where
    C: Connection + Send + Sync + 'static,
{
    if request.json_path.is_some() {
        return Err(ApiError::bad_request(
            "json_path is not accepted over HTTP; send the rustdoc JSON inline as `json`",
        ));
    }
    let ingest = tokio::time::timeout(
        state.request_timeout,
        state.control.ingest_rustdoc_json(request),
    )
    .await
    .map_err(|_| ApiError::timeout())??;

    Ok(Json(ingest))
}

async fn render_sidebar<C>(
    State(state): State<AppState<C>>,
    Path((project_id, module_path)): Path<(String, String)>,
    Query(params): Query<RenderParams>,
) -> Result<Response, ApiError>
where
    C: Connection + Send + Sync + 'static,
{
    let style = match params.style.as_deref() {
        Some(value) => value
            .parse::<SidebarScriptStyle>()
            .map_err(|err| ApiError::bad_request(err.to_string()))?,
        None => SidebarScriptStyle::default(),
    };
    let script = state
        .control
        .render_sidebar(&project_id, &module_path, style)
        .await?
        .ok_or_else(|| unknown_module(&project_id, &module_path))?;

    let content_type = match style {
        SidebarScriptStyle::Json => "application/json",
        SidebarScriptStyle::Legacy | SidebarScriptStyle::Window => "application/javascript",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], script).into_response())
}

async fn sidebar_entries<C>(
    State(state): State<AppState<C>>,
    Path((project_id, module_path)): Path<(String, String)>,
) -> Result<Json<SidebarIndex>, ApiError>
where
    C: Connection + Send + Sync + 'static,
{
    let index = state
        .control
        .get_sidebar(&project_id, &module_path)
        .await?
        .ok_or_else(|| unknown_module(&project_id, &module_path))?;
    Ok(Json(index))
}

async fn search_entries<C>(
    State(state): State<AppState<C>>,
    Path(project_id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SidebarEntryRecord>>, ApiError>
where
    C: Connection + Send + Sync + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let hits = state
        .control
        .search_entries(&project_id, &params.name, limit)
        .await?;
    Ok(Json(hits))
}

async fn list_modules<C>(
    State(state): State<AppState<C>>,
    Path(project_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SidebarModule>>, ApiError>
where
    C: Connection + Send + Sync + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let modules = state.control.list_modules(&project_id, limit).await?;
    Ok(Json(modules))
}

fn unknown_module(project_id: &str, module_path: &str) -> ApiError {
    ApiError::not_found(format!("unknown module: {project_id}/{module_path}"))
}

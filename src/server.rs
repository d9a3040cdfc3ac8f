//! HTTP API layer.
//!
//! Exposes the catalog engine as a JSON API for browser UIs and other
//! consumers. The server is a thin mapping from routes to engine calls; all
//! search, stats, and indexing logic lives in the engine modules.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/stats` | Aggregate catalog statistics |
//! | `GET`  | `/api/workflows` | Free-text + filtered search with pagination |
//! | `GET`  | `/api/workflows/{filename}` | Record metadata plus raw workflow JSON |
//! | `GET`  | `/api/workflows/{filename}/download` | Raw workflow file as attachment |
//! | `GET`  | `/api/workflows/category/{category}` | Category search |
//! | `GET`  | `/api/categories` | Static service-category names |
//! | `GET`  | `/api/integrations` | Distinct integration names across the corpus |
//! | `POST` | `/api/reindex` | Start a background indexing pass |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "workflow not found: x.json" } }
//! ```
//!
//! Engine failures map to 500, missing resources to 404, and invalid
//! pagination parameters to 400.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog;
use crate::config::Config;
use crate::db;
use crate::get::{corpus_file_path, get_workflow_detail};
use crate::indexer;
use crate::migrate;
use crate::models::WorkflowRecord;
use crate::search;
use crate::stats;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    pool: sqlx::SqlitePool,
}

/// Starts the HTTP server.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated. The schema is migrated on startup so a fresh
/// database file works out of the box.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;

    let state = AppState {
        config: Arc::new(config.clone()),
        pool,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/api/stats", get(handle_stats))
        .route("/api/workflows", get(handle_search))
        .route("/api/workflows/category/{category}", get(handle_category))
        .route("/api/workflows/{filename}", get(handle_detail))
        .route("/api/workflows/{filename}/download", get(handle_download))
        .route("/api/categories", get(handle_categories))
        .route("/api/integrations", get(handle_integrations))
        .route("/api/reindex", post(handle_reindex))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    println!("Flowdex API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal_error(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /api/stats ============

async fn handle_stats(
    State(state): State<AppState>,
) -> Result<Json<crate::models::CorpusStats>, AppError> {
    let stats = stats::collect_stats(&state.pool)
        .await
        .map_err(internal_error)?;
    Ok(Json(stats))
}

// ============ GET /api/workflows ============

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    #[serde(default = "default_all")]
    trigger: String,
    #[serde(default = "default_all")]
    complexity: String,
    #[serde(default)]
    active_only: bool,
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_per_page")]
    per_page: i64,
}

fn default_all() -> String {
    "all".to_string()
}
fn default_page() -> i64 {
    1
}
fn default_per_page() -> i64 {
    20
}

#[derive(Serialize)]
struct FilterEcho {
    trigger: String,
    complexity: String,
    active_only: bool,
}

#[derive(Serialize)]
struct SearchResponse {
    workflows: Vec<WorkflowRecord>,
    total: i64,
    page: i64,
    per_page: i64,
    pages: i64,
    query: String,
    filters: FilterEcho,
}

fn page_count(total: i64, per_page: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + per_page - 1) / per_page
    }
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    if params.page < 1 {
        return Err(bad_request("page must be >= 1"));
    }
    if !(1..=100).contains(&params.per_page) {
        return Err(bad_request("per_page must be between 1 and 100"));
    }

    let offset = (params.page - 1) * params.per_page;
    let (workflows, total) = search::search_workflows(
        &state.pool,
        params.q.as_deref(),
        &params.trigger,
        &params.complexity,
        params.active_only,
        params.per_page,
        offset,
    )
    .await
    .map_err(internal_error)?;

    Ok(Json(SearchResponse {
        workflows,
        total,
        page: params.page,
        per_page: params.per_page,
        pages: page_count(total, params.per_page),
        query: params.q.unwrap_or_default(),
        filters: FilterEcho {
            trigger: params.trigger,
            complexity: params.complexity,
            active_only: params.active_only,
        },
    }))
}

// ============ GET /api/workflows/category/{category} ============

#[derive(Deserialize)]
struct PageParams {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_per_page")]
    per_page: i64,
}

async fn handle_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<SearchResponse>, AppError> {
    if params.page < 1 {
        return Err(bad_request("page must be >= 1"));
    }
    if !(1..=100).contains(&params.per_page) {
        return Err(bad_request("per_page must be between 1 and 100"));
    }

    let offset = (params.page - 1) * params.per_page;
    let (workflows, total) =
        search::search_by_category(&state.pool, &category, params.per_page, offset)
            .await
            .map_err(internal_error)?;

    Ok(Json(SearchResponse {
        workflows,
        total,
        page: params.page,
        per_page: params.per_page,
        pages: page_count(total, params.per_page),
        query: category,
        filters: FilterEcho {
            trigger: default_all(),
            complexity: default_all(),
            active_only: false,
        },
    }))
}

// ============ GET /api/workflows/{filename} ============

#[derive(Serialize)]
struct DetailResponse {
    metadata: WorkflowRecord,
    raw_json: serde_json::Value,
}

async fn handle_detail(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DetailResponse>, AppError> {
    let detail = get_workflow_detail(&state.pool, &state.config.corpus.root, &filename)
        .await
        .map_err(internal_error)?;
    let Some((metadata, raw_json)) = detail else {
        return Err(not_found(format!("workflow not found: {}", filename)));
    };

    Ok(Json(DetailResponse { metadata, raw_json }))
}

// ============ GET /api/workflows/{filename}/download ============

async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let record = crate::get::get_workflow_record(&state.pool, &filename)
        .await
        .map_err(internal_error)?;
    if record.is_none() {
        return Err(not_found(format!("workflow not found: {}", filename)));
    }

    let Some(path) = corpus_file_path(&state.config.corpus.root, &filename) else {
        return Err(not_found(format!("workflow not found: {}", filename)));
    };
    let bytes = std::fs::read(&path)
        .map_err(|_| not_found(format!("workflow not found: {}", filename)))?;

    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    Ok((headers, bytes).into_response())
}

// ============ GET /api/categories ============

#[derive(Serialize)]
struct CategoriesResponse {
    categories: Vec<String>,
}

async fn handle_categories() -> Json<CategoriesResponse> {
    let categories = catalog::SERVICE_CATEGORIES
        .iter()
        .map(|(name, _)| (*name).to_string())
        .collect();
    Json(CategoriesResponse { categories })
}

// ============ GET /api/integrations ============

#[derive(Serialize)]
struct IntegrationsResponse {
    integrations: Vec<String>,
    count: usize,
}

async fn handle_integrations(
    State(state): State<AppState>,
) -> Result<Json<IntegrationsResponse>, AppError> {
    let integrations = stats::distinct_integrations(&state.pool)
        .await
        .map_err(internal_error)?;
    let count = integrations.len();
    Ok(Json(IntegrationsResponse {
        integrations,
        count,
    }))
}

// ============ POST /api/reindex ============

#[derive(Deserialize)]
struct ReindexParams {
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
struct ReindexResponse {
    message: String,
    force: bool,
}

/// Starts an indexing pass as a background task and acknowledges
/// immediately. At most one pass at a time is assumed; guarding concurrent
/// passes is the caller's responsibility.
async fn handle_reindex(
    State(state): State<AppState>,
    Query(params): Query<ReindexParams>,
) -> Json<ReindexResponse> {
    let pool = state.pool.clone();
    let corpus = state.config.corpus.clone();
    let force = params.force;

    tokio::spawn(async move {
        match indexer::index_corpus(&pool, &corpus, force).await {
            Ok(report) => tracing::info!(
                processed = report.processed,
                skipped = report.skipped,
                errors = report.errors,
                "reindex finished"
            ),
            Err(e) => tracing::error!(error = %e, "reindex failed"),
        }
    });

    Json(ReindexResponse {
        message: "reindex started".to_string(),
        force,
    })
}

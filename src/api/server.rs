//! HTTP API server

use super::{error::ApiError, state::AppState};
use crate::admin::{AdminReport, ViewCriteria};
use crate::error::FeedbackError;
use crate::types::FeedbackRecord;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use uuid::Uuid;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 8080).into(),
        }
    }
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create new API server
    pub fn new(config: ApiServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build router
    pub fn router(state: AppState) -> Router {
        Router::new()
            // Public
            .route("/feedback", post(submit_handler))
            // Admin
            .route("/admin/login", post(login_handler))
            .route("/admin/logout", post(logout_handler))
            .route("/admin/feedback", get(report_handler))
            .route("/admin/export", get(export_handler))
            // Health check
            .route("/health", get(health_handler))
            // State
            .with_state(state)
            // Middleware
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until Ctrl-C
    pub async fn serve(self) -> anyhow::Result<()> {
        let router = Self::router(self.state);
        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!("Feedback API listening on http://{}", self.config.addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Received shutdown signal, stopping API server gracefully...");
            })
            .await?;

        info!("API server shut down complete");
        Ok(())
    }
}

/// Bearer token from the Authorization header, if well-formed
fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .and_then(|t| Uuid::parse_str(t.trim()).ok())
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    rating: i64,
    review: String,
}

async fn submit_handler(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<FeedbackRecord>), ApiError> {
    let record = state.pipeline.submit(req.rating, &req.review).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: Uuid,
}

async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = state.sessions.login(&state.credential, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.logout(token).await;
    }
    StatusCode::NO_CONTENT
}

/// `?ratings=1,2&start=2024-01-01&end=2024-01-31`, every key optional
#[derive(Debug, Default, Deserialize)]
struct ViewParams {
    ratings: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl TryFrom<ViewParams> for ViewCriteria {
    type Error = FeedbackError;

    fn try_from(params: ViewParams) -> Result<Self, Self::Error> {
        ViewCriteria::from_params(params.ratings.as_deref(), params.start, params.end)
    }
}

async fn report_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ViewParams>,
) -> Result<Json<AdminReport>, ApiError> {
    let session = match bearer_token(&headers) {
        Some(token) => state.sessions.session(token).await,
        None => Default::default(),
    };
    let criteria = ViewCriteria::try_from(params)?;
    debug!(?criteria, "Admin report requested");

    let report = state.view.report(&session, &criteria).await?;
    Ok(Json(report))
}

async fn export_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ViewParams>,
) -> Result<impl IntoResponse, ApiError> {
    let session = match bearer_token(&headers) {
        Some(token) => state.sessions.session(token).await,
        None => Default::default(),
    };
    let criteria = ViewCriteria::try_from(params)?;

    let blob = state.view.export(&session, &criteria).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"feedback_export.csv\"",
            ),
        ],
        blob,
    ))
}

/// Health check handler
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

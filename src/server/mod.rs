//! HTTP front
//!
//! - `POST /generate`: build (or reuse) and return outputs as JSON
//! - `GET /p/:fingerprint`: render a workspace's inputs and outputs
//! - `GET /static/*`: plain file serving, when configured

pub mod page;

pub use page::PlaygroundPage;

use crate::build::BuildResponse;
use crate::cache::Fingerprint;
use crate::config::Config;
use crate::error::{PlayError, PlayResult};
use crate::playground::{BuildRequest, Playground};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    playground: Arc<Playground>,
    page: Arc<PlaygroundPage>,
}

impl AppState {
    pub fn new(playground: Playground, page: PlaygroundPage) -> Self {
        Self {
            playground: Arc::new(playground),
            page: Arc::new(page),
        }
    }
}

/// Error returned from handlers
#[derive(Debug)]
pub struct ApiError(PlayError);

impl From<PlayError> for ApiError {
    fn from(err: PlayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_client_error() {
            warn!(error = %self.0, "Rejected request");
            let body = Json(serde_json::json!({
                "errored": true,
                "error": self.0.to_string(),
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        error!(error = %self.0, "Internal server error");
        let body = Json(serde_json::json!({
            "errored": true,
            "error": "500: Internal Server Error",
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Build the router
pub fn router(state: AppState, static_dir: Option<&std::path::Path>) -> Router {
    let mut app = Router::new()
        .route("/generate", post(generate))
        .route("/p/:fingerprint", get(play));

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Start the HTTP server and run until Ctrl-C
pub async fn serve(config: &Config, bind: &str) -> PlayResult<()> {
    let page = PlaygroundPage::load(config.server.template.as_deref()).await?;
    let playground = Playground::from_config(config);
    info!(
        "Workspaces under {}",
        playground.store().root().display()
    );

    let app = router(
        AppState::new(playground, page),
        config.server.static_dir.as_deref(),
    );

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| PlayError::io(format!("binding {}", bind), e))?;
    info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PlayError::io("serving HTTP", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Handler for build submissions
///
/// The body is decoded as JSON whatever its `Content-Type`.
async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BuildResponse>, ApiError> {
    let request: BuildRequest =
        serde_json::from_slice(&body).map_err(|e| PlayError::InvalidRequest(e.to_string()))?;
    let response = state.playground.submit(&request).await?;
    Ok(Json(response))
}

/// Handler for the playground page of one workspace
async fn play(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Html<String>, ApiError> {
    let fingerprint = Fingerprint::parse(&raw)?;
    let view = state.playground.view(&fingerprint).await?;
    Ok(Html(state.page.render(&view)?))
}

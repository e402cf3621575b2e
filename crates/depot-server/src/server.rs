use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderValue, StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use depot_config::{BadgeMode, Config};
use depot_core::Listing;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::require_token;
use crate::error::ApiError;
use crate::index::render_index;
use crate::state::AppState;
use crate::upload::upload;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Build the router for `state`
pub fn app(state: AppState) -> Router {
    let settings = state.settings.clone();

    let uploads = Router::new()
        .route("/api/upload", post(upload))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes));

    Router::new()
        .route("/", get(get_index))
        .route("/index.htm", get(get_index))
        .route("/index.html", get(get_index))
        .route("/api/health-check", get(health_check))
        .route("/api/listing", get(get_listing))
        .route("/latest/:platform", get(latest_artifact))
        .route("/status/:platform", get(build_status))
        .route(
            &format!("{}/:revision/:file", settings.base_path),
            get(download_artifact),
        )
        .merge(uploads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until interrupted
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    info!(data_dir = %config.data_dir.display(), "Running server at {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

fn redirect(location: &str) -> Result<Response, ApiError> {
    let location = HeaderValue::try_from(location)
        .map_err(|_| ApiError::Internal(format!("Invalid redirect location: {}", location)))?;
    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}

/// GET / - Build index
async fn get_index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let start = Instant::now();
    let listing = state.listing().await?;
    let generation_time = start.elapsed();

    Ok(Html(render_index(
        &listing,
        &state.settings.link_base,
        OffsetDateTime::now_utc(),
        generation_time,
    )))
}

/// GET /api/health-check
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /api/listing - Ordered listing as JSON
async fn get_listing(State(state): State<AppState>) -> Result<Json<Listing>, ApiError> {
    Ok(Json(state.listing().await?))
}

/// GET /latest/:platform - Redirect to the newest artifact for a platform
async fn latest_artifact(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Result<Response, ApiError> {
    let listing = state.listing().await?;
    let artifact = listing
        .latest_artifact(&platform)
        .ok_or_else(|| ApiError::NotFound(format!("No artifact for platform '{}'", platform)))?;

    redirect(&artifact.location(&state.settings.link_base))
}

/// GET /status/:platform - Badge for the newest revision
async fn build_status(State(state): State<AppState>, Path(platform): Path<String>) -> Response {
    let mut response = status_badge(&state, &platform).await.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

async fn status_badge(state: &AppState, platform: &str) -> Result<Response, ApiError> {
    let listing = state.listing().await?;
    let status = listing
        .build_status(platform)
        .ok_or_else(|| ApiError::NotFound("No revisions stored".to_string()))?;

    tracing::debug!(platform = %platform, status = status.as_str(), "build status");

    match state.badges.mode() {
        BadgeMode::Redirect => redirect(&state.badges.url(status)),
        BadgeMode::Inline => {
            let image: Bytes = state.badges.image(status).await?;
            Ok((
                [(header::CONTENT_TYPE, HeaderValue::from_static("image/svg+xml"))],
                image,
            )
                .into_response())
        }
    }
}

/// GET {base_path}/:revision/:file - Artifact download
async fn download_artifact(
    State(state): State<AppState>,
    Path((revision, file)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let content = state.store.read_artifact(&revision, &file).await?;

    let disposition = format!("attachment; filename=\"{}\"", file.replace('"', "_"));
    let disposition = HeaderValue::try_from(disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}

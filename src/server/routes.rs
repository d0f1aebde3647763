//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::error::Error;
use crate::format::{available_formats, get_formatter, FormatInfo};
use crate::route::{MapLinks, RouteSummary, DIRECTIONS_NOTE};
use crate::server::state::AppState;
use crate::store::Command;
use crate::sync::{SessionState, SyncStatus};
use crate::trip::{Day, Trip};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_path = static_dir(state.config.server.static_dir.as_ref());

    Router::new()
        .route("/api/trip", get(trip_handler).put(import_handler))
        .route("/api/export", get(export_handler))
        .route("/api/reset", post(reset_handler))
        .route("/api/commands", post(command_handler))
        .route("/api/days/:id", get(day_handler))
        .route("/api/route", get(route_handler))
        .route("/api/stations", get(stations_handler))
        .route("/api/map", get(map_handler))
        .route("/api/map/:id", get(map_day_handler))
        .route("/api/formats", get(formats_handler))
        .route("/api/sync/status", get(sync_status_handler))
        .route("/api/sync/push", post(sync_push_handler))
        .route("/api/sync/pull", post(sync_pull_handler))
        .fallback_service(ServeDir::new(static_path).append_index_html_on_directories(true))
        .with_state(state)
}

/// Static files: configured directory, else `static/` in the cwd, else next to the binary
fn static_dir(configured: Option<&PathBuf>) -> PathBuf {
    if let Some(dir) = configured {
        return dir.clone();
    }
    let local = PathBuf::from("static");
    if local.exists() {
        return local;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
        .filter(|path| path.exists())
        .unwrap_or(local)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "SYNC_ERROR" => StatusCode::BAD_GATEWAY,
            "STORAGE_ERROR" | "INTERNAL_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Import(_) => "IMPORT_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Sync(_) | Error::Http(_) => "SYNC_ERROR",
            Error::Storage(_) | Error::Io(_) => "STORAGE_ERROR",
            Error::Json(_) => "INVALID_JSON",
            Error::Server(_) => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Trip plus the view state the front end needs
#[derive(Debug, Serialize, Deserialize)]
pub struct TripResponse {
    pub trip: Trip,
    pub selected_id: Option<String>,
    pub hero_image: Option<String>,
    pub legs_label: String,
    pub total_km: f64,
}

async fn trip_view(state: &AppState) -> TripResponse {
    let planner = state.planner.read().await;
    let store = planner.store();
    let route = store.route();
    TripResponse {
        trip: store.trip().clone(),
        selected_id: store.selected_id().map(str::to_string),
        hero_image: store.trip().effective_hero_image().map(str::to_string),
        legs_label: route.legs_label(),
        total_km: route.total_km,
    }
}

/// Current trip
///
/// GET /api/trip
async fn trip_handler(State(state): State<Arc<AppState>>) -> Json<TripResponse> {
    Json(trip_view(&state).await)
}

/// Replace the trip with the request body
///
/// PUT /api/trip
async fn import_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<TripResponse>, ApiError> {
    state
        .planner
        .write()
        .await
        .dispatch(Command::Import { json: body })?;
    Ok(Json(trip_view(&state).await))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// Download the trip (JSON export by default, or any other output format)
///
/// GET /api/export?format=json|text|gpx|url
async fn export_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let name = query.format.unwrap_or_else(|| "json".to_string());
    let formatter = get_formatter(&name).ok_or_else(|| ApiError {
        error: format!("Unknown format: {}", name),
        code: "INVALID_FORMAT".to_string(),
    })?;

    let planner = state.planner.read().await;
    let body = formatter.format(planner.store())?;

    let (content_type, extension) = match formatter.name() {
        "json" => ("application/json", "json"),
        "gpx" => ("application/gpx+xml", "gpx"),
        _ => ("text/plain; charset=utf-8", "txt"),
    };
    let disposition = format!("attachment; filename=\"roadtrip.{}\"", extension);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Restore the bundled trip
///
/// POST /api/reset
async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<TripResponse>, ApiError> {
    state.planner.write().await.dispatch(Command::Reset)?;
    Ok(Json(trip_view(&state).await))
}

/// Outcome of a command
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub changed: bool,
    pub selected_id: Option<String>,
    pub day_count: usize,
}

/// Apply an editing command
///
/// POST /api/commands
async fn command_handler(
    State(state): State<Arc<AppState>>,
    Json(command): Json<Command>,
) -> Result<Json<CommandResponse>, ApiError> {
    let mut planner = state.planner.write().await;
    let changed = planner.dispatch(command)?;
    Ok(Json(CommandResponse {
        changed,
        selected_id: planner.store().selected_id().map(str::to_string),
        day_count: planner.trip().days.len(),
    }))
}

/// A day with its neighbors for step-through navigation
#[derive(Debug, Serialize, Deserialize)]
pub struct DayResponse {
    pub day: Day,
    pub position: usize,
    pub previous_id: Option<String>,
    pub next_id: Option<String>,
}

/// Single day
///
/// GET /api/days/:id
async fn day_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DayResponse>, ApiError> {
    let planner = state.planner.read().await;
    let trip = planner.trip();
    let position = trip
        .index_of(&id)
        .ok_or_else(|| Error::NotFound(format!("day {}", id)))?;

    Ok(Json(DayResponse {
        day: trip.days[position].clone(),
        position: position + 1,
        previous_id: trip.previous_day_id(&id).map(str::to_string),
        next_id: trip.next_day_id(&id).map(str::to_string),
    }))
}

/// Route legs and total distance
///
/// Route with its display labels
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    #[serde(flatten)]
    pub route: RouteSummary,
    pub total_label: String,
    pub directions_note: &'static str,
}

/// GET /api/route
async fn route_handler(State(state): State<Arc<AppState>>) -> Json<RouteResponse> {
    let route = state.planner.read().await.store().route();
    Json(RouteResponse {
        total_label: route.total_label(),
        directions_note: DIRECTIONS_NOTE,
        route,
    })
}

/// Station as shown in the planner
#[derive(Debug, Serialize, Deserialize)]
pub struct StationResponse {
    pub name: String,
    pub nights: usize,
    pub nights_label: String,
    pub image: String,
    pub coordinates: crate::coord::Coordinates,
    pub first_day_id: Option<String>,
    pub day_ids: Vec<String>,
}

/// Derived stations
///
/// GET /api/stations
async fn stations_handler(State(state): State<Arc<AppState>>) -> Json<Vec<StationResponse>> {
    let stations = state.planner.read().await.store().stations();
    Json(
        stations
            .into_iter()
            .map(|s| StationResponse {
                nights_label: s.nights_label(),
                first_day_id: s.first_day_id().map(str::to_string),
                name: s.name,
                nights: s.nights,
                image: s.image,
                coordinates: s.coordinates,
                day_ids: s.day_ids,
            })
            .collect(),
    )
}

/// Map links for the focused day
///
/// GET /api/map
async fn map_handler(State(state): State<Arc<AppState>>) -> Result<Json<MapLinks>, ApiError> {
    Ok(Json(state.planner.read().await.map_links(None)?))
}

/// Map links for a specific day
///
/// GET /api/map/:id
async fn map_day_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MapLinks>, ApiError> {
    Ok(Json(state.planner.read().await.map_links(Some(&id))?))
}

/// Formats list response
#[derive(Debug, Serialize, Deserialize)]
pub struct FormatsResponse {
    pub formats: Vec<FormatInfo>,
}

/// List available output formats
///
/// GET /api/formats
async fn formats_handler() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        formats: available_formats(),
    })
}

/// Sync overview
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncStatusResponse {
    pub configured: bool,
    pub slug: String,
    pub auto: bool,
    pub session: SessionState,
    pub last: Option<SyncStatus>,
}

/// GET /api/sync/status
async fn sync_status_handler(State(state): State<Arc<AppState>>) -> Json<SyncStatusResponse> {
    let planner = state.planner.read().await;
    let settings = planner.settings();
    Json(SyncStatusResponse {
        configured: settings.has_endpoint(),
        slug: settings.slug.clone(),
        auto: settings.auto,
        session: planner.session_state(),
        last: planner.status(),
    })
}

/// Push the trip now; remote problems are reported in the status
///
/// The planner lock is only held to snapshot the trip, never across the
/// network call, so edits keep flowing while the push is in flight.
///
/// POST /api/sync/push
async fn sync_push_handler(State(state): State<Arc<AppState>>) -> Json<SyncStatus> {
    let request = state.planner.read().await.prepare_push();
    Json(request.send().await)
}

/// Replace the local trip with the remote copy
///
/// The write lock is taken only to swap in the fetched document.
///
/// POST /api/sync/pull
async fn sync_pull_handler(State(state): State<Arc<AppState>>) -> Result<Json<SyncStatus>, ApiError> {
    let request = state.planner.read().await.prepare_pull();
    let status = match request {
        Ok(request) => {
            let response = request.fetch().await;
            state.planner.write().await.finish_pull(response)?
        }
        Err(status) => status,
    };
    Ok(Json(status))
}

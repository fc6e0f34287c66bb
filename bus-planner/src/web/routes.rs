//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDateTime};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{Category, Direction, LineCode, Plan, StopKey, normalize};
use crate::planner::{PlanError, PlanRequest, Planner, nearest_k};
use crate::repository::{RepositoryError, StopRepository};
use crate::schedule::{PlanningSession, annotate_plan, evaluate};

use super::dto::*;
use super::state::AppState;

/// Largest `k` accepted by the nearest-stops endpoint.
const MAX_NEAREST: usize = 50;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/lines", get(list_lines))
        .route("/lines/:code/stops/nearest", get(nearest_stops))
        .route("/plan", post(plan_journey))
        .route("/schedule", get(stop_schedule))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List lines of one or both categories serving an area.
async fn list_lines(
    State(state): State<AppState>,
    Query(req): Query<LinesQuery>,
) -> Result<Json<LinesResponse>, AppError> {
    let categories = match req.category.as_deref().map(normalize) {
        Some(c) if !c.is_empty() => {
            vec![Category::from_normalized(&c).map_err(|e| AppError::BadRequest {
                message: e.to_string(),
            })?]
        }
        _ => Category::ALL.to_vec(),
    };
    let area = AreaDto {
        city: req.city,
        parish: req.parish,
    }
    .to_context();

    let mut lines = Vec::new();
    for category in categories {
        let fetched = state.repository.fetch_lines(category, &area).await?;
        lines.extend(fetched.iter().map(LineResult::from_line));
    }

    Ok(Json(LinesResponse { lines }))
}

/// The stops of a line nearest to a point.
async fn nearest_stops(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(req): Query<NearestQuery>,
) -> Result<Json<NearestResponse>, AppError> {
    let code = parse_line_code(&code)?;
    let point = PointDto {
        lat: req.lat,
        lon: req.lon,
    }
    .to_coord()
    .map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let direction = parse_direction(req.direction.as_deref())?;
    let k = req.k.unwrap_or(5).clamp(1, MAX_NEAREST);

    let stops = state.repository.fetch_stops(&code).await?;
    if stops.is_empty() {
        return Err(AppError::NotFound {
            message: format!("No stops for line {code}"),
        });
    }

    let stops = nearest_k(&stops, point, k, direction, &state.distance)
        .into_iter()
        .map(|c| NearestStopResult {
            stop: StopResult::from_stop(c.stop),
            distance_m: c.distance_m,
        })
        .collect();

    Ok(Json(NearestResponse { stops }))
}

/// Plan a journey and annotate it with next departures.
async fn plan_journey(
    State(state): State<AppState>,
    Json(req): Json<PlanJourneyRequest>,
) -> Result<Json<PlanJourneyResponse>, AppError> {
    let origin = req.origin.to_coord().map_err(|e| AppError::BadRequest {
        message: format!("Invalid origin: {e}"),
    })?;
    let destination = req.destination.to_coord().map_err(|e| AppError::BadRequest {
        message: format!("Invalid destination: {e}"),
    })?;
    let request = PlanRequest::new(origin, destination).with_areas(
        req.origin_area.to_context(),
        req.destination_area.to_context(),
    );

    let planner = Planner::new(state.repository.as_ref(), &state.distance, &state.config);
    let outcome = planner.plan(&request).await?;

    let schedule = match &outcome.plan {
        Some(plan) => schedule_for(&state, plan, Local::now().naive_local()).await?,
        None => Vec::new(),
    };

    let plan = outcome.plan.as_ref().map(|p| {
        PlanResult::from_plan(
            p,
            &state.config.weights,
            state.config.schedule.default_speed_kmh,
        )
    });

    Ok(Json(PlanJourneyResponse {
        plan,
        radius_level: outcome.radius_level,
        lines_considered: outcome.lines_considered,
        schedule,
    }))
}

/// A blank or missing tag means untagged.
fn parse_direction(tag: Option<&str>) -> Result<Option<Direction>, AppError> {
    match tag.map(normalize) {
        Some(d) if !d.is_empty() => Direction::from_normalized(&d)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest {
                message: format!("Unknown direction: {d}"),
            }),
        _ => Ok(None),
    }
}

/// Next departure at one stop of one line, at the server's local time.
async fn stop_schedule(
    State(state): State<AppState>,
    Query(req): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResult>, AppError> {
    let code = parse_line_code(&req.line)?;
    let line = state
        .repository
        .fetch_line(&code)
        .await?
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown line {code}"),
        })?;
    let stops = state.repository.fetch_stops(&code).await?;

    let key = StopKey::new(parse_direction(req.direction.as_deref())?, req.stop);

    let session = PlanningSession::new(line, stops, &state.distance, &state.config.schedule);
    if !session.has_stop(key) {
        return Err(AppError::NotFound {
            message: format!("Line {code} has no stop with order {}", req.stop),
        });
    }

    let report = evaluate(
        &session,
        key,
        Local::now().naive_local(),
        &state.config.schedule,
    );
    Ok(Json(ScheduleResult::from_report(&report)))
}

/// Schedule reports for the boarding stop of each bus leg.
async fn schedule_for(
    state: &AppState,
    plan: &Plan,
    now: NaiveDateTime,
) -> Result<Vec<ScheduleResult>, AppError> {
    let mut sessions = Vec::new();
    for leg in plan.bus_legs() {
        let stops = state.repository.fetch_stops(&leg.line.code).await?;
        sessions.push(PlanningSession::new(
            leg.line.clone(),
            stops,
            &state.distance,
            &state.config.schedule,
        ));
    }

    Ok(annotate_plan(plan, &sessions, now, &state.config.schedule)
        .iter()
        .map(ScheduleResult::from_report)
        .collect())
}

fn parse_line_code(code: &str) -> Result<LineCode, AppError> {
    LineCode::parse(code).map_err(|_| AppError::BadRequest {
        message: format!("Invalid line code: {code}"),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(what) => AppError::NotFound {
                message: format!("Not found: {what}"),
            },
            RepositoryError::NotConfigured(_) => AppError::Internal {
                message: e.to_string(),
            },
            _ => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::InvalidRequest(msg) => AppError::BadRequest { message: msg },
            PlanError::Repository(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::AppError,
    filter::FilterOption,
    models::trip::{Trip, TripType},
    planner::TripForm,
    services::{
        notify::CollectingNotifier,
        trips::{SaveOutcome, TripService},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(day_agenda).post(create_trip))
        .route("/all", get(search_trips))
        .route("/dates", post(pick_date))
}

/// A service whose notices end up in the response instead of only the log.
fn scoped(state: &AppState) -> (TripService, CollectingNotifier) {
    let notices = CollectingNotifier::new();
    let service = state.trips.with_notifier(Arc::new(notices.clone()));
    (service, notices)
}

#[derive(Deserialize)]
struct AgendaQuery {
    day: NaiveDate,
    filter: Option<String>,
}

#[derive(Serialize)]
struct AgendaResponse {
    day: NaiveDate,
    filter: String,
    trips: Vec<Trip>,
}

async fn day_agenda(
    State(state): State<AppState>,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<AgendaResponse>, AppError> {
    let filter = match query.filter.as_deref() {
        Some(raw) => raw.parse::<FilterOption>().map_err(AppError::BadRequest)?,
        None => FilterOption::All,
    };
    let agenda = state.trips.load_day(query.day).await?;
    Ok(Json(AgendaResponse {
        day: agenda.day,
        filter: filter.to_string(),
        trips: agenda.filtered(filter),
    }))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(rename = "type")]
    trip_type: Option<TripType>,
    duration: Option<u32>,
}

async fn search_trips(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Trip>>, AppError> {
    let store = state.trips.store();
    let trips = match (query.trip_type, query.duration) {
        (Some(_), Some(_)) => {
            return Err(AppError::BadRequest(
                "filter by type or by duration, not both".into(),
            ))
        }
        (Some(trip_type), None) => store.trips_by_type(trip_type).await?,
        (None, Some(days)) => store.trips_by_duration(days).await?,
        (None, None) => store.all_trips().await?,
    };
    Ok(Json(trips))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DateField {
    Start,
    End,
}

#[derive(Deserialize)]
struct DatePick {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    field: DateField,
    date: NaiveDate,
}

#[derive(Serialize)]
struct DateRangeResponse {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    accepted: bool,
    notices: Vec<String>,
}

async fn pick_date(
    State(state): State<AppState>,
    Json(pick): Json<DatePick>,
) -> Json<DateRangeResponse> {
    let (service, notices) = scoped(&state);
    let mut form = TripForm {
        start_date: pick.start,
        end_date: pick.end,
        ..TripForm::default()
    };
    let accepted = match pick.field {
        DateField::Start => {
            form.select_start_date(pick.date);
            true
        }
        DateField::End => service.select_end_date(&mut form, pick.date).is_some(),
    };
    Json(DateRangeResponse {
        start: form.start_date,
        end: form.end_date,
        accepted,
        notices: notices.take(),
    })
}

#[derive(Serialize)]
struct SaveResponse {
    created: bool,
    id: Option<i64>,
    notices: Vec<String>,
    /// Trips starting on the new trip's start day, reloaded after a successful save.
    day_trips: Option<Vec<Trip>>,
}

async fn create_trip(
    State(state): State<AppState>,
    Json(form): Json<TripForm>,
) -> (StatusCode, Json<SaveResponse>) {
    let (service, notices) = scoped(&state);
    let outcome = service.save(&form).await;

    let (status, id) = match outcome {
        SaveOutcome::Created { id } => (StatusCode::CREATED, Some(id)),
        SaveOutcome::Invalid(_) => (StatusCode::UNPROCESSABLE_ENTITY, None),
        SaveOutcome::Failed => (StatusCode::INTERNAL_SERVER_ERROR, None),
    };

    let day_trips = match form.start_date {
        Some(day) => match service.refresh_after_save(day, outcome).await {
            Ok(agenda) => agenda.map(|agenda| agenda.trips),
            Err(err) => {
                warn!(%day, "reloading trips after save failed: {err}");
                None
            }
        },
        None => None,
    };

    (
        status,
        Json(SaveResponse {
            created: outcome.created(),
            id,
            notices: notices.take(),
            day_trips,
        }),
    )
}

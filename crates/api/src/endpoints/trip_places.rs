//! Itinerary endpoints, nested under a trip.
//!
//! Entries are edited with PATCH only; PUT is not routed.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use wayfarer_common::AppResult;
use wayfarer_core::{ItineraryEntry, TripPlaceInput, UpdateTripPlaceInput};

use super::places::PlaceSummary;
use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Itinerary entry response.
#[derive(Debug, Serialize)]
pub struct TripPlaceResponse {
    pub id: i32,
    pub place: PlaceSummary,
    pub date: Option<NaiveDate>,
    pub duration: Decimal,
    pub created_at: DateTime<FixedOffset>,
}

impl From<ItineraryEntry> for TripPlaceResponse {
    fn from(e: ItineraryEntry) -> Self {
        Self {
            id: e.entry.id,
            place: e.place.into(),
            date: e.entry.date,
            duration: e.entry.duration,
            created_at: e.entry.created_at,
        }
    }
}

async fn list(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<TripPlaceResponse>>> {
    let entries = state.itinerary_service.list(trip_id).await?;
    Ok(ApiResponse::ok(entries.into_iter().map(Into::into).collect()))
}

/// Add a place, or merge into the entry for the same place and date.
///
/// 201 for a new entry, 200 when an existing one absorbed the request.
async fn create(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Json(input): Json<TripPlaceInput>,
) -> AppResult<ApiResponse<TripPlaceResponse>> {
    let (entry, created) = state
        .itinerary_service
        .add(trip_id, user.as_ref(), input)
        .await?;
    Ok(ApiResponse::created_if(created, entry.into()))
}

async fn show(
    State(state): State<AppState>,
    Path((trip_id, id)): Path<(Uuid, i32)>,
) -> AppResult<ApiResponse<TripPlaceResponse>> {
    let entry = state.itinerary_service.get(trip_id, id).await?;
    Ok(ApiResponse::ok(entry.into()))
}

async fn update(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path((trip_id, id)): Path<(Uuid, i32)>,
    Json(input): Json<UpdateTripPlaceInput>,
) -> AppResult<ApiResponse<TripPlaceResponse>> {
    let entry = state
        .itinerary_service
        .update(trip_id, id, user.as_ref(), input)
        .await?;
    Ok(ApiResponse::ok(entry.into()))
}

async fn destroy(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path((trip_id, id)): Path<(Uuid, i32)>,
) -> AppResult<impl IntoResponse> {
    state
        .itinerary_service
        .delete(trip_id, id, user.as_ref())
        .await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).patch(update).delete(destroy))
}

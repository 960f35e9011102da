//! Trip endpoints.

use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use wayfarer_common::AppResult;
use wayfarer_core::TripDetails;

use super::trip_places::TripPlaceResponse;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Trip response.
#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub id: Uuid,
    pub member_id: Option<i32>,
    pub places: Vec<TripPlaceResponse>,
    pub total_places: usize,
    pub total_duration: Decimal,
    pub created_at: DateTime<FixedOffset>,
}

impl From<TripDetails> for TripResponse {
    fn from(t: TripDetails) -> Self {
        Self {
            id: t.trip.id,
            member_id: t.trip.member_id,
            places: t.places.into_iter().map(Into::into).collect(),
            total_places: t.total_places,
            total_duration: t.total_duration,
            created_at: t.trip.created_at,
        }
    }
}

/// Trips of the acting user.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<TripResponse>>> {
    let trips = state.trip_service.list_mine(&user).await?;
    Ok(ApiResponse::ok(trips.into_iter().map(Into::into).collect()))
}

/// Start a trip. Anonymous trips have no owner.
async fn create(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<TripResponse>> {
    let trip = state.trip_service.create(user.as_ref()).await?;
    Ok(ApiResponse::created(trip.into()))
}

async fn show(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<ApiResponse<TripResponse>> {
    let trip = state.trip_service.get(trip_id).await?;
    Ok(ApiResponse::ok(trip.into()))
}

async fn destroy(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    state.trip_service.delete(trip_id, user.as_ref()).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{trip_id}", get(show).delete(destroy))
}

//! Place endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wayfarer_common::AppResult;
use wayfarer_core::{PlaceDetails, PlaceInput, PlaceListQuery, UpdatePlaceInput};
use wayfarer_db::entities::place::{self, PlaceStatus, RatingBand};

use super::addresses::AddressResponse;
use super::transits::TransitResponse;
use crate::{
    extractors::StaffUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

// ==================== Request/Response Types ====================

/// Place response.
#[derive(Debug, Serialize)]
pub struct PlaceResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub lat: Decimal,
    pub lon: Decimal,
    pub rating: Decimal,
    pub rating_label: &'static str,
    pub status: PlaceStatus,
    pub slug: String,
    pub place_link: String,
    pub created_at: DateTime<FixedOffset>,
    pub last_update: DateTime<FixedOffset>,
    pub address: Option<AddressResponse>,
}

impl From<PlaceDetails> for PlaceResponse {
    fn from(details: PlaceDetails) -> Self {
        let p = details.place;
        Self {
            place_link: place_link(p.id),
            rating_label: RatingBand::of(p.rating).label(),
            id: p.id,
            name: p.name,
            description: p.description,
            lat: p.lat,
            lon: p.lon,
            rating: p.rating,
            status: p.status,
            slug: p.slug,
            created_at: p.created_at,
            last_update: p.last_update,
            address: details.address.map(Into::into),
        }
    }
}

/// Short place form embedded in other resources.
#[derive(Debug, Serialize)]
pub struct PlaceSummary {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub lat: Decimal,
    pub lon: Decimal,
    pub rating: Decimal,
    pub place_link: String,
}

impl From<place::Model> for PlaceSummary {
    fn from(p: place::Model) -> Self {
        Self {
            place_link: place_link(p.id),
            id: p.id,
            name: p.name,
            description: p.description,
            lat: p.lat,
            lon: p.lon,
            rating: p.rating,
        }
    }
}

/// Link to a place resource.
pub fn place_link(id: i32) -> String {
    format!("/places/{id}")
}

/// Link a transit to a place request.
#[derive(Debug, Deserialize)]
pub struct AddTransitRequest {
    pub transit_id: i32,
}

// ==================== Handlers ====================

/// List places.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<PlaceListQuery>,
) -> AppResult<ApiResponse<Vec<PlaceResponse>>> {
    let places = state.place_service.list(query).await?;
    Ok(ApiResponse::ok(places.into_iter().map(Into::into).collect()))
}

/// Create a place.
async fn create(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Json(input): Json<PlaceInput>,
) -> AppResult<ApiResponse<PlaceResponse>> {
    let place = state.place_service.create(input).await?;
    Ok(ApiResponse::created(place.into()))
}

/// Show a place.
async fn show(
    State(state): State<AppState>,
    Path(place_id): Path<i32>,
) -> AppResult<ApiResponse<PlaceResponse>> {
    let place = state.place_service.get(place_id).await?;
    Ok(ApiResponse::ok(place.into()))
}

/// Replace a place, creating or replacing its embedded address.
async fn replace(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(place_id): Path<i32>,
    Json(input): Json<PlaceInput>,
) -> AppResult<ApiResponse<PlaceResponse>> {
    let place = state.place_service.replace(place_id, input).await?;
    Ok(ApiResponse::ok(place.into()))
}

/// Update some fields of a place.
async fn update(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(place_id): Path<i32>,
    Json(input): Json<UpdatePlaceInput>,
) -> AppResult<ApiResponse<PlaceResponse>> {
    let place = state.place_service.update(place_id, input).await?;
    Ok(ApiResponse::ok(place.into()))
}

/// Delete a place.
async fn destroy(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(place_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.place_service.delete(place_id).await?;
    Ok(no_content())
}

/// Transits serving a place.
async fn transits(
    State(state): State<AppState>,
    Path(place_id): Path<i32>,
) -> AppResult<ApiResponse<Vec<TransitResponse>>> {
    let transits = state.place_service.transits(place_id).await?;
    Ok(ApiResponse::ok(transits.into_iter().map(Into::into).collect()))
}

/// Link a transit to a place.
async fn add_transit(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(place_id): Path<i32>,
    Json(req): Json<AddTransitRequest>,
) -> AppResult<ApiResponse<TransitResponse>> {
    let transit = state
        .place_service
        .add_transit(place_id, req.transit_id)
        .await?;
    Ok(ApiResponse::created(transit.into()))
}

/// Unlink a transit from a place.
async fn remove_transit(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path((place_id, transit_id)): Path<(i32, i32)>,
) -> AppResult<impl IntoResponse> {
    state
        .place_service
        .remove_transit(place_id, transit_id)
        .await?;
    Ok(no_content())
}

// ==================== Router ====================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route(
            "/{place_id}",
            get(show).put(replace).patch(update).delete(destroy),
        )
        .route("/{place_id}/transits", get(transits).post(add_transit))
        .route("/{place_id}/transits/{transit_id}", delete(remove_transit))
}

//! Address endpoints, nested under a place.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use wayfarer_common::AppResult;
use wayfarer_core::{AddressDetails, AddressInput, UpdateAddressInput};

use crate::{
    extractors::StaffUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Address response. The id is the id of the place it belongs to.
#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub id: i32,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub state: Option<String>,
    pub state_id: Option<i32>,
    pub country: Option<String>,
    pub country_id: Option<i32>,
}

impl From<AddressDetails> for AddressResponse {
    fn from(details: AddressDetails) -> Self {
        let a = details.address;
        Self {
            id: a.place_id,
            street: a.street,
            city: a.city,
            postcode: a.postcode,
            state: details.state.map(|s| s.name),
            state_id: a.state_id,
            country: details.country.map(|c| c.name),
            country_id: a.country_id,
        }
    }
}

async fn list(
    State(state): State<AppState>,
    Path(place_id): Path<i32>,
) -> AppResult<ApiResponse<Vec<AddressResponse>>> {
    let addresses = state.address_service.list(place_id).await?;
    Ok(ApiResponse::ok(addresses.into_iter().map(Into::into).collect()))
}

async fn create(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(place_id): Path<i32>,
    Json(input): Json<AddressInput>,
) -> AppResult<ApiResponse<AddressResponse>> {
    let address = state.address_service.create(place_id, input).await?;
    Ok(ApiResponse::created(address.into()))
}

async fn show(
    State(state): State<AppState>,
    Path((place_id, id)): Path<(i32, i32)>,
) -> AppResult<ApiResponse<AddressResponse>> {
    let address = state.address_service.get(place_id, id).await?;
    Ok(ApiResponse::ok(address.into()))
}

async fn replace(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path((place_id, id)): Path<(i32, i32)>,
    Json(input): Json<AddressInput>,
) -> AppResult<ApiResponse<AddressResponse>> {
    let address = state.address_service.replace(place_id, id, input).await?;
    Ok(ApiResponse::ok(address.into()))
}

async fn update(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path((place_id, id)): Path<(i32, i32)>,
    Json(input): Json<UpdateAddressInput>,
) -> AppResult<ApiResponse<AddressResponse>> {
    let address = state.address_service.update(place_id, id, input).await?;
    Ok(ApiResponse::ok(address.into()))
}

/// Always refused; an address goes away with its place.
async fn destroy(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path((place_id, id)): Path<(i32, i32)>,
) -> AppResult<impl IntoResponse> {
    state.address_service.delete(place_id, id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(create)).route(
        "/{id}",
        get(show).put(replace).patch(update).delete(destroy),
    )
}

//! Country and state endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use wayfarer_common::AppResult;
use wayfarer_core::{CountryInput, StateInput, UpdateCountryInput, UpdateStateInput};
use wayfarer_db::entities::{country, state};

use super::ListQuery;
use crate::{
    extractors::StaffUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

// ==================== Countries ====================

async fn list_countries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<country::Model>>> {
    let countries = state
        .geography_service
        .list_countries(query.search.as_deref(), query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(countries))
}

async fn create_country(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Json(input): Json<CountryInput>,
) -> AppResult<ApiResponse<country::Model>> {
    let country = state.geography_service.create_country(input).await?;
    Ok(ApiResponse::created(country))
}

async fn show_country(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<country::Model>> {
    Ok(ApiResponse::ok(state.geography_service.get_country(id).await?))
}

async fn replace_country(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<CountryInput>,
) -> AppResult<ApiResponse<country::Model>> {
    let country = state
        .geography_service
        .update_country(id, input.into())
        .await?;
    Ok(ApiResponse::ok(country))
}

async fn update_country(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateCountryInput>,
) -> AppResult<ApiResponse<country::Model>> {
    let country = state.geography_service.update_country(id, input).await?;
    Ok(ApiResponse::ok(country))
}

/// Refused while an address refers to the country.
async fn delete_country(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.geography_service.delete_country(id).await?;
    Ok(no_content())
}

// ==================== States ====================

async fn list_states(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<state::Model>>> {
    let states = state
        .geography_service
        .list_states(query.search.as_deref(), query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(states))
}

async fn create_state(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Json(input): Json<StateInput>,
) -> AppResult<ApiResponse<state::Model>> {
    let created = state.geography_service.create_state(input).await?;
    Ok(ApiResponse::created(created))
}

async fn show_state(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<state::Model>> {
    Ok(ApiResponse::ok(state.geography_service.get_state(id).await?))
}

async fn replace_state(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<StateInput>,
) -> AppResult<ApiResponse<state::Model>> {
    let updated = state
        .geography_service
        .update_state(id, input.into())
        .await?;
    Ok(ApiResponse::ok(updated))
}

async fn update_state(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateStateInput>,
) -> AppResult<ApiResponse<state::Model>> {
    let updated = state.geography_service.update_state(id, input).await?;
    Ok(ApiResponse::ok(updated))
}

/// Refused while an address refers to the state.
async fn delete_state(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.geography_service.delete_state(id).await?;
    Ok(no_content())
}

// ==================== Routers ====================

pub fn countries_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_countries).post(create_country))
        .route(
            "/{id}",
            get(show_country)
                .put(replace_country)
                .patch(update_country)
                .delete(delete_country),
        )
}

pub fn states_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_states).post(create_state))
        .route(
            "/{id}",
            get(show_state)
                .put(replace_state)
                .patch(update_state)
                .delete(delete_state),
        )
}

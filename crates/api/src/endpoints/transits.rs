//! Transit endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Serialize;
use wayfarer_common::AppResult;
use wayfarer_core::{TransitInput, UpdateTransitInput};
use wayfarer_db::entities::transit::{self, TransitMode};

use super::ListQuery;
use crate::{
    extractors::StaffUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Transit response.
#[derive(Debug, Serialize)]
pub struct TransitResponse {
    pub id: i32,
    pub name: String,
    pub lat: Decimal,
    pub long: Decimal,
    pub mode: TransitMode,
}

impl From<transit::Model> for TransitResponse {
    fn from(t: transit::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            lat: t.lat,
            long: t.long,
            mode: t.mode,
        }
    }
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<TransitResponse>>> {
    let transits = state
        .transit_service
        .list(query.search.as_deref(), query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(transits.into_iter().map(Into::into).collect()))
}

async fn create(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Json(input): Json<TransitInput>,
) -> AppResult<ApiResponse<TransitResponse>> {
    let transit = state.transit_service.create(input).await?;
    Ok(ApiResponse::created(transit.into()))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<TransitResponse>> {
    let transit = state.transit_service.get(id).await?;
    Ok(ApiResponse::ok(transit.into()))
}

async fn replace(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<TransitInput>,
) -> AppResult<ApiResponse<TransitResponse>> {
    let transit = state.transit_service.update(id, input.into()).await?;
    Ok(ApiResponse::ok(transit.into()))
}

async fn update(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateTransitInput>,
) -> AppResult<ApiResponse<TransitResponse>> {
    let transit = state.transit_service.update(id, input).await?;
    Ok(ApiResponse::ok(transit.into()))
}

async fn destroy(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.transit_service.delete(id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(create)).route(
        "/{id}",
        get(show).put(replace).patch(update).delete(destroy),
    )
}

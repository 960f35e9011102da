//! Visitor (review) endpoints, nested under a place.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wayfarer_common::AppResult;
use wayfarer_core::{UpdateVisitorInput, VisitorInput};
use wayfarer_db::entities::visitor::{self, VisitType};

use super::places::place_link;
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Review response.
#[derive(Debug, Serialize)]
pub struct VisitorResponse {
    pub id: i32,
    pub place: String,
    pub place_id: i32,
    pub member_id: Option<i32>,
    pub created_at: DateTime<FixedOffset>,
    pub review: String,
    pub rating: Decimal,
    pub visit_type: VisitType,
}

impl From<visitor::Model> for VisitorResponse {
    fn from(v: visitor::Model) -> Self {
        Self {
            id: v.id,
            place: place_link(v.place_id),
            place_id: v.place_id,
            member_id: v.member_id,
            created_at: v.created_at,
            review: v.review,
            rating: v.rating,
            visit_type: v.visit_type,
        }
    }
}

/// Paging parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

async fn list(
    State(state): State<AppState>,
    Path(place_id): Path<i32>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<VisitorResponse>>> {
    let reviews = state
        .visitor_service
        .list(place_id, page.limit, page.offset)
        .await?;
    Ok(ApiResponse::ok(reviews.into_iter().map(Into::into).collect()))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(place_id): Path<i32>,
    Json(input): Json<VisitorInput>,
) -> AppResult<ApiResponse<VisitorResponse>> {
    let review = state.visitor_service.create(place_id, &user, input).await?;
    Ok(ApiResponse::created(review.into()))
}

async fn show(
    State(state): State<AppState>,
    Path((place_id, id)): Path<(i32, i32)>,
) -> AppResult<ApiResponse<VisitorResponse>> {
    let review = state.visitor_service.get(place_id, id).await?;
    Ok(ApiResponse::ok(review.into()))
}

async fn replace(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((place_id, id)): Path<(i32, i32)>,
    Json(input): Json<VisitorInput>,
) -> AppResult<ApiResponse<VisitorResponse>> {
    let review = state
        .visitor_service
        .replace(place_id, id, &user, input)
        .await?;
    Ok(ApiResponse::ok(review.into()))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((place_id, id)): Path<(i32, i32)>,
    Json(input): Json<UpdateVisitorInput>,
) -> AppResult<ApiResponse<VisitorResponse>> {
    let review = state
        .visitor_service
        .update(place_id, id, &user, input)
        .await?;
    Ok(ApiResponse::ok(review.into()))
}

async fn destroy(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((place_id, id)): Path<(i32, i32)>,
) -> AppResult<impl IntoResponse> {
    state.visitor_service.delete(place_id, id, &user).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(create)).route(
        "/{id}",
        get(show).put(replace).patch(update).delete(destroy),
    )
}

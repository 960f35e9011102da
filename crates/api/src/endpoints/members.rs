//! Member endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayfarer_common::AppResult;
use wayfarer_core::{CreateMemberInput, MemberHistory, MemberInput};
use wayfarer_db::{
    content_type::ContentType,
    entities::{member, trip},
};

use super::visitors::{PageQuery, VisitorResponse};
use crate::{
    extractors::{AuthUser, StaffUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Member response.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: i32,
    pub user_id: i32,
    pub birth_date: Option<NaiveDate>,
    pub joined_at: DateTime<FixedOffset>,
}

impl From<member::Model> for MemberResponse {
    fn from(m: member::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            birth_date: m.birth_date,
            joined_at: m.joined_at,
        }
    }
}

/// Trip as listed in a member's history, without its itinerary.
#[derive(Debug, Serialize)]
pub struct TripSummary {
    pub id: Uuid,
    pub trip: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<trip::Model> for TripSummary {
    fn from(t: trip::Model) -> Self {
        Self {
            id: t.id,
            trip: format!("/trips/{}", t.id),
            created_at: t.created_at,
        }
    }
}

/// Member history response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub member: MemberResponse,
    pub reviews: Vec<VisitorResponse>,
    pub trips: Vec<TripSummary>,
}

impl From<MemberHistory> for HistoryResponse {
    fn from(h: MemberHistory) -> Self {
        Self {
            member: h.member.into(),
            reviews: h.reviews.into_iter().map(Into::into).collect(),
            trips: h.trips.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LikesQuery {
    #[serde(default = "default_content_type")]
    content_type: ContentType,
}

const fn default_content_type() -> ContentType {
    ContentType::Place
}

// ==================== Acting member ====================

async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MemberResponse>> {
    let member = state.member_service.me(&user).await?;
    Ok(ApiResponse::ok(member.into()))
}

async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<MemberInput>,
) -> AppResult<ApiResponse<MemberResponse>> {
    let member = state.member_service.update_me(&user, input).await?;
    Ok(ApiResponse::ok(member.into()))
}

/// IDs of the objects of one type the acting user likes.
async fn my_likes(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LikesQuery>,
) -> AppResult<ApiResponse<Vec<i32>>> {
    let ids = state
        .like_service
        .liked_by_me(&user, query.content_type)
        .await?;
    Ok(ApiResponse::ok(ids))
}

async fn history(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> AppResult<ApiResponse<HistoryResponse>> {
    let history = state.member_service.history(&user, member_id).await?;
    Ok(ApiResponse::ok(history.into()))
}

// ==================== Administration ====================

async fn list(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<MemberResponse>>> {
    let members = state.member_service.list(page.limit, page.offset).await?;
    Ok(ApiResponse::ok(members.into_iter().map(Into::into).collect()))
}

async fn create(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Json(input): Json<CreateMemberInput>,
) -> AppResult<ApiResponse<MemberResponse>> {
    let member = state.member_service.create(input).await?;
    Ok(ApiResponse::created(member.into()))
}

async fn show(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> AppResult<ApiResponse<MemberResponse>> {
    let member = state.member_service.get(member_id).await?;
    Ok(ApiResponse::ok(member.into()))
}

async fn update(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
    Json(input): Json<MemberInput>,
) -> AppResult<ApiResponse<MemberResponse>> {
    let member = state.member_service.update(member_id, input).await?;
    Ok(ApiResponse::ok(member.into()))
}

async fn destroy(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(member_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.member_service.delete(member_id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/me", get(me).put(update_me))
        .route("/me/likes", get(my_likes))
        .route(
            "/{member_id}",
            get(show).put(update).patch(update).delete(destroy),
        )
        .route("/{member_id}/history", get(history))
}

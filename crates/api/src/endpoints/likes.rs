//! Likes of places, countries, states and transits.

use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use wayfarer_common::AppResult;
use wayfarer_db::{
    content_type::ContentType,
    entities::{liked_item, member},
};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// A member who likes an object.
#[derive(Debug, Serialize)]
pub struct LikerResponse {
    pub member_id: i32,
    pub user_id: i32,
    pub liked_at: DateTime<FixedOffset>,
}

impl From<(member::Model, liked_item::Model)> for LikerResponse {
    fn from((member, like): (member::Model, liked_item::Model)) -> Self {
        Self {
            member_id: member.id,
            user_id: member.user_id,
            liked_at: like.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct LikeStatus {
    content_type: ContentType,
    object_id: i32,
    liked: bool,
}

async fn likers(
    State(state): State<AppState>,
    Path((content_type, object_id)): Path<(ContentType, i32)>,
) -> AppResult<ApiResponse<Vec<LikerResponse>>> {
    let likes = state.like_service.likes_for(content_type, object_id).await?;
    Ok(ApiResponse::ok(likes.into_iter().map(Into::into).collect()))
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((content_type, object_id)): Path<(ContentType, i32)>,
) -> AppResult<ApiResponse<LikeStatus>> {
    let created = state
        .like_service
        .like(&user, content_type, object_id)
        .await?;
    Ok(ApiResponse::created_if(
        created,
        LikeStatus {
            content_type,
            object_id,
            liked: true,
        },
    ))
}

async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((content_type, object_id)): Path<(ContentType, i32)>,
) -> AppResult<impl IntoResponse> {
    state
        .like_service
        .unlike(&user, content_type, object_id)
        .await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{content_type}/{object_id}",
        get(likers).post(like).delete(unlike),
    )
}

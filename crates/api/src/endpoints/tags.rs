//! Tag endpoints, including tags attached to arbitrary objects.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use wayfarer_common::AppResult;
use wayfarer_core::TagInput;
use wayfarer_db::{
    content_type::ContentType,
    entities::{tag, tagged_item},
};

use super::{ListQuery, places::PlaceSummary};
use crate::{
    extractors::StaffUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Tag attached to an object.
#[derive(Debug, Serialize)]
pub struct TaggedItemResponse {
    pub id: i32,
    pub tag_id: i32,
    pub label: String,
    pub content_type: ContentType,
    pub object_id: i32,
}

impl From<(tag::Model, tagged_item::Model)> for TaggedItemResponse {
    fn from((tag, item): (tag::Model, tagged_item::Model)) -> Self {
        Self {
            id: item.id,
            tag_id: tag.id,
            label: tag.label,
            content_type: item.content_type,
            object_id: item.object_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AttachRequest {
    tag_id: i32,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<tag::Model>>> {
    let tags = state
        .tag_service
        .list(query.search.as_deref(), query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(tags))
}

async fn create(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Json(input): Json<TagInput>,
) -> AppResult<ApiResponse<tag::Model>> {
    let tag = state.tag_service.create(input).await?;
    Ok(ApiResponse::created(tag))
}

async fn show(
    State(state): State<AppState>,
    Path(tag_id): Path<i32>,
) -> AppResult<ApiResponse<tag::Model>> {
    Ok(ApiResponse::ok(state.tag_service.get(tag_id).await?))
}

async fn destroy(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(tag_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.tag_service.delete(tag_id).await?;
    Ok(no_content())
}

async fn places(
    State(state): State<AppState>,
    Path(tag_id): Path<i32>,
) -> AppResult<ApiResponse<Vec<PlaceSummary>>> {
    let places = state.tag_service.places(tag_id).await?;
    Ok(ApiResponse::ok(places.into_iter().map(Into::into).collect()))
}

async fn item_tags(
    State(state): State<AppState>,
    Path((content_type, object_id)): Path<(ContentType, i32)>,
) -> AppResult<ApiResponse<Vec<TaggedItemResponse>>> {
    let tags = state.tag_service.tags_for(content_type, object_id).await?;
    Ok(ApiResponse::ok(tags.into_iter().map(Into::into).collect()))
}

/// Attach a tag. 201 when newly attached, 200 when it already was.
async fn attach(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path((content_type, object_id)): Path<(ContentType, i32)>,
    Json(body): Json<AttachRequest>,
) -> AppResult<ApiResponse<tag::Model>> {
    let (tag, attached) = state
        .tag_service
        .attach(content_type, object_id, body.tag_id)
        .await?;
    Ok(ApiResponse::created_if(attached, tag))
}

async fn detach(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path((content_type, object_id, tag_id)): Path<(ContentType, i32, i32)>,
) -> AppResult<impl IntoResponse> {
    state
        .tag_service
        .detach(content_type, object_id, tag_id)
        .await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{tag_id}", get(show).delete(destroy))
        .route("/{tag_id}/places", get(places))
        .route(
            "/items/{content_type}/{object_id}",
            get(item_tags).post(attach),
        )
        .route(
            "/items/{content_type}/{object_id}/{tag_id}",
            delete(detach),
        )
}

//! Likes of discriminated objects by members.

use std::sync::Arc;

use crate::content_type::ContentType;
use crate::entities::{LikedItem, Member, liked_item, member};
use crate::repositories::{target_exists, write_error};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, SelectTwo,
    Set,
};
use wayfarer_common::{AppError, AppResult};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn likes_for_query(
        content_type: ContentType,
        object_id: i32,
    ) -> SelectTwo<LikedItem, Member> {
        LikedItem::find()
            .filter(liked_item::Column::ContentType.eq(content_type))
            .filter(liked_item::Column::ObjectId.eq(object_id))
            .find_also_related(Member)
            .order_by_asc(liked_item::Column::Id)
    }

    /// Members who like an object, fetched together with their like rows.
    pub async fn likes_for(
        &self,
        content_type: ContentType,
        object_id: i32,
    ) -> AppResult<Vec<(member::Model, liked_item::Model)>> {
        let rows = Self::likes_for_query(content_type, object_id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(item, member)| member.map(|member| (member, item)))
            .collect())
    }

    /// IDs of the objects of one type a member likes.
    pub async fn liked_by(&self, member_id: i32, content_type: ContentType) -> AppResult<Vec<i32>> {
        LikedItem::find()
            .select_only()
            .column(liked_item::Column::ObjectId)
            .filter(liked_item::Column::MemberId.eq(member_id))
            .filter(liked_item::Column::ContentType.eq(content_type))
            .order_by_desc(liked_item::Column::CreatedAt)
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a like. Returns whether it is new.
    pub async fn like(
        &self,
        member_id: i32,
        content_type: ContentType,
        object_id: i32,
    ) -> AppResult<bool> {
        let exists = target_exists(self.db.as_ref(), content_type, object_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if !exists {
            return Err(AppError::NotFound(format!("{content_type} {object_id}")));
        }

        let item = liked_item::ActiveModel {
            member_id: Set(member_id),
            content_type: Set(content_type),
            object_id: Set(object_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let inserted = LikedItem::insert(item)
            .on_conflict(
                OnConflict::columns([
                    liked_item::Column::MemberId,
                    liked_item::Column::ContentType,
                    liked_item::Column::ObjectId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(write_error)?;

        Ok(inserted > 0)
    }

    /// Remove a like. Returns whether one was removed.
    pub async fn unlike(
        &self,
        member_id: i32,
        content_type: ContentType,
        object_id: i32,
    ) -> AppResult<bool> {
        let result = LikedItem::delete_many()
            .filter(liked_item::Column::MemberId.eq(member_id))
            .filter(liked_item::Column::ContentType.eq(content_type))
            .filter(liked_item::Column::ObjectId.eq(object_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}

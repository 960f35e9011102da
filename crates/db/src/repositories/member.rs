//! Member repository.

use std::sync::Arc;

use crate::entities::{Member, member};
use crate::repositories::{is_unique_violation, write_error};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use wayfarer_common::{AppError, AppResult};

/// Member repository for database operations.
#[derive(Clone)]
pub struct MemberRepository {
    db: Arc<DatabaseConnection>,
}

impl MemberRepository {
    /// Create a new member repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a member by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<member::Model>> {
        Member::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a member by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<member::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {id}")))
    }

    /// Find the member wrapping a user.
    pub async fn find_by_user_id(&self, user_id: i32) -> AppResult<Option<member::Model>> {
        Member::find()
            .filter(member::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find members by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<member::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Member::find()
            .filter(member::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Return the member wrapping a user, creating it on first use.
    pub async fn get_or_create(&self, user_id: i32) -> AppResult<member::Model> {
        if let Some(existing) = self.find_by_user_id(user_id).await? {
            return Ok(existing);
        }

        let model = member::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        };

        match model.insert(self.db.as_ref()).await {
            Ok(created) => {
                tracing::info!(member_id = created.id, user_id, "Created member");
                Ok(created)
            }
            // Another request created it first
            Err(e) if is_unique_violation(&e) => self
                .find_by_user_id(user_id)
                .await?
                .ok_or_else(|| AppError::Conflict(format!("Member for user {user_id}"))),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// List members.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<member::Model>> {
        Member::find()
            .order_by_asc(member::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a member.
    pub async fn create(&self, model: member::ActiveModel) -> AppResult<member::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Update a member.
    pub async fn update(&self, model: member::ActiveModel) -> AppResult<member::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }

    /// Delete a member. Returns whether a row was removed.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = Member::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}

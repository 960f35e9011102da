//! Transit repository.

use std::sync::Arc;

use crate::content_type::ContentType;
use crate::entities::{Transit, transit};
use crate::repositories::{detach_all, escape_like, write_error};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use wayfarer_common::{AppError, AppResult};

/// Transit repository for database operations.
#[derive(Clone)]
pub struct TransitRepository {
    db: Arc<DatabaseConnection>,
}

impl TransitRepository {
    /// Create a new transit repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a transit by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<transit::Model>> {
        Transit::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a transit by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<transit::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transit {id}")))
    }

    /// Whether a transit exists.
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let count = Transit::find_by_id(id)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// List transits, optionally by name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<transit::Model>> {
        let mut query = Transit::find().order_by_asc(transit::Column::Id);
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            query = query.filter(transit::Column::Name.contains(escape_like(search)));
        }

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a transit.
    pub async fn create(&self, model: transit::ActiveModel) -> AppResult<transit::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Update a transit.
    pub async fn update(&self, model: transit::ActiveModel) -> AppResult<transit::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }

    /// Delete a transit with its tags and likes; its place links go with it.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        detach_all(&txn, ContentType::Transit, id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = Transit::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

//! Trip repository.

use std::sync::Arc;

use crate::entities::{Trip, trip};
use crate::repositories::write_error;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;
use wayfarer_common::{AppError, AppResult};

/// Trip repository for database operations.
#[derive(Clone)]
pub struct TripRepository {
    db: Arc<DatabaseConnection>,
}

impl TripRepository {
    /// Create a new trip repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a trip by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<trip::Model>> {
        Trip::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a trip by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<trip::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip {id}")))
    }

    /// Whether a trip exists.
    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let count = Trip::find_by_id(id)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// List the trips a member owns, newest first.
    pub async fn list_by_member(&self, member_id: i32) -> AppResult<Vec<trip::Model>> {
        Trip::find()
            .filter(trip::Column::MemberId.eq(member_id))
            .order_by_desc(trip::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a trip.
    pub async fn create(&self, model: trip::ActiveModel) -> AppResult<trip::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Delete a trip; its itinerary goes with it.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = Trip::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_get_by_id() {
        let id = Uuid::new_v4();
        let trip = trip::Model {
            id,
            created_at: Utc::now().into(),
            member_id: Some(1),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[trip.clone()]])
                .append_query_results([Vec::<trip::Model>::new()])
                .into_connection(),
        );

        let repo = TripRepository::new(db);
        assert_eq!(repo.get_by_id(id).await.unwrap().member_id, Some(1));
        assert!(matches!(
            repo.get_by_id(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}

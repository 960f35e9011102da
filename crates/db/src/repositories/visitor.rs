//! Visitor (review) repository.

use std::sync::Arc;

use crate::entities::{Visitor, visitor};
use crate::repositories::write_error;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use wayfarer_common::{AppError, AppResult};

/// Visitor repository for database operations.
#[derive(Clone)]
pub struct VisitorRepository {
    db: Arc<DatabaseConnection>,
}

impl VisitorRepository {
    /// Create a new visitor repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a review of a place. Reviews of other places are not returned.
    pub async fn find_for_place(
        &self,
        place_id: i32,
        id: i32,
    ) -> AppResult<Option<visitor::Model>> {
        Visitor::find_by_id(id)
            .filter(visitor::Column::PlaceId.eq(place_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reviews of a place, newest first.
    pub async fn list_by_place(
        &self,
        place_id: i32,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<visitor::Model>> {
        Visitor::find()
            .filter(visitor::Column::PlaceId.eq(place_id))
            .order_by_desc(visitor::Column::CreatedAt)
            .order_by_desc(visitor::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reviews written by a member, newest first.
    pub async fn list_by_member(&self, member_id: i32) -> AppResult<Vec<visitor::Model>> {
        Visitor::find()
            .filter(visitor::Column::MemberId.eq(member_id))
            .order_by_desc(visitor::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a review.
    pub async fn create(&self, model: visitor::ActiveModel) -> AppResult<visitor::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Update a review.
    pub async fn update(&self, model: visitor::ActiveModel) -> AppResult<visitor::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }

    /// Delete a review.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = Visitor::delete_by_id(id)
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
    use crate::entities::visitor::VisitType;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_visitor(id: i32, place_id: i32, member_id: Option<i32>) -> visitor::Model {
        visitor::Model {
            id,
            member_id,
            rating: Decimal::new(450, 2),
            review: "Quiet beach at sunset".to_string(),
            visit_type: VisitType::Holiday,
            place_id,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_for_place_wrong_parent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<visitor::Model>::new()])
                .into_connection(),
        );

        let repo = VisitorRepository::new(db);
        assert!(repo.find_for_place(2, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_place() {
        let v1 = create_test_visitor(1, 5, Some(1));
        let v2 = create_test_visitor(2, 5, None);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[v1, v2]])
                .into_connection(),
        );

        let repo = VisitorRepository::new(db);
        let result = repo.list_by_place(5, 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result[1].member_id.is_none());
    }
}

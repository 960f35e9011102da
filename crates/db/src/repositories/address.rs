//! Address repository.

use std::sync::Arc;

use crate::entities::{Address, address};
use crate::repositories::write_error;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use wayfarer_common::{AppError, AppResult};

/// Address repository for database operations.
#[derive(Clone)]
pub struct AddressRepository {
    db: Arc<DatabaseConnection>,
}

impl AddressRepository {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the address of a place.
    pub async fn find_by_place(&self, place_id: i32) -> AppResult<Option<address::Model>> {
        Address::find_by_id(place_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the addresses of several places.
    pub async fn find_by_places(&self, place_ids: &[i32]) -> AppResult<Vec<address::Model>> {
        if place_ids.is_empty() {
            return Ok(vec![]);
        }

        Address::find()
            .filter(address::Column::PlaceId.is_in(place_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create an address.
    pub async fn create(&self, model: address::ActiveModel) -> AppResult<address::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Update an address.
    pub async fn update(&self, model: address::ActiveModel) -> AppResult<address::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }

    /// Count addresses in a state.
    pub async fn count_by_state(&self, state_id: i32) -> AppResult<u64> {
        Address::find()
            .filter(address::Column::StateId.eq(state_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count addresses in a country.
    pub async fn count_by_country(&self, country_id: i32) -> AppResult<u64> {
        Address::find()
            .filter(address::Column::CountryId.eq(country_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_address(place_id: i32, state_id: Option<i32>) -> address::Model {
        address::Model {
            place_id,
            street: Some("Jalan Pantai".to_string()),
            city: Some("Yan".to_string()),
            postcode: Some("06900".to_string()),
            state_id,
            country_id: Some(1),
        }
    }

    #[tokio::test]
    async fn test_find_by_places_skips_query_when_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = AddressRepository::new(db);
        assert!(repo.find_by_places(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_place() {
        let address = create_test_address(5, Some(2));
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[address.clone()]])
                .into_connection(),
        );

        let repo = AddressRepository::new(db);
        let result = repo.find_by_place(5).await.unwrap().unwrap();

        assert_eq!(result.city.as_deref(), Some("Yan"));
        assert_eq!(result.state_id, Some(2));
    }

    #[tokio::test]
    async fn test_count_by_state() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );

        let repo = AddressRepository::new(db);
        assert_eq!(repo.count_by_state(2).await.unwrap(), 3);
    }
}

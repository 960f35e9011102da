//! Country and state repositories.

use std::sync::Arc;

use crate::content_type::ContentType;
use crate::entities::{Country, State, country, state};
use crate::repositories::{delete_error, detach_all, escape_like, write_error};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use wayfarer_common::{AppError, AppResult};

/// Country repository for database operations.
#[derive(Clone)]
pub struct CountryRepository {
    db: Arc<DatabaseConnection>,
}

impl CountryRepository {
    /// Create a new country repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a country by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<country::Model>> {
        Country::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a country by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<country::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Country {id}")))
    }

    /// Find countries by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<country::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Country::find()
            .filter(country::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List countries, optionally by name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<country::Model>> {
        let mut query = Country::find().order_by_asc(country::Column::Name);
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            query = query.filter(country::Column::Name.contains(escape_like(search)));
        }

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a country.
    pub async fn create(&self, model: country::ActiveModel) -> AppResult<country::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Update a country.
    pub async fn update(&self, model: country::ActiveModel) -> AppResult<country::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }

    /// Delete a country along with its tags and likes. Returns whether a row was removed.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        detach_all(&txn, ContentType::Country, id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = Country::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| delete_error(e, "Country"))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// State repository for database operations.
#[derive(Clone)]
pub struct StateRepository {
    db: Arc<DatabaseConnection>,
}

impl StateRepository {
    /// Create a new state repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a state by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<state::Model>> {
        State::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a state by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<state::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("State {id}")))
    }

    /// Find states by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<state::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        State::find()
            .filter(state::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List states, optionally by name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<state::Model>> {
        let mut query = State::find().order_by_asc(state::Column::Name);
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            query = query.filter(state::Column::Name.contains(escape_like(search)));
        }

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a state.
    pub async fn create(&self, model: state::ActiveModel) -> AppResult<state::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Update a state.
    pub async fn update(&self, model: state::ActiveModel) -> AppResult<state::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }

    /// Delete a state along with its tags and likes. Returns whether a row was removed.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        detach_all(&txn, ContentType::State, id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = State::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| delete_error(e, "State"))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_state(id: i32, name: &str) -> state::Model {
        state::Model {
            id,
            name: name.to_string(),
            lat: Decimal::new(6_120_000, 6),
            lon: Decimal::new(100_370_000, 6),
        }
    }

    #[tokio::test]
    async fn test_state_list() {
        let kedah = create_test_state(1, "Kedah");
        let penang = create_test_state(2, "Penang");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[kedah, penang]])
                .into_connection(),
        );

        let repo = StateRepository::new(db);
        let result = repo.list(Some("e"), 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_country_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<country::Model>::new()])
                .into_connection(),
        );

        let repo = CountryRepository::new(db);
        assert!(matches!(repo.get_by_id(9).await, Err(AppError::NotFound(_))));
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_state_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0), exec(0), exec(1)])
                .into_connection(),
        );

        let repo = StateRepository::new(db);
        assert!(repo.delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_country_delete_clears_tags_and_likes_in_one_transaction() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(3), exec(1), exec(1)])
                .into_connection(),
        );

        let repo = CountryRepository::new(db.clone());
        assert!(repo.delete(4).await.unwrap());
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
        let statements = format!("{:?}", log[0]);
        assert!(statements.contains("BEGIN"));
        assert!(statements.contains("COMMIT"));
        let tags_at = statements.find("tagged_item").unwrap();
        let likes_at = statements.find("liked_item").unwrap();
        let country_at = statements.rfind("DELETE FROM").unwrap();
        assert!(tags_at < likes_at);
        assert!(likes_at < country_at);
    }
}

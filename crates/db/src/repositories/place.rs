//! Place repository.

use std::str::FromStr;
use std::sync::Arc;

use crate::content_type::ContentType;
use crate::entities::{Place, PlaceTransit, Transit, address, place, place_transit, transit};
use crate::repositories::{detach_all, escape_like, write_error};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    TransactionTrait,
};
use wayfarer_common::{AppError, AppResult};

/// Pending write to the address of an existing place.
#[derive(Debug, Clone)]
pub enum AddressChange {
    Insert(address::ActiveModel),
    Update(address::ActiveModel),
}

/// Sort order for place listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceOrdering {
    #[default]
    Id,
    Rating,
    RatingDesc,
    LastUpdate,
    LastUpdateDesc,
}

impl FromStr for PlaceOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(Self::Rating),
            "-rating" => Ok(Self::RatingDesc),
            "last_update" => Ok(Self::LastUpdate),
            "-last_update" => Ok(Self::LastUpdateDesc),
            other => Err(format!("unsupported ordering: {other}")),
        }
    }
}

/// Filters for place listings.
#[derive(Debug, Clone, Default)]
pub struct PlaceFilter {
    pub rating_lt: Option<Decimal>,
    pub rating_gt: Option<Decimal>,
    /// Inclusive lower rating bound.
    pub rating_gte: Option<Decimal>,
    pub state_id: Option<i32>,
    /// Name prefix, or substring of the description or of "city, state".
    pub search: Option<String>,
    pub ordering: PlaceOrdering,
    pub limit: u64,
    pub offset: u64,
}

/// Place repository for database operations.
#[derive(Clone)]
pub struct PlaceRepository {
    db: Arc<DatabaseConnection>,
}

impl PlaceRepository {
    /// Create a new place repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a place by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<place::Model>> {
        Place::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a place by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<place::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Place {id}")))
    }

    /// Find places by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<place::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Place::find()
            .filter(place::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a place exists.
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let count = Place::find_by_id(id)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    fn filtered(filter: &PlaceFilter) -> Select<Place> {
        let mut query = Place::find()
            .join(JoinType::LeftJoin, place::Relation::Address.def())
            .join(JoinType::LeftJoin, address::Relation::State.def());

        if let Some(rating) = filter.rating_lt {
            query = query.filter(place::Column::Rating.lt(rating));
        }
        if let Some(rating) = filter.rating_gt {
            query = query.filter(place::Column::Rating.gt(rating));
        }
        if let Some(rating) = filter.rating_gte {
            query = query.filter(place::Column::Rating.gte(rating));
        }
        if let Some(state_id) = filter.state_id {
            query = query.filter(address::Column::StateId.eq(state_id));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let escaped = escape_like(search);
            query = query.filter(
                Condition::any()
                    .add(Expr::col((Place, place::Column::Name)).ilike(format!("{escaped}%")))
                    .add(
                        Expr::col((Place, place::Column::Description))
                            .ilike(format!("%{escaped}%")),
                    )
                    .add(Expr::cust_with_values(
                        r#"CONCAT_WS(', ', "address"."city", "state"."name") ILIKE $1"#,
                        [format!("%{escaped}%")],
                    )),
            );
        }

        match filter.ordering {
            PlaceOrdering::Id => query,
            PlaceOrdering::Rating => query.order_by_asc(place::Column::Rating),
            PlaceOrdering::RatingDesc => query.order_by_desc(place::Column::Rating),
            PlaceOrdering::LastUpdate => query.order_by_asc(place::Column::LastUpdate),
            PlaceOrdering::LastUpdateDesc => query.order_by_desc(place::Column::LastUpdate),
        }
        .order_by_asc(place::Column::Id)
    }

    /// List places matching a filter.
    pub async fn list(&self, filter: &PlaceFilter) -> AppResult<Vec<place::Model>> {
        Self::filtered(filter)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a place.
    pub async fn create(&self, model: place::ActiveModel) -> AppResult<place::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Update a place.
    pub async fn update(&self, model: place::ActiveModel) -> AppResult<place::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }

    /// Create a place and its address in one transaction.
    ///
    /// The address gets the id of the new place.
    pub async fn create_with_address(
        &self,
        model: place::ActiveModel,
        address: Option<address::ActiveModel>,
    ) -> AppResult<(place::Model, Option<address::Model>)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let place = model.insert(&txn).await.map_err(write_error)?;
        let address = match address {
            Some(mut address) => {
                address.place_id = Set(place.id);
                Some(address.insert(&txn).await.map_err(write_error)?)
            }
            None => None,
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((place, address))
    }

    /// Update a place and write its address in one transaction.
    pub async fn update_with_address(
        &self,
        model: place::ActiveModel,
        address: Option<AddressChange>,
    ) -> AppResult<place::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match address {
            Some(AddressChange::Insert(address)) => {
                address.insert(&txn).await.map_err(write_error)?;
            }
            Some(AddressChange::Update(address)) => {
                address.update(&txn).await.map_err(write_error)?;
            }
            None => {}
        }
        let place = model.update(&txn).await.map_err(write_error)?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(place)
    }

    /// Delete a place together with the tags and likes pointing at it.
    ///
    /// Address, visitors, itinerary rows and transit links go with it through
    /// their cascading foreign keys. Returns whether the place existed.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        detach_all(&txn, ContentType::Place, id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = Place::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Transits serving a place.
    pub async fn transits(&self, place_id: i32) -> AppResult<Vec<transit::Model>> {
        Transit::find()
            .join(JoinType::InnerJoin, transit::Relation::PlaceTransits.def())
            .filter(place_transit::Column::PlaceId.eq(place_id))
            .order_by_asc(transit::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Link a transit to a place. Linking twice is a no-op.
    pub async fn add_transit(&self, place_id: i32, transit_id: i32) -> AppResult<()> {
        let link = place_transit::ActiveModel {
            place_id: Set(place_id),
            transit_id: Set(transit_id),
        };

        PlaceTransit::insert(link)
            .on_conflict(
                OnConflict::columns([
                    place_transit::Column::PlaceId,
                    place_transit::Column::TransitId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(write_error)?;
        Ok(())
    }

    /// Unlink a transit from a place. Returns whether a link was removed.
    pub async fn remove_transit(&self, place_id: i32, transit_id: i32) -> AppResult<bool> {
        let result = PlaceTransit::delete_many()
            .filter(place_transit::Column::PlaceId.eq(place_id))
            .filter(place_transit::Column::TransitId.eq(transit_id))
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
    use crate::entities::place::PlaceStatus;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};

    fn create_test_place(id: i32, name: &str, rating: Decimal) -> place::Model {
        let now = Utc::now().into();
        place::Model {
            id,
            name: name.to_string(),
            description: None,
            lat: Decimal::new(5_438_918, 6),
            lon: Decimal::new(100_180_263, 6),
            rating,
            status: PlaceStatus::Active,
            slug: name.to_lowercase().replace(' ', "-"),
            created_at: now,
            status_change_at: now,
            last_update: now,
        }
    }

    #[test]
    fn test_ordering_parse() {
        assert_eq!("-rating".parse::<PlaceOrdering>(), Ok(PlaceOrdering::RatingDesc));
        assert_eq!("last_update".parse::<PlaceOrdering>(), Ok(PlaceOrdering::LastUpdate));
        assert!("name".parse::<PlaceOrdering>().is_err());
    }

    #[test]
    fn test_filtered_query_joins_address_and_state() {
        let filter = PlaceFilter {
            rating_lt: Some(Decimal::from(4)),
            state_id: Some(2),
            search: Some("pas".to_string()),
            ordering: PlaceOrdering::RatingDesc,
            ..Default::default()
        };

        let sql = PlaceRepository::filtered(&filter)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"LEFT JOIN "address""#));
        assert!(sql.contains(r#"LEFT JOIN "state""#));
        assert!(sql.contains(r#""address"."state_id" = 2"#));
        assert!(sql.contains("ILIKE 'pas%'"));
        assert!(sql.contains("CONCAT_WS"));
        assert!(sql.contains(r#"ORDER BY "place"."rating" DESC"#));
    }

    #[tokio::test]
    async fn test_list() {
        let p1 = create_test_place(1, "Pasir Buaya", Decimal::from(3));
        let p2 = create_test_place(2, "Bukit Bendera", Decimal::from(5));
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1.clone(), p2.clone()]])
                .into_connection(),
        );

        let repo = PlaceRepository::new(db);
        let result = repo
            .list(&PlaceFilter {
                limit: 20,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Pasir Buaya");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<place::Model>::new()])
                .into_connection(),
        );

        let repo = PlaceRepository::new(db);
        let result = repo.get_by_id(42).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_generic_associations_first() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = PlaceRepository::new(db.clone());
        assert!(repo.delete(5).await.unwrap());
        drop(repo);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        let tags_at = log.find("tagged_item").unwrap();
        let likes_at = log.find("liked_item").unwrap();
        let place_at = log.rfind("DELETE FROM").unwrap();
        assert!(tags_at < place_at);
        assert!(likes_at < place_at);
    }

    #[tokio::test]
    async fn test_create_with_address_links_new_place() {
        let created = create_test_place(9, "Pasir Buaya", Decimal::from(4));
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created.clone()]])
                .append_query_results([[address::Model {
                    place_id: 9,
                    street: Some("Jalan Pantai".to_string()),
                    city: None,
                    postcode: None,
                    state_id: None,
                    country_id: None,
                }]])
                .into_connection(),
        );

        let repo = PlaceRepository::new(db.clone());
        let draft = address::ActiveModel {
            street: Set(Some("Jalan Pantai".to_string())),
            city: Set(None),
            postcode: Set(None),
            state_id: Set(None),
            country_id: Set(None),
            ..Default::default()
        };
        let (place, address) = repo
            .create_with_address(
                place::ActiveModel {
                    name: Set(created.name.clone()),
                    rating: Set(created.rating),
                    ..Default::default()
                },
                Some(draft),
            )
            .await
            .unwrap();
        drop(repo);

        assert_eq!(place.id, 9);
        assert_eq!(address.unwrap().place_id, 9);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
        let log = format!("{log:?}");
        assert_eq!(log.matches("INSERT INTO").count(), 2);
        assert!(log.contains("BEGIN"));
        assert!(log.contains("COMMIT"));
    }
}

//! Trip place (itinerary) repository.
//!
//! Creating an itinerary entry is an upsert on `(trip, place, date)`: an
//! existing row for the triple has its duration overwritten instead of a
//! second row being inserted. The unique index on the triple backs this up
//! when two requests race; the loser is folded into the merge path.

use std::sync::Arc;

use crate::entities::{TripPlace, trip_place};
use crate::repositories::{is_unique_violation, write_error};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;
use wayfarer_common::{AppError, AppResult};

/// Outcome of an itinerary upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upserted {
    /// A new row was inserted.
    Created(trip_place::Model),
    /// An existing row for the same trip, place and date took the new duration.
    Merged(trip_place::Model),
    /// Some trip already visits the place on that date; nothing was written.
    PlaceDateTaken,
}

/// Trip place repository for database operations.
#[derive(Clone)]
pub struct TripPlaceRepository {
    db: Arc<DatabaseConnection>,
}

impl TripPlaceRepository {
    /// Create a new trip place repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an itinerary row within a trip. Rows of other trips are not returned.
    pub async fn find_for_trip(
        &self,
        trip_id: Uuid,
        id: i32,
    ) -> AppResult<Option<trip_place::Model>> {
        TripPlace::find_by_id(id)
            .filter(trip_place::Column::TripId.eq(trip_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a trip's itinerary ordered by date; undated rows come last.
    pub async fn list_by_trip(&self, trip_id: Uuid) -> AppResult<Vec<trip_place::Model>> {
        TripPlace::find()
            .filter(trip_place::Column::TripId.eq(trip_id))
            .order_by_asc(trip_place::Column::Date)
            .order_by_asc(trip_place::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the itineraries of several trips ordered by date.
    pub async fn list_by_trips(&self, trip_ids: &[Uuid]) -> AppResult<Vec<trip_place::Model>> {
        if trip_ids.is_empty() {
            return Ok(vec![]);
        }

        TripPlace::find()
            .filter(trip_place::Column::TripId.is_in(trip_ids.to_vec()))
            .order_by_asc(trip_place::Column::Date)
            .order_by_asc(trip_place::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether any trip visits a place on a date.
    pub async fn place_date_taken(&self, place_id: i32, date: NaiveDate) -> AppResult<bool> {
        let count = Self::on_place_date(place_id, date)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    fn on_place_date(place_id: i32, date: NaiveDate) -> Select<TripPlace> {
        TripPlace::find()
            .filter(trip_place::Column::PlaceId.eq(place_id))
            .filter(trip_place::Column::Date.eq(date))
    }

    fn matching(trip_id: Uuid, place_id: i32, date: Option<NaiveDate>) -> Select<TripPlace> {
        let query = TripPlace::find()
            .filter(trip_place::Column::TripId.eq(trip_id))
            .filter(trip_place::Column::PlaceId.eq(place_id));
        match date {
            Some(date) => query.filter(trip_place::Column::Date.eq(date)),
            None => query.filter(trip_place::Column::Date.is_null()),
        }
    }

    async fn merge<C: ConnectionTrait>(
        db: &C,
        existing: trip_place::Model,
        duration: Decimal,
    ) -> Result<trip_place::Model, DbErr> {
        let mut active = existing.into_active_model();
        active.duration = Set(duration);
        active.update(db).await
    }

    /// Insert an itinerary row, or merge into the row for the same trip, place and date.
    pub async fn upsert(
        &self,
        trip_id: Uuid,
        place_id: i32,
        date: Option<NaiveDate>,
        duration: Decimal,
    ) -> AppResult<Upserted> {
        match self.try_upsert(trip_id, place_id, date, duration).await {
            Ok(outcome) => Ok(outcome),
            Err(e) if is_unique_violation(&e) => {
                debug!(%trip_id, place_id, ?date, "Concurrent itinerary insert, merging");
                self.merge_after_conflict(trip_id, place_id, date, duration)
                    .await
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn try_upsert(
        &self,
        trip_id: Uuid,
        place_id: i32,
        date: Option<NaiveDate>,
        duration: Decimal,
    ) -> Result<Upserted, DbErr> {
        let txn = self.db.begin().await?;

        if let Some(existing) = Self::matching(trip_id, place_id, date)
            .lock_exclusive()
            .one(&txn)
            .await?
        {
            let merged = Self::merge(&txn, existing, duration).await?;
            txn.commit().await?;
            debug!(id = merged.id, %trip_id, place_id, "Merged itinerary duration");
            return Ok(Upserted::Merged(merged));
        }

        if let Some(date) = date {
            if Self::on_place_date(place_id, date).count(&txn).await? > 0 {
                txn.rollback().await?;
                return Ok(Upserted::PlaceDateTaken);
            }
        }

        let created = trip_place::ActiveModel {
            trip_id: Set(trip_id),
            place_id: Set(place_id),
            date: Set(date),
            duration: Set(duration),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        Ok(Upserted::Created(created))
    }

    async fn merge_after_conflict(
        &self,
        trip_id: Uuid,
        place_id: i32,
        date: Option<NaiveDate>,
        duration: Decimal,
    ) -> AppResult<Upserted> {
        let run = async {
            let txn = self.db.begin().await?;
            let existing = Self::matching(trip_id, place_id, date)
                .lock_exclusive()
                .one(&txn)
                .await?;
            let merged = match existing {
                Some(existing) => Some(Self::merge(&txn, existing, duration).await?),
                None => None,
            };
            txn.commit().await?;
            Ok::<_, DbErr>(merged)
        };

        match run.await {
            Ok(Some(merged)) => Ok(Upserted::Merged(merged)),
            // The winning row vanished before we could merge into it
            Ok(None) => Err(AppError::Conflict(
                "Itinerary entry changed concurrently, retry the request".to_string(),
            )),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Save an edited itinerary row.
    pub async fn update(&self, model: trip_place::ActiveModel) -> AppResult<trip_place::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }

    /// Delete an itinerary row.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = TripPlace::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}

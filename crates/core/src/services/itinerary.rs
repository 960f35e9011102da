//! Itinerary service: the places a trip visits.
//!
//! Adding a place a trip already holds on the same date (or undated) merges
//! into the existing entry instead of duplicating it, and a dated visit is
//! refused when the place already has a visit on that date in any trip.

use std::collections::HashMap;

use crate::services::nullable;
use crate::services::trip::ensure_can_modify;
use crate::validation;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use uuid::Uuid;
use wayfarer_common::{AppError, AppResult, FieldErrors};
use wayfarer_db::{
    entities::{place, trip, trip_place, user},
    repositories::{
        MemberRepository, PlaceRepository, TripPlaceRepository, TripRepository, Upserted,
    },
};

const NO_SUCH_PLACE: &str = "No place with the given ID was found";
const PLACE_DATE_TAKEN: &str = "Place already added in the date, no change performed";

/// An itinerary row with its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryEntry {
    pub entry: trip_place::Model,
    pub place: place::Model,
}

/// Input for adding a place to a trip.
#[derive(Debug, Clone, Deserialize)]
pub struct TripPlaceInput {
    pub place_id: i32,
    pub duration: Decimal,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Input for editing an itinerary entry.
///
/// `place_id` is checked but never moves the entry to another place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTripPlaceInput {
    pub place_id: Option<i32>,
    pub duration: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable")]
    pub date: Option<Option<NaiveDate>>,
}

/// Pair itinerary rows with their places, keeping row order.
pub(crate) async fn entries(
    place_repo: &PlaceRepository,
    rows: Vec<trip_place::Model>,
) -> AppResult<Vec<ItineraryEntry>> {
    let mut ids: Vec<i32> = rows.iter().map(|r| r.place_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let places: HashMap<i32, place::Model> = place_repo
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    rows.into_iter()
        .map(|entry| {
            let place = places.get(&entry.place_id).cloned().ok_or_else(|| {
                AppError::Internal(format!("Place {} of entry {} vanished", entry.place_id, entry.id))
            })?;
            Ok(ItineraryEntry { entry, place })
        })
        .collect()
}

/// Itinerary service for business logic.
#[derive(Clone)]
pub struct ItineraryService {
    trip_repo: TripRepository,
    trip_place_repo: TripPlaceRepository,
    place_repo: PlaceRepository,
    member_repo: MemberRepository,
}

impl ItineraryService {
    /// Create a new itinerary service.
    #[must_use]
    pub const fn new(
        trip_repo: TripRepository,
        trip_place_repo: TripPlaceRepository,
        place_repo: PlaceRepository,
        member_repo: MemberRepository,
    ) -> Self {
        Self {
            trip_repo,
            trip_place_repo,
            place_repo,
            member_repo,
        }
    }

    async fn modifiable_trip(
        &self,
        trip_id: Uuid,
        user: Option<&user::Model>,
    ) -> AppResult<trip::Model> {
        let trip = self.trip_repo.get_by_id(trip_id).await?;
        ensure_can_modify(&self.member_repo, &trip, user).await?;
        Ok(trip)
    }

    async fn find_scoped(&self, trip_id: Uuid, id: i32) -> AppResult<trip_place::Model> {
        self.trip_place_repo
            .find_for_trip(trip_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip place {id}")))
    }

    async fn entry(&self, row: trip_place::Model) -> AppResult<ItineraryEntry> {
        let place = self.place_repo.get_by_id(row.place_id).await?;
        Ok(ItineraryEntry { entry: row, place })
    }

    async fn check_place(&self, errors: &mut FieldErrors, place_id: i32) -> AppResult<()> {
        if !self.place_repo.exists(place_id).await? {
            errors.add("place_id", NO_SUCH_PLACE);
        }
        Ok(())
    }

    /// List a trip's itinerary ordered by date.
    pub async fn list(&self, trip_id: Uuid) -> AppResult<Vec<ItineraryEntry>> {
        if !self.trip_repo.exists(trip_id).await? {
            return Err(AppError::NotFound(format!("Trip {trip_id}")));
        }
        let rows = self.trip_place_repo.list_by_trip(trip_id).await?;
        entries(&self.place_repo, rows).await
    }

    /// Get one itinerary entry of a trip.
    pub async fn get(&self, trip_id: Uuid, id: i32) -> AppResult<ItineraryEntry> {
        let row = self.find_scoped(trip_id, id).await?;
        self.entry(row).await
    }

    /// Add a place to a trip, or merge into the entry for the same place and date.
    ///
    /// Returns the entry and whether it was newly created.
    pub async fn add(
        &self,
        trip_id: Uuid,
        user: Option<&user::Model>,
        input: TripPlaceInput,
    ) -> AppResult<(ItineraryEntry, bool)> {
        self.modifiable_trip(trip_id, user).await?;

        let mut errors = FieldErrors::new();
        self.check_place(&mut errors, input.place_id).await?;
        validation::duration(&mut errors, "duration", input.duration);
        errors.into_result()?;

        let outcome = self
            .trip_place_repo
            .upsert(trip_id, input.place_id, input.date, input.duration)
            .await?;

        let (row, created) = match outcome {
            Upserted::Created(row) => {
                tracing::info!(id = row.id, %trip_id, place_id = row.place_id, "Added place to trip");
                (row, true)
            }
            Upserted::Merged(row) => (row, false),
            Upserted::PlaceDateTaken => {
                return Err(AppError::invalid("date", PLACE_DATE_TAKEN));
            }
        };

        Ok((self.entry(row).await?, created))
    }

    /// Edit the duration or date of an entry.
    pub async fn update(
        &self,
        trip_id: Uuid,
        id: i32,
        user: Option<&user::Model>,
        input: UpdateTripPlaceInput,
    ) -> AppResult<ItineraryEntry> {
        self.modifiable_trip(trip_id, user).await?;
        let existing = self.find_scoped(trip_id, id).await?;

        let mut errors = FieldErrors::new();
        if let Some(place_id) = input.place_id {
            self.check_place(&mut errors, place_id).await?;
        }
        if let Some(duration) = input.duration {
            validation::duration(&mut errors, "duration", duration);
        }
        // Checked against the entry's own place, which may include the entry itself
        if let Some(Some(date)) = input.date {
            if self
                .trip_place_repo
                .place_date_taken(existing.place_id, date)
                .await?
            {
                errors.add("date", PLACE_DATE_TAKEN);
            }
        }
        errors.into_result()?;

        let mut active = existing.into_active_model();
        if let Some(duration) = input.duration {
            active.duration = Set(duration);
        }
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        let updated = self.trip_place_repo.update(active).await?;

        tracing::info!(id, %trip_id, "Updated trip place");
        self.entry(updated).await
    }

    /// Remove an entry from a trip.
    pub async fn delete(
        &self,
        trip_id: Uuid,
        id: i32,
        user: Option<&user::Model>,
    ) -> AppResult<()> {
        self.modifiable_trip(trip_id, user).await?;
        self.find_scoped(trip_id, id).await?;

        if !self.trip_place_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Trip place {id}")));
        }
        tracing::info!(id, %trip_id, "Removed place from trip");
        Ok(())
    }
}

//! Trip service.

use std::collections::HashMap;

use crate::services::itinerary::{ItineraryEntry, entries};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::Set;
use uuid::Uuid;
use wayfarer_common::{AppError, AppResult, IdGenerator};
use wayfarer_db::{
    entities::{trip, user},
    repositories::{MemberRepository, PlaceRepository, TripPlaceRepository, TripRepository},
};

/// A trip with its itinerary and totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDetails {
    pub trip: trip::Model,
    /// Ordered by date; undated entries last.
    pub places: Vec<ItineraryEntry>,
    pub total_places: usize,
    /// Sum of the entry durations, in hours.
    pub total_duration: Decimal,
}

impl TripDetails {
    fn new(trip: trip::Model, places: Vec<ItineraryEntry>) -> Self {
        let total_duration = places.iter().map(|p| p.entry.duration).sum();
        Self {
            trip,
            total_places: places.len(),
            total_duration,
            places,
        }
    }
}

/// Reject a user who may not change a trip.
///
/// Trips without an owner are open to anyone. Owned trips may be changed by
/// their owner and by staff.
pub(crate) async fn ensure_can_modify(
    member_repo: &MemberRepository,
    trip: &trip::Model,
    user: Option<&user::Model>,
) -> AppResult<()> {
    let Some(owner) = trip.member_id else {
        return Ok(());
    };
    let user = user.ok_or(AppError::Unauthorized)?;
    if user.is_staff {
        return Ok(());
    }

    match member_repo.find_by_user_id(user.id).await? {
        Some(member) if member.id == owner => Ok(()),
        _ => Err(AppError::Forbidden(
            "Only the owner can change this trip.".to_string(),
        )),
    }
}

/// Trip service for business logic.
#[derive(Clone)]
pub struct TripService {
    trip_repo: TripRepository,
    trip_place_repo: TripPlaceRepository,
    place_repo: PlaceRepository,
    member_repo: MemberRepository,
    id_gen: IdGenerator,
}

impl TripService {
    /// Create a new trip service.
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
            id_gen: IdGenerator::new(),
        }
    }

    /// Start a trip, owned by the acting user's member when there is one.
    pub async fn create(&self, user: Option<&user::Model>) -> AppResult<TripDetails> {
        let member_id = match user {
            Some(user) => Some(self.member_repo.get_or_create(user.id).await?.id),
            None => None,
        };

        let trip = self
            .trip_repo
            .create(trip::ActiveModel {
                id: Set(self.id_gen.trip_id()),
                created_at: Set(Utc::now().into()),
                member_id: Set(member_id),
            })
            .await?;

        tracing::info!(trip_id = %trip.id, ?member_id, "Created trip");
        Ok(TripDetails::new(trip, vec![]))
    }

    /// Get a trip with its itinerary.
    pub async fn get(&self, id: Uuid) -> AppResult<TripDetails> {
        let trip = self.trip_repo.get_by_id(id).await?;
        let rows = self.trip_place_repo.list_by_trip(id).await?;
        let places = entries(&self.place_repo, rows).await?;
        Ok(TripDetails::new(trip, places))
    }

    /// Trips owned by the acting user, newest first.
    pub async fn list_mine(&self, user: &user::Model) -> AppResult<Vec<TripDetails>> {
        let Some(member) = self.member_repo.find_by_user_id(user.id).await? else {
            return Ok(vec![]);
        };

        let trips = self.trip_repo.list_by_member(member.id).await?;
        let ids: Vec<Uuid> = trips.iter().map(|t| t.id).collect();
        let rows = self.trip_place_repo.list_by_trips(&ids).await?;

        let mut by_trip: HashMap<Uuid, Vec<ItineraryEntry>> = HashMap::new();
        for entry in entries(&self.place_repo, rows).await? {
            by_trip.entry(entry.entry.trip_id).or_default().push(entry);
        }

        Ok(trips
            .into_iter()
            .map(|trip| {
                let places = by_trip.remove(&trip.id).unwrap_or_default();
                TripDetails::new(trip, places)
            })
            .collect())
    }

    /// Delete a trip and its itinerary.
    pub async fn delete(&self, id: Uuid, user: Option<&user::Model>) -> AppResult<()> {
        let trip = self.trip_repo.get_by_id(id).await?;
        ensure_can_modify(&self.member_repo, &trip, user).await?;

        if !self.trip_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Trip {id}")));
        }
        tracing::info!(trip_id = %id, "Deleted trip");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use wayfarer_db::entities::{
        member,
        place::{self, PlaceStatus},
        trip_place,
    };

    fn create_test_trip(member_id: Option<i32>) -> trip::Model {
        trip::Model {
            id: Uuid::nil(),
            created_at: Utc::now().into(),
            member_id,
        }
    }

    fn create_test_place(id: i32) -> place::Model {
        let now = Utc::now().into();
        place::Model {
            id,
            name: format!("Place {id}"),
            description: None,
            lat: Decimal::ZERO,
            lon: Decimal::ZERO,
            rating: Decimal::from(5),
            status: PlaceStatus::Active,
            slug: format!("place-{id}"),
            created_at: now,
            status_change_at: now,
            last_update: now,
        }
    }

    fn create_test_entry(id: i32, place_id: i32, duration: Decimal) -> trip_place::Model {
        trip_place::Model {
            id,
            trip_id: Uuid::nil(),
            place_id,
            date: NaiveDate::from_ymd_opt(2024, 5, u32::try_from(id).unwrap()),
            duration,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_user(id: i32) -> user::Model {
        user::Model {
            id,
            username: format!("user{id}"),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            token: None,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now().into(),
        }
    }

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    #[tokio::test]
    async fn test_get_sums_itinerary() {
        let service = TripService::new(
            TripRepository::new(Arc::new(
                mock()
                    .append_query_results([[create_test_trip(None)]])
                    .into_connection(),
            )),
            TripPlaceRepository::new(Arc::new(
                mock()
                    .append_query_results([[
                        create_test_entry(1, 10, Decimal::new(250, 2)),
                        create_test_entry(2, 11, Decimal::new(175, 2)),
                    ]])
                    .into_connection(),
            )),
            PlaceRepository::new(Arc::new(
                mock()
                    .append_query_results([[create_test_place(10), create_test_place(11)]])
                    .into_connection(),
            )),
            MemberRepository::new(Arc::new(mock().into_connection())),
        );

        let details = service.get(Uuid::nil()).await.unwrap();

        assert_eq!(details.total_places, 2);
        assert_eq!(details.total_duration, Decimal::new(425, 2));
        assert_eq!(details.places[0].place.id, 10);
        assert_eq!(details.places[1].entry.id, 2);
    }

    #[tokio::test]
    async fn test_ownerless_trip_is_open() {
        let trip = create_test_trip(None);
        let members = MemberRepository::new(Arc::new(mock().into_connection()));

        assert!(ensure_can_modify(&members, &trip, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_owned_trip_needs_owner() {
        let trip = create_test_trip(Some(3));
        let members = MemberRepository::new(Arc::new(
            mock()
                .append_query_results([[member::Model {
                    id: 4,
                    user_id: 9,
                    birth_date: None,
                    joined_at: Utc::now().into(),
                }]])
                .into_connection(),
        ));

        assert!(matches!(
            ensure_can_modify(&members, &trip, None).await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            ensure_can_modify(&members, &trip, Some(&create_test_user(9))).await,
            Err(AppError::Forbidden(_))
        ));
    }
}

//! Place service.

use std::collections::HashMap;

use crate::services::address::{AddressDetails, AddressInput, AddressService};
use crate::services::{nullable, page_limit};
use crate::validation;
use rust_decimal::Decimal;
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use wayfarer_common::{AppError, AppResult, FieldErrors};
use wayfarer_db::{
    entities::{
        place::{self, PlaceStatus, RatingBand},
        transit,
    },
    repositories::{
        AddressRepository, PlaceFilter, PlaceOrdering, PlaceRepository, TransitRepository,
    },
};

/// A place with its address resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceDetails {
    pub place: place::Model,
    pub address: Option<AddressDetails>,
}

/// Input for creating or replacing a place.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceInput {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub lat: Decimal,
    pub lon: Decimal,
    pub rating: Option<Decimal>,
    pub slug: Option<String>,
    /// Created or replaced along with the place.
    pub address: Option<AddressInput>,
}

/// Input for a partial place update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlaceInput {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub lat: Option<Decimal>,
    pub lon: Option<Decimal>,
    pub rating: Option<Decimal>,
    pub slug: Option<String>,
    pub status: Option<PlaceStatus>,
}

impl From<PlaceInput> for UpdatePlaceInput {
    fn from(input: PlaceInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
            lat: Some(input.lat),
            lon: Some(input.lon),
            rating: input.rating,
            slug: input.slug,
            status: None,
        }
    }
}

/// Query parameters for listing places.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceListQuery {
    #[serde(rename = "rating__lt")]
    pub rating_lt: Option<Decimal>,
    #[serde(rename = "rating__gt")]
    pub rating_gt: Option<Decimal>,
    #[serde(rename = "address_set__state")]
    pub state: Option<i32>,
    pub rating_band: Option<RatingBand>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PlaceListQuery {
    fn into_filter(self) -> AppResult<PlaceFilter> {
        let ordering = match self.ordering.as_deref().filter(|o| !o.is_empty()) {
            Some(ordering) => ordering
                .parse::<PlaceOrdering>()
                .map_err(AppError::BadRequest)?,
            None => PlaceOrdering::default(),
        };

        let mut rating_lt = self.rating_lt;
        let mut rating_gte = None;
        if let Some(band) = self.rating_band {
            let (lower, upper) = band.bounds();
            rating_gte = lower;
            if let Some(upper) = upper {
                rating_lt = Some(rating_lt.map_or(upper, |lt| lt.min(upper)));
            }
        }

        Ok(PlaceFilter {
            rating_lt,
            rating_gt: self.rating_gt,
            rating_gte,
            state_id: self.state,
            search: self.search,
            ordering,
            limit: page_limit(self.limit),
            offset: self.offset.unwrap_or(0),
        })
    }
}

fn validate_slug(errors: &mut FieldErrors, slug: &str) {
    validation::max_chars(errors, "slug", slug, 255);
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        errors.add(
            "slug",
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        );
    }
}

fn validate(input: &UpdatePlaceInput) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if let Some(name) = &input.name {
        validation::max_chars(&mut errors, "name", name, 255);
    }
    if let Some(lat) = input.lat {
        validation::coordinate(&mut errors, "lat", lat);
    }
    if let Some(lon) = input.lon {
        validation::coordinate(&mut errors, "lon", lon);
    }
    if let Some(rating) = input.rating {
        validation::rating(&mut errors, "rating", rating);
    }
    if let Some(slug) = input.slug.as_deref().filter(|s| !s.is_empty()) {
        validate_slug(&mut errors, slug);
    }
    errors.into_result()
}

fn changes(existing: place::Model, input: UpdatePlaceInput) -> place::ActiveModel {
    let name = input.name.clone().unwrap_or_else(|| existing.name.clone());
    let mut active = existing.into_active_model();
    if let Some(name) = input.name {
        active.name = Set(name);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(lat) = input.lat {
        active.lat = Set(lat);
    }
    if let Some(lon) = input.lon {
        active.lon = Set(lon);
    }
    if let Some(rating) = input.rating {
        active.rating = Set(rating);
    }
    if let Some(slug) = input.slug {
        active.slug = Set(if slug.is_empty() {
            validation::slugify(&name)
        } else {
            slug
        });
    }
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    active
}

/// Place service for business logic.
#[derive(Clone)]
pub struct PlaceService {
    place_repo: PlaceRepository,
    address_repo: AddressRepository,
    transit_repo: TransitRepository,
    address_service: AddressService,
}

impl PlaceService {
    /// Create a new place service.
    #[must_use]
    pub const fn new(
        place_repo: PlaceRepository,
        address_repo: AddressRepository,
        transit_repo: TransitRepository,
        address_service: AddressService,
    ) -> Self {
        Self {
            place_repo,
            address_repo,
            transit_repo,
            address_service,
        }
    }

    async fn with_addresses(&self, places: Vec<place::Model>) -> AppResult<Vec<PlaceDetails>> {
        let ids: Vec<i32> = places.iter().map(|p| p.id).collect();
        let addresses = self.address_repo.find_by_places(&ids).await?;
        let mut by_place: HashMap<i32, AddressDetails> = self
            .address_service
            .hydrate(addresses)
            .await?
            .into_iter()
            .map(|a| (a.address.place_id, a))
            .collect();

        Ok(places
            .into_iter()
            .map(|place| PlaceDetails {
                address: by_place.remove(&place.id),
                place,
            })
            .collect())
    }

    async fn with_address(&self, place: place::Model) -> AppResult<PlaceDetails> {
        self.with_addresses(vec![place])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("place hydration returned nothing".to_string()))
    }

    /// List places.
    pub async fn list(&self, query: PlaceListQuery) -> AppResult<Vec<PlaceDetails>> {
        let filter = query.into_filter()?;
        let places = self.place_repo.list(&filter).await?;
        self.with_addresses(places).await
    }

    /// Get a place.
    pub async fn get(&self, id: i32) -> AppResult<PlaceDetails> {
        let place = self.place_repo.get_by_id(id).await?;
        self.with_address(place).await
    }

    /// Create a place. New places are always active.
    ///
    /// An embedded address is validated before anything is written and saved
    /// in the same transaction as the place.
    pub async fn create(&self, input: PlaceInput) -> AppResult<PlaceDetails> {
        let address = input.address.clone();
        let input = UpdatePlaceInput::from(input);
        validate(&input)?;
        let address = match address {
            Some(address) => Some(self.address_service.draft(address).await?),
            None => None,
        };

        let name = input.name.unwrap_or_default();
        let slug = input
            .slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| validation::slugify(&name));

        let model = place::ActiveModel {
            name: Set(name),
            description: Set(input.description.flatten()),
            lat: Set(input.lat.unwrap_or_default()),
            lon: Set(input.lon.unwrap_or_default()),
            rating: Set(input.rating.unwrap_or_else(|| Decimal::from(5))),
            status: Set(PlaceStatus::Active),
            slug: Set(slug),
            ..Default::default()
        };
        let (place, address) = self.place_repo.create_with_address(model, address).await?;
        tracing::info!(place_id = place.id, name = %place.name, "Created place");

        let address = match address {
            Some(address) => Some(self.address_service.details(address).await?),
            None => None,
        };

        Ok(PlaceDetails { place, address })
    }

    /// Replace a place, creating or replacing its embedded address.
    ///
    /// Both are validated first, then written in one transaction.
    pub async fn replace(&self, id: i32, input: PlaceInput) -> AppResult<PlaceDetails> {
        let existing = self.place_repo.get_by_id(id).await?;
        let address = input.address.clone();
        let input = UpdatePlaceInput::from(input);
        validate(&input)?;

        let address = match address {
            Some(address) => Some(self.address_service.prepare_for_place(id, address).await?),
            None => None,
        };

        let active = changes(existing, input);
        let place = self.place_repo.update_with_address(active, address).await?;
        tracing::info!(place_id = place.id, "Replaced place");
        self.with_address(place).await
    }

    /// Update some fields of a place; the rest keep their values.
    pub async fn update(&self, id: i32, input: UpdatePlaceInput) -> AppResult<PlaceDetails> {
        let existing = self.place_repo.get_by_id(id).await?;
        validate(&input)?;

        let place = self.place_repo.update(changes(existing, input)).await?;
        tracing::info!(place_id = place.id, "Updated place");
        self.with_address(place).await
    }

    /// Delete a place with everything it owns.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.place_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Place {id}")));
        }
        tracing::info!(place_id = id, "Deleted place");
        Ok(())
    }

    /// Transits serving a place.
    pub async fn transits(&self, place_id: i32) -> AppResult<Vec<transit::Model>> {
        if !self.place_repo.exists(place_id).await? {
            return Err(AppError::NotFound(format!("Place {place_id}")));
        }
        self.place_repo.transits(place_id).await
    }

    /// Link a transit to a place.
    pub async fn add_transit(&self, place_id: i32, transit_id: i32) -> AppResult<transit::Model> {
        if !self.place_repo.exists(place_id).await? {
            return Err(AppError::NotFound(format!("Place {place_id}")));
        }
        let transit = self.transit_repo.find_by_id(transit_id).await?.ok_or_else(|| {
            AppError::invalid(
                "transit_id",
                format!("Invalid pk \"{transit_id}\" - object does not exist."),
            )
        })?;

        self.place_repo.add_transit(place_id, transit_id).await?;
        Ok(transit)
    }

    /// Unlink a transit from a place.
    pub async fn remove_transit(&self, place_id: i32, transit_id: i32) -> AppResult<()> {
        if self.place_repo.remove_transit(place_id, transit_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Transit {transit_id} of place {place_id}"
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use wayfarer_db::entities::address;
    use wayfarer_db::repositories::{CountryRepository, StateRepository};

    fn create_test_place(id: i32, description: Option<&str>) -> place::Model {
        let now = Utc::now().into();
        place::Model {
            id,
            name: "Pasir Buaya".to_string(),
            description: description.map(ToString::to_string),
            lat: Decimal::new(5_438_918, 6),
            lon: Decimal::new(100_180_263, 6),
            rating: Decimal::from(3),
            status: PlaceStatus::Active,
            slug: "pasir-buaya".to_string(),
            created_at: now,
            status_change_at: now,
            last_update: now,
        }
    }

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn service(place_db: MockDatabase, address_db: MockDatabase) -> PlaceService {
        let place_repo = PlaceRepository::new(Arc::new(place_db.into_connection()));
        let address_repo = AddressRepository::new(Arc::new(address_db.into_connection()));
        let address_service = AddressService::new(
            address_repo.clone(),
            place_repo.clone(),
            StateRepository::new(Arc::new(mock().into_connection())),
            CountryRepository::new(Arc::new(mock().into_connection())),
        );
        PlaceService::new(
            place_repo,
            address_repo,
            TransitRepository::new(Arc::new(mock().into_connection())),
            address_service,
        )
    }

    #[test]
    fn test_band_narrows_rating_filter() {
        let query = PlaceListQuery {
            rating_lt: Some(Decimal::new(45, 1)),
            rating_band: Some(RatingBand::Good),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();

        assert_eq!(filter.rating_gte, Some(Decimal::from(4)));
        assert_eq!(filter.rating_lt, Some(Decimal::new(45, 1)));
        assert_eq!(filter.limit, 20);
    }

    #[test]
    fn test_unknown_ordering_is_rejected() {
        let query = PlaceListQuery {
            ordering: Some("name".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_filter(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_query_uses_filter_parameter_names() {
        let query: PlaceListQuery = serde_json::from_value(serde_json::json!({
            "rating__gt": "2.5",
            "address_set__state": 3,
            "rating_band": "perfect",
        }))
        .unwrap();

        assert_eq!(query.rating_gt, Some(Decimal::new(25, 1)));
        assert_eq!(query.state, Some(3));
        assert_eq!(query.rating_band, Some(RatingBand::Perfect));
    }

    #[tokio::test]
    async fn test_create_forces_active_and_derives_slug() {
        let created = create_test_place(1, None);
        let service = service(mock().append_query_results([[created.clone()]]), mock());

        let input = PlaceInput {
            name: Some("Pasir Buaya".to_string()),
            description: None,
            lat: Decimal::new(5_438_918, 6),
            lon: Decimal::new(100_180_263, 6),
            rating: Some(Decimal::from(3)),
            slug: None,
            address: None,
        };
        let details = service.create(input).await.unwrap();

        assert_eq!(details.place.status, PlaceStatus::Active);
        assert_eq!(details.place.slug, "pasir-buaya");
        assert!(details.address.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_rating() {
        let service = service(mock(), mock());

        let input = PlaceInput {
            name: Some("Pasir Buaya".to_string()),
            description: None,
            lat: Decimal::new(5_438_918, 6),
            lon: Decimal::new(100_180_263, 6),
            rating: Some(Decimal::from(6)),
            slug: None,
            address: None,
        };

        match service.create(input).await {
            Err(AppError::Validation(fields)) => assert!(fields.get("rating").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let existing = create_test_place(1, None);
        let updated = create_test_place(1, Some("Fishing village beach"));
        let service = service(
            mock()
                .append_query_results([[existing.clone()]])
                .append_query_results([[updated.clone()]]),
            mock().append_query_results([Vec::<address::Model>::new()]),
        );

        let input = UpdatePlaceInput {
            description: Some(Some("Fishing village beach".to_string())),
            ..Default::default()
        };
        let details = service.update(1, input).await.unwrap();

        assert_eq!(details.place.rating, existing.rating);
        assert_eq!(details.place.lat, existing.lat);
        assert_eq!(details.place.lon, existing.lon);
        assert_eq!(
            details.place.description.as_deref(),
            Some("Fishing village beach")
        );
    }

    #[tokio::test]
    async fn test_delete_missing_place() {
        let service = service(
            mock().append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ]),
            mock(),
        );

        assert!(matches!(service.delete(9).await, Err(AppError::NotFound(_))));
    }

    fn beach_input(rating: Decimal) -> PlaceInput {
        PlaceInput {
            name: Some("Pasir Buaya".to_string()),
            description: None,
            lat: Decimal::new(5_438_918, 6),
            lon: Decimal::new(100_180_263, 6),
            rating: Some(rating),
            slug: None,
            address: Some(AddressInput {
                street: Some("Jalan Pantai".to_string()),
                ..Default::default()
            }),
        }
    }

    fn service_over(
        place_db: &Arc<sea_orm::DatabaseConnection>,
        address_db: &Arc<sea_orm::DatabaseConnection>,
    ) -> PlaceService {
        let place_repo = PlaceRepository::new(Arc::clone(place_db));
        let address_repo = AddressRepository::new(Arc::clone(address_db));
        let address_service = AddressService::new(
            address_repo.clone(),
            place_repo.clone(),
            StateRepository::new(Arc::new(mock().into_connection())),
            CountryRepository::new(Arc::new(mock().into_connection())),
        );
        PlaceService::new(
            place_repo,
            address_repo,
            TransitRepository::new(Arc::new(mock().into_connection())),
            address_service,
        )
    }

    #[tokio::test]
    async fn test_rejected_replace_leaves_address_untouched() {
        let place_db = Arc::new(
            mock()
                .append_query_results([[create_test_place(1, None)]])
                .into_connection(),
        );
        let address_db = Arc::new(mock().into_connection());
        let service = service_over(&place_db, &address_db);

        match service.replace(1, beach_input(Decimal::from(9))).await {
            Err(AppError::Validation(fields)) => assert_eq!(
                fields.get("rating").unwrap(),
                ["Ensure this value is less than or equal to 5.".to_string()]
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
        drop(service);

        let place_log = format!("{:?}", Arc::try_unwrap(place_db).unwrap().into_transaction_log());
        let address_log = Arc::try_unwrap(address_db).unwrap().into_transaction_log();
        assert!(!place_log.contains("INSERT"));
        assert!(!place_log.contains("UPDATE"));
        assert!(address_log.is_empty());
    }

    #[tokio::test]
    async fn test_replace_saves_place_and_address_together() {
        let saved_address = address::Model {
            place_id: 1,
            street: Some("Jalan Pantai".to_string()),
            city: None,
            postcode: None,
            state_id: None,
            country_id: None,
        };
        let place_db = Arc::new(
            mock()
                .append_query_results([[create_test_place(1, None)]])
                .append_query_results([[saved_address.clone()]])
                .append_query_results([[create_test_place(1, None)]])
                .into_connection(),
        );
        let address_db = Arc::new(
            mock()
                .append_query_results([Vec::<address::Model>::new()])
                .append_query_results([[saved_address]])
                .into_connection(),
        );
        let service = service_over(&place_db, &address_db);

        let details = service.replace(1, beach_input(Decimal::from(4))).await.unwrap();
        drop(service);

        assert_eq!(
            details.address.unwrap().address.street.as_deref(),
            Some("Jalan Pantai")
        );
        let log = Arc::try_unwrap(place_db).unwrap().into_transaction_log();
        let txn = format!("{:?}", log.last().unwrap());
        assert!(txn.contains("BEGIN"));
        assert!(txn.contains("INSERT INTO"));
        assert!(txn.contains("UPDATE"));
        assert!(txn.contains("COMMIT"));
    }
}

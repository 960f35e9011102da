//! Address service.
//!
//! A place has at most one address, keyed by the place id, so the nested
//! address id must equal the place id in the URL.

use std::collections::HashMap;

use crate::services::nullable;
use crate::validation;
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use wayfarer_common::{AppError, AppResult, FieldErrors};
use wayfarer_db::{
    entities::{address, country, state},
    repositories::{
        AddressChange, AddressRepository, CountryRepository, PlaceRepository, StateRepository,
    },
};

/// An address with its state and country resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDetails {
    pub address: address::Model,
    pub state: Option<state::Model>,
    pub country: Option<country::Model>,
}

/// Input for creating or replacing an address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressInput {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub state_id: Option<i32>,
    pub country_id: Option<i32>,
}

/// Input for a partial address update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAddressInput {
    #[serde(default, deserialize_with = "nullable")]
    pub street: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub postcode: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub state_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub country_id: Option<Option<i32>>,
}

impl From<AddressInput> for UpdateAddressInput {
    fn from(input: AddressInput) -> Self {
        Self {
            street: Some(input.street),
            city: Some(input.city),
            postcode: Some(input.postcode),
            state_id: Some(input.state_id),
            country_id: Some(input.country_id),
        }
    }
}

/// Address service for business logic.
#[derive(Clone)]
pub struct AddressService {
    address_repo: AddressRepository,
    place_repo: PlaceRepository,
    state_repo: StateRepository,
    country_repo: CountryRepository,
}

impl AddressService {
    /// Create a new address service.
    #[must_use]
    pub const fn new(
        address_repo: AddressRepository,
        place_repo: PlaceRepository,
        state_repo: StateRepository,
        country_repo: CountryRepository,
    ) -> Self {
        Self {
            address_repo,
            place_repo,
            state_repo,
            country_repo,
        }
    }

    /// Resolve states and countries for a batch of addresses.
    pub async fn hydrate(&self, addresses: Vec<address::Model>) -> AppResult<Vec<AddressDetails>> {
        let state_ids: Vec<i32> = addresses.iter().filter_map(|a| a.state_id).collect();
        let country_ids: Vec<i32> = addresses.iter().filter_map(|a| a.country_id).collect();

        let states: HashMap<i32, state::Model> = self
            .state_repo
            .find_by_ids(&state_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let countries: HashMap<i32, country::Model> = self
            .country_repo
            .find_by_ids(&country_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(addresses
            .into_iter()
            .map(|address| AddressDetails {
                state: address.state_id.and_then(|id| states.get(&id).cloned()),
                country: address.country_id.and_then(|id| countries.get(&id).cloned()),
                address,
            })
            .collect())
    }

    pub(crate) async fn details(&self, address: address::Model) -> AppResult<AddressDetails> {
        self.hydrate(vec![address])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("address hydration returned nothing".to_string()))
    }

    async fn ensure_place(&self, place_id: i32) -> AppResult<()> {
        if self.place_repo.exists(place_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Place {place_id}")))
        }
    }

    async fn find_scoped(&self, place_id: i32, id: i32) -> AppResult<address::Model> {
        if id != place_id {
            return Err(AppError::NotFound(format!("Address {id}")));
        }
        self.address_repo
            .find_by_place(place_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Address {id}")))
    }

    async fn validate(&self, input: &UpdateAddressInput) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        for (field, value) in [
            ("street", &input.street),
            ("city", &input.city),
            ("postcode", &input.postcode),
        ] {
            if let Some(Some(value)) = value {
                validation::max_chars(&mut errors, field, value, 255);
            }
        }
        if let Some(Some(state_id)) = input.state_id {
            if self.state_repo.find_by_id(state_id).await?.is_none() {
                errors.add(
                    "state_id",
                    format!("Invalid pk \"{state_id}\" - object does not exist."),
                );
            }
        }
        if let Some(Some(country_id)) = input.country_id {
            if self.country_repo.find_by_id(country_id).await?.is_none() {
                errors.add(
                    "country_id",
                    format!("Invalid pk \"{country_id}\" - object does not exist."),
                );
            }
        }
        errors.into_result()
    }

    fn apply(active: &mut address::ActiveModel, input: UpdateAddressInput) {
        if let Some(street) = input.street {
            active.street = Set(street);
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(postcode) = input.postcode {
            active.postcode = Set(postcode);
        }
        if let Some(state_id) = input.state_id {
            active.state_id = Set(state_id);
        }
        if let Some(country_id) = input.country_id {
            active.country_id = Set(country_id);
        }
    }

    /// List the addresses of a place (zero or one).
    pub async fn list(&self, place_id: i32) -> AppResult<Vec<AddressDetails>> {
        self.ensure_place(place_id).await?;
        let address = self.address_repo.find_by_place(place_id).await?;
        self.hydrate(address.into_iter().collect()).await
    }

    /// Get the address of a place.
    pub async fn get(&self, place_id: i32, id: i32) -> AppResult<AddressDetails> {
        let address = self.find_scoped(place_id, id).await?;
        self.details(address).await
    }

    /// Create the address of a place.
    pub async fn create(&self, place_id: i32, input: AddressInput) -> AppResult<AddressDetails> {
        self.ensure_place(place_id).await?;
        if self.address_repo.find_by_place(place_id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Place {place_id} already has an address"
            )));
        }

        let input = UpdateAddressInput::from(input);
        self.validate(&input).await?;

        let mut active = address::ActiveModel {
            place_id: Set(place_id),
            ..Default::default()
        };
        Self::apply(&mut active, input);
        let created = self.address_repo.create(active).await?;

        tracing::info!(place_id, "Created address");
        self.details(created).await
    }

    /// Replace every field of a place's address.
    pub async fn replace(
        &self,
        place_id: i32,
        id: i32,
        input: AddressInput,
    ) -> AppResult<AddressDetails> {
        self.update(place_id, id, input.into()).await
    }

    /// Update some fields of a place's address.
    pub async fn update(
        &self,
        place_id: i32,
        id: i32,
        input: UpdateAddressInput,
    ) -> AppResult<AddressDetails> {
        let existing = self.find_scoped(place_id, id).await?;
        self.validate(&input).await?;

        let mut active = existing.into_active_model();
        Self::apply(&mut active, input);
        let updated = self.address_repo.update(active).await?;

        self.details(updated).await
    }

    /// Validate an address for a place that does not exist yet.
    pub(crate) async fn draft(&self, input: AddressInput) -> AppResult<address::ActiveModel> {
        let input = UpdateAddressInput::from(input);
        self.validate(&input).await?;

        let mut active = address::ActiveModel::default();
        Self::apply(&mut active, input);
        Ok(active)
    }

    /// Validate the replacement address of an existing place.
    ///
    /// Reads only; the caller saves the change together with the place.
    pub(crate) async fn prepare_for_place(
        &self,
        place_id: i32,
        input: AddressInput,
    ) -> AppResult<AddressChange> {
        let input = UpdateAddressInput::from(input);
        self.validate(&input).await?;

        Ok(match self.address_repo.find_by_place(place_id).await? {
            Some(existing) => {
                let mut active = existing.into_active_model();
                Self::apply(&mut active, input);
                AddressChange::Update(active)
            }
            None => {
                let mut active = address::ActiveModel {
                    place_id: Set(place_id),
                    ..Default::default()
                };
                Self::apply(&mut active, input);
                AddressChange::Insert(active)
            }
        })
    }

    /// Addresses belong to their place and are only removed with it.
    pub async fn delete(&self, place_id: i32, id: i32) -> AppResult<()> {
        self.find_scoped(place_id, id).await?;
        Err(AppError::Protected(
            "Address associated with place cannot be deleted".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_address(place_id: i32) -> address::Model {
        address::Model {
            place_id,
            street: None,
            city: Some("Yan".to_string()),
            postcode: None,
            state_id: Some(2),
            country_id: None,
        }
    }

    fn create_test_state(id: i32) -> state::Model {
        state::Model {
            id,
            name: "Kedah".to_string(),
            lat: Decimal::new(6_120_000, 6),
            lon: Decimal::new(100_370_000, 6),
        }
    }

    fn service(
        address_db: MockDatabase,
        place_db: MockDatabase,
        state_db: MockDatabase,
    ) -> AddressService {
        AddressService::new(
            AddressRepository::new(Arc::new(address_db.into_connection())),
            PlaceRepository::new(Arc::new(place_db.into_connection())),
            StateRepository::new(Arc::new(state_db.into_connection())),
            CountryRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
        )
    }

    #[tokio::test]
    async fn test_get_resolves_state() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_address(5)]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_state(2)]]),
        );

        let details = service.get(5, 5).await.unwrap();

        assert_eq!(details.state.unwrap().name, "Kedah");
        assert!(details.country.is_none());
    }

    #[tokio::test]
    async fn test_get_under_wrong_place_is_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.get(5, 6).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_refused() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_address(5)]]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        match service.delete(5, 5).await {
            Err(AppError::Protected(msg)) => {
                assert_eq!(msg, "Address associated with place cannot be deleted");
            }
            other => panic!("expected Protected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<address::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        assert!(matches!(service.delete(5, 5).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_with_unknown_state() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<address::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
                maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(1)) },
            ]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<state::Model>::new()]),
        );

        let input = AddressInput {
            state_id: Some(40),
            ..Default::default()
        };

        match service.create(5, input).await {
            Err(AppError::Validation(fields)) => {
                assert_eq!(
                    fields.get("state_id").unwrap(),
                    ["Invalid pk \"40\" - object does not exist.".to_string()]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_when_address_exists_conflicts() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_address(5)]]),
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
                maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(1)) },
            ]]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.create(5, AddressInput::default()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}

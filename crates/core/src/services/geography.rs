//! Country and state service.

use crate::services::page_limit;
use crate::validation;
use rust_decimal::Decimal;
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use validator::Validate;
use wayfarer_common::{AppError, AppResult, FieldErrors};
use wayfarer_db::{
    entities::{country, state},
    repositories::{AddressRepository, CountryRepository, StateRepository},
};

/// Input for creating or replacing a country.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CountryInput {
    #[validate(length(max = 3, message = "Ensure this field has no more than 3 characters."))]
    pub code: String,
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub name: String,
    pub lat: Decimal,
    pub lon: Decimal,
}

/// Input for a partial country update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCountryInput {
    #[validate(length(max = 3, message = "Ensure this field has no more than 3 characters."))]
    pub code: Option<String>,
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub name: Option<String>,
    pub lat: Option<Decimal>,
    pub lon: Option<Decimal>,
}

impl From<CountryInput> for UpdateCountryInput {
    fn from(input: CountryInput) -> Self {
        Self {
            code: Some(input.code),
            name: Some(input.name),
            lat: Some(input.lat),
            lon: Some(input.lon),
        }
    }
}

/// Input for creating or replacing a state.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StateInput {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub name: String,
    pub lat: Decimal,
    pub lon: Decimal,
}

/// Input for a partial state update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStateInput {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub name: Option<String>,
    pub lat: Option<Decimal>,
    pub lon: Option<Decimal>,
}

impl From<StateInput> for UpdateStateInput {
    fn from(input: StateInput) -> Self {
        Self {
            name: Some(input.name),
            lat: Some(input.lat),
            lon: Some(input.lon),
        }
    }
}

fn check(
    validated: Result<(), validator::ValidationErrors>,
    lat: Option<Decimal>,
    lon: Option<Decimal>,
) -> AppResult<()> {
    let mut errors = validated.map_or_else(FieldErrors::from, |()| FieldErrors::new());
    if let Some(lat) = lat {
        validation::coordinate(&mut errors, "lat", lat);
    }
    if let Some(lon) = lon {
        validation::coordinate(&mut errors, "lon", lon);
    }
    errors.into_result()
}

/// Service for countries and states.
#[derive(Clone)]
pub struct GeographyService {
    country_repo: CountryRepository,
    state_repo: StateRepository,
    address_repo: AddressRepository,
}

impl GeographyService {
    /// Create a new geography service.
    #[must_use]
    pub const fn new(
        country_repo: CountryRepository,
        state_repo: StateRepository,
        address_repo: AddressRepository,
    ) -> Self {
        Self {
            country_repo,
            state_repo,
            address_repo,
        }
    }

    // === Countries ===

    /// List countries.
    pub async fn list_countries(
        &self,
        search: Option<&str>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<Vec<country::Model>> {
        self.country_repo
            .list(search, page_limit(limit), offset.unwrap_or(0))
            .await
    }

    /// Get a country.
    pub async fn get_country(&self, id: i32) -> AppResult<country::Model> {
        self.country_repo.get_by_id(id).await
    }

    /// Create a country.
    pub async fn create_country(&self, input: CountryInput) -> AppResult<country::Model> {
        check(input.validate(), Some(input.lat), Some(input.lon))?;

        let created = self
            .country_repo
            .create(country::ActiveModel {
                code: Set(input.code),
                name: Set(input.name),
                lat: Set(input.lat),
                lon: Set(input.lon),
                ..Default::default()
            })
            .await?;
        tracing::info!(country_id = created.id, code = %created.code, "Created country");
        Ok(created)
    }

    /// Update a country; absent fields keep their values.
    pub async fn update_country(
        &self,
        id: i32,
        input: UpdateCountryInput,
    ) -> AppResult<country::Model> {
        let existing = self.country_repo.get_by_id(id).await?;
        check(input.validate(), input.lat, input.lon)?;

        let mut active = existing.into_active_model();
        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(lat) = input.lat {
            active.lat = Set(lat);
        }
        if let Some(lon) = input.lon {
            active.lon = Set(lon);
        }
        self.country_repo.update(active).await
    }

    /// Delete a country no address refers to.
    pub async fn delete_country(&self, id: i32) -> AppResult<()> {
        self.country_repo.get_by_id(id).await?;
        let referenced = self.address_repo.count_by_country(id).await?;
        if referenced > 0 {
            return Err(AppError::Protected(format!(
                "Country {id} is used by {referenced} address(es) and cannot be deleted"
            )));
        }

        if !self.country_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Country {id}")));
        }
        tracing::info!(country_id = id, "Deleted country");
        Ok(())
    }

    // === States ===

    /// List states.
    pub async fn list_states(
        &self,
        search: Option<&str>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<Vec<state::Model>> {
        self.state_repo
            .list(search, page_limit(limit), offset.unwrap_or(0))
            .await
    }

    /// Get a state.
    pub async fn get_state(&self, id: i32) -> AppResult<state::Model> {
        self.state_repo.get_by_id(id).await
    }

    /// Create a state.
    pub async fn create_state(&self, input: StateInput) -> AppResult<state::Model> {
        check(input.validate(), Some(input.lat), Some(input.lon))?;

        let created = self
            .state_repo
            .create(state::ActiveModel {
                name: Set(input.name),
                lat: Set(input.lat),
                lon: Set(input.lon),
                ..Default::default()
            })
            .await?;
        tracing::info!(state_id = created.id, name = %created.name, "Created state");
        Ok(created)
    }

    /// Update a state; absent fields keep their values.
    pub async fn update_state(&self, id: i32, input: UpdateStateInput) -> AppResult<state::Model> {
        let existing = self.state_repo.get_by_id(id).await?;
        check(input.validate(), input.lat, input.lon)?;

        let mut active = existing.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(lat) = input.lat {
            active.lat = Set(lat);
        }
        if let Some(lon) = input.lon {
            active.lon = Set(lon);
        }
        self.state_repo.update(active).await
    }

    /// Delete a state no address refers to.
    pub async fn delete_state(&self, id: i32) -> AppResult<()> {
        self.state_repo.get_by_id(id).await?;
        let referenced = self.address_repo.count_by_state(id).await?;
        if referenced > 0 {
            return Err(AppError::Protected(format!(
                "State {id} is used by {referenced} address(es) and cannot be deleted"
            )));
        }

        if !self.state_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("State {id}")));
        }
        tracing::info!(state_id = id, "Deleted state");
        Ok(())
    }
}

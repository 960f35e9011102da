//! Transit service.

use crate::services::page_limit;
use crate::validation;
use rust_decimal::Decimal;
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use validator::Validate;
use wayfarer_common::{AppError, AppResult, FieldErrors};
use wayfarer_db::{
    entities::transit::{self, TransitMode},
    repositories::TransitRepository,
};

/// Input for creating or replacing a transit.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransitInput {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub name: String,
    pub lat: Decimal,
    pub long: Decimal,
    #[serde(default)]
    pub mode: TransitMode,
}

/// Input for a partial transit update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTransitInput {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub name: Option<String>,
    pub lat: Option<Decimal>,
    pub long: Option<Decimal>,
    pub mode: Option<TransitMode>,
}

impl From<TransitInput> for UpdateTransitInput {
    fn from(input: TransitInput) -> Self {
        Self {
            name: Some(input.name),
            lat: Some(input.lat),
            long: Some(input.long),
            mode: Some(input.mode),
        }
    }
}

fn validate(input: &UpdateTransitInput) -> AppResult<()> {
    let mut errors = input
        .validate()
        .map_or_else(FieldErrors::from, |()| FieldErrors::new());
    if let Some(lat) = input.lat {
        validation::coordinate(&mut errors, "lat", lat);
    }
    if let Some(long) = input.long {
        validation::coordinate(&mut errors, "long", long);
    }
    errors.into_result()
}

/// Transit service for business logic.
#[derive(Clone)]
pub struct TransitService {
    transit_repo: TransitRepository,
}

impl TransitService {
    /// Create a new transit service.
    #[must_use]
    pub const fn new(transit_repo: TransitRepository) -> Self {
        Self { transit_repo }
    }

    /// List transits.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<Vec<transit::Model>> {
        self.transit_repo
            .list(search, page_limit(limit), offset.unwrap_or(0))
            .await
    }

    /// Get a transit.
    pub async fn get(&self, id: i32) -> AppResult<transit::Model> {
        self.transit_repo.get_by_id(id).await
    }

    /// Create a transit.
    pub async fn create(&self, input: TransitInput) -> AppResult<transit::Model> {
        let input = UpdateTransitInput::from(input);
        validate(&input)?;

        let created = self
            .transit_repo
            .create(transit::ActiveModel {
                name: Set(input.name.unwrap_or_default()),
                lat: Set(input.lat.unwrap_or_default()),
                long: Set(input.long.unwrap_or_default()),
                mode: Set(input.mode.unwrap_or_default()),
                ..Default::default()
            })
            .await?;
        tracing::info!(transit_id = created.id, mode = ?created.mode, "Created transit");
        Ok(created)
    }

    /// Update a transit; absent fields keep their values.
    pub async fn update(&self, id: i32, input: UpdateTransitInput) -> AppResult<transit::Model> {
        let existing = self.transit_repo.get_by_id(id).await?;
        validate(&input)?;

        let mut active = existing.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(lat) = input.lat {
            active.lat = Set(lat);
        }
        if let Some(long) = input.long {
            active.long = Set(long);
        }
        if let Some(mode) = input.mode {
            active.mode = Set(mode);
        }
        self.transit_repo.update(active).await
    }

    /// Delete a transit and its place links.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.transit_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Transit {id}")));
        }
        tracing::info!(transit_id = id, "Deleted transit");
        Ok(())
    }
}

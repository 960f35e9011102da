//! Visitor (place review) service.

use crate::services::page_limit;
use crate::validation;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use wayfarer_common::{AppError, AppResult, FieldErrors};
use wayfarer_db::{
    entities::{
        user,
        visitor::{self, VisitType},
    },
    repositories::{MemberRepository, PlaceRepository, VisitorRepository},
};

/// Input for creating or replacing a review.
#[derive(Debug, Clone, Deserialize)]
pub struct VisitorInput {
    pub rating: Decimal,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub visit_type: VisitType,
}

/// Input for a partial review update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVisitorInput {
    pub rating: Option<Decimal>,
    pub review: Option<String>,
    pub visit_type: Option<VisitType>,
}

impl From<VisitorInput> for UpdateVisitorInput {
    fn from(input: VisitorInput) -> Self {
        Self {
            rating: Some(input.rating),
            review: Some(input.review),
            visit_type: Some(input.visit_type),
        }
    }
}

/// Visitor service for business logic.
#[derive(Clone)]
pub struct VisitorService {
    visitor_repo: VisitorRepository,
    place_repo: PlaceRepository,
    member_repo: MemberRepository,
}

impl VisitorService {
    /// Create a new visitor service.
    #[must_use]
    pub const fn new(
        visitor_repo: VisitorRepository,
        place_repo: PlaceRepository,
        member_repo: MemberRepository,
    ) -> Self {
        Self {
            visitor_repo,
            place_repo,
            member_repo,
        }
    }

    async fn ensure_place(&self, place_id: i32) -> AppResult<()> {
        if self.place_repo.exists(place_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Place {place_id}")))
        }
    }

    async fn find_scoped(&self, place_id: i32, id: i32) -> AppResult<visitor::Model> {
        self.visitor_repo
            .find_for_place(place_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Visitor {id}")))
    }

    /// Staff may edit any review, members only their own.
    async fn ensure_author(&self, review: &visitor::Model, user: &user::Model) -> AppResult<()> {
        if user.is_staff {
            return Ok(());
        }
        let member = self.member_repo.find_by_user_id(user.id).await?;
        match (member, review.member_id) {
            (Some(member), Some(author)) if member.id == author => Ok(()),
            _ => Err(AppError::Forbidden(
                "Only the author can change this review.".to_string(),
            )),
        }
    }

    /// List reviews of a place.
    pub async fn list(
        &self,
        place_id: i32,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<Vec<visitor::Model>> {
        self.ensure_place(place_id).await?;
        self.visitor_repo
            .list_by_place(place_id, page_limit(limit), offset.unwrap_or(0))
            .await
    }

    /// Get a review of a place.
    pub async fn get(&self, place_id: i32, id: i32) -> AppResult<visitor::Model> {
        self.find_scoped(place_id, id).await
    }

    /// Review a place as the acting user.
    pub async fn create(
        &self,
        place_id: i32,
        user: &user::Model,
        input: VisitorInput,
    ) -> AppResult<visitor::Model> {
        self.ensure_place(place_id).await?;

        let mut errors = FieldErrors::new();
        validation::rating(&mut errors, "rating", input.rating);
        errors.into_result()?;

        let member = self.member_repo.get_or_create(user.id).await?;
        let created = self
            .visitor_repo
            .create(visitor::ActiveModel {
                member_id: Set(Some(member.id)),
                rating: Set(input.rating),
                review: Set(input.review),
                visit_type: Set(input.visit_type),
                place_id: Set(place_id),
                created_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .await?;

        tracing::info!(visitor_id = created.id, place_id, member_id = member.id, "Created review");
        Ok(created)
    }

    /// Replace a review.
    pub async fn replace(
        &self,
        place_id: i32,
        id: i32,
        user: &user::Model,
        input: VisitorInput,
    ) -> AppResult<visitor::Model> {
        self.update(place_id, id, user, input.into()).await
    }

    /// Update some fields of a review.
    pub async fn update(
        &self,
        place_id: i32,
        id: i32,
        user: &user::Model,
        input: UpdateVisitorInput,
    ) -> AppResult<visitor::Model> {
        let existing = self.find_scoped(place_id, id).await?;
        self.ensure_author(&existing, user).await?;

        if let Some(rating) = input.rating {
            let mut errors = FieldErrors::new();
            validation::rating(&mut errors, "rating", rating);
            errors.into_result()?;
        }

        let mut active = existing.into_active_model();
        if let Some(rating) = input.rating {
            active.rating = Set(rating);
        }
        if let Some(review) = input.review {
            active.review = Set(review);
        }
        if let Some(visit_type) = input.visit_type {
            active.visit_type = Set(visit_type);
        }
        self.visitor_repo.update(active).await
    }

    /// Delete a review.
    pub async fn delete(&self, place_id: i32, id: i32, user: &user::Model) -> AppResult<()> {
        let existing = self.find_scoped(place_id, id).await?;
        self.ensure_author(&existing, user).await?;

        if !self.visitor_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Visitor {id}")));
        }
        tracing::info!(visitor_id = id, place_id, "Deleted review");
        Ok(())
    }
}

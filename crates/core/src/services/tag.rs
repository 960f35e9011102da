//! Tag service.

use std::collections::HashMap;

use crate::services::page_limit;
use serde::Deserialize;
use validator::Validate;
use wayfarer_common::{AppError, AppResult};
use wayfarer_db::{
    ContentType,
    entities::{place, tag, tagged_item},
    repositories::{PlaceRepository, TagRepository},
};

/// Input for creating a tag.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TagInput {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub label: String,
}

/// Tag service for business logic.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
    place_repo: PlaceRepository,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository, place_repo: PlaceRepository) -> Self {
        Self {
            tag_repo,
            place_repo,
        }
    }

    /// List tags.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<Vec<tag::Model>> {
        self.tag_repo
            .list(search, page_limit(limit), offset.unwrap_or(0))
            .await
    }

    /// Get a tag.
    pub async fn get(&self, id: i32) -> AppResult<tag::Model> {
        self.tag_repo.get_by_id(id).await
    }

    /// Create a tag.
    pub async fn create(&self, input: TagInput) -> AppResult<tag::Model> {
        if input.label.trim().is_empty() {
            return Err(AppError::invalid("label", "This field may not be blank."));
        }
        input.validate()?;
        let created = self.tag_repo.create(input.label).await?;
        tracing::info!(tag_id = created.id, label = %created.label, "Created tag");
        Ok(created)
    }

    /// Delete a tag; it is detached from everything.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.tag_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Tag {id}")));
        }
        tracing::info!(tag_id = id, "Deleted tag");
        Ok(())
    }

    /// Places carrying a tag, in tagging order.
    pub async fn places(&self, tag_id: i32) -> AppResult<Vec<place::Model>> {
        self.tag_repo.get_by_id(tag_id).await?;
        let ids = self.tag_repo.places_for(tag_id).await?;

        let mut places: HashMap<i32, place::Model> = self
            .place_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        Ok(ids.iter().filter_map(|id| places.remove(id)).collect())
    }

    /// Tags attached to an object.
    pub async fn tags_for(
        &self,
        content_type: ContentType,
        object_id: i32,
    ) -> AppResult<Vec<(tag::Model, tagged_item::Model)>> {
        self.tag_repo.tags_for(content_type, object_id).await
    }

    /// Attach a tag to an object. Returns the tag and whether it was newly attached.
    pub async fn attach(
        &self,
        content_type: ContentType,
        object_id: i32,
        tag_id: i32,
    ) -> AppResult<(tag::Model, bool)> {
        let tag = self.tag_repo.find_by_id(tag_id).await?.ok_or_else(|| {
            AppError::invalid(
                "tag_id",
                format!("Invalid pk \"{tag_id}\" - object does not exist."),
            )
        })?;

        let attached = self.tag_repo.attach(tag_id, content_type, object_id).await?;
        if attached {
            tracing::info!(tag_id, %content_type, object_id, "Tagged object");
        }
        Ok((tag, attached))
    }

    /// Detach a tag from an object.
    pub async fn detach(
        &self,
        content_type: ContentType,
        object_id: i32,
        tag_id: i32,
    ) -> AppResult<()> {
        if self.tag_repo.detach(tag_id, content_type, object_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Tag {tag_id} on {content_type} {object_id}"
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn create_test_tag(id: i32) -> tag::Model {
        tag::Model {
            id,
            label: "beach".to_string(),
        }
    }

    fn create_test_place(id: i32) -> place::Model {
        let now = chrono::Utc::now().into();
        place::Model {
            id,
            name: format!("Place {id}"),
            description: None,
            lat: rust_decimal::Decimal::ZERO,
            lon: rust_decimal::Decimal::ZERO,
            rating: rust_decimal::Decimal::from(5),
            status: place::PlaceStatus::Active,
            slug: format!("place-{id}"),
            created_at: now,
            status_change_at: now,
            last_update: now,
        }
    }

    #[tokio::test]
    async fn test_create_blank_label() {
        let service = TagService::new(
            TagRepository::new(Arc::new(mock().into_connection())),
            PlaceRepository::new(Arc::new(mock().into_connection())),
        );

        let result = service
            .create(TagInput {
                label: String::new(),
            })
            .await;

        match result {
            Err(AppError::Validation(fields)) => {
                assert_eq!(
                    fields.get("label").unwrap(),
                    ["This field may not be blank.".to_string()]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_attach_unknown_tag() {
        let service = TagService::new(
            TagRepository::new(Arc::new(
                mock()
                    .append_query_results([Vec::<tag::Model>::new()])
                    .into_connection(),
            )),
            PlaceRepository::new(Arc::new(mock().into_connection())),
        );

        let result = service.attach(ContentType::Place, 1, 8).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_places_keep_tagging_order() {
        let service = TagService::new(
            TagRepository::new(Arc::new(
                mock()
                    .append_query_results([[create_test_tag(1)]])
                    .append_query_results([[
                        maplit::btreemap! { "object_id" => sea_orm::Value::Int(Some(2)) },
                        maplit::btreemap! { "object_id" => sea_orm::Value::Int(Some(1)) },
                    ]])
                    .into_connection(),
            )),
            PlaceRepository::new(Arc::new(
                mock()
                    .append_query_results([[create_test_place(1), create_test_place(2)]])
                    .into_connection(),
            )),
        );

        let places = service.places(1).await.unwrap();
        let ids: Vec<i32> = places.iter().map(|p| p.id).collect();
        assert_eq!(ids, [2, 1]);
    }
}

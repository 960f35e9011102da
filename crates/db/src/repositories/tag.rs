//! Tag repository and tag associations.

use std::sync::Arc;

use crate::content_type::ContentType;
use crate::entities::{Tag, TaggedItem, tag, tagged_item};
use crate::repositories::{escape_like, target_exists, write_error};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SelectTwo, Set,
};
use wayfarer_common::{AppError, AppResult};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<tag::Model>> {
        Tag::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tag by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<tag::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {id}")))
    }

    /// List tags, optionally by label substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<tag::Model>> {
        let mut query = Tag::find().order_by_asc(tag::Column::Label);
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            query = query.filter(tag::Column::Label.contains(escape_like(search)));
        }

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a tag.
    pub async fn create(&self, label: String) -> AppResult<tag::Model> {
        tag::ActiveModel {
            label: Set(label),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(write_error)
    }

    /// Delete a tag and its associations.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = Tag::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    fn tags_for_query(content_type: ContentType, object_id: i32) -> SelectTwo<TaggedItem, Tag> {
        TaggedItem::find()
            .filter(tagged_item::Column::ContentType.eq(content_type))
            .filter(tagged_item::Column::ObjectId.eq(object_id))
            .find_also_related(Tag)
            .order_by_asc(tagged_item::Column::Id)
    }

    /// Tags attached to one object, fetched together with their association rows.
    pub async fn tags_for(
        &self,
        content_type: ContentType,
        object_id: i32,
    ) -> AppResult<Vec<(tag::Model, tagged_item::Model)>> {
        let rows = Self::tags_for_query(content_type, object_id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(item, tag)| tag.map(|tag| (tag, item)))
            .collect())
    }

    /// IDs of the places carrying a tag.
    pub async fn places_for(&self, tag_id: i32) -> AppResult<Vec<i32>> {
        TaggedItem::find()
            .select_only()
            .column(tagged_item::Column::ObjectId)
            .filter(tagged_item::Column::TagId.eq(tag_id))
            .filter(tagged_item::Column::ContentType.eq(ContentType::Place))
            .order_by_asc(tagged_item::Column::Id)
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Attach a tag to an object. Returns whether a new association was made.
    pub async fn attach(
        &self,
        tag_id: i32,
        content_type: ContentType,
        object_id: i32,
    ) -> AppResult<bool> {
        let exists = target_exists(self.db.as_ref(), content_type, object_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if !exists {
            return Err(AppError::NotFound(format!("{content_type} {object_id}")));
        }

        let item = tagged_item::ActiveModel {
            tag_id: Set(tag_id),
            content_type: Set(content_type),
            object_id: Set(object_id),
            ..Default::default()
        };

        let inserted = TaggedItem::insert(item)
            .on_conflict(
                OnConflict::columns([
                    tagged_item::Column::TagId,
                    tagged_item::Column::ContentType,
                    tagged_item::Column::ObjectId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(write_error)?;

        Ok(inserted > 0)
    }

    /// Detach a tag from an object. Returns whether an association was removed.
    pub async fn detach(
        &self,
        tag_id: i32,
        content_type: ContentType,
        object_id: i32,
    ) -> AppResult<bool> {
        let result = TaggedItem::delete_many()
            .filter(tagged_item::Column::TagId.eq(tag_id))
            .filter(tagged_item::Column::ContentType.eq(content_type))
            .filter(tagged_item::Column::ObjectId.eq(object_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}

//! Like service.

use wayfarer_common::{AppError, AppResult};
use wayfarer_db::{
    ContentType,
    entities::{liked_item, member, user},
    repositories::{LikeRepository, MemberRepository},
};

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    member_repo: MemberRepository,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(like_repo: LikeRepository, member_repo: MemberRepository) -> Self {
        Self {
            like_repo,
            member_repo,
        }
    }

    /// Members who like an object.
    pub async fn likes_for(
        &self,
        content_type: ContentType,
        object_id: i32,
    ) -> AppResult<Vec<(member::Model, liked_item::Model)>> {
        self.like_repo.likes_for(content_type, object_id).await
    }

    /// IDs of the objects of one type the acting user likes.
    pub async fn liked_by_me(
        &self,
        user: &user::Model,
        content_type: ContentType,
    ) -> AppResult<Vec<i32>> {
        match self.member_repo.find_by_user_id(user.id).await? {
            Some(member) => self.like_repo.liked_by(member.id, content_type).await,
            None => Ok(vec![]),
        }
    }

    /// Like an object as the acting user. Returns whether the like is new.
    pub async fn like(
        &self,
        user: &user::Model,
        content_type: ContentType,
        object_id: i32,
    ) -> AppResult<bool> {
        let member = self.member_repo.get_or_create(user.id).await?;
        let created = self
            .like_repo
            .like(member.id, content_type, object_id)
            .await?;
        if created {
            tracing::info!(member_id = member.id, %content_type, object_id, "Liked object");
        }
        Ok(created)
    }

    /// Withdraw the acting user's like.
    pub async fn unlike(
        &self,
        user: &user::Model,
        content_type: ContentType,
        object_id: i32,
    ) -> AppResult<()> {
        let member = self.member_repo.find_by_user_id(user.id).await?;
        let removed = match member {
            Some(member) => {
                self.like_repo
                    .unlike(member.id, content_type, object_id)
                    .await?
            }
            None => false,
        };

        if removed {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Like of {content_type} {object_id}"
            )))
        }
    }
}

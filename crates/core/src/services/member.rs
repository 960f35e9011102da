//! Member service.

use crate::services::auth::AuthService;
use crate::services::{nullable, page_limit};
use chrono::NaiveDate;
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use wayfarer_common::{AppError, AppResult};
use wayfarer_db::{
    entities::{member, trip, user, visitor},
    repositories::{MemberRepository, TripRepository, VisitorRepository},
};

/// Editable member profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberInput {
    #[serde(default, deserialize_with = "nullable")]
    pub birth_date: Option<Option<NaiveDate>>,
}

/// Input for creating a member on behalf of a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMemberInput {
    pub user_id: i32,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

/// What a member has done: reviews written and trips planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberHistory {
    pub member: member::Model,
    pub reviews: Vec<visitor::Model>,
    pub trips: Vec<trip::Model>,
}

/// Member service for business logic.
#[derive(Clone)]
pub struct MemberService {
    member_repo: MemberRepository,
    visitor_repo: VisitorRepository,
    trip_repo: TripRepository,
    auth_service: AuthService,
}

impl MemberService {
    /// Create a new member service.
    #[must_use]
    pub const fn new(
        member_repo: MemberRepository,
        visitor_repo: VisitorRepository,
        trip_repo: TripRepository,
        auth_service: AuthService,
    ) -> Self {
        Self {
            member_repo,
            visitor_repo,
            trip_repo,
            auth_service,
        }
    }

    fn apply(active: &mut member::ActiveModel, input: MemberInput) {
        if let Some(birth_date) = input.birth_date {
            active.birth_date = Set(birth_date);
        }
    }

    /// The acting user's member, created on first use.
    pub async fn me(&self, user: &user::Model) -> AppResult<member::Model> {
        self.member_repo.get_or_create(user.id).await
    }

    /// Update the acting user's member.
    pub async fn update_me(
        &self,
        user: &user::Model,
        input: MemberInput,
    ) -> AppResult<member::Model> {
        let member = self.member_repo.get_or_create(user.id).await?;
        let mut active = member.into_active_model();
        Self::apply(&mut active, input);
        self.member_repo.update(active).await
    }

    /// List members.
    pub async fn list(&self, limit: Option<u64>, offset: Option<u64>) -> AppResult<Vec<member::Model>> {
        self.member_repo
            .list(page_limit(limit), offset.unwrap_or(0))
            .await
    }

    /// Get a member.
    pub async fn get(&self, id: i32) -> AppResult<member::Model> {
        self.member_repo.get_by_id(id).await
    }

    /// Create a member for a user.
    pub async fn create(&self, input: CreateMemberInput) -> AppResult<member::Model> {
        let created = self
            .member_repo
            .create(member::ActiveModel {
                user_id: Set(input.user_id),
                birth_date: Set(input.birth_date),
                ..Default::default()
            })
            .await?;
        tracing::info!(member_id = created.id, user_id = created.user_id, "Created member");
        Ok(created)
    }

    /// Update a member.
    pub async fn update(&self, id: i32, input: MemberInput) -> AppResult<member::Model> {
        let existing = self.member_repo.get_by_id(id).await?;
        let mut active = existing.into_active_model();
        Self::apply(&mut active, input);
        self.member_repo.update(active).await
    }

    /// Delete a member. Their reviews and trips stay, without an owner.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.member_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Member {id}")));
        }
        tracing::info!(member_id = id, "Deleted member");
        Ok(())
    }

    /// Reviews and trips of a member, for users allowed to see them.
    pub async fn history(&self, viewer: &user::Model, id: i32) -> AppResult<MemberHistory> {
        self.auth_service.ensure_can_view_history(viewer).await?;

        let member = self.member_repo.get_by_id(id).await?;
        let reviews = self.visitor_repo.list_by_member(id).await?;
        let trips = self.trip_repo.list_by_member(id).await?;

        Ok(MemberHistory {
            member,
            reviews,
            trips,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use wayfarer_db::repositories::UserRepository;

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    fn create_test_user(id: i32, is_superuser: bool) -> user::Model {
        user::Model {
            id,
            username: format!("user{id}"),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            token: None,
            is_staff: is_superuser,
            is_superuser,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_member(id: i32, birth_date: Option<NaiveDate>) -> member::Model {
        member::Model {
            id,
            user_id: id,
            birth_date,
            joined_at: Utc::now().into(),
        }
    }

    fn service(member_db: MockDatabase, user_db: MockDatabase) -> MemberService {
        MemberService::new(
            MemberRepository::new(Arc::new(member_db.into_connection())),
            VisitorRepository::new(Arc::new(
                mock()
                    .append_query_results([Vec::<visitor::Model>::new()])
                    .into_connection(),
            )),
            TripRepository::new(Arc::new(
                mock()
                    .append_query_results([Vec::<trip::Model>::new()])
                    .into_connection(),
            )),
            AuthService::new(UserRepository::new(Arc::new(user_db.into_connection()))),
        )
    }

    #[tokio::test]
    async fn test_me_returns_existing_member() {
        let service = service(
            mock().append_query_results([[create_test_member(3, None)]]),
            mock(),
        );

        let member = service.me(&create_test_user(3, false)).await.unwrap();
        assert_eq!(member.id, 3);
    }

    #[tokio::test]
    async fn test_update_me_clears_birth_date() {
        let birth = NaiveDate::from_ymd_opt(1990, 1, 2);
        let service = service(
            mock()
                .append_query_results([[create_test_member(3, birth)]])
                .append_query_results([[create_test_member(3, None)]]),
            mock(),
        );

        let input: MemberInput = serde_json::from_str(r#"{"birth_date": null}"#).unwrap();
        let member = service
            .update_me(&create_test_user(3, false), input)
            .await
            .unwrap();

        assert_eq!(member.birth_date, None);
    }

    #[tokio::test]
    async fn test_history_for_superuser() {
        let service = service(
            mock().append_query_results([[create_test_member(3, None)]]),
            mock(),
        );

        let history = service
            .history(&create_test_user(1, true), 3)
            .await
            .unwrap();

        assert_eq!(history.member.id, 3);
        assert!(history.reviews.is_empty());
        assert!(history.trips.is_empty());
    }

    #[tokio::test]
    async fn test_history_without_permission() {
        let service = service(
            mock(),
            mock().append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(0))
            }]]),
        );

        let result = service.history(&create_test_user(2, false), 3).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}

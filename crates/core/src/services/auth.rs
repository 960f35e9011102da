//! Principal resolution and permission rules.

use wayfarer_common::{AppError, AppResult};
use wayfarer_db::{
    entities::{user, user_permission},
    repositories::UserRepository,
};

/// Reject a principal without staff rights.
pub fn ensure_staff(user: &user::Model) -> AppResult<()> {
    if user.is_staff {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have permission to perform this action.".to_string(),
        ))
    }
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> AppResult<Option<user::Model>> {
        if token.is_empty() {
            return Ok(None);
        }
        self.user_repo.find_by_token(token).await
    }

    /// Whether a user holds a permission; superusers hold every permission.
    pub async fn has_permission(&self, user: &user::Model, codename: &str) -> AppResult<bool> {
        if user.is_superuser {
            return Ok(true);
        }
        self.user_repo.has_permission(user.id, codename).await
    }

    /// Reject a user who may not read member histories.
    pub async fn ensure_can_view_history(&self, user: &user::Model) -> AppResult<()> {
        if self
            .has_permission(user, user_permission::VIEW_HISTORY)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have permission to view member history.".to_string(),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(is_staff: bool, is_superuser: bool) -> user::Model {
        user::Model {
            id: 1,
            username: "nadia".to_string(),
            first_name: "Nadia".to_string(),
            last_name: String::new(),
            email: "nadia@example.com".to_string(),
            token: Some("tok".to_string()),
            is_staff,
            is_superuser,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_ensure_staff() {
        assert!(ensure_staff(&create_test_user(true, false)).is_ok());
        assert!(matches!(
            ensure_staff(&create_test_user(false, false)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_superuser_skips_permission_lookup() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = AuthService::new(UserRepository::new(db));

        assert!(
            service
                .ensure_can_view_history(&create_test_user(false, true))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_history_requires_permission() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0))
                }]])
                .into_connection(),
        );
        let service = AuthService::new(UserRepository::new(db));

        let result = service
            .ensure_can_view_history(&create_test_user(true, false))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_empty_token_is_anonymous() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = AuthService::new(UserRepository::new(db));

        assert!(service.authenticate("").await.unwrap().is_none());
    }
}

//! Admin account management.

use docket_db::{Filter, RepositoryError, ResourceRepository};
use docket_models::{User, UserRole};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("username {0} is already taken")]
    UsernameTaken(String),

    #[error("no user named {0}")]
    UserNotFound(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Creates an account with the `ADMIN` role.
pub async fn create_admin(
    users: &dyn ResourceRepository<User>,
    username: &str,
    password: &str,
) -> Result<User, AdminError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AdminError::EmptyField("username"));
    }
    if password.is_empty() {
        return Err(AdminError::EmptyField("password"));
    }

    users
        .store(User::new_document(username, password, UserRole::Admin))
        .await
        .map_err(|e| match e {
            RepositoryError::DuplicateKey(_) => AdminError::UsernameTaken(username.to_string()),
            other => other.into(),
        })
}

/// Changes the role of an existing account.
pub async fn set_role(
    users: &dyn ResourceRepository<User>,
    username: &str,
    role: UserRole,
) -> Result<User, AdminError> {
    let user = users
        .find_one(&Filter::new().eq("username", username))
        .await?
        .ok_or_else(|| AdminError::UserNotFound(username.to_string()))?;

    let mut patch = Map::new();
    patch.insert("role".to_string(), Value::String(role.as_str().to_string()));

    users
        .edit(user.id, patch)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(username.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_db::MemoryRepository;

    #[tokio::test]
    async fn test_create_admin() {
        let users = MemoryRepository::<User>::new();
        let admin = create_admin(&users, " root ", "secret").await.unwrap();

        assert_eq!(admin.username, "root");
        assert!(admin.is_admin());
        assert_ne!(admin.password, "secret");
    }

    #[tokio::test]
    async fn test_create_admin_rejects_empty_fields() {
        let users = MemoryRepository::<User>::new();

        let err = create_admin(&users, "  ", "secret").await.unwrap_err();
        assert!(matches!(err, AdminError::EmptyField("username")));

        let err = create_admin(&users, "root", "").await.unwrap_err();
        assert!(matches!(err, AdminError::EmptyField("password")));
    }

    #[tokio::test]
    async fn test_create_admin_duplicate_username() {
        let users = MemoryRepository::<User>::new();
        create_admin(&users, "root", "secret").await.unwrap();

        let err = create_admin(&users, "root", "other").await.unwrap_err();
        assert!(matches!(err, AdminError::UsernameTaken(ref name) if name == "root"));
    }

    #[tokio::test]
    async fn test_promote_and_demote() {
        let users = MemoryRepository::<User>::new();
        users
            .store(User::new_document("alice", "secret", UserRole::User))
            .await
            .unwrap();

        let promoted = set_role(&users, "alice", UserRole::Admin).await.unwrap();
        assert!(promoted.is_admin());

        let demoted = set_role(&users, "alice", UserRole::User).await.unwrap();
        assert!(!demoted.is_admin());
    }

    #[tokio::test]
    async fn test_set_role_unknown_user() {
        let users = MemoryRepository::<User>::new();
        let err = set_role(&users, "ghost", UserRole::Admin).await.unwrap_err();
        assert!(matches!(err, AdminError::UserNotFound(_)));
    }
}

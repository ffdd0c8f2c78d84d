use async_trait::async_trait;

use super::domain::{NewUser, User};
use crate::storage::RepositoryError;

/// Credential storage contract. Usernames are unique; inserting a taken name
/// yields [`RepositoryError::Conflict`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
}

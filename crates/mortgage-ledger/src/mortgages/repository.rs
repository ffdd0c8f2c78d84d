use async_trait::async_trait;

use super::domain::{Mortgage, MortgageId, MortgageTerms};
use crate::accounts::UserId;
use crate::storage::RepositoryError;

/// Storage abstraction for mortgage records.
///
/// Every lookup and mutation is scoped by owner: a record belonging to someone
/// else behaves exactly like a missing one.
#[async_trait]
pub trait MortgageRepository: Send + Sync {
    async fn insert(&self, owner: UserId, terms: MortgageTerms) -> Result<Mortgage, RepositoryError>;
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Mortgage>, RepositoryError>;
    async fn find_owned(
        &self,
        owner: UserId,
        id: MortgageId,
    ) -> Result<Option<Mortgage>, RepositoryError>;
    /// Overwrites the stored terms; `NotFound` unless `mortgage.owner` owns the row.
    async fn update(&self, mortgage: &Mortgage) -> Result<(), RepositoryError>;
    async fn delete_owned(&self, owner: UserId, id: MortgageId) -> Result<(), RepositoryError>;
    /// Mean credit score over all stored mortgages, `None` when there are none.
    async fn average_credit_score(&self) -> Result<Option<f64>, RepositoryError>;
}

//! Fixtures shared by the in-crate test modules.

use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::accounts::{NewUser, User, UserId, UserRepository};
use crate::auth::TokenService;
use crate::http::LedgerState;
use crate::mortgages::{Mortgage, MortgageId, MortgageRepository, MortgageTerms};
use crate::storage::{RepositoryError, SqlStore};

pub(crate) const TEST_SECRET: &str = "unit-test-secret";

pub(crate) fn terms(credit_score: i64) -> MortgageTerms {
    MortgageTerms {
        credit_score,
        loan_amount: 90.0,
        property_value: 100.0,
        annual_income: 100.0,
        debt_amount: 40.0,
        loan_type: "fixed".to_string(),
        property_type: "house".to_string(),
    }
}

pub(crate) fn risky_terms(credit_score: i64) -> MortgageTerms {
    MortgageTerms {
        credit_score,
        loan_amount: 95.0,
        property_value: 100.0,
        annual_income: 100.0,
        debt_amount: 60.0,
        loan_type: "adjustable".to_string(),
        property_type: "condo".to_string(),
    }
}

pub(crate) async fn store() -> Arc<SqlStore> {
    Arc::new(SqlStore::in_memory().await.expect("in-memory store opens"))
}

pub(crate) async fn seed_user(store: &SqlStore, username: &str) -> User {
    UserRepository::insert(
        store,
        NewUser {
            username: username.to_string(),
            password_hash: "not-a-real-digest".to_string(),
        },
    )
    .await
    .expect("user inserted")
}

pub(crate) fn state(store: Arc<SqlStore>) -> LedgerState<SqlStore, SqlStore> {
    LedgerState::new(
        store.clone(),
        store,
        Arc::new(TokenService::new(TEST_SECRET)),
    )
}

pub(crate) fn bearer_for(username: &str) -> String {
    let token = TokenService::new(TEST_SECRET)
        .issue(username)
        .expect("token issued");
    format!("Bearer {token}")
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every call fails as if the database were offline.
pub(crate) struct UnavailableStore;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

#[async_trait]
impl UserRepository for UnavailableStore {
    async fn insert(&self, _user: NewUser) -> Result<User, RepositoryError> {
        Err(offline())
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, RepositoryError> {
        Err(offline())
    }
}

#[async_trait]
impl MortgageRepository for UnavailableStore {
    async fn insert(
        &self,
        _owner: UserId,
        _terms: MortgageTerms,
    ) -> Result<Mortgage, RepositoryError> {
        Err(offline())
    }

    async fn list_by_owner(&self, _owner: UserId) -> Result<Vec<Mortgage>, RepositoryError> {
        Err(offline())
    }

    async fn find_owned(
        &self,
        _owner: UserId,
        _id: MortgageId,
    ) -> Result<Option<Mortgage>, RepositoryError> {
        Err(offline())
    }

    async fn update(&self, _mortgage: &Mortgage) -> Result<(), RepositoryError> {
        Err(offline())
    }

    async fn delete_owned(&self, _owner: UserId, _id: MortgageId) -> Result<(), RepositoryError> {
        Err(offline())
    }

    async fn average_credit_score(&self) -> Result<Option<f64>, RepositoryError> {
        Err(offline())
    }
}

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};

use super::domain::{Mortgage, MortgageId, MortgageTerms, MortgageUpdate, RatedMortgage};
use super::rating;
use super::repository::MortgageRepository;
use crate::accounts::User;
use crate::storage::RepositoryError;

/// Owner-scoped mortgage operations with ratings attached on create and list.
pub struct MortgageService<M> {
    repository: Arc<M>,
}

impl<M> MortgageService<M>
where
    M: MortgageRepository + 'static,
{
    pub fn new(repository: Arc<M>) -> Self {
        Self { repository }
    }

    pub async fn create(
        &self,
        owner: &User,
        terms: MortgageTerms,
    ) -> Result<RatedMortgage, MortgageServiceError> {
        terms.validate().map_err(MortgageServiceError::Validation)?;

        let mortgage = self.repository.insert(owner.id, terms).await?;
        let average = self.average_credit_score().await?;
        let credit_rating = rating::rate(&mortgage.terms, average);

        info!(
            mortgage_id = %mortgage.id,
            user_id = %owner.id,
            %credit_rating,
            "mortgage created"
        );
        Ok(RatedMortgage {
            mortgage,
            credit_rating,
        })
    }

    pub async fn list(&self, owner: &User) -> Result<Vec<RatedMortgage>, MortgageServiceError> {
        let mortgages = self.repository.list_by_owner(owner.id).await?;
        let average = self.average_credit_score().await?;

        Ok(mortgages
            .into_iter()
            .map(|mortgage| {
                let credit_rating = rating::rate(&mortgage.terms, average);
                RatedMortgage {
                    mortgage,
                    credit_rating,
                }
            })
            .collect())
    }

    /// Apply a partial update. Missing and foreign records are both `NotFound`.
    pub async fn update(
        &self,
        owner: &User,
        id: MortgageId,
        changes: MortgageUpdate,
    ) -> Result<Mortgage, MortgageServiceError> {
        let mut mortgage = self
            .repository
            .find_owned(owner.id, id)
            .await?
            .ok_or(MortgageServiceError::NotFound)?;

        changes.apply_to(&mut mortgage.terms);
        mortgage
            .terms
            .validate()
            .map_err(MortgageServiceError::Validation)?;

        self.repository.update(&mortgage).await.map_err(not_found)?;
        info!(mortgage_id = %mortgage.id, user_id = %owner.id, "mortgage updated");
        Ok(mortgage)
    }

    pub async fn delete(&self, owner: &User, id: MortgageId) -> Result<(), MortgageServiceError> {
        self.repository
            .delete_owned(owner.id, id)
            .await
            .map_err(not_found)?;
        info!(mortgage_id = %id, user_id = %owner.id, "mortgage deleted");
        Ok(())
    }

    /// Average across every stored mortgage; an empty store counts as zero.
    async fn average_credit_score(&self) -> Result<f64, MortgageServiceError> {
        Ok(self.repository.average_credit_score().await?.unwrap_or(0.0))
    }
}

fn not_found(err: RepositoryError) -> MortgageServiceError {
    match err {
        RepositoryError::NotFound => MortgageServiceError::NotFound,
        other => MortgageServiceError::Repository(other),
    }
}

/// Error raised by the mortgage service.
#[derive(Debug, thiserror::Error)]
pub enum MortgageServiceError {
    #[error("mortgage not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl MortgageServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            MortgageServiceError::NotFound => StatusCode::NOT_FOUND,
            MortgageServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            MortgageServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MortgageServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "mortgage operation failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

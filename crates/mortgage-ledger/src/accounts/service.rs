use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info, warn};

use super::domain::{AccessToken, Credentials, NewUser, SessionView, User};
use super::repository::UserRepository;
use crate::auth::{
    bearer_token, CredentialHasher, PasswordError, TokenError, TokenService, DECOY_DIGEST,
};
use crate::mortgages::MortgageRepository;
use crate::storage::RepositoryError;

/// Registration, login and token-to-user resolution.
pub struct AccountService<U, M> {
    users: Arc<U>,
    mortgages: Arc<M>,
    hasher: CredentialHasher,
    tokens: Arc<TokenService>,
}

impl<U, M> AccountService<U, M>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    pub fn new(users: Arc<U>, mortgages: Arc<M>, tokens: Arc<TokenService>) -> Self {
        Self {
            users,
            mortgages,
            hasher: CredentialHasher::new(),
            tokens,
        }
    }

    /// Create an account. Usernames must be unused.
    pub async fn register(&self, credentials: Credentials) -> Result<User, AccountError> {
        let Credentials { username, password } = credentials;
        if username.trim().is_empty() {
            return Err(AccountError::Validation("username must not be blank".to_string()));
        }
        if password.is_empty() {
            return Err(AccountError::Validation("password must not be empty".to_string()));
        }

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AccountError::UsernameTaken);
        }

        let hasher = self.hasher.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| AccountError::Worker(err.to_string()))??;

        let user = self
            .users
            .insert(NewUser {
                username,
                password_hash,
            })
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict => AccountError::UsernameTaken,
                other => AccountError::Repository(other),
            })?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Exchange credentials for a bearer token. Unknown users and wrong passwords
    /// produce the same error, and both pay for one argon2 verification.
    pub async fn login(&self, credentials: Credentials) -> Result<AccessToken, AccountError> {
        let Credentials { username, password } = credentials;
        let user = self.users.find_by_username(&username).await?;

        let hasher = self.hasher.clone();
        let digest = user
            .as_ref()
            .map_or_else(|| DECOY_DIGEST.to_string(), |user| user.password_hash.clone());
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|err| AccountError::Worker(err.to_string()))?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                warn!("login rejected");
                return Err(AccountError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(&user.username)?;
        info!(user_id = %user.id, "login succeeded");
        Ok(AccessToken::bearer(token))
    }

    /// Resolve the caller from a raw `Authorization` header value.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<User, AccountError> {
        let token = bearer_token(authorization)?;
        let username = self.tokens.validate(token)?;
        self.users
            .find_by_username(&username)
            .await?
            .ok_or(AccountError::Token(TokenError::Malformed))
    }

    pub async fn session(&self, user: &User) -> Result<SessionView, AccountError> {
        let mortgages = self.mortgages.list_by_owner(user.id).await?;
        Ok(SessionView {
            username: user.username.clone(),
            mortgages,
        })
    }
}

/// Error raised by the account service.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("username already taken")]
    UsernameTaken,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("credential worker failed: {0}")]
    Worker(String),
}

impl AccountError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::Token(TokenError::Malformed | TokenError::Expired) => {
                StatusCode::UNAUTHORIZED
            }
            AccountError::UsernameTaken => StatusCode::CONFLICT,
            AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::Token(TokenError::Signing(_))
            | AccountError::Password(_)
            | AccountError::Repository(_)
            | AccountError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "account operation failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

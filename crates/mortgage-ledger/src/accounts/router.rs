use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::domain::{AccessToken, Credentials, MessageResponse, SessionView};
use super::repository::UserRepository;
use super::service::AccountError;
use crate::http::{Caller, LedgerState};
use crate::mortgages::MortgageRepository;

/// Routes under `/api/auth`.
pub fn account_router<U, M>() -> Router<LedgerState<U, M>>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    Router::new()
        .route("/api/auth/register", post(register_handler::<U, M>))
        .route("/api/auth/login", post(login_handler::<U, M>))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/validate", get(validate_handler::<U, M>))
}

pub(crate) async fn register_handler<U, M>(
    State(state): State<LedgerState<U, M>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<MessageResponse>, AccountError>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    state.accounts.register(credentials).await?;
    Ok(Json(MessageResponse {
        message: "User registered successfully",
    }))
}

pub(crate) async fn login_handler<U, M>(
    State(state): State<LedgerState<U, M>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AccessToken>, AccountError>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    let token = state.accounts.login(credentials).await?;
    Ok(Json(token))
}

/// Tokens are stateless, so logging out cannot revoke anything; clients drop the token.
pub(crate) async fn logout_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out successfully",
    })
}

pub(crate) async fn validate_handler<U, M>(
    State(state): State<LedgerState<U, M>>,
    Caller(user): Caller,
) -> Result<Json<SessionView>, AccountError>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    let session = state.accounts.session(&user).await?;
    Ok(Json(session))
}

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::accounts::{account_router, AccountError, AccountService, User, UserRepository};
use crate::auth::TokenService;
use crate::mortgages::{mortgage_router, MortgageRepository, MortgageService, MortgageServiceError};

/// Services shared by every handler. Cloning only bumps reference counts.
pub struct LedgerState<U, M> {
    pub accounts: Arc<AccountService<U, M>>,
    pub mortgages: Arc<MortgageService<M>>,
}

impl<U, M> LedgerState<U, M>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    pub fn new(users: Arc<U>, mortgages: Arc<M>, tokens: Arc<TokenService>) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(users, mortgages.clone(), tokens)),
            mortgages: Arc::new(MortgageService::new(mortgages)),
        }
    }

    /// Resolve the caller from the request's `Authorization` header.
    pub async fn caller(&self, headers: &HeaderMap) -> Result<User, AccountError> {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        self.accounts.authenticate(authorization).await
    }
}

impl<U, M> Clone for LedgerState<U, M> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            mortgages: Arc::clone(&self.mortgages),
        }
    }
}

/// Authenticated caller resolved from the bearer token.
///
/// List it before `Path` and `Json` so unauthenticated requests fail with 401
/// before their path or body is parsed.
#[derive(Debug, Clone)]
pub struct Caller(pub User);

impl<U, M> FromRequestParts<LedgerState<U, M>> for Caller
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    type Rejection = AccountError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &LedgerState<U, M>,
    ) -> Result<Self, Self::Rejection> {
        state.caller(&parts.headers).await.map(Caller)
    }
}

/// Failure from any ledger handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Mortgage(#[from] MortgageServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Account(err) => err.into_response(),
            ApiError::Mortgage(err) => err.into_response(),
        }
    }
}

/// Every ledger endpoint with permissive CORS and request tracing applied.
pub fn ledger_router<U, M>(state: LedgerState<U, M>) -> Router
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    with_http_layers(ledger_routes(state))
}

/// Ledger endpoints without cross-cutting layers, for callers that merge in
/// routes of their own before calling [`with_http_layers`].
pub fn ledger_routes<U, M>(state: LedgerState<U, M>) -> Router
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    account_router::<U, M>()
        .merge(mortgage_router::<U, M>())
        .with_state(state)
}

pub fn with_http_layers(router: Router) -> Router {
    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

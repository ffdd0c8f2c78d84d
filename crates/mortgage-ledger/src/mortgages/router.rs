use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};

use super::domain::{Mortgage, MortgageId, MortgageTerms, MortgageUpdate, RatedMortgage};
use super::repository::MortgageRepository;
use crate::accounts::UserRepository;
use crate::http::{ApiError, Caller, LedgerState};

/// Routes under `/api/mortgages`. Every handler resolves its [`Caller`] before
/// parsing the path or body.
pub fn mortgage_router<U, M>() -> Router<LedgerState<U, M>>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    Router::new()
        .route(
            "/api/mortgages",
            get(list_handler::<U, M>).post(create_handler::<U, M>),
        )
        .route(
            "/api/mortgages/{mortgage_id}",
            put(update_handler::<U, M>).delete(delete_handler::<U, M>),
        )
}

pub(crate) async fn create_handler<U, M>(
    State(state): State<LedgerState<U, M>>,
    Caller(owner): Caller,
    Json(terms): Json<MortgageTerms>,
) -> Result<Json<RatedMortgage>, ApiError>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    let created = state.mortgages.create(&owner, terms).await?;
    Ok(Json(created))
}

pub(crate) async fn list_handler<U, M>(
    State(state): State<LedgerState<U, M>>,
    Caller(owner): Caller,
) -> Result<Json<Vec<RatedMortgage>>, ApiError>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    let mortgages = state.mortgages.list(&owner).await?;
    Ok(Json(mortgages))
}

pub(crate) async fn update_handler<U, M>(
    State(state): State<LedgerState<U, M>>,
    Caller(owner): Caller,
    Path(mortgage_id): Path<i64>,
    Json(changes): Json<MortgageUpdate>,
) -> Result<Json<Mortgage>, ApiError>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    let updated = state
        .mortgages
        .update(&owner, MortgageId(mortgage_id), changes)
        .await?;
    Ok(Json(updated))
}

pub(crate) async fn delete_handler<U, M>(
    State(state): State<LedgerState<U, M>>,
    Caller(owner): Caller,
    Path(mortgage_id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
    U: UserRepository + 'static,
    M: MortgageRepository + 'static,
{
    state.mortgages.delete(&owner, MortgageId(mortgage_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

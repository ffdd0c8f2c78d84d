pub mod accounts;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod mortgages;
pub mod storage;
pub mod telemetry;

pub use http::{ledger_router, ledger_routes, with_http_layers, ApiError, Caller, LedgerState};

#[cfg(test)]
mod test_support;

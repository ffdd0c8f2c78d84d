//! Owner-scoped mortgage records and their credit ratings.

pub mod domain;
pub mod rating;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Mortgage, MortgageId, MortgageTerms, MortgageUpdate, RatedMortgage};
pub use rating::{assess, rate, CreditRating, RiskAssessment};
pub use repository::MortgageRepository;
pub use router::mortgage_router;
pub use service::{MortgageService, MortgageServiceError};

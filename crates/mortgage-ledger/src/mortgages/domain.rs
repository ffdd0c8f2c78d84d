use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rating::CreditRating;
use crate::accounts::UserId;

/// Store-assigned identifier for a mortgage record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MortgageId(pub i64);

impl fmt::Display for MortgageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Financial figures describing one mortgage application.
///
/// This is also the create payload; unknown keys such as `id` or `credit_rating`
/// sent by clients are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageTerms {
    pub credit_score: i64,
    pub loan_amount: f64,
    pub property_value: f64,
    pub annual_income: f64,
    pub debt_amount: f64,
    pub loan_type: String,
    pub property_type: String,
}

impl MortgageTerms {
    /// Rejects blank categories and amounts that are negative or not finite.
    pub fn validate(&self) -> Result<(), String> {
        let amounts = [
            ("loan_amount", self.loan_amount),
            ("property_value", self.property_value),
            ("annual_income", self.annual_income),
            ("debt_amount", self.debt_amount),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{field} must be a non-negative number"));
            }
        }
        if self.credit_score < 0 {
            return Err("credit_score must be non-negative".to_string());
        }
        if self.loan_type.trim().is_empty() {
            return Err("loan_type must not be blank".to_string());
        }
        if self.property_type.trim().is_empty() {
            return Err("property_type must not be blank".to_string());
        }
        Ok(())
    }
}

/// Persisted mortgage owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mortgage {
    pub id: MortgageId,
    #[serde(skip)]
    pub owner: UserId,
    #[serde(flatten)]
    pub terms: MortgageTerms,
    pub created_at: DateTime<Utc>,
}

/// Partial update body; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MortgageUpdate {
    pub credit_score: Option<i64>,
    pub loan_amount: Option<f64>,
    pub property_value: Option<f64>,
    pub annual_income: Option<f64>,
    pub debt_amount: Option<f64>,
    pub loan_type: Option<String>,
    pub property_type: Option<String>,
}

impl MortgageUpdate {
    pub fn apply_to(self, terms: &mut MortgageTerms) {
        if let Some(value) = self.credit_score {
            terms.credit_score = value;
        }
        if let Some(value) = self.loan_amount {
            terms.loan_amount = value;
        }
        if let Some(value) = self.property_value {
            terms.property_value = value;
        }
        if let Some(value) = self.annual_income {
            terms.annual_income = value;
        }
        if let Some(value) = self.debt_amount {
            terms.debt_amount = value;
        }
        if let Some(value) = self.loan_type {
            terms.loan_type = value;
        }
        if let Some(value) = self.property_type {
            terms.property_type = value;
        }
    }
}

/// Mortgage annotated with a rating computed at response time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedMortgage {
    #[serde(flatten)]
    pub mortgage: Mortgage,
    pub credit_rating: CreditRating,
}

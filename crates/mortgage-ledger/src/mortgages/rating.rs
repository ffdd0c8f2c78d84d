//! Additive risk scoring that buckets a mortgage into a letter rating.
//!
//! The average credit score is taken across every stored mortgage, not only the
//! owner's, so a rating can change when other users add records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::MortgageTerms;

/// Categorical risk rating, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditRating {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "BBB")]
    Bbb,
    #[serde(rename = "C")]
    C,
}

impl CreditRating {
    pub fn from_risk_score(risk_score: i32) -> Self {
        match risk_score {
            i32::MIN..=2 => Self::Aaa,
            3..=5 => Self::Bbb,
            _ => Self::C,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Aaa => "AAA",
            Self::Bbb => "BBB",
            Self::C => "C",
        }
    }
}

impl fmt::Display for CreditRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Intermediate ratios and the final score behind a rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub loan_to_value: f64,
    pub debt_to_income: f64,
    pub risk_score: i32,
    pub rating: CreditRating,
}

pub fn assess(terms: &MortgageTerms, average_credit_score: f64) -> RiskAssessment {
    let mut risk_score = 0;

    let loan_to_value = ratio(terms.loan_amount, terms.property_value);
    if loan_to_value > 0.9 {
        risk_score += 2;
    } else if loan_to_value > 0.8 {
        risk_score += 1;
    }

    let debt_to_income = ratio(terms.debt_amount, terms.annual_income);
    if debt_to_income > 0.5 {
        risk_score += 2;
    } else if debt_to_income > 0.4 {
        risk_score += 1;
    }

    if terms.credit_score >= 700 {
        risk_score -= 1;
    } else if terms.credit_score < 650 {
        risk_score += 1;
    }

    match terms.loan_type.as_str() {
        "fixed" => risk_score -= 1,
        "adjustable" => risk_score += 1,
        _ => {}
    }

    if terms.property_type == "condo" {
        risk_score += 1;
    }

    // 650 < avg < 700 contributes nothing.
    if average_credit_score >= 700.0 {
        risk_score -= 1;
    } else if (500.0..=650.0).contains(&average_credit_score) {
        risk_score += 2;
    } else if average_credit_score < 500.0 {
        risk_score += 3;
    }

    RiskAssessment {
        loan_to_value,
        debt_to_income,
        risk_score,
        rating: CreditRating::from_risk_score(risk_score),
    }
}

pub fn rate(terms: &MortgageTerms, average_credit_score: f64) -> CreditRating {
    assess(terms, average_credit_score).rating
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

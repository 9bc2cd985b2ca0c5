use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_DAYS_SINCE_LAST_LOAN: i64 = 365;

fn default_days_since_last_loan() -> i64 {
    DEFAULT_DAYS_SINCE_LAST_LOAN
}

/// Applicant attributes submitted for a single scoring request.
///
/// `employment_status` and `education_level` are carried verbatim; none of the
/// current rules branch on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub age: i64,
    pub monthly_income: f64,
    pub loan_amount: f64,
    pub loan_term_months: i64,
    #[serde(default)]
    pub existing_loans: i64,
    #[serde(default)]
    pub previous_defaults: i64,
    pub employment_status: String,
    pub education_level: String,
    #[serde(default)]
    pub dependents: i64,
    #[serde(default)]
    pub mpesa_transactions_monthly: i64,
    #[serde(default)]
    pub mpesa_average_balance: f64,
    #[serde(default)]
    pub mpesa_savings_rate: f64,
    /// Length of the applicant's credit history, in months.
    #[serde(default)]
    pub credit_history_length: i64,
    #[serde(default)]
    pub previous_loans: i64,
    #[serde(default = "default_days_since_last_loan")]
    pub days_since_last_loan: i64,
}

impl ApplicantProfile {
    /// Profile with the required fields set and every optional field at its default.
    pub fn new(
        age: i64,
        monthly_income: f64,
        loan_amount: f64,
        loan_term_months: i64,
        employment_status: impl Into<String>,
        education_level: impl Into<String>,
    ) -> Self {
        Self {
            age,
            monthly_income,
            loan_amount,
            loan_term_months,
            existing_loans: 0,
            previous_defaults: 0,
            employment_status: employment_status.into(),
            education_level: education_level.into(),
            dependents: 0,
            mpesa_transactions_monthly: 0,
            mpesa_average_balance: 0.0,
            mpesa_savings_rate: 0.0,
            credit_history_length: 0,
            previous_loans: 0,
            days_since_last_loan: DEFAULT_DAYS_SINCE_LAST_LOAN,
        }
    }

    /// Loan amount expressed in months of income, `None` when income is not positive.
    pub fn loan_to_income_ratio(&self) -> Option<f64> {
        if self.monthly_income > 0.0 {
            Some(self.loan_amount / self.monthly_income)
        } else {
            None
        }
    }
}

/// Coarse risk bucket derived from the default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "VERY HIGH")]
    VeryHigh,
}

impl RiskCategory {
    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::High => "HIGH",
            RiskCategory::VeryHigh => "VERY HIGH",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            RiskCategory::Low => "APPROVE - Low risk applicant",
            RiskCategory::Medium => "REVIEW - Moderate risk",
            RiskCategory::High => "CAUTION - High risk",
            RiskCategory::VeryHigh => "REJECT - Very high risk",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome returned to callers of the scoring endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Timestamp-derived; two requests within the same second share an id.
    pub applicant_id: String,
    pub default_probability: f64,
    pub risk_category: RiskCategory,
    pub recommendation: String,
    pub score: i32,
    pub timestamp: String,
}

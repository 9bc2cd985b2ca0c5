use super::domain::ApplicantProfile;
use serde::{Deserialize, Serialize};

const MAX_LOAN_TO_INCOME_RATIO: f64 = 3.0;
const YOUNG_APPLICANT_AGE: i64 = 25;
const MAX_EXISTING_LOANS: i64 = 2;
const MIN_MPESA_TRANSACTIONS: i64 = 10;
const HIGH_INCOME_THRESHOLD: f64 = 50_000.0;
const SAVINGS_RATE_THRESHOLD: f64 = 0.15;
const ESTABLISHED_HISTORY_MONTHS: i64 = 24;

/// Rule that moved the raw risk accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactorKind {
    LoanToIncome,
    PreviousDefaults,
    YoungApplicant,
    ExistingLoans,
    LowMpesaActivity,
    HighIncome,
    MpesaSavings,
    EstablishedCreditHistory,
}

impl RiskFactorKind {
    /// Signed contribution to the raw score; protective factors are negative.
    pub fn weight(self) -> f64 {
        match self {
            RiskFactorKind::LoanToIncome => 0.2,
            RiskFactorKind::PreviousDefaults => 0.3,
            RiskFactorKind::YoungApplicant => 0.15,
            RiskFactorKind::ExistingLoans => 0.1,
            RiskFactorKind::LowMpesaActivity => 0.1,
            RiskFactorKind::HighIncome => -0.1,
            RiskFactorKind::MpesaSavings => -0.1,
            RiskFactorKind::EstablishedCreditHistory => -0.08,
        }
    }

    pub fn is_protective(self) -> bool {
        self.weight() < 0.0
    }
}

/// Triggered rule together with a human-readable trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub kind: RiskFactorKind,
    pub weight: f64,
    pub notes: String,
}

impl RiskFactor {
    fn new(kind: RiskFactorKind, notes: String) -> Self {
        Self {
            kind,
            weight: kind.weight(),
            notes,
        }
    }
}

/// Applies every rule in order and returns the triggered factors with the raw,
/// unclamped accumulator.
pub(crate) fn evaluate_factors(profile: &ApplicantProfile) -> (Vec<RiskFactor>, f64) {
    let mut factors = Vec::new();

    match profile.loan_to_income_ratio() {
        Some(ratio) if ratio > MAX_LOAN_TO_INCOME_RATIO => factors.push(RiskFactor::new(
            RiskFactorKind::LoanToIncome,
            format!("loan is {ratio:.2}x monthly income (limit {MAX_LOAN_TO_INCOME_RATIO:.0}x)"),
        )),
        Some(_) => {}
        // A non-positive income makes the ratio unbounded.
        None => factors.push(RiskFactor::new(
            RiskFactorKind::LoanToIncome,
            format!(
                "monthly income {:.2} gives no usable loan-to-income ratio",
                profile.monthly_income
            ),
        )),
    }

    if profile.previous_defaults > 0 {
        factors.push(RiskFactor::new(
            RiskFactorKind::PreviousDefaults,
            format!("{} previous default(s)", profile.previous_defaults),
        ));
    }

    if profile.age < YOUNG_APPLICANT_AGE {
        factors.push(RiskFactor::new(
            RiskFactorKind::YoungApplicant,
            format!("applicant aged {} is under {YOUNG_APPLICANT_AGE}", profile.age),
        ));
    }

    if profile.existing_loans > MAX_EXISTING_LOANS {
        factors.push(RiskFactor::new(
            RiskFactorKind::ExistingLoans,
            format!(
                "{} existing loans exceeds {MAX_EXISTING_LOANS}",
                profile.existing_loans
            ),
        ));
    }

    if profile.mpesa_transactions_monthly < MIN_MPESA_TRANSACTIONS {
        factors.push(RiskFactor::new(
            RiskFactorKind::LowMpesaActivity,
            format!(
                "{} M-Pesa transactions per month (minimum {MIN_MPESA_TRANSACTIONS})",
                profile.mpesa_transactions_monthly
            ),
        ));
    }

    if profile.monthly_income > HIGH_INCOME_THRESHOLD {
        factors.push(RiskFactor::new(
            RiskFactorKind::HighIncome,
            format!(
                "monthly income {:.2} above {HIGH_INCOME_THRESHOLD:.0}",
                profile.monthly_income
            ),
        ));
    }

    if profile.mpesa_savings_rate > SAVINGS_RATE_THRESHOLD {
        factors.push(RiskFactor::new(
            RiskFactorKind::MpesaSavings,
            format!(
                "M-Pesa savings rate {:.0}% above {:.0}%",
                profile.mpesa_savings_rate * 100.0,
                SAVINGS_RATE_THRESHOLD * 100.0
            ),
        ));
    }

    if profile.credit_history_length > ESTABLISHED_HISTORY_MONTHS {
        factors.push(RiskFactor::new(
            RiskFactorKind::EstablishedCreditHistory,
            format!(
                "{} months of credit history (over {ESTABLISHED_HISTORY_MONTHS})",
                profile.credit_history_length
            ),
        ));
    }

    let raw = factors.iter().fold(0.0, |acc, factor| acc + factor.weight);
    (factors, raw)
}

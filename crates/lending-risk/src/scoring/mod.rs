//! Rule-based default-risk scoring.
//!
//! A raw score is accumulated from fixed risk and protective factors, clamped
//! into `[0.05, 0.95]`, rounded to four places and then mapped onto a risk
//! category, a recommendation and an 850-ceiling credit score.

mod clock;
mod domain;
pub mod policy;
mod rules;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{ApplicantProfile, RiskCategory, ScoringResult};
pub use rules::{RiskFactor, RiskFactorKind};
pub use validation::{parse_profile, FieldError, ValidationErrors};

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

const APPLICANT_ID_PREFIX: &str = "APP";
const APPLICANT_ID_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const TIMESTAMP_MICROS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Stateless scorer; safe to share across concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer<C = SystemClock> {
    clock: C,
}

impl RiskScorer<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> RiskScorer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Scores a profile and keeps the factor trail that produced the result.
    pub fn assess(&self, profile: &ApplicantProfile) -> RiskAssessment {
        let (factors, raw_score) = rules::evaluate_factors(profile);

        let default_probability = policy::default_probability(raw_score);
        let risk_category = policy::categorize(default_probability);
        let score = policy::credit_score(default_probability);
        let now = self.clock.now();

        RiskAssessment {
            factors,
            raw_score,
            result: ScoringResult {
                applicant_id: applicant_id(now),
                default_probability,
                risk_category,
                recommendation: risk_category.recommendation().to_string(),
                score,
                timestamp: format_timestamp(now),
            },
        }
    }

    pub fn score(&self, profile: &ApplicantProfile) -> ScoringResult {
        self.assess(profile).result
    }
}

/// ISO-8601 local time as stamped on results; the six-digit microsecond
/// fraction is omitted when it is zero.
pub fn format_timestamp(now: NaiveDateTime) -> String {
    let format = if now.nanosecond() / 1_000 == 0 {
        TIMESTAMP_FORMAT
    } else {
        TIMESTAMP_MICROS_FORMAT
    };
    now.format(format).to_string()
}

/// Ids are second-resolution and therefore not unique across requests.
fn applicant_id(now: NaiveDateTime) -> String {
    format!("{APPLICANT_ID_PREFIX}{}", now.format(APPLICANT_ID_FORMAT))
}

/// Scoring result together with the rules that fired and the unclamped score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub factors: Vec<RiskFactor>,
    pub raw_score: f64,
    pub result: ScoringResult,
}

impl RiskAssessment {
    pub fn factor_kinds(&self) -> Vec<RiskFactorKind> {
        self.factors.iter().map(|factor| factor.kind).collect()
    }
}

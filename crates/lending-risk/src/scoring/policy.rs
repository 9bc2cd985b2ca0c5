use super::domain::RiskCategory;

pub const MIN_DEFAULT_PROBABILITY: f64 = 0.05;
pub const MAX_DEFAULT_PROBABILITY: f64 = 0.95;

const PROBABILITY_SCALE: f64 = 10_000.0;
const MEDIUM_RISK_FLOOR: f64 = 0.20;
const HIGH_RISK_FLOOR: f64 = 0.40;
const VERY_HIGH_RISK_FLOOR: f64 = 0.60;

const SCORE_CEILING: f64 = 850.0;
const SCORE_SPAN: f64 = 550.0;

/// Clamps the raw accumulator into the reportable band and rounds it to four
/// decimal places, ties away from zero.
pub fn default_probability(raw: f64) -> f64 {
    // f64::min/max discard NaN, so a NaN accumulator resolves to the ceiling.
    let clamped = raw.min(MAX_DEFAULT_PROBABILITY).max(MIN_DEFAULT_PROBABILITY);
    (clamped * PROBABILITY_SCALE).round() / PROBABILITY_SCALE
}

/// Each floor belongs to the higher bucket.
pub fn categorize(probability: f64) -> RiskCategory {
    if probability < MEDIUM_RISK_FLOOR {
        RiskCategory::Low
    } else if probability < HIGH_RISK_FLOOR {
        RiskCategory::Medium
    } else if probability < VERY_HIGH_RISK_FLOOR {
        RiskCategory::High
    } else {
        RiskCategory::VeryHigh
    }
}

/// Maps a probability onto the 850-ceiling score scale, truncating toward zero.
pub fn credit_score(probability: f64) -> i32 {
    (SCORE_CEILING - probability * SCORE_SPAN) as i32
}

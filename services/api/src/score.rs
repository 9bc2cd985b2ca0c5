use clap::Args;
use lending_risk::error::AppError;
use lending_risk::scoring::{parse_profile, Clock, RiskAssessment, RiskScorer};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Path to an applicant profile in the /predict JSON format
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Include the triggered risk factors and raw score in the output
    #[arg(long)]
    pub(crate) explain: bool,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let body = std::fs::read(&args.input)?;
    let output = score_document(&body, &RiskScorer::new(), args.explain, args.pretty)?;
    println!("{output}");
    Ok(())
}

fn score_document<C: Clock>(
    body: &[u8],
    scorer: &RiskScorer<C>,
    explain: bool,
    pretty: bool,
) -> Result<String, AppError> {
    let profile = parse_profile(body)?;
    let RiskAssessment {
        factors,
        raw_score,
        result,
    } = scorer.assess(&profile);

    let value = if explain {
        serde_json::json!({
            "result": result,
            "raw_score": raw_score,
            "factors": factors,
        })
    } else {
        serde_json::to_value(&result)?
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lending_risk::scoring::FixedClock;
    use serde_json::{json, Value};

    fn frozen_scorer() -> RiskScorer<FixedClock> {
        let instant = NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .expect("valid instant");
        RiskScorer::with_clock(FixedClock(instant))
    }

    const PROFILE: &str = r#"{
        "age": 24,
        "monthly_income": 15000,
        "loan_amount": 30000,
        "loan_term_months": 6,
        "employment_status": "informal",
        "education_level": "secondary",
        "mpesa_transactions_monthly": 40
    }"#;

    #[test]
    fn document_is_scored_as_plain_result() {
        let output = score_document(PROFILE.as_bytes(), &frozen_scorer(), false, false)
            .expect("profile scores");
        let value: Value = serde_json::from_str(&output).expect("valid json");

        assert_eq!(value["applicant_id"], json!("APP20250115080000"));
        assert_eq!(value["default_probability"], json!(0.15));
        assert_eq!(value["risk_category"], json!("LOW"));
        assert!(value.get("factors").is_none());
    }

    #[test]
    fn explain_includes_factor_trail() {
        let output = score_document(PROFILE.as_bytes(), &frozen_scorer(), true, true)
            .expect("profile scores");
        let value: Value = serde_json::from_str(&output).expect("valid json");

        assert_eq!(value["factors"][0]["kind"], json!("young_applicant"));
        assert_eq!(value["result"]["score"], json!(767));
        assert!(output.contains('\n'));
    }

    #[test]
    fn invalid_document_surfaces_validation_error() {
        let err = score_document(b"{}", &frozen_scorer(), false, false)
            .expect_err("profile incomplete");

        match err {
            AppError::Validation(errors) => assert_eq!(errors.len(), 6),
            other => panic!("expected validation error, got {other}"),
        }
    }
}

//! Boundary checks applied to raw request bodies before a profile is scored.
//!
//! Every offending field is collected so callers can report them together,
//! using `loc`/`msg`/`type` entries rooted at `body`.

use super::domain::ApplicantProfile;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

const BODY: &str = "body";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Integer,
    Float,
    Text,
}

struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    required: bool,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
    }
}

const PROFILE_FIELDS: &[FieldSpec] = &[
    required("age", FieldKind::Integer),
    required("monthly_income", FieldKind::Float),
    required("loan_amount", FieldKind::Float),
    required("loan_term_months", FieldKind::Integer),
    optional("existing_loans", FieldKind::Integer),
    optional("previous_defaults", FieldKind::Integer),
    required("employment_status", FieldKind::Text),
    required("education_level", FieldKind::Text),
    optional("dependents", FieldKind::Integer),
    optional("mpesa_transactions_monthly", FieldKind::Integer),
    optional("mpesa_average_balance", FieldKind::Float),
    optional("mpesa_savings_rate", FieldKind::Float),
    optional("credit_history_length", FieldKind::Integer),
    optional("previous_loans", FieldKind::Integer),
    optional("days_since_last_loan", FieldKind::Integer),
];

/// Single offending location in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    fn body(msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec![BODY.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    fn field(name: &str, msg: &str, kind: &str) -> Self {
        Self {
            loc: vec![BODY.to_string(), name.to_string()],
            msg: msg.to_string(),
            kind: kind.to_string(),
        }
    }

    fn missing(name: &str) -> Self {
        Self::field(name, "field required", "value_error.missing")
    }

    fn wrong_type(name: &str, kind: FieldKind) -> Self {
        match kind {
            FieldKind::Integer => {
                Self::field(name, "value is not a valid integer", "type_error.integer")
            }
            FieldKind::Float => Self::field(name, "value is not a valid float", "type_error.float"),
            FieldKind::Text => Self::field(name, "str type expected", "type_error.str"),
        }
    }

    /// Name of the offending field, if the error is not about the whole body.
    pub fn field_name(&self) -> Option<&str> {
        self.loc.get(1).map(String::as_str)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.loc.join("."), self.msg)
    }
}

/// Request rejected before scoring; serializes as `{"detail": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("invalid applicant profile: {}", summarize(.detail))]
pub struct ValidationErrors {
    pub detail: Vec<FieldError>,
}

impl ValidationErrors {
    fn from_errors(detail: Vec<FieldError>) -> Result<(), Self> {
        if detail.is_empty() {
            Ok(())
        } else {
            Err(Self { detail })
        }
    }

    pub fn len(&self) -> usize {
        self.detail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detail.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.detail
            .iter()
            .filter_map(FieldError::field_name)
            .collect()
    }
}

fn summarize(detail: &[FieldError]) -> String {
    detail
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Decodes a JSON body into a profile that is safe to score.
pub fn parse_profile(body: &[u8]) -> Result<ApplicantProfile, ValidationErrors> {
    let value: Value = serde_json::from_slice(body).map_err(|err| ValidationErrors {
        detail: vec![FieldError::body(
            format!("JSON decode error: {err}"),
            "value_error.jsondecode",
        )],
    })?;

    profile_from_value(value)
}

/// Same checks as [`parse_profile`] for a body that is already decoded.
///
/// Numeric fields are coerced the way lax JSON clients expect: whole-valued
/// floats are accepted for integers and numeric strings for either kind.
pub fn profile_from_value(value: Value) -> Result<ApplicantProfile, ValidationErrors> {
    let object = value.as_object().ok_or_else(|| ValidationErrors {
        detail: vec![FieldError::body("value is not a valid dict", "type_error.dict")],
    })?;

    let mut normalized = Map::new();
    let mut detail = Vec::new();

    for spec in PROFILE_FIELDS {
        match object.get(spec.name) {
            None if spec.required => detail.push(FieldError::missing(spec.name)),
            None => {}
            Some(raw) => match coerce(raw, spec.kind) {
                Some(coerced) => {
                    if spec.name == "monthly_income" {
                        detail.extend(coerced.as_f64().and_then(income_error));
                    }
                    normalized.insert(spec.name.to_string(), coerced);
                }
                None => detail.push(FieldError::wrong_type(spec.name, spec.kind)),
            },
        }
    }

    ValidationErrors::from_errors(detail)?;

    serde_json::from_value(Value::Object(normalized)).map_err(|err| ValidationErrors {
        detail: vec![FieldError::body(err.to_string(), "value_error")],
    })
}

/// Semantic checks on an already typed profile.
pub fn validate_profile(profile: &ApplicantProfile) -> Result<(), ValidationErrors> {
    let detail = income_error(profile.monthly_income).into_iter().collect();
    ValidationErrors::from_errors(detail)
}

fn income_error(monthly_income: f64) -> Option<FieldError> {
    if monthly_income.is_nan() || monthly_income <= 0.0 {
        Some(FieldError::field(
            "monthly_income",
            "ensure this value is greater than 0",
            "value_error.number.not_gt",
        ))
    } else {
        None
    }
}

/// Canonical JSON value for the field kind, or `None` on a type mismatch.
/// Booleans and nulls never coerce.
fn coerce(value: &Value, kind: FieldKind) -> Option<Value> {
    match kind {
        FieldKind::Integer => match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().and_then(whole_number))
                .map(Value::from),
            Value::String(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(whole_number))
                    .map(Value::from)
            }
            _ => None,
        },
        FieldKind::Float => match value {
            Value::Number(number) => number.as_f64().map(Value::from),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|parsed| parsed.is_finite())
                .map(Value::from),
            _ => None,
        },
        FieldKind::Text => value.is_string().then(|| value.clone()),
    }
}

fn whole_number(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

use crate::infra::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use lending_risk::error::AppError;
use lending_risk::scoring::{format_timestamp, parse_profile, Clock, ScoringResult, SystemClock};
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::{debug, info, warn};

const SERVICE_MESSAGE: &str = "Mobile Lending Risk API - Kenya";
const PUBLIC_ENDPOINTS: [&str; 2] = ["/predict", "/health"];

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/predict", post(predict_endpoint))
        .with_state(state)
}

pub(crate) async fn root_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": SERVICE_MESSAGE,
        "status": "active",
        "endpoints": PUBLIC_ENDPOINTS,
    }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": format_timestamp(SystemClock.now()),
    }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn predict_endpoint(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScoringResult>, AppError> {
    let profile = parse_profile(&body).map_err(|errors| {
        warn!(
            invalid_fields = errors.len(),
            fields = ?errors.field_names(),
            "rejected applicant profile"
        );
        errors
    })?;

    let assessment = state.scorer.assess(&profile);
    debug!(
        factors = ?assessment.factor_kinds(),
        raw_score = assessment.raw_score,
        "risk factors evaluated"
    );

    let result = assessment.result;
    info!(
        applicant_id = %result.applicant_id,
        risk_category = %result.risk_category,
        score = result.score,
        "applicant scored"
    );

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        AppState::new(handle)
    }

    fn predict_request(body: impl Into<Body>) -> Request<Body> {
        Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .expect("request builds")
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn root_lists_public_endpoints() {
        let response = router(test_state())
            .oneshot(Request::get("/").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], json!("active"));
        assert_eq!(body["message"], json!(SERVICE_MESSAGE));
        assert_eq!(body["endpoints"], json!(["/predict", "/health"]));
    }

    #[tokio::test]
    async fn health_reports_timestamp() {
        let Json(body) = healthcheck().await;

        assert_eq!(body["status"], json!("healthy"));
        let timestamp = body["timestamp"].as_str().expect("timestamp string");
        assert!(chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }

    #[tokio::test]
    async fn readiness_follows_flag() {
        let state = test_state();
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, json!({ "status": "ready" }));
    }

    #[tokio::test]
    async fn predict_scores_valid_profile() {
        let payload = json!({
            "age": 22,
            "monthly_income": 20000.0,
            "loan_amount": 80000.0,
            "loan_term_months": 12,
            "previous_defaults": 1,
            "existing_loans": 3,
            "mpesa_transactions_monthly": 5,
            "employment_status": "casual",
            "education_level": "secondary"
        });

        let response = router(test_state())
            .oneshot(predict_request(payload.to_string()))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["default_probability"], json!(0.85));
        assert_eq!(body["risk_category"], json!("VERY HIGH"));
        assert_eq!(body["recommendation"], json!("REJECT - Very high risk"));
        assert_eq!(body["score"], json!(382));
        assert!(body["applicant_id"]
            .as_str()
            .is_some_and(|id| id.starts_with("APP")));
    }

    #[tokio::test]
    async fn predict_rejects_missing_and_mistyped_fields() {
        let payload = json!({
            "age": "twenty",
            "monthly_income": 20000.0,
            "loan_term_months": 12,
            "employment_status": "casual",
            "education_level": "secondary"
        });

        let response = router(test_state())
            .oneshot(predict_request(payload.to_string()))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = read_json(response).await;
        let locations: Vec<Value> = body["detail"]
            .as_array()
            .expect("detail array")
            .iter()
            .map(|entry| entry["loc"].clone())
            .collect();
        assert_eq!(
            locations,
            vec![json!(["body", "age"]), json!(["body", "loan_amount"])]
        );
    }

    #[tokio::test]
    async fn predict_coerces_lax_numeric_values() {
        let payload = json!({
            "age": 30.0,
            "monthly_income": "60000",
            "loan_amount": 50000,
            "loan_term_months": "12",
            "mpesa_transactions_monthly": 20,
            "mpesa_savings_rate": "0.2",
            "credit_history_length": 30,
            "employment_status": "employed",
            "education_level": "tertiary"
        });

        let response = router(test_state())
            .oneshot(predict_request(payload.to_string()))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["default_probability"], json!(0.05));
        assert_eq!(body["score"], json!(822));
    }

    #[tokio::test]
    async fn predict_rejects_zero_income() {
        let payload = json!({
            "age": 30,
            "monthly_income": 0,
            "loan_amount": 1000.0,
            "loan_term_months": 3,
            "employment_status": "employed",
            "education_level": "tertiary"
        });

        let response = router(test_state())
            .oneshot(predict_request(payload.to_string()))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = read_json(response).await;
        assert_eq!(body["detail"][0]["type"], json!("value_error.number.not_gt"));
    }

    #[tokio::test]
    async fn predict_rejects_malformed_json() {
        let response = router(test_state())
            .oneshot(predict_request("{\"age\": 30,"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = read_json(response).await;
        assert_eq!(body["detail"][0]["loc"], json!(["body"]));
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_text_exposition() {
        let response = router(test_state())
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}

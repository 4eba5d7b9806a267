//! REST API server for the wealth advisory orchestrator
//!
//! One analysis endpoint plus a health check. Validation failures are
//! rejected before any outbound call; upstream failures never surface as
//! request errors (they become fallback text in the rendered report).

use axum::extract::{FromRequest, Request, State};
use axum::{http::StatusCode, routing::get, routing::post, Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::{ClientRecord, Goal, Portfolio, Profile, Report, TaxInfo};
use crate::orchestrator::Orchestrator;
use crate::report::render_report;

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub profile: Profile,
    pub portfolio: Portfolio,
    #[serde(default)]
    pub tax_info: TaxInfo,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub results: Report,
    pub report: String,
}

/// Error body carried by every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

fn client_error(detail: String) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { detail }))
}

/// JSON extractor whose rejection carries the same `{"detail": ...}` body
/// as every other non-2xx response. The default `axum::Json` rejection is
/// plain text.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err((
                rejection.status(),
                Json(ErrorBody {
                    detail: rejection.body_text(),
                }),
            )),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
}

/// =============================
/// Handlers
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn analyze(
    State(state): State<ApiState>,
    ApiJson(req): ApiJson<AnalyzeRequest>,
) -> std::result::Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorBody>)> {
    let record = ClientRecord::new(req.profile, req.portfolio, req.tax_info, req.goals);

    // Reject bad submissions before any model, search, or storage call.
    record
        .validate()
        .map_err(|e| client_error(e.to_string()))?;

    info!(
        analysis_id = %record.analysis_id,
        user_id = %record.profile.user_id,
        "Received analysis request"
    );

    let results = state.orchestrator.comprehensive_analysis(&record).await;
    let report = render_report(&results, &record);

    Ok(Json(AnalyzeResponse {
        status: "success".to_string(),
        results,
        report,
    }))
}

/// =============================
/// Router / Server Startup
/// =============================

pub fn create_router(orchestrator: Arc<Orchestrator>) -> Router {
    let state = ApiState { orchestrator };

    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(
    orchestrator: Arc<Orchestrator>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::TextGenerator;
    use crate::models::SectionKey;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGenerator {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, _system: &str, _task: &str) -> crate::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("Generated section.".to_string())
        }
    }

    fn valid_request() -> AnalyzeRequest {
        let mut holdings = BTreeMap::new();
        holdings.insert("stocks".to_string(), 300_000.0);
        holdings.insert("bonds".to_string(), 150_000.0);
        holdings.insert("cash".to_string(), 50_000.0);

        AnalyzeRequest {
            profile: Profile {
                user_id: "client_001".to_string(),
                name: "John Doe".to_string(),
                age: 45,
                income: 150_000.0,
                risk_tolerance: Default::default(),
                investment_timeline: "15 years".to_string(),
            },
            portfolio: Portfolio {
                user_id: "client_001".to_string(),
                total_value: 500_000.0,
                holdings,
                risk_score: Some(6.5),
            },
            tax_info: TaxInfo::default(),
            goals: vec![],
        }
    }

    fn test_state(calls: Arc<AtomicUsize>) -> ApiState {
        let generator = Arc::new(CountingGenerator { calls });
        ApiState {
            orchestrator: Arc::new(Orchestrator::new(generator, None, None)),
        }
    }

    #[tokio::test]
    async fn test_analyze_returns_six_sections() {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = test_state(calls.clone());

        let response = analyze(State(state), ApiJson(valid_request())).await.unwrap();

        assert_eq!(response.status, "success");
        assert_eq!(response.results.len(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert!(response.report.contains("Comprehensive Financial Advisory Report"));
    }

    #[tokio::test]
    async fn test_missing_user_id_rejected_before_any_outbound_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = test_state(calls.clone());

        let mut request = valid_request();
        request.profile.user_id = String::new();

        let (status, Json(body)) = analyze(State(state), ApiJson(request)).await.unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.detail.contains("user_id"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_request_without_user_id_field_deserializes_to_empty() {
        // The wire format tolerates a missing user_id; validation, not
        // deserialization, rejects it.
        let request: AnalyzeRequest = serde_json::from_value(serde_json::json!({
            "profile": {"name": "Jane", "age": 30},
            "portfolio": {"total_value": 1000.0, "holdings": {"cash": 1000.0}}
        }))
        .unwrap();

        assert!(request.profile.user_id.is_empty());
        assert!(request.goals.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_rejection_carries_detail_json() {
        // A body missing a required field must still produce the
        // `{"detail": ...}` error shape, not axum's plain-text rejection.
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(
                r#"{"profile": {"user_id": "client_001"}}"#,
            ))
            .unwrap();

        let rejection = ApiJson::<AnalyzeRequest>::from_request(request, &())
            .await
            .unwrap_err();

        let (status, Json(body)) = rejection;
        assert!(status.is_client_error());
        assert!(body.detail.contains("portfolio"));

        // The body round-trips through serde as JSON with a `detail` key.
        let encoded = serde_json::to_value(&body).unwrap();
        assert!(encoded.get("detail").is_some());
    }

    #[tokio::test]
    async fn test_analyze_succeeds_when_every_storage_backend_fails() {
        use crate::storage::ClientStore;

        struct BrokenStore;

        #[async_trait]
        impl ClientStore for BrokenStore {
            async fn upsert_client(
                &self,
                _record: &ClientRecord,
                _report: Option<&Report>,
            ) -> crate::Result<()> {
                Err(crate::error::AdvisoryError::StorageUnavailable(
                    "broken store".to_string(),
                ))
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let generator = Arc::new(CountingGenerator {
            calls: calls.clone(),
        });
        let state = ApiState {
            orchestrator: Arc::new(Orchestrator::new(
                generator,
                None,
                Some(Arc::new(BrokenStore)),
            )),
        };

        let response = analyze(State(state), ApiJson(valid_request())).await.unwrap();

        assert_eq!(response.status, "success");
        assert_eq!(response.results.len(), 6);
        assert!(response.report.contains("Comprehensive Financial Advisory Report"));
    }

    #[tokio::test]
    async fn test_results_keep_raw_sentinels_while_report_uses_fallback() {
        struct FailingGenerator;

        #[async_trait]
        impl TextGenerator for FailingGenerator {
            async fn generate(&self, _system: &str, _task: &str) -> crate::Result<String> {
                Err(crate::error::AdvisoryError::LlmError(
                    "Empty response from Gemini".to_string(),
                ))
            }
        }

        let state = ApiState {
            orchestrator: Arc::new(Orchestrator::new(Arc::new(FailingGenerator), None, None)),
        };

        let response = analyze(State(state), ApiJson(valid_request())).await.unwrap();

        // Raw results carry the sentinel for diagnostics.
        let raw = response.results.get(SectionKey::PortfolioAnalysis).unwrap();
        assert!(raw.starts_with("Error: Could not complete task."));

        // The rendered report substitutes fallback text.
        assert!(!response.report.contains("Error: Could not complete task."));
        assert!(response.report.contains("$500,000"));
    }
}

mod stations;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use evscout_tomtom::{TomTomClient, TomTomError};

use crate::middleware::request_id;

#[derive(Clone)]
pub struct AppState {
    pub tomtom: Arc<TomTomClient>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    #[serde(skip)]
    status: StatusCode,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code,
                message: message.into(),
            },
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

/// Map a provider-client error onto an HTTP response.
///
/// Upstream rejections keep the provider's status code and body so the caller
/// can tell "provider rejected the request" apart from "we gave up waiting"
/// (504) and internal failures (500).
pub(super) fn map_provider_error(error: &TomTomError) -> ApiError {
    tracing::error!(error = %error, "TomTom request failed");
    match error {
        TomTomError::SubmitRejected { status, detail }
        | TomTomError::PollFailed { status, detail }
        | TomTomError::UnexpectedStatus { status, detail } => ApiError::new(
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            "provider_error",
            format!("TomTom API error: {detail}"),
        ),
        TomTomError::Http(e) => match e.status() {
            Some(status) => ApiError::new(
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
                "provider_error",
                format!("TomTom API error: {e}"),
            ),
            None => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                e.to_string(),
            ),
        },
        TomTomError::MissingPollLocation => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "batch_submission_failed",
            "batch submission failed: no status URL",
        ),
        TomTomError::TimedOut { waited_secs } => ApiError::new(
            StatusCode::GATEWAY_TIMEOUT,
            "batch_timeout",
            format!("batch processing timed out after {waited_secs}s"),
        ),
        TomTomError::InvalidUrl { .. } | TomTomError::Deserialize { .. } => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            error.to_string(),
        ),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/ev-stations", get(stations::search_stations))
        .route(
            "/api/ev-stations/availability/{availability_id}",
            get(stations::station_availability),
        )
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthData { status: "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use evscout_tomtom::PollConfig;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_for(server: &MockServer) -> Router {
        let tomtom = TomTomClient::with_base_url("test-key", 30, &server.uri())
            .expect("client")
            .with_poll_config(PollConfig {
                max_wait: Duration::from_millis(300),
                poll_interval: Duration::from_millis(20),
                transient_backoff: Duration::from_millis(10),
                status_timeout: Duration::from_millis(500),
            });
        build_app(AppState {
            tomtom: Arc::new(tomtom),
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let server = MockServer::start().await;
        let (status, json) = get_json(app_for(&server), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"].as_str(), Some("ok"));
    }

    #[tokio::test]
    async fn search_returns_merged_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search/2/batch.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "batchItems": [
                    { "statusCode": 200, "response": { "results": [
                        { "id": "A", "poi": { "name": "Charger A" } }
                    ] } }
                ]
            })))
            .mount(&server)
            .await;

        let uri = "/api/ev-stations?min_lat=35.00&min_lon=139.00&max_lat=35.01&max_lon=139.01";
        let (status, json) = get_json(app_for(&server), uri).await;

        assert_eq!(status, StatusCode::OK);
        let results = json["results"].as_array().expect("results array");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"].as_str(), Some("A"));
        assert_eq!(results[0]["poi"]["name"].as_str(), Some("Charger A"));
    }

    #[tokio::test]
    async fn search_preserves_provider_rejection_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search/2/batch.json"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Developer inactive"))
            .mount(&server)
            .await;

        let uri = "/api/ev-stations?min_lat=35.00&min_lon=139.00&max_lat=35.01&max_lon=139.01";
        let (status, json) = get_json(app_for(&server), uri).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"]["code"].as_str(), Some("provider_error"));
        assert!(
            json["error"]["message"]
                .as_str()
                .is_some_and(|m| m.contains("Developer inactive")),
            "body: {json}"
        );
    }

    #[tokio::test]
    async fn search_maps_poll_timeout_to_504() {
        let server = MockServer::start().await;
        let poll_path = "/search/batch/stuck";
        Mock::given(method("POST"))
            .and(path("/search/2/batch.json"))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("Location", format!("{}{poll_path}", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(poll_path))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let uri = "/api/ev-stations?min_lat=35.00&min_lon=139.00&max_lat=35.01&max_lon=139.01";
        let (status, json) = get_json(app_for(&server), uri).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["error"]["code"].as_str(), Some("batch_timeout"));
    }

    #[tokio::test]
    async fn search_requires_all_four_coordinates() {
        let server = MockServer::start().await;
        let uri = "/api/ev-stations?min_lat=35.00&min_lon=139.00&max_lat=35.01";
        let (status, _) = get_json(app_for(&server), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn availability_route_passes_provider_body_through() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "connectors": [] });
        Mock::given(method("GET"))
            .and(path("/search/2/chargingAvailability/station-9.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let (status, json) =
            get_json(app_for(&server), "/api/ev-stations/availability/station-9").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, body);
    }

    #[tokio::test]
    async fn availability_error_preserves_provider_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/2/chargingAvailability/station-x.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("station not found"))
            .mount(&server)
            .await;

        let (status, json) =
            get_json(app_for(&server), "/api/ev-stations/availability/station-x").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"].as_str(), Some("provider_error"));
        assert!(
            json["error"]["message"]
                .as_str()
                .is_some_and(|m| m.contains("station not found")),
            "body: {json}"
        );
    }

    #[tokio::test]
    async fn response_echoes_request_id_header() {
        let server = MockServer::start().await;
        let response = app_for(&server)
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-42")
        );
    }
}

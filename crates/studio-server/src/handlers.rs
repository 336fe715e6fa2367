//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use studio_payments::{Amount, PaymentError, PaymentRequest};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub amount: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of a handler result, rendered as `{ "error": ... }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        if err.is_unexpected() {
            tracing::error!("Checkout error: {}", err);
        } else {
            tracing::warn!("Checkout rejected: {}", err);
        }

        // Stripe only sends real HTTP statuses, but don't trust it blindly
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
        Self::new(status, err.user_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.gateway.is_some(),
    })
}

/// Create Stripe checkout session for a payer-chosen amount
///
/// The body is read raw so a missing content type or unparseable JSON
/// answers with the same 400 as a bad amount.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let payload: CheckoutRequest = serde_json::from_slice(&body).unwrap_or_default();
    let amount = Amount::parse(payload.amount.as_ref())?;

    let gateway = state.gateway.as_ref().ok_or_else(|| {
        tracing::warn!("Checkout requested but Stripe is not configured");
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Payments not configured")
    })?;

    let origin = request_origin(&headers, &uri, state.port);
    let request = PaymentRequest::for_origin(amount, &origin);

    let session = gateway.create_session(&request).await?;

    Ok(Json(CheckoutResponse {
        url: session.url,
        id: session.id,
    }))
}

/// Turn a template result into a page, or a 500 if rendering failed
fn page(rendered: tera::Result<String>) -> Result<Html<String>, ApiError> {
    rendered.map(Html).map_err(|e| {
        tracing::error!("Page render error: {:?}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Page unavailable")
    })
}

pub async fn landing(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    page(state.pages.render_landing(&state.studio_name))
}

pub async fn success(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    page(state.pages.render_success(&state.studio_name))
}

pub async fn cancel(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    page(state.pages.render_cancel(&state.studio_name))
}

/// Public origin of this server as the caller reached it
///
/// Scheme comes from `X-Forwarded-Proto` when a proxy set it, else from the
/// request URI. Host comes from the `Host` header, else from the URI
/// authority (HTTP/2 `:authority`).
fn request_origin(headers: &HeaderMap, uri: &Uri, port: u16) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .or_else(|| uri.scheme_str())
        .filter(|s| s.eq_ignore_ascii_case("https"))
        .map_or("http", |_| "https");

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
        .unwrap_or_else(|| format!("localhost:{port}"));

    format!("{scheme}://{host}")
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use serde_json::json;
    use studio_payments::{CheckoutGateway, CheckoutSession, StripeClient};
    use tower::ServiceExt;

    use crate::pages::Pages;
    use crate::router;

    enum Outcome {
        Created,
        Rejected(u16, &'static str),
        Broken,
    }

    /// Gateway double that records every request it is handed
    struct FakeGateway {
        outcome: Outcome,
        seen: Mutex<Vec<PaymentRequest>>,
    }

    impl FakeGateway {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<PaymentRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CheckoutGateway for FakeGateway {
        async fn create_session(
            &self,
            request: &PaymentRequest,
        ) -> studio_payments::Result<CheckoutSession> {
            self.seen.lock().unwrap().push(request.clone());
            match self.outcome {
                Outcome::Created => Ok(CheckoutSession {
                    id: "cs_test_fake".into(),
                    url: "https://checkout.stripe.com/c/pay/cs_test_fake".into(),
                }),
                Outcome::Rejected(status, message) => Err(PaymentError::Upstream {
                    status,
                    message: message.into(),
                }),
                Outcome::Broken => Err(PaymentError::MalformedResponse(
                    "expected value at line 1 column 1".into(),
                )),
            }
        }
    }

    fn state_with(gateway: Option<Arc<dyn CheckoutGateway>>) -> AppState {
        AppState::new("Nova Works", Pages::new().unwrap(), gateway, 4242)
    }

    fn checkout_request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/create-checkout-session")
            .header("host", "studio.test")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get_page(path: &str) -> (StatusCode, String, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = router(state_with(None)).oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_amount_is_forwarded() {
        let fake = FakeGateway::new(Outcome::Created);
        let (status, body) = send(
            state_with(Some(fake.clone())),
            checkout_request(json!({"amount": 100}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "cs_test_fake");
        assert_eq!(body["url"], "https://checkout.stripe.com/c/pay/cs_test_fake");

        let seen = fake.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].amount.cents(), 100);
        assert_eq!(seen[0].success_url, "http://studio.test/success");
        assert_eq!(seen[0].cancel_url, "http://studio.test/cancel");
    }

    #[tokio::test]
    async fn test_forwards_exact_amount() {
        for cents in [101_i64, 2_500, 1_234_567] {
            let fake = FakeGateway::new(Outcome::Created);
            let (status, _) = send(
                state_with(Some(fake.clone())),
                checkout_request(json!({ "amount": cents }).to_string()),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(fake.seen()[0].amount.cents(), cents);
        }
    }

    #[tokio::test]
    async fn test_invalid_amounts_never_reach_stripe() {
        let bodies = [
            json!({"amount": 99}).to_string(),
            json!({"amount": 0}).to_string(),
            json!({"amount": -1000}).to_string(),
            json!({"amount": "lots"}).to_string(),
            json!({"amount": 150.5}).to_string(),
            json!({"amount": null}).to_string(),
            json!({}).to_string(),
            "not json".to_string(),
            String::new(),
        ];

        for body in bodies {
            let fake = FakeGateway::new(Outcome::Created);
            let (status, response) =
                send(state_with(Some(fake.clone())), checkout_request(body.clone())).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body:?}");
            assert_eq!(response["error"], "Invalid amount. Must be at least $1.");
            assert!(fake.seen().is_empty(), "body: {body:?}");
        }
    }

    #[tokio::test]
    async fn test_upstream_rejection_is_relayed() {
        let fake = FakeGateway::new(Outcome::Rejected(402, "Your card was declined."));
        let (status, body) = send(
            state_with(Some(fake)),
            checkout_request(json!({"amount": 5000}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body, json!({"error": "Your card was declined."}));
    }

    #[tokio::test]
    async fn test_unexpected_failure_is_generic() {
        let fake = FakeGateway::new(Outcome::Broken);
        let (status, body) = send(
            state_with(Some(fake)),
            checkout_request(json!({"amount": 5000}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Server error creating checkout session"}));
    }

    #[tokio::test]
    async fn test_network_failure_does_not_leak() {
        let stripe = StripeClient::with_base_url("sk_test_123", "http://127.0.0.1:1");
        let (status, body) = send(
            state_with(Some(Arc::new(stripe))),
            checkout_request(json!({"amount": 5000}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Server error creating checkout session"}));
    }

    #[tokio::test]
    async fn test_stripe_402_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/checkout/sessions")
            .match_header("authorization", "Bearer sk_test_123")
            .match_body(mockito::Matcher::UrlEncoded(
                "line_items[0][price_data][unit_amount]".into(),
                "100".into(),
            ))
            .with_status(402)
            .with_body(r#"{"error":{"type":"invalid_request_error","message":"Amount too small for this account."}}"#)
            .create_async()
            .await;

        let stripe = StripeClient::with_base_url("sk_test_123", &server.url());
        let (status, body) = send(
            state_with(Some(Arc::new(stripe))),
            checkout_request(json!({"amount": "100"}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["error"], "Amount too small for this account.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unconfigured_stripe() {
        let (status, body) = send(
            state_with(None),
            checkout_request(json!({"amount": 5000}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Payments not configured");
    }

    #[tokio::test]
    async fn test_pages_render_studio_name() {
        for path in ["/", "/success", "/cancel"] {
            let (status, content_type, html) = get_page(path).await;
            assert_eq!(status, StatusCode::OK, "path: {path}");
            assert!(content_type.starts_with("text/html"), "path: {path}");
            assert!(html.contains("Nova Works"), "path: {path}");
        }
    }

    #[tokio::test]
    async fn test_health_reports_stripe() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(state_with(None), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stripe_configured"], false);
    }

    #[test]
    fn test_request_origin() {
        let path: Uri = "/create-checkout-session".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(request_origin(&headers, &path, 4242), "http://localhost:4242");

        headers.insert(header::HOST, "studio.example".parse().unwrap());
        assert_eq!(request_origin(&headers, &path, 4242), "http://studio.example");

        headers.insert("x-forwarded-proto", "https, http".parse().unwrap());
        assert_eq!(request_origin(&headers, &path, 4242), "https://studio.example");

        headers.insert("x-forwarded-proto", "javascript".parse().unwrap());
        assert_eq!(request_origin(&headers, &path, 4242), "http://studio.example");
    }

    #[test]
    fn test_request_origin_from_uri_authority() {
        let absolute: Uri = "https://studio.h2:8443/create-checkout-session".parse().unwrap();
        let headers = HeaderMap::new();
        assert_eq!(request_origin(&headers, &absolute, 4242), "https://studio.h2:8443");

        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "studio.example".parse().unwrap());
        assert_eq!(request_origin(&headers, &absolute, 4242), "https://studio.example");
    }

    #[tokio::test]
    async fn test_redirects_use_authority_without_host_header() {
        let fake = FakeGateway::new(Outcome::Created);
        let request = Request::builder()
            .method("POST")
            .uri("https://studio.h2:8443/create-checkout-session")
            .header("content-type", "application/json")
            .body(Body::from(json!({"amount": 2500}).to_string()))
            .unwrap();
        let (status, _) = send(state_with(Some(fake.clone())), request).await;

        assert_eq!(status, StatusCode::OK);
        let seen = fake.seen();
        assert_eq!(seen[0].success_url, "https://studio.h2:8443/success");
        assert_eq!(seen[0].cancel_url, "https://studio.h2:8443/cancel");
    }

    #[tokio::test]
    async fn test_cross_origin_preflight_is_not_answered() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/create-checkout-session")
            .header("host", "studio.test")
            .header(header::ORIGIN, "https://elsewhere.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = router(state_with(None)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_render_failure_is_server_error() {
        let response = page(Err(tera::Error::msg("template blew up"))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Page unavailable");
    }
}

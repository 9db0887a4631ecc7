use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::models::{
    ApiError, RefreshRequest, TokenResponse, HISTORY_FALLBACK, LOGIN_FALLBACK, PREDICT_FALLBACK,
    REFRESH_FALLBACK, REGISTER_FALLBACK,
};
use super::PredictionApi;
use crate::config::ClientConfig;
use crate::models::{Credential, LoginRequest, PredictionRequest, RegisterRequest};
use crate::store::CredentialStore;
use crate::utils::extract_error_details;

const CSRF_HEADER: &str = "x-csrftoken";

/// HTTP client for the prediction backend
pub struct StockcastClient {
    http_client: HttpClient,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    csrf_token: Option<String>,
}

impl StockcastClient {
    /// Create a client from configuration
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            csrf_token: config.csrf_token.clone(),
        }
    }

    /// Create a client against a custom origin (for testing)
    pub fn with_base_url(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            csrf_token: None,
        }
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build request headers. Protected calls read the credential store now,
    /// so a logout elsewhere applies to the very next request.
    fn create_headers(&self, protected: bool) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(csrf) = &self.csrf_token {
            let value = HeaderValue::from_str(csrf).map_err(|e| {
                ApiError::NetworkFailure(format!("Failed to create anti-forgery header: {}", e))
            })?;
            headers.insert(CSRF_HEADER, value);
        }

        if protected {
            match self.credentials.load() {
                Some(credential) => {
                    let auth_value = HeaderValue::from_str(&credential.bearer()).map_err(|e| {
                        ApiError::NetworkFailure(format!("Failed to create auth header: {}", e))
                    })?;
                    headers.insert(AUTHORIZATION, auth_value);
                }
                None => debug!("No stored credential, sending protected request without one"),
            }
        }

        Ok(headers)
    }

    /// Send a request and map the outcome. 2xx bodies are parsed as JSON; an
    /// empty 2xx body is `Value::Null`.
    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Value, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::NetworkFailure(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkFailure(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Self::handle_error_response(status, &body_text, fallback));
        }

        if body_text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body_text)
            .map_err(|e| ApiError::MalformedResponse(format!("Failed to parse response: {}", e)))
    }

    /// Map a non-2xx status to an error
    fn handle_error_response(status: StatusCode, body_text: &str, fallback: &str) -> ApiError {
        let status_code = status.as_u16();

        match status_code {
            401 => ApiError::Unauthorized,
            400..=499 => {
                let body = serde_json::from_str::<Value>(body_text).unwrap_or(Value::Null);
                ApiError::ClientError(extract_error_details(&body, fallback))
            }
            500.. => {
                warn!("Server error {}: {}", status_code, body_text);
                ApiError::ServerError(status_code)
            }
            _ => ApiError::MalformedResponse(format!("Unexpected status {}", status_code)),
        }
    }
}

#[async_trait]
impl PredictionApi for StockcastClient {
    async fn login(&self, request: &LoginRequest) -> Result<Credential, ApiError> {
        let headers = self.create_headers(false)?;
        let body = self
            .send(
                self.http_client
                    .post(self.url("/api/v1/token/"))
                    .headers(headers)
                    .json(request),
                LOGIN_FALLBACK,
            )
            .await?;

        let tokens: TokenResponse = serde_json::from_value(body)
            .map_err(|e| ApiError::MalformedResponse(format!("Unexpected token response: {}", e)))?;

        match (tokens.access, tokens.refresh) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                info!("Login accepted for {}", request.username);
                Ok(Credential::new(access, refresh))
            }
            _ => Err(ApiError::MalformedResponse(
                "Token response is missing the access or refresh token".to_string(),
            )),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let headers = self.create_headers(false)?;
        self.send(
            self.http_client
                .post(self.url("/api/v1/register/"))
                .headers(headers)
                .json(request),
            REGISTER_FALLBACK,
        )
        .await?;

        info!("Registered account {}", request.username);
        Ok(())
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<Value, ApiError> {
        let headers = self.create_headers(true)?;
        debug!("Requesting prediction for {}", request.ticker);

        self.send(
            self.http_client
                .post(self.url("/api/v1/predict/"))
                .headers(headers)
                .json(request),
            PREDICT_FALLBACK,
        )
        .await
    }

    async fn list_predictions(&self) -> Result<Value, ApiError> {
        let headers = self.create_headers(true)?;

        self.send(
            self.http_client
                .get(self.url("/api/v1/predictions/"))
                .headers(headers),
            HISTORY_FALLBACK,
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, ApiError> {
        let headers = self.create_headers(false)?;
        let body = self
            .send(
                self.http_client
                    .post(self.url("/api/v1/token/refresh/"))
                    .headers(headers)
                    .json(&RefreshRequest { refresh: refresh_token }),
                REFRESH_FALLBACK,
            )
            .await?;

        let tokens: TokenResponse = serde_json::from_value(body)
            .map_err(|e| ApiError::MalformedResponse(format!("Unexpected token response: {}", e)))?;

        match tokens.access.filter(|access| !access.is_empty()) {
            Some(access) => {
                let refresh = tokens
                    .refresh
                    .filter(|refresh| !refresh.is_empty())
                    .unwrap_or_else(|| refresh_token.to_string());
                Ok(Credential::new(access, refresh))
            }
            None => Err(ApiError::MalformedResponse(
                "Refresh response is missing the access token".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorDetails;
    use crate::store::InMemoryCredentialStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, store: Arc<InMemoryCredentialStore>) -> StockcastClient {
        StockcastClient::with_base_url(server.uri(), store)
    }

    fn logged_in() -> Arc<InMemoryCredentialStore> {
        Arc::new(InMemoryCredentialStore::with_credential(&Credential::new("a1", "r1")))
    }

    // ==================== Login ====================

    #[tokio::test]
    async fn test_login_returns_token_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/token/"))
            .and(body_json(json!({"username": "bob", "password": "x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})))
            .mount(&server)
            .await;

        let request = LoginRequest { username: "bob".into(), password: "x".into() };
        let credential = client(&server, logged_in()).login(&request).await.unwrap();

        assert_eq!(credential, Credential::new("a1", "r1"));

        let received = server.received_requests().await.unwrap();
        assert!(received[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_login_without_refresh_token_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "a1"})))
            .mount(&server)
            .await;

        let request = LoginRequest { username: "bob".into(), password: "x".into() };
        let result = client(&server, Arc::new(InMemoryCredentialStore::new())).login(&request).await;

        assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_login_rejected_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/token/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "No active account found with the given credentials"
            })))
            .mount(&server)
            .await;

        let request = LoginRequest { username: "bob".into(), password: "wrong".into() };
        let result = client(&server, Arc::new(InMemoryCredentialStore::new())).login(&request).await;

        assert_eq!(result, Err(ApiError::Unauthorized));
    }

    // ==================== Register ====================

    #[tokio::test]
    async fn test_register_field_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/register/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "username": ["A user with that username already exists."]
            })))
            .mount(&server)
            .await;

        let request = RegisterRequest {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "hunter22".into(),
        };
        let result = client(&server, Arc::new(InMemoryCredentialStore::new()))
            .register(&request)
            .await;

        match result {
            Err(ApiError::ClientError(details)) => assert_eq!(
                details.lines(),
                vec!["username: A user with that username already exists."]
            ),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_accepts_empty_created_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/register/"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let request = RegisterRequest {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "hunter22".into(),
        };
        assert_eq!(
            client(&server, Arc::new(InMemoryCredentialStore::new())).register(&request).await,
            Ok(())
        );
    }

    // ==================== Predict ====================

    #[tokio::test]
    async fn test_predict_sends_bearer_and_csrf() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/predict/"))
            .and(header("authorization", "Bearer a1"))
            .and(header("x-csrftoken", "csrf123"))
            .and(body_json(json!({"ticker": "AAPL"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ticker": "AAPL",
                "metrics": {"next_day_price": 150.5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, logged_in()).with_csrf_token("csrf123");
        let request = PredictionRequest::from_input(" aapl ").unwrap();
        let payload = api.predict(&request).await.unwrap();

        assert_eq!(payload["metrics"]["next_day_price"], json!(150.5));
    }

    #[tokio::test]
    async fn test_predict_reads_store_at_issuance() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/predict/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = logged_in();
        let api = client(&server, store.clone());
        store.clear().unwrap();

        let request = PredictionRequest::from_input("AAPL").unwrap();
        assert_eq!(api.predict(&request).await, Err(ApiError::Unauthorized));

        let received = server.received_requests().await.unwrap();
        assert!(received[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_predict_bad_request_uses_error_then_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/predict/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "detail": "ignored",
                "error": "Ticker ZZZZ not found"
            })))
            .mount(&server)
            .await;

        let request = PredictionRequest::from_input("zzzz").unwrap();
        let result = client(&server, logged_in()).predict(&request).await;

        assert_eq!(
            result,
            Err(ApiError::ClientError(ErrorDetails::message("Ticker ZZZZ not found")))
        );
    }

    #[tokio::test]
    async fn test_predict_bad_request_without_message_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/predict/"))
            .respond_with(ResponseTemplate::new(400).set_body_string("<html>bad</html>"))
            .mount(&server)
            .await;

        let request = PredictionRequest::from_input("AAPL").unwrap();
        let result = client(&server, logged_in()).predict(&request).await;

        assert_eq!(
            result,
            Err(ApiError::ClientError(ErrorDetails::message(PREDICT_FALLBACK)))
        );
    }

    #[tokio::test]
    async fn test_predict_server_error_hides_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/predict/"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Traceback (most recent call last)"))
            .mount(&server)
            .await;

        let request = PredictionRequest::from_input("AAPL").unwrap();
        let result = client(&server, logged_in()).predict(&request).await;

        assert_eq!(result, Err(ApiError::ServerError(503)));
    }

    #[test]
    fn test_any_status_from_500_up_is_server_error() {
        for code in [500, 599, 600, 999] {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(
                StockcastClient::handle_error_response(status, "", PREDICT_FALLBACK),
                ApiError::ServerError(code)
            );
        }
    }

    #[tokio::test]
    async fn test_predict_invalid_json_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/predict/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let request = PredictionRequest::from_input("AAPL").unwrap();
        let result = client(&server, logged_in()).predict(&request).await;

        assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_failure() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let api = StockcastClient::with_base_url(uri, logged_in());
        let result = api.list_predictions().await;

        assert!(matches!(result, Err(ApiError::NetworkFailure(_))));
    }

    // ==================== History / refresh ====================

    #[tokio::test]
    async fn test_list_predictions_is_protected_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/predictions/"))
            .and(header("authorization", "Bearer a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let payload = client(&server, logged_in()).list_predictions().await.unwrap();
        assert_eq!(payload, json!([]));
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token_unless_rotated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/token/refresh/"))
            .and(body_json(json!({"refresh": "r1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "a2"})))
            .mount(&server)
            .await;

        let credential = client(&server, logged_in()).refresh("r1").await.unwrap();
        assert_eq!(credential, Credential::new("a2", "r1"));
    }
}

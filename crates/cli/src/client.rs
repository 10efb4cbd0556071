// HTTP client wrapper for the Agentdesk backend
//
// Design Decision: One reqwest client with a cookie store. The backend keeps
// its session token in an http-only cookie, so logging in once per process
// authenticates every later request.
// Design Decision: Error bodies are reduced to their `detail` field, the way
// the backend reports failures.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::config::CliConfig;

/// Header the backend checks on every request
pub const REQUEST_TOKEN_HEADER: &str = "X-Requested-With";

/// Message used when a response carries no usable detail
pub const GENERIC_SERVER_ERROR: &str = "An error occurred on the server";

/// Message used when the backend cannot be reached
pub const NO_RESPONSE: &str = "No response received from the server. Please try again later.";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{}", NO_RESPONSE)]
    NoResponse,

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify a failure to get any response at all
    fn from_send(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            tracing::debug!(error = %err, "Request got no response");
            ClientError::NoResponse
        } else {
            ClientError::Http(err)
        }
    }

    /// HTTP status of an error response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::NotFound(_) => Some(StatusCode::NOT_FOUND.as_u16()),
            _ => None,
        }
    }
}

pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: &CliConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ClientError::Config(format!("invalid API URL {}: {}", config.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "API URL cannot be a base: {}",
                config.api_url
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.request_token {
            let value = HeaderValue::from_str(token)
                .map_err(|_| ClientError::Config("request token is not a valid header value".into()))?;
            headers.insert(REQUEST_TOKEN_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { base_url, http })
    }

    /// Build a URL under the API base; an empty last segment yields a trailing slash
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let request = self.http.get(self.url(segments));
        self.send(request).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ClientError> {
        let request = self.http.post(self.url(segments)).json(body);
        self.send(request).await
    }

    /// Send a multipart form with `method`
    pub async fn send_form<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        form: Form,
    ) -> Result<T, ClientError> {
        let request = self.http.request(method, self.url(segments)).multipart(form);
        self.send(request).await
    }

    pub async fn delete(&self, segments: &[&str]) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(segments))
            .send()
            .await
            .map_err(ClientError::from_send)?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::error_from(response).await)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await.map_err(ClientError::from_send)?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body = response.json().await?;
        Ok(body)
    }

    async fn error_from(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = error_detail(&body);
        tracing::debug!(status = status.as_u16(), %message, "Backend returned an error");

        if status == StatusCode::NOT_FOUND {
            ClientError::NotFound(message)
        } else {
            ClientError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

/// Extract the `detail` of an error body, falling back to a generic message
///
/// `detail` is either a string or, for request validation failures, a list
/// of objects carrying `msg`.
pub fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return GENERIC_SERVER_ERROR.to_string();
    };
    match value.get("detail") {
        Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                GENERIC_SERVER_ERROR.to_string()
            } else {
                messages.join("; ")
            }
        }
        _ => GENERIC_SERVER_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Client {
        let config = CliConfig::new(&format!("{}/api", server.uri()))
            .with_request_token(Some("test-token".to_string()));
        Client::new(&config).unwrap()
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(error_detail(r#"{"detail":"Agent exists"}"#), "Agent exists");
        assert_eq!(
            error_detail(r#"{"detail":[{"msg":"field required"},{"msg":"too long"}]}"#),
            "field required; too long"
        );
        assert_eq!(error_detail(r#"{"detail":""}"#), GENERIC_SERVER_ERROR);
        assert_eq!(error_detail("Internal Server Error"), GENERIC_SERVER_ERROR);
    }

    #[test]
    fn test_url_building() {
        let client = Client::new(&CliConfig::new("http://localhost:8080/api/")).unwrap();
        assert_eq!(
            client.url(&["agents", ""]).as_str(),
            "http://localhost:8080/api/agents/"
        );
        assert_eq!(
            client.url(&["agents", "my agent"]).as_str(),
            "http://localhost:8080/api/agents/my%20agent"
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Client::new(&CliConfig::new("not a url")),
            Err(ClientError::Config(_))
        ));
        let config = CliConfig::new("http://localhost").with_request_token(Some("bad\nvalue".into()));
        assert!(matches!(Client::new(&config), Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn test_sends_request_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/is-admin-password-set"))
            .and(header(REQUEST_TOKEN_HEADER, "test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"admin_password_set": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body: serde_json::Value = client
            .get(&["auth", "is-admin-password-set"])
            .await
            .unwrap();
        assert_eq!(body["admin_password_set"], true);
    }

    #[tokio::test]
    async fn test_error_status_maps_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid password"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/agents/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Agent not found"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .post::<serde_json::Value, _>(&["auth", "login"], &json!({"password": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 401, .. }));
        assert_eq!(err.to_string(), "Invalid password");

        let err = client
            .get::<serde_json::Value>(&["agents", "ghost"])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_session_cookie_is_replayed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "access_token=abc123; Path=/; HttpOnly")
                    .set_body_json(json!({"message": "Login successful"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/auth/check-token"))
            .and(header("cookie", "access_token=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Token is valid"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let _: serde_json::Value = client
            .post(&["auth", "login"], &json!({"username": "admin", "password": "secret"}))
            .await
            .unwrap();
        let _: serde_json::Value = client.get(&["auth", "check-token"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let client = Client::new(&CliConfig::new("http://127.0.0.1:9/api")).unwrap();
        let err = client
            .get::<serde_json::Value>(&["agents", ""])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NoResponse));
        assert_eq!(err.to_string(), NO_RESPONSE);
    }
}

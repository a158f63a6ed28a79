//! API client for communicating with the education platform REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests. Each endpoint knows the `code` its successful response must
//! carry and the field its payload lives under.

use std::time::Duration;

use reqwest::{header, multipart, Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Envelope, Pagination, Role};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Multipart field the backend reads the avatar file from.
const AVATAR_FIELD: &str = "avatar";

pub const CODE_TESTS_FETCHED: &str = "testsFetched";
pub const CODE_TEACHERS_NAME_FETCHED: &str = "teachersNameFetched";
pub const CODE_USERS_FETCHED: &str = "usersFetched";
pub const CODE_USER_FETCHED: &str = "userFetched";
pub const CODE_USER_UPDATED: &str = "userUpdated";
pub const CODE_AVATAR_UPDATED: &str = "avatarUpdated";

/// Query for one page of the tests list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestsQuery {
    pub page: u32,
    pub limit: u32,
    /// `None` for a teacher's own tests, `"all"` or a teacher id otherwise.
    pub teacher_id: Option<String>,
}

impl TestsQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(ref id) = self.teacher_id {
            params.push(("teacherId", id.clone()));
        }
        params
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub items: Vec<Value>,
    pub pagination: Option<Pagination>,
}

/// Result of a mutation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResult {
    pub record: Value,
    pub message: Option<String>,
}

/// API client for the education platform.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    initial_backoff: Duration,
}

impl ApiClient {
    /// Create a new API client for `base_url` (e.g. `https://api.example.uz`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
            initial_backoff: self.initial_backoff,
        }
    }

    /// Override the first rate-limit backoff delay (doubles on each retry).
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidResponse(format!("Invalid token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request, retrying with exponential backoff while rate limited.
    async fn send(&self, build: impl Fn() -> RequestBuilder) -> Result<Response, ApiError> {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let response = build().headers(self.auth_headers()?).send().await?;

            if response.status() != reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Self::check_response(response).await;
            }

            retries += 1;
            if retries > MAX_RATE_LIMIT_RETRIES {
                return Err(ApiError::RateLimited);
            }
            warn!(url = %response.url(), retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
            tokio::time::sleep(backoff).await;
            backoff *= 2;
        }
    }

    /// Parse the response envelope and verify its `code`.
    async fn expect_code(response: Response, expected: &'static str) -> Result<Envelope, ApiError> {
        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if envelope.code != expected {
            warn!(expected, actual = %envelope.code, "Unexpected response code");
            return Err(ApiError::UnexpectedCode {
                expected,
                actual: envelope.code,
            });
        }
        Ok(envelope)
    }

    async fn get(&self, path: &str, query: &[(&str, String)], expected: &'static str) -> Result<Envelope, ApiError> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");
        let response = self.send(|| self.client.get(&url).query(query)).await?;
        Self::expect_code(response, expected).await
    }

    async fn put<B: Serialize>(&self, path: &str, body: &B, expected: &'static str) -> Result<Envelope, ApiError> {
        let url = self.url(path);
        debug!(%url, "PUT");
        let response = self
            .send(|| self.client.request(Method::PUT, &url).json(body))
            .await?;
        Self::expect_code(response, expected).await
    }

    fn into_update(mut envelope: Envelope, field: &str) -> Result<UpdateResult, ApiError> {
        let record = envelope
            .take(field)
            .ok_or_else(|| ApiError::InvalidResponse(format!("Response has no `{}` field", field)))?;
        Ok(UpdateResult {
            record,
            message: envelope.message,
        })
    }

    // ===== Tests =====

    /// Fetch one page of tests.
    pub async fn fetch_tests(&self, query: &TestsQuery) -> Result<PageResult, ApiError> {
        let mut envelope = self.get("/api/tests", &query.params(), CODE_TESTS_FETCHED).await?;
        Ok(PageResult {
            items: envelope.take_items("tests"),
            pagination: envelope.pagination,
        })
    }

    // ===== Teachers =====

    /// Fetch the names of all teachers (for the tests filter).
    pub async fn fetch_teacher_names(&self) -> Result<Vec<Value>, ApiError> {
        let mut envelope = self
            .get("/api/teachers/names", &[], CODE_TEACHERS_NAME_FETCHED)
            .await?;
        Ok(envelope.take_items("teachers"))
    }

    // ===== Users =====

    /// Fetch users, optionally filtered by role.
    pub async fn fetch_users(&self, role: Option<Role>) -> Result<Vec<Value>, ApiError> {
        let query: Vec<(&str, String)> = role
            .map(|r| vec![("role", r.as_str().to_string())])
            .unwrap_or_default();
        let mut envelope = self.get("/api/users", &query, CODE_USERS_FETCHED).await?;
        Ok(envelope.take_items("users"))
    }

    pub async fn fetch_user(&self, id: &str) -> Result<Value, ApiError> {
        let mut envelope = self
            .get(&format!("/api/users/{}", id), &[], CODE_USER_FETCHED)
            .await?;
        envelope
            .take("user")
            .ok_or_else(|| ApiError::InvalidResponse("Response has no `user` field".to_string()))
    }

    /// Update another user's record (e.g. `{"isActive": true}`).
    pub async fn update_user(&self, id: &str, patch: &Value) -> Result<UpdateResult, ApiError> {
        let envelope = self
            .put(&format!("/api/users/{}", id), patch, CODE_USER_UPDATED)
            .await?;
        Self::into_update(envelope, "user")
    }

    /// Update the signed-in user's own record.
    pub async fn update_me(&self, patch: &Value) -> Result<UpdateResult, ApiError> {
        let envelope = self.put("/api/users/me", patch, CODE_USER_UPDATED).await?;
        Self::into_update(envelope, "user")
    }

    /// Upload a new avatar for the signed-in user as multipart form data.
    ///
    /// Multipart bodies are not replayable, so this request is not retried
    /// when rate limited.
    pub async fn update_avatar(&self, file: Vec<u8>, file_name: &str) -> Result<UpdateResult, ApiError> {
        let url = self.url("/api/users/me/avatar");
        debug!(%url, bytes = file.len(), "PUT multipart");

        let part = multipart::Part::bytes(file).file_name(file_name.to_string());
        let form = multipart::Form::new().part(AVATAR_FIELD, part);

        let response = self
            .client
            .put(&url)
            .headers(self.auth_headers()?)
            .multipart(form)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let envelope = Self::expect_code(response, CODE_AVATAR_UPDATED).await?;
        Self::into_update(envelope, "user")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tests_query_params() {
        let q = TestsQuery {
            page: 2,
            limit: 12,
            teacher_id: Some("all".into()),
        };
        assert_eq!(
            q.params(),
            vec![
                ("page", "2".to_string()),
                ("limit", "12".to_string()),
                ("teacherId", "all".to_string())
            ]
        );

        let own = TestsQuery {
            teacher_id: None,
            ..q
        };
        assert_eq!(own.params().len(), 2);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:3000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url("/api/tests"), "http://localhost:3000/api/tests");
    }

    #[test]
    fn test_with_token_shares_settings() {
        let client = ApiClient::new("http://localhost", Duration::from_secs(5))
            .unwrap()
            .with_initial_backoff(Duration::from_millis(1));
        assert!(!client.has_token());
        let authed = client.with_token("abc".into());
        assert!(authed.has_token());
        assert_eq!(authed.initial_backoff, Duration::from_millis(1));
    }
}

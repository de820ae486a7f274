//! HTTP client for the portfolio and storefront REST APIs.
//!
//! Every successful response body is wrapped in an envelope,
//! `{ "data": <payload>, "message": "..." }`, and every failure body carries
//! `{ "message": "..." }`. `ApiClient` unwraps the envelope on success and
//! turns failures into [`ApiError`].

use std::time::Duration;

use chrono::Utc;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionData;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// There is no other timeout: an issued request runs until this fires.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Login endpoint, relative to the API base URL
const LOGIN_PATH: &str = "/auth/login";

/// Success envelope returned by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// REST API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url` (e.g. `http://localhost:5000/api`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    /// Same client without a bearer token, sharing the connection pool.
    pub fn without_token(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Authenticate with email and password and return session data
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SessionData, ApiError> {
        let login: LoginResponse = self
            .post(LOGIN_PATH, &LoginRequest { email, password })
            .await?;

        if login.token.trim().is_empty() {
            return Err(ApiError::invalid_response(
                "Login response contained an empty token",
            ));
        }

        Ok(SessionData {
            token: login.token,
            email: email.to_string(),
            api_url: self.base_url.clone(),
            created_at: Utc::now(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json");
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if response is successful, returning an error built from the body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);
            warn!(status = %status, error = %err, "Request failed");
            Err(err)
        }
    }

    /// Send a request and unwrap the `data` field of the success envelope.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, path: &str) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            ApiError::invalid_response(format!("Failed to parse response from {}: {}", path, e))
        })?;

        if let Some(ref message) = envelope.message {
            debug!(path = path, message = %message, "Server message");
        }
        Ok(envelope.data)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path = path, "GET");
        self.send(self.request(Method::GET, path), path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path = path, "POST");
        self.send(self.request(Method::POST, path).json(body), path).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path = path, "PATCH");
        self.send(self.request(Method::PATCH, path).json(body), path).await
    }

    /// DELETE a resource. The response body (often empty) is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!(path = path, "DELETE");
        let response = self.request(Method::DELETE, path).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }
}

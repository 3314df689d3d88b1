//! Account and session endpoints.
//!
//! The backend issues an HTTP-only session cookie on register/login.
//! Sharing one `reqwest::Client` (cookie store enabled) between this and
//! [`ThumbnailApi`](crate::ThumbnailApi) keeps that session attached to
//! every call, the way the browser does.

use crate::api::{check_status, parse_response, ApiError};
use crate::config::ClientConfig;
use crate::models::{UserEnvelope, UserRecord};

/// HTTP client for the auth endpoints.
pub struct AuthApi {
    client: reqwest::Client,
    api_url: String,
}

impl AuthApi {
    /// Create a client from configuration, with its own cookie store.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Create an auth client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Create an account and open a session.
    ///
    /// Sends `POST /api/auth/register`.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, ApiError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });

        let response = self
            .client
            .post(format!("{}/api/auth/register", self.api_url))
            .json(&body)
            .send()
            .await?;

        expect_user(parse_response(response).await?)
    }

    /// Open a session for an existing account.
    ///
    /// Sends `POST /api/auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self
            .client
            .post(format!("{}/api/auth/login", self.api_url))
            .json(&body)
            .send()
            .await?;

        expect_user(parse_response(response).await?)
    }

    /// Close the current session.
    ///
    /// Sends `POST /api/auth/logout`.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}/api/auth/logout", self.api_url))
            .send()
            .await?;

        check_status(response).await
    }

    /// Probe whether the session cookie is still valid.
    ///
    /// Sends `GET /api/auth/verify`. A 401/403 means "not logged in" and
    /// returns `Ok(None)` rather than an error — an unauthenticated probe
    /// is an expected outcome, not a failure.
    pub async fn verify(&self) -> Result<Option<UserRecord>, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/auth/verify", self.api_url))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Ok(None);
        }

        let envelope: UserEnvelope = parse_response(response).await?;
        Ok(envelope.user)
    }
}

/// A 2xx auth response must carry the user document.
fn expect_user(envelope: UserEnvelope) -> Result<UserRecord, ApiError> {
    envelope.user.ok_or_else(|| ApiError::Api {
        status: 200,
        body: "response contained no user".to_string(),
    })
}

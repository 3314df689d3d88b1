//! REST API client for the thumbnail endpoints.
//!
//! Wraps the backend HTTP API (thumbnail creation, retrieval, visibility
//! patching, community listing) using [`reqwest`]. Creation is a
//! multipart upload carrying the draft fields and any reference images.

use reqwest::multipart;
use thumbsmith_core::draft::ThumbnailDraft;

use crate::config::ClientConfig;
use crate::models::{
    CommunityPage, MessageBody, ThumbnailEnvelope, ThumbnailListEnvelope, ThumbnailRecord,
};

/// HTTP client for the Thumbsmith backend.
pub struct ThumbnailApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ApiError {
    /// Human-readable message for a notice.
    ///
    /// Non-2xx responses on this backend carry `{ "message": ... }`;
    /// falls back to the raw body, or the transport error text.
    pub fn server_message(&self) -> String {
        match self {
            ApiError::Api { body, .. } => serde_json::from_str::<MessageBody>(body)
                .map(|parsed| parsed.message)
                .unwrap_or_else(|_| body.clone()),
            ApiError::Request(e) => e.to_string(),
        }
    }
}

impl ThumbnailApi {
    /// Create a client from configuration.
    ///
    /// Enables the cookie store so the backend's session cookie survives
    /// across calls, matching the browser behavior.
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

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (shares the session cookie with [`AuthApi`](crate::AuthApi)).
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Submit a draft for generation.
    ///
    /// Sends `POST /api/thumbnail/generate` as multipart form data. Field
    /// names match the backend contract exactly; `reference_hint` is
    /// omitted when every role is `auto`.
    pub async fn create_thumbnail(
        &self,
        draft: &ThumbnailDraft,
    ) -> Result<ThumbnailRecord, ApiError> {
        let mut form = multipart::Form::new()
            .text("title", draft.title.clone())
            .text("prompt", draft.prompt.clone())
            .text("style", draft.style.as_str())
            .text("aspect_ratio", draft.aspect_ratio.as_str())
            .text("color_scheme", draft.color_scheme.clone())
            .text("text_overlay", if draft.text_overlay { "true" } else { "false" })
            .text("isPublic", if draft.is_public { "true" } else { "false" });

        if let Some(hint) = draft.references.reference_hint() {
            form = form.text("reference_hint", hint);
        }

        for image in draft.references.images() {
            let part = multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.media_type)?;
            form = form.part("reference_images", part);
        }

        let response = self
            .client
            .post(format!("{}/api/thumbnail/generate", self.api_url))
            .multipart(form)
            .send()
            .await?;

        let envelope: ThumbnailEnvelope = parse_response(response).await?;
        tracing::info!(job_id = %envelope.thumbnail.id, "Generation request accepted");
        Ok(envelope.thumbnail)
    }

    /// Fetch one of the caller's thumbnails by id.
    ///
    /// Sends `GET /api/user/thumbnails/{id}`.
    pub async fn get_thumbnail(&self, id: &str) -> Result<ThumbnailRecord, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/user/thumbnails/{}", self.api_url, id))
            .send()
            .await?;

        let envelope: ThumbnailEnvelope = parse_response(response).await?;
        Ok(envelope.thumbnail)
    }

    /// List all of the caller's thumbnails.
    ///
    /// Sends `GET /api/user/thumbnails`.
    pub async fn user_thumbnails(&self) -> Result<Vec<ThumbnailRecord>, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/user/thumbnails", self.api_url))
            .send()
            .await?;

        let envelope: ThumbnailListEnvelope = parse_response(response).await?;
        Ok(envelope.thumbnails)
    }

    /// Flip a thumbnail's community visibility.
    ///
    /// Sends `PATCH /api/thumbnail/{id}/visibility`.
    pub async fn set_visibility(&self, id: &str, is_public: bool) -> Result<(), ApiError> {
        let body = serde_json::json!({ "isPublic": is_public });

        let response = self
            .client
            .patch(format!("{}/api/thumbnail/{}/visibility", self.api_url, id))
            .json(&body)
            .send()
            .await?;

        check_status(response).await
    }

    /// Fetch one page of the public community listing.
    ///
    /// Sends `GET /api/thumbnail/community?page={page}&limit={limit}`.
    pub async fn community_page(&self, page: u32, limit: u32) -> Result<CommunityPage, ApiError> {
        let response = self
            .client
            .get(format!(
                "{}/api/thumbnail/community?page={}&limit={}",
                self.api_url, page, limit
            ))
            .send()
            .await?;

        parse_response(response).await
    }
}

/// Build the in-app preview route for a generated thumbnail.
///
/// Query values are percent-encoded the way the simulated video-platform
/// page expects them.
pub fn preview_path(thumbnail_url: &str, title: &str) -> String {
    let mut url =
        reqwest::Url::parse("http://localhost/preview").expect("static base URL is valid");
    url.query_pairs_mut()
        .append_pair("thumbnail_url", thumbnail_url)
        .append_pair("title", title);
    match url.query() {
        Some(query) => format!("/preview?{query}"),
        None => "/preview".to_string(),
    }
}

// ---- shared response helpers ----

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or an [`ApiError::Api`] containing the status
/// and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ApiError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

/// Assert the response has a success status code, discarding the body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
    ensure_success(response).await?;
    Ok(())
}

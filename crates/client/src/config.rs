//! Client configuration loaded from environment variables.

use std::time::Duration;

use thumbsmith_core::attachment::AttachmentLimits;

/// Configuration for the API client and the completion poll.
///
/// All fields have defaults suitable for local development against a
/// backend on `localhost`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend API (default: `http://localhost:3000`).
    pub api_url: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Completion poll interval in seconds (default: `5`).
    pub poll_interval_secs: u64,
    /// Cap on reference images per request (default: `2`).
    pub max_reference_images: usize,
    /// Per-image size cap in MiB (default: `6`).
    pub max_reference_mib: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
            poll_interval_secs: 5,
            max_reference_images: 2,
            max_reference_mib: 6,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// A `.env` file in the working directory is honored.
    ///
    /// | Env Var                            | Default                 |
    /// |------------------------------------|-------------------------|
    /// | `THUMBSMITH_API_URL`               | `http://localhost:3000` |
    /// | `THUMBSMITH_REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `THUMBSMITH_POLL_INTERVAL_SECS`    | `5`                     |
    /// | `THUMBSMITH_MAX_REFERENCE_IMAGES`  | `2`                     |
    /// | `THUMBSMITH_MAX_REFERENCE_MIB`     | `6`                     |
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_url =
            std::env::var("THUMBSMITH_API_URL").unwrap_or(defaults.api_url);

        let request_timeout_secs: u64 = std::env::var("THUMBSMITH_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults.request_timeout_secs.to_string())
            .parse()
            .expect("THUMBSMITH_REQUEST_TIMEOUT_SECS must be a valid u64");

        let poll_interval_secs: u64 = std::env::var("THUMBSMITH_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| defaults.poll_interval_secs.to_string())
            .parse()
            .expect("THUMBSMITH_POLL_INTERVAL_SECS must be a valid u64");

        let max_reference_images: usize = std::env::var("THUMBSMITH_MAX_REFERENCE_IMAGES")
            .unwrap_or_else(|_| defaults.max_reference_images.to_string())
            .parse()
            .expect("THUMBSMITH_MAX_REFERENCE_IMAGES must be a valid usize");

        let max_reference_mib: usize = std::env::var("THUMBSMITH_MAX_REFERENCE_MIB")
            .unwrap_or_else(|_| defaults.max_reference_mib.to_string())
            .parse()
            .expect("THUMBSMITH_MAX_REFERENCE_MIB must be a valid usize");

        Self {
            api_url,
            request_timeout_secs,
            poll_interval_secs,
            max_reference_images,
            max_reference_mib,
        }
    }

    /// HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Delay between completion polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Attachment limits derived from the configured caps.
    pub fn attachment_limits(&self) -> AttachmentLimits {
        AttachmentLimits {
            max_images: self.max_reference_images,
            max_bytes: self.max_reference_mib * 1024 * 1024,
        }
    }
}

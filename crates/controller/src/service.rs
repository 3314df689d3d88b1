//! Seam between the job controller and the network.
//!
//! The controller and the poll loop only see this trait, so the HTTP
//! client can be replaced by a fake in tests — or by a push-based
//! transport later — without touching the lifecycle logic.

use async_trait::async_trait;
use thumbsmith_client::models::ThumbnailRecord;
use thumbsmith_client::{ApiError, ThumbnailApi};
use thumbsmith_core::draft::ThumbnailDraft;

/// Network operations the job lifecycle needs.
#[async_trait]
pub trait ThumbnailService: Send + Sync {
    /// Submit a draft; returns the server's copy with the assigned id.
    async fn create(&self, draft: &ThumbnailDraft) -> Result<ThumbnailRecord, ApiError>;

    /// Fetch the authoritative copy of a job.
    async fn fetch(&self, id: &str) -> Result<ThumbnailRecord, ApiError>;

    /// Patch the community-visibility flag.
    async fn set_visibility(&self, id: &str, is_public: bool) -> Result<(), ApiError>;
}

#[async_trait]
impl ThumbnailService for ThumbnailApi {
    async fn create(&self, draft: &ThumbnailDraft) -> Result<ThumbnailRecord, ApiError> {
        self.create_thumbnail(draft).await
    }

    async fn fetch(&self, id: &str) -> Result<ThumbnailRecord, ApiError> {
        self.get_thumbnail(id).await
    }

    async fn set_visibility(&self, id: &str, is_public: bool) -> Result<(), ApiError> {
        ThumbnailApi::set_visibility(self, id, is_public).await
    }
}

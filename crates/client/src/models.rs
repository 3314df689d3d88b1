//! Wire types mirroring the backend's JSON payloads.
//!
//! Field names follow the backend exactly (serde renames), including the
//! Mongo-style `_id`. `isPublic` defaults to `true` for documents written
//! before the visibility flag existed.

use serde::Deserialize;
use thumbsmith_core::community;
use thumbsmith_core::lifecycle::{derive_phase, JobPhase};
use thumbsmith_core::types::{JobId, Timestamp};

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Thumbnail
// ---------------------------------------------------------------------------

/// A thumbnail document as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailRecord {
    #[serde(rename = "_id")]
    pub id: JobId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub user_prompt: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub color_scheme: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(rename = "isPublic", default = "default_true")]
    pub is_public: bool,
    /// URL of the generated artifact; absent or empty while pending.
    #[serde(default)]
    pub image_url: Option<String>,
    /// URLs of the reference images stored at creation time.
    #[serde(default)]
    pub reference_images: Vec<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<Timestamp>,
}

impl ThumbnailRecord {
    /// The generated artifact URL, once present and non-empty.
    pub fn result_url(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Lifecycle phase derived from this server copy.
    pub fn phase(&self) -> JobPhase {
        derive_phase(Some(&self.id), self.image_url.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThumbnailEnvelope {
    pub thumbnail: ThumbnailRecord,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThumbnailListEnvelope {
    #[serde(default)]
    pub thumbnails: Vec<ThumbnailRecord>,
}

/// One page of the public community listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CommunityPage {
    #[serde(default)]
    pub thumbnails: Vec<ThumbnailRecord>,
    #[serde(rename = "totalPages", default = "default_one")]
    pub total_pages: u32,
}

impl CommunityPage {
    /// Whether another page can be requested after `page`.
    pub fn has_more(&self, page: u32) -> bool {
        community::has_more(page, self.total_pages)
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// An account document as returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    #[serde(default)]
    pub user: Option<UserRecord>,
}

/// Error payload shape used by the backend for non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnail_parses_full_document() {
        let record: ThumbnailRecord = serde_json::from_str(
            r#"{
                "_id": "abc123",
                "title": "My video",
                "user_prompt": "dramatic lighting",
                "style": "Minimalist",
                "color_scheme": "ocean",
                "aspect_ratio": "9:16",
                "isPublic": false,
                "image_url": "https://cdn.example/upload/th.png",
                "reference_images": ["https://cdn.example/upload/ref1.png"],
                "createdAt": "2024-05-01T12:00:00.000Z"
            }"#,
        )
        .unwrap();

        assert_eq!(record.id, "abc123");
        assert_eq!(record.style.as_deref(), Some("Minimalist"));
        assert!(!record.is_public);
        assert_eq!(record.phase(), JobPhase::Complete);
        assert!(record.created_at.is_some());
    }

    #[test]
    fn missing_visibility_defaults_to_public() {
        let record: ThumbnailRecord =
            serde_json::from_str(r#"{ "_id": "abc123", "title": "t" }"#).unwrap();
        assert!(record.is_public);
    }

    #[test]
    fn empty_image_url_means_still_pending() {
        let record: ThumbnailRecord =
            serde_json::from_str(r#"{ "_id": "abc123", "title": "t", "image_url": "" }"#)
                .unwrap();
        assert_eq!(record.result_url(), None);
        assert_eq!(record.phase(), JobPhase::Pending);
    }

    #[test]
    fn community_page_defaults_to_one_total_page() {
        let page: CommunityPage = serde_json::from_str(r#"{ "thumbnails": [] }"#).unwrap();
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_more(1));
    }

    #[test]
    fn community_page_reports_more_pages() {
        let page: CommunityPage =
            serde_json::from_str(r#"{ "thumbnails": [], "totalPages": 4 }"#).unwrap();
        assert!(page.has_more(1));
        assert!(!page.has_more(4));
    }
}

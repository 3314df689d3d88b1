//! Reference-image rules.
//!
//! A draft may carry up to two reference images, each paired with a role
//! hint forwarded to the generation backend. Files in a batch are validated
//! independently; capacity overflow across a batch produces a single
//! "too many" rejection and the excess is dropped.

use crate::error::CoreError;

/// Media types accepted for reference images.
pub const ALLOWED_MEDIA_TYPES: &[&str] =
    &["image/png", "image/jpeg", "image/jpg", "image/webp"];

/// Default cap on reference images per draft.
pub const DEFAULT_MAX_IMAGES: usize = 2;

/// Default per-image size cap in bytes (6 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 6 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Hint classifying what a reference image is for.
///
/// `Auto` lets the backend decide and is never encoded into the
/// reference hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceRole {
    #[default]
    Auto,
    Person,
    Background,
    Style,
}

impl ReferenceRole {
    /// All selectable roles, in display order.
    pub const ALL: &'static [ReferenceRole] = &[
        ReferenceRole::Auto,
        ReferenceRole::Person,
        ReferenceRole::Background,
        ReferenceRole::Style,
    ];

    /// The wire representation used in the reference hint.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceRole::Auto => "auto",
            ReferenceRole::Person => "person",
            ReferenceRole::Background => "background",
            ReferenceRole::Style => "style",
        }
    }

    /// Parse a wire value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.as_str() == value)
    }
}

// ---------------------------------------------------------------------------
// Images and limits
// ---------------------------------------------------------------------------

/// A reference image held in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    /// Original file name, forwarded with the multipart upload.
    pub file_name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ReferenceImage {
    /// Size of the file in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Limits applied when adding reference images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentLimits {
    /// Maximum number of images per draft.
    pub max_images: usize,
    /// Maximum size of a single image in bytes.
    pub max_bytes: usize,
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        Self {
            max_images: DEFAULT_MAX_IMAGES,
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

/// Why a file offered to [`ReferenceSet::add`] was not kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentRejection {
    /// The declared media type is not in [`ALLOWED_MEDIA_TYPES`].
    #[error("Unsupported image type '{media_type}'")]
    UnsupportedType { media_type: String },

    /// The file is larger than the per-image cap.
    #[error("Image is larger than {} MiB", .max_bytes / (1024 * 1024))]
    TooLarge { size: usize, max_bytes: usize },

    /// The batch would push the draft past the image cap.
    #[error("At most {max_images} reference images are allowed")]
    TooMany { max_images: usize },
}

// ---------------------------------------------------------------------------
// Reference set
// ---------------------------------------------------------------------------

/// The draft's reference images with their paired roles.
///
/// Invariant: the role list always has exactly one entry per image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSet {
    images: Vec<ReferenceImage>,
    roles: Vec<ReferenceRole>,
    limits: AttachmentLimits,
}

impl Default for ReferenceSet {
    fn default() -> Self {
        Self::new(AttachmentLimits::default())
    }
}

impl ReferenceSet {
    /// Create an empty set with the given limits.
    pub fn new(limits: AttachmentLimits) -> Self {
        Self {
            images: Vec::new(),
            roles: Vec::new(),
            limits,
        }
    }

    /// Number of images currently held.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the set holds no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// The images, in insertion order.
    pub fn images(&self) -> &[ReferenceImage] {
        &self.images
    }

    /// The role paired with each image, same order as [`images`](Self::images).
    pub fn roles(&self) -> &[ReferenceRole] {
        &self.roles
    }

    /// The limits this set was created with.
    pub fn limits(&self) -> AttachmentLimits {
        self.limits
    }

    /// Validate and append a batch of files.
    ///
    /// Each file is checked independently: a disallowed media type and an
    /// over-sized file each produce their own rejection and are skipped.
    /// If the surviving files overflow the image cap, the excess is dropped
    /// and a single [`AttachmentRejection::TooMany`] is reported for the
    /// whole batch. Accepted images get the [`ReferenceRole::Auto`] role.
    pub fn add(&mut self, incoming: Vec<ReferenceImage>) -> Vec<AttachmentRejection> {
        let mut rejections = Vec::new();
        let mut accepted = Vec::new();

        for image in incoming {
            if !ALLOWED_MEDIA_TYPES.contains(&image.media_type.as_str()) {
                rejections.push(AttachmentRejection::UnsupportedType {
                    media_type: image.media_type,
                });
                continue;
            }
            if image.size() > self.limits.max_bytes {
                rejections.push(AttachmentRejection::TooLarge {
                    size: image.size(),
                    max_bytes: self.limits.max_bytes,
                });
                continue;
            }
            accepted.push(image);
        }

        let capacity = self.limits.max_images.saturating_sub(self.images.len());
        if accepted.len() > capacity {
            rejections.push(AttachmentRejection::TooMany {
                max_images: self.limits.max_images,
            });
            accepted.truncate(capacity);
        }

        for image in accepted {
            self.images.push(image);
            self.roles.push(ReferenceRole::Auto);
        }

        rejections
    }

    /// Change the role hint for the image at `index`.
    ///
    /// Out-of-bounds indexes are a silent no-op.
    pub fn set_role(&mut self, index: usize, role: ReferenceRole) {
        if let Some(slot) = self.roles.get_mut(index) {
            *slot = role;
        }
    }

    /// Remove the image and its paired role at `index`.
    pub fn remove(&mut self, index: usize) -> Result<(), CoreError> {
        if index >= self.images.len() {
            return Err(CoreError::Validation(format!(
                "No reference image at slot {index}"
            )));
        }
        self.images.remove(index);
        self.roles.remove(index);
        Ok(())
    }

    /// Encode the non-auto roles for the backend.
    ///
    /// Format: comma-joined `img<N>=<role>` tokens, `N` being the 1-based
    /// image position, e.g. `img1=person,img2=background`. Returns `None`
    /// when every role is auto; the field is then omitted from the upload.
    pub fn reference_hint(&self) -> Option<String> {
        let parts: Vec<String> = self
            .roles
            .iter()
            .enumerate()
            .filter(|(_, role)| **role != ReferenceRole::Auto)
            .map(|(idx, role)| format!("img{}={}", idx + 1, role.as_str()))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(","))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The pre-submission generation request.
//!
//! A draft is mutated field by field through [`ThumbnailDraft::apply`] and
//! frozen once the server assigns an id (the freeze itself is enforced by
//! the controller, which owns the lifecycle state).

use crate::attachment::ReferenceSet;
use crate::error::CoreError;
use crate::options::{default_color_scheme, validate_color_scheme, AspectRatio, ThumbnailStyle};

/// Hard cap on title length, enforced on input.
pub const MAX_TITLE_LEN: usize = 100;

/// A single editable-field update for a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftUpdate {
    Title(String),
    Prompt(String),
    Style(ThumbnailStyle),
    ColorScheme(String),
    AspectRatio(AspectRatio),
}

/// An in-memory generation request not yet accepted by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailDraft {
    /// Video title rendered onto the thumbnail. Required, ≤100 chars.
    pub title: String,
    /// Free-text guidance for the generator. Optional.
    pub prompt: String,
    pub style: ThumbnailStyle,
    /// Id of a catalog color scheme.
    pub color_scheme: String,
    pub aspect_ratio: AspectRatio,
    /// Whether the generator should render the title text onto the image.
    pub text_overlay: bool,
    /// Community visibility; the only field that stays mutable after
    /// submission.
    pub is_public: bool,
    pub references: ReferenceSet,
}

impl Default for ThumbnailDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            prompt: String::new(),
            style: ThumbnailStyle::default(),
            color_scheme: default_color_scheme().id.to_string(),
            aspect_ratio: AspectRatio::default(),
            text_overlay: true,
            is_public: true,
            references: ReferenceSet::default(),
        }
    }
}

impl ThumbnailDraft {
    /// Apply a field update.
    ///
    /// Titles are clamped to [`MAX_TITLE_LEN`] characters. A color-scheme
    /// id outside the catalog is rejected; all other updates are
    /// infallible.
    pub fn apply(&mut self, update: DraftUpdate) -> Result<(), CoreError> {
        match update {
            DraftUpdate::Title(title) => {
                self.title = clamp_title(&title);
                Ok(())
            }
            DraftUpdate::Prompt(prompt) => {
                self.prompt = prompt;
                Ok(())
            }
            DraftUpdate::Style(style) => {
                self.style = style;
                Ok(())
            }
            DraftUpdate::ColorScheme(id) => {
                validate_color_scheme(&id)?;
                self.color_scheme = id;
                Ok(())
            }
            DraftUpdate::AspectRatio(ratio) => {
                self.aspect_ratio = ratio;
                Ok(())
            }
        }
    }

    /// Preconditions for submission that live on the draft itself.
    pub fn validate_for_submit(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("Title is required".to_string()));
        }
        Ok(())
    }
}

/// Clamp a title to [`MAX_TITLE_LEN`] characters, char-boundary safe.
pub fn clamp_title(input: &str) -> String {
    input.chars().take(MAX_TITLE_LEN).collect()
}

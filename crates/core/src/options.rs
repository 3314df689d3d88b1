//! Fixed option catalogs for the generation form.
//!
//! Styles, aspect ratios, and color schemes are closed sets chosen before
//! submission and immutable afterwards. Server copies may carry values from
//! an older catalog, so every `parse` returns `Option` and callers fall
//! back to the defaults when rehydrating.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Thumbnail styles
// ---------------------------------------------------------------------------

/// Visual style applied by the generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailStyle {
    #[default]
    BoldGraphic,
    Minimalist,
    Photorealistic,
    Illustrated,
    Retro,
    Cinematic,
}

impl ThumbnailStyle {
    /// All selectable styles, in display order.
    pub const ALL: &'static [ThumbnailStyle] = &[
        ThumbnailStyle::BoldGraphic,
        ThumbnailStyle::Minimalist,
        ThumbnailStyle::Photorealistic,
        ThumbnailStyle::Illustrated,
        ThumbnailStyle::Retro,
        ThumbnailStyle::Cinematic,
    ];

    /// The wire representation sent to and received from the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailStyle::BoldGraphic => "Bold & Graphic",
            ThumbnailStyle::Minimalist => "Minimalist",
            ThumbnailStyle::Photorealistic => "Photorealistic",
            ThumbnailStyle::Illustrated => "Illustrated",
            ThumbnailStyle::Retro => "Retro",
            ThumbnailStyle::Cinematic => "Cinematic",
        }
    }

    /// Parse a wire value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

// ---------------------------------------------------------------------------
// Aspect ratios
// ---------------------------------------------------------------------------

/// Output aspect ratio of the generated thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    Widescreen,
    Square,
    Vertical,
}

impl AspectRatio {
    /// All selectable ratios, in display order.
    pub const ALL: &'static [AspectRatio] = &[
        AspectRatio::Widescreen,
        AspectRatio::Square,
        AspectRatio::Vertical,
    ];

    /// The wire representation, e.g. `16:9`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Square => "1:1",
            AspectRatio::Vertical => "9:16",
        }
    }

    /// Parse a wire value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.as_str() == value)
    }
}

// ---------------------------------------------------------------------------
// Color schemes
// ---------------------------------------------------------------------------

/// A named palette offered by the color-scheme picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    /// Stable identifier sent to the backend.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Swatch colors shown in the picker.
    pub colors: [&'static str; 4],
}

/// The fixed color-scheme catalog. The first entry is the default.
pub const COLOR_SCHEMES: &[ColorScheme] = &[
    ColorScheme {
        id: "vibrant",
        name: "Vibrant",
        colors: ["#ff2d78", "#ff7a00", "#ffd600", "#7c3aed"],
    },
    ColorScheme {
        id: "sunset",
        name: "Sunset",
        colors: ["#ff4e50", "#fc913a", "#f9d62e", "#ede574"],
    },
    ColorScheme {
        id: "ocean",
        name: "Ocean",
        colors: ["#0f2027", "#203a43", "#2c5364", "#4ca1af"],
    },
    ColorScheme {
        id: "forest",
        name: "Forest",
        colors: ["#134e5e", "#1f7a5c", "#71b280", "#c9d8b6"],
    },
    ColorScheme {
        id: "mono",
        name: "Monochrome",
        colors: ["#0a0a0a", "#3d3d3d", "#9e9e9e", "#f5f5f5"],
    },
    ColorScheme {
        id: "neon",
        name: "Neon",
        colors: ["#0ff0fc", "#ff00e6", "#39ff14", "#120458"],
    },
];

/// The catalog default (first entry).
pub fn default_color_scheme() -> &'static ColorScheme {
    &COLOR_SCHEMES[0]
}

/// Look up a scheme by its identifier.
pub fn find_color_scheme(id: &str) -> Option<&'static ColorScheme> {
    COLOR_SCHEMES.iter().find(|s| s.id == id)
}

/// Validate that a color-scheme id is in the catalog.
pub fn validate_color_scheme(id: &str) -> Result<(), CoreError> {
    if find_color_scheme(id).is_some() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown color scheme '{id}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which turns a profile into concrete pixel values) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`Codec`] / [`CodecChoice`] — Output encoding, with an explicit variant for unknown names.
//! - [`Gravity`] — Text anchor relative to the canvas.
//! - [`FontFace`] / [`Caption`] — One line of text to draw.
//! - [`CompositeParams`] — Border, top crop and captions for one composite.

use crate::types::Color;
use log::warn;
use std::fmt;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Jpeg { quality: Quality },
    Png,
    Tiff,
}

impl Codec {
    /// File extension written for this codec, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Codec::Jpeg { .. } => "jpg",
            Codec::Png => "png",
            Codec::Tiff => "tif",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Jpeg { quality } => write!(f, "jpeg (quality {})", quality.value()),
            Codec::Png => f.write_str("png"),
            Codec::Tiff => f.write_str("tiff"),
        }
    }
}

/// A codec name as written in a profile.
///
/// Unknown names are kept rather than rejected: they fall back to PNG
/// when [resolved](CodecChoice::resolve).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecChoice {
    Known(Codec),
    Unrecognized(String),
}

impl CodecChoice {
    /// Parse a codec name (case-insensitive). `quality` only applies to JPEG.
    pub fn parse(name: &str, quality: Quality) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpeg" => CodecChoice::Known(Codec::Jpeg { quality }),
            "png" => CodecChoice::Known(Codec::Png),
            "tiff" => CodecChoice::Known(Codec::Tiff),
            _ => CodecChoice::Unrecognized(name.to_string()),
        }
    }

    /// The codec to encode with, warning when falling back to PNG.
    pub fn resolve(&self) -> Codec {
        match self {
            CodecChoice::Known(codec) => *codec,
            CodecChoice::Unrecognized(name) => {
                warn!("\tUnrecognised output format '{name}': using PNG");
                Codec::Png
            }
        }
    }
}

/// Anchor point for text placement.
///
/// Offsets are measured from the anchored edges: `y` always upward from the
/// bottom edge, `x` rightward from the left edge (`SouthWest`) or from the
/// horizontal center (`South`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    South,
    SouthWest,
}

/// Font selection for a caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    /// Font file path or font file stem.
    pub name: String,
    /// Fallback lookup key.
    pub family: String,
    pub weight: u32,
}

impl FontFace {
    /// Weights at or above this are emboldened.
    pub const BOLD_WEIGHT: u32 = 600;

    pub fn is_bold(&self) -> bool {
        self.weight >= Self::BOLD_WEIGHT
    }
}

/// One line of text to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    /// Font size in pixels.
    pub size: f32,
    pub color: Color,
    pub gravity: Gravity,
    pub offset_x: i64,
    pub offset_y: i64,
}

/// Everything `composite` needs: border, crop and captions.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeParams {
    pub border_color: Color,
    /// Left and right border thickness.
    pub border_side: u32,
    /// Top and bottom border thickness before cropping.
    pub border_bottom: u32,
    /// Rows removed from the top after the border is applied.
    pub top_crop: u32,
    pub font: FontFace,
    pub captions: Vec<Caption>,
}

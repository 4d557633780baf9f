//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: decode, composite, resize_to_area, and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on
//! the `image` and `rusttype` crates.

use super::params::{Codec, CompositeParams};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("Font not found: {0}")]
    FontNotFound(String),
    #[error("Invalid border geometry for {width}x{height}")]
    InvalidGeometry { width: u32, height: u32 },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    pub fn pixels(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// Every backend must implement all four operations so the rest of the
/// codebase is backend-agnostic. `composite` never mutates its source: the
/// same decoded image is reused for every profile in a run.
pub trait ImageBackend {
    /// Decode an image file.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Border, crop and caption a copy of `source`.
    fn composite(
        &self,
        source: &DynamicImage,
        params: &CompositeParams,
    ) -> Result<DynamicImage, BackendError>;

    /// Resize so the pixel count approximates `target_pixels`, keeping aspect.
    fn resize_to_area(
        &self,
        image: DynamicImage,
        target_pixels: u64,
    ) -> Result<DynamicImage, BackendError>;

    /// Encode into an in-memory buffer.
    fn encode(&self, image: &DynamicImage, codec: Codec) -> Result<Vec<u8>, BackendError>;
}

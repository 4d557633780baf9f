//! Image processing in pure Rust, with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` |
//! | **Border + crop** | `image::imageops::overlay`, `crop_imm` |
//! | **Captions** | `rusttype` |
//! | **Resize to megapixels** | Lanczos3 `resize_exact` |
//! | **Encode** | JPEG / PNG / TIFF encoders from `image` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for border geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Text**: Font lookup and glyph drawing
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod text;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    BorderGeometry, area_resize_dimensions, border_px, font_size, pixel_count,
};
pub use operations::{CaptionText, RenderedImage, plan_composite, render_image, render_web_variant};
pub use params::{Caption, Codec, CodecChoice, CompositeParams, FontFace, Gravity, Quality};
pub use rust_backend::RustBackend;

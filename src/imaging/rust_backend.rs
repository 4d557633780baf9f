//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` (format sniffed from content) |
//! | Border | new RGBA canvas + `image::imageops::overlay` |
//! | Top crop | `image::imageops::crop_imm` |
//! | Captions | `rusttype` glyph rasterization, see [`text`](super::text) |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | `image::codecs::{jpeg, png, tiff}` into a `Vec<u8>` |
//!
//! Compositing works on an RGBA canvas at the source's sample depth: 16-bit
//! inputs get a 16-bit canvas, everything else an 8-bit one. The alpha
//! channel is dropped again afterwards unless the source had one.

use super::backend::{BackendError, ImageBackend};
use super::calculations::area_resize_dimensions;
use super::params::{Codec, CompositeParams};
use super::text::{Channel, FontResolver, color_pixel, draw_caption};
use crate::types::Color;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, ImageReader, Pixel, Rgba};
use rusttype::Font;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    fonts: FontResolver,
}

impl RustBackend {
    /// Backend that looks fonts up in the system font directories only.
    pub fn new() -> Self {
        Self::with_font_dirs(Vec::new())
    }

    /// Backend that searches `dirs` before the system font directories.
    pub fn with_font_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            fonts: FontResolver::with_system_dirs(dirs),
        }
    }

    pub fn fonts(&self) -> &FontResolver {
        &self.fonts
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let decode_err = |message: String| BackendError::Decode {
        path: path.to_path_buf(),
        message,
    };
    ImageReader::open(path)
        .map_err(|e| decode_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?
        .decode()
        .map_err(|e| decode_err(e.to_string()))
}

/// RGBA working canvas with `S` samples.
pub type Canvas<S> = ImageBuffer<Rgba<S>, Vec<S>>;

/// Surround `image` with `side` columns left and right and `top_bottom` rows
/// above and below.
pub fn add_border<S: Channel>(
    image: &Canvas<S>,
    color: Color,
    side: u32,
    top_bottom: u32,
) -> Result<Canvas<S>, BackendError>
where
    Rgba<S>: Pixel<Subpixel = S>,
{
    let (width, height) = image.dimensions();
    let overflow = || BackendError::InvalidGeometry { width, height };
    let canvas_width = side
        .checked_mul(2)
        .and_then(|s| s.checked_add(width))
        .ok_or_else(overflow)?;
    let canvas_height = top_bottom
        .checked_mul(2)
        .and_then(|s| s.checked_add(height))
        .ok_or_else(overflow)?;

    let mut canvas = ImageBuffer::from_pixel(canvas_width, canvas_height, color_pixel(color));
    imageops::overlay(&mut canvas, image, side as i64, top_bottom as i64);
    Ok(canvas)
}

/// Drop the first `rows` rows.
pub fn crop_top<S: Channel>(image: &Canvas<S>, rows: u32) -> Canvas<S>
where
    Rgba<S>: Pixel<Subpixel = S>,
{
    let (width, height) = image.dimensions();
    let rows = rows.min(height);
    imageops::crop_imm(image, 0, rows, width, height - rows).to_image()
}

/// Border, crop and caption `source` on a canvas of its own sample type.
fn frame<S: Channel>(
    source: &Canvas<S>,
    params: &CompositeParams,
    font: Option<&Font<'_>>,
) -> Result<Canvas<S>, BackendError>
where
    Rgba<S>: Pixel<Subpixel = S>,
{
    let bordered = add_border(
        source,
        params.border_color,
        params.border_side,
        params.border_bottom,
    )?;
    let mut canvas = crop_top(&bordered, params.top_crop);
    drop(bordered);

    if let Some(font) = font {
        for caption in &params.captions {
            draw_caption(&mut canvas, font, &params.font, caption);
        }
    }
    Ok(canvas)
}

/// Whether `image` stores more than 8 bits per sample.
fn is_high_depth(image: &DynamicImage) -> bool {
    let color = image.color();
    color.bytes_per_pixel() > color.channel_count()
}

/// Encode into memory. JPEG has no alpha channel, so it is flattened to RGB.
pub fn encode_image(image: &DynamicImage, codec: Codec) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let encode_err = |e: image::ImageError| {
        BackendError::ProcessingFailed(format!("{codec} encode failed: {e}"))
    };
    match codec {
        Codec::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            rgb.write_with_encoder(encoder).map_err(encode_err)?;
        }
        Codec::Png => {
            image
                .write_with_encoder(PngEncoder::new(&mut buf))
                .map_err(encode_err)?;
        }
        Codec::Tiff => {
            image
                .write_with_encoder(TiffEncoder::new(Cursor::new(&mut buf)))
                .map_err(encode_err)?;
        }
    }
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        load_image(path)
    }

    fn composite(
        &self,
        source: &DynamicImage,
        params: &CompositeParams,
    ) -> Result<DynamicImage, BackendError> {
        // Load the font before allocating the canvas so a missing font fails fast.
        let font = if params.captions.iter().any(|c| !c.text.is_empty()) {
            Some(self.fonts.load(&params.font)?)
        } else {
            None
        };

        let keep_alpha = source.color().has_alpha();
        Ok(if is_high_depth(source) {
            let canvas = frame(&source.to_rgba16(), params, font.as_ref())?;
            let canvas = DynamicImage::ImageRgba16(canvas);
            if keep_alpha {
                canvas
            } else {
                DynamicImage::ImageRgb16(canvas.into_rgb16())
            }
        } else {
            let canvas = frame(&source.to_rgba8(), params, font.as_ref())?;
            let canvas = DynamicImage::ImageRgba8(canvas);
            if keep_alpha {
                canvas
            } else {
                DynamicImage::ImageRgb8(canvas.into_rgb8())
            }
        })
    }

    fn resize_to_area(
        &self,
        image: DynamicImage,
        target_pixels: u64,
    ) -> Result<DynamicImage, BackendError> {
        let (w, h) = area_resize_dimensions((image.width(), image.height()), target_pixels);
        if (w, h) == (image.width(), image.height()) {
            return Ok(image);
        }
        Ok(image.resize_exact(w, h, FilterType::Lanczos3))
    }

    fn encode(&self, image: &DynamicImage, codec: Codec) -> Result<Vec<u8>, BackendError> {
        encode_image(image, codec)
    }
}

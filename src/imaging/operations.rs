//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take a profile, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{BorderGeometry, font_size};
use super::params::{Caption, Codec, CompositeParams, FontFace, Gravity};
use crate::config::Profile;
use image::DynamicImage;
use log::{debug, info, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Copyright line as printed under the author name.
pub fn copyright_line(year: &str) -> String {
    format!("\u{a9} {year}")
}

/// Text inputs that are not part of a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionText {
    pub title: String,
    pub year: String,
}

/// Compute border geometry and caption placement without touching pixels.
///
/// Useful for testing parameter generation.
pub fn plan_composite(
    source: Dimensions,
    profile: &Profile,
    text: &CaptionText,
) -> Result<(BorderGeometry, CompositeParams)> {
    let Dimensions { width, height } = source;
    let geometry = BorderGeometry::compute(
        width,
        height,
        profile.border.bottom_scale,
        profile.border.top_side_scale,
    )
    .ok_or(BackendError::InvalidGeometry { width, height })?;

    let font = &profile.font;
    let title_size = font_size(width, height, font.scale_factor_title);
    let meta_size = font_size(width, height, font.scale_factor_metadata);

    let captions = vec![
        Caption {
            text: text.title.clone(),
            size: title_size,
            color: font.color,
            gravity: Gravity::South,
            offset_x: 0,
            offset_y: geometry.title_offset() as i64,
        },
        Caption {
            text: profile.author.name.clone(),
            size: meta_size,
            color: font.color,
            gravity: Gravity::SouthWest,
            offset_x: geometry.other as i64,
            offset_y: geometry.author_offset() as i64,
        },
        Caption {
            text: copyright_line(&text.year),
            size: meta_size,
            color: font.color,
            gravity: Gravity::SouthWest,
            offset_x: geometry.other as i64,
            offset_y: geometry.copyright_offset() as i64,
        },
    ];

    let params = CompositeParams {
        border_color: profile.border.color,
        border_side: geometry.other,
        border_bottom: geometry.bottom,
        top_crop: geometry.top_crop(),
        font: FontFace {
            name: font.name.clone(),
            family: font.family.clone(),
            weight: font.weight,
        },
        captions,
    };
    Ok((geometry, params))
}

/// A finished image: the pixels (kept for the web variant) and their encoding.
#[derive(Debug)]
pub struct RenderedImage {
    pub image: DynamicImage,
    pub geometry: BorderGeometry,
    pub codec: Codec,
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.image)
    }
}

/// Composite, optionally resize, and encode one profile's output.
///
/// `source` is only borrowed; the backend works on its own copy.
pub fn render_image(
    backend: &impl ImageBackend,
    source: &DynamicImage,
    profile: &Profile,
    text: &CaptionText,
) -> Result<RenderedImage> {
    let dims = Dimensions::of(source);
    let (geometry, params) = plan_composite(dims, profile, text)?;
    debug!(
        "\tBorders: {}px at bottom, {}px around",
        geometry.bottom, geometry.other
    );

    let mut image = backend.composite(source, &params)?;

    if profile.resize.enable {
        let target = profile.resize.target_pixels();
        info!("\tResizing to {} megapixels", profile.resize.megapixels);
        if dims.pixels() < target {
            warn!("\t\tInput image is smaller than output - you are scaling up!");
        }
        image = backend.resize_to_area(image, target)?;
    }

    let codec = profile.output.codec_choice().resolve();
    let bytes = backend.encode(&image, codec)?;
    Ok(RenderedImage {
        image,
        geometry,
        codec,
        bytes,
    })
}

/// Downscale a rendered image for the web and encode it as JPEG.
///
/// Never upscales: an image already at or below the web target is only
/// re-encoded.
pub fn render_web_variant(
    backend: &impl ImageBackend,
    rendered: &RenderedImage,
    profile: &Profile,
) -> Result<Vec<u8>> {
    let target = profile.web.target_pixels();
    let codec = profile.web.codec();
    if rendered.dimensions().pixels() > target {
        let smaller = backend.resize_to_area(rendered.image.clone(), target)?;
        backend.encode(&smaller, codec)
    } else {
        backend.encode(&rendered.image, codec)
    }
}

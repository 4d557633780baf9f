//! Pure calculation functions for border geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Everything that depends on image size is expressed against the *input*
//! image's `width + height`, so portrait and landscape shots of the same
//! size get the same border.

/// Share of the bottom border cropped from the top after bordering.
pub const TOP_CROP_RATIO: f64 = 0.5;
/// Title offset from the bottom edge, as a share of the bottom border.
pub const TITLE_OFFSET_RATIO: f64 = 0.39;
/// Author line offset from the bottom edge, as a share of the bottom border.
pub const AUTHOR_OFFSET_RATIO: f64 = 0.55;
/// Copyright line offset from the bottom edge, as a share of the bottom border.
pub const COPYRIGHT_OFFSET_RATIO: f64 = 0.31;

/// Border thickness in pixels: `trunc((width + height) * scale)`.
///
/// Truncates toward zero. A negative `scale` gives a negative result, which
/// callers must treat as invalid.
///
/// # Examples
/// ```
/// # use photo_border::imaging::border_px;
/// assert_eq!(border_px(6000, 4000, 0.02), 200);
/// assert_eq!(border_px(101, 100, 0.01), 2); // 2.01 truncates
/// ```
pub fn border_px(width: u32, height: u32, scale: f64) -> i64 {
    ((width as f64 + height as f64) * scale).trunc() as i64
}

/// Truncated share of a pixel length.
pub fn share_of(px: u32, ratio: f64) -> u32 {
    (px as f64 * ratio).trunc() as u32
}

/// Font size in pixels for a scale factor relative to `width + height`.
pub fn font_size(width: u32, height: u32, scale_factor: f64) -> f32 {
    ((width as f64 + height as f64) * scale_factor) as f32
}

/// Absolute border thicknesses for one image under one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGeometry {
    /// Bottom border thickness (`border_bottom_px`).
    pub bottom: u32,
    /// Left/right/top border thickness (`border_other_px`).
    pub other: u32,
}

impl BorderGeometry {
    /// Compute both thicknesses.
    ///
    /// Returns `None` if either would be negative, or if the bordered canvas
    /// for a `width` x `height` image would not fit `u32` dimensions.
    pub fn compute(width: u32, height: u32, bottom_scale: f64, top_side_scale: f64) -> Option<Self> {
        let bottom = u32::try_from(border_px(width, height, bottom_scale)).ok()?;
        let other = u32::try_from(border_px(width, height, top_side_scale)).ok()?;
        let geometry = Self { bottom, other };
        geometry.composited_dimensions(width, height)?;
        Some(geometry)
    }

    /// Rows removed from the top after bordering.
    ///
    /// The border primitive puts the bottom thickness on top as well; half of
    /// it is cropped back off.
    pub fn top_crop(&self) -> u32 {
        share_of(self.bottom, TOP_CROP_RATIO)
    }

    pub fn title_offset(&self) -> u32 {
        share_of(self.bottom, TITLE_OFFSET_RATIO)
    }

    pub fn author_offset(&self) -> u32 {
        share_of(self.bottom, AUTHOR_OFFSET_RATIO)
    }

    pub fn copyright_offset(&self) -> u32 {
        share_of(self.bottom, COPYRIGHT_OFFSET_RATIO)
    }

    /// Canvas size after bordering and cropping an image of `(width, height)`.
    ///
    /// `None` when the bordered canvas overflows `u32`.
    pub fn composited_dimensions(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let bordered_width = self.other.checked_mul(2)?.checked_add(width)?;
        let bordered_height = self.bottom.checked_mul(2)?.checked_add(height)?;
        Some((bordered_width, bordered_height - self.top_crop()))
    }
}

/// Dimensions that bring `width * height` close to `target_pixels` while
/// keeping the aspect ratio.
///
/// Each side is scaled by `sqrt(target / (width * height))` and rounded;
/// neither side drops below one pixel.
///
/// # Examples
/// ```
/// # use photo_border::imaging::area_resize_dimensions;
/// assert_eq!(area_resize_dimensions((6000, 4000), 3_000_000), (2121, 1414));
/// ```
pub fn area_resize_dimensions(source: (u32, u32), target_pixels: u64) -> (u32, u32) {
    let (w, h) = source;
    let area = w as f64 * h as f64;
    if area == 0.0 {
        return source;
    }
    let scale = (target_pixels as f64 / area).sqrt();
    let new_w = (w as f64 * scale).round().max(1.0) as u32;
    let new_h = (h as f64 * scale).round().max(1.0) as u32;
    (new_w, new_h)
}

/// Total pixel count of `(width, height)`.
pub fn pixel_count(dims: (u32, u32)) -> u64 {
    dims.0 as u64 * dims.1 as u64
}

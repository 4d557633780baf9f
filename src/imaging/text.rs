//! Font lookup and caption rasterization.
//!
//! Fonts are plain `.ttf`/`.otf`/`.ttc` files. A [`FontFace`] is resolved by
//! trying, in order:
//!
//! 1. `name` as a file path,
//! 2. `name` as a font file stem in each font directory,
//! 3. `family` as a font file stem in each font directory.
//!
//! Stems are compared case-insensitively with spaces, dashes and
//! underscores ignored, so `"DejaVu Sans"` matches `DejaVuSans.ttf`.
//! Font directories are the user-supplied ones followed by the platform's
//! system font directories.

use super::backend::BackendError;
use super::params::{Caption, FontFace, Gravity};
use crate::types::Color;
use image::{ImageBuffer, Pixel, Primitive, Rgba};
use log::debug;
use rusttype::{Font, Scale, point};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// System font directories for the current platform, if they exist.
pub fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join(".fonts"));
        dirs.push(home.join("Library/Fonts"));
    }

    dirs.retain(|d| d.is_dir());
    dirs
}

/// Looks fonts up by path or name across a list of directories.
#[derive(Debug, Clone, Default)]
pub struct FontResolver {
    dirs: Vec<PathBuf>,
}

impl FontResolver {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// User directories first, then the system font directories.
    pub fn with_system_dirs(mut user_dirs: Vec<PathBuf>) -> Self {
        user_dirs.extend(system_font_dirs());
        Self::new(user_dirs)
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Find the font file for `face`.
    pub fn resolve(&self, face: &FontFace) -> Result<PathBuf, BackendError> {
        let as_path = Path::new(&face.name);
        if as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }

        for key in [&face.name, &face.family] {
            if key.trim().is_empty() {
                continue;
            }
            if let Some(found) = self.find_by_stem(key) {
                debug!("\tFont '{}' resolved to {}", key, found.display());
                return Ok(found);
            }
        }

        Err(BackendError::FontNotFound(format!(
            "'{}' (family '{}')",
            face.name, face.family
        )))
    }

    /// Every font file under the directories, in search order.
    pub fn font_files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.dirs.iter().flat_map(|dir| {
            // Sorted so the same font wins on every run.
            WalkDir::new(dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| is_font_file(p))
        })
    }

    fn find_by_stem(&self, key: &str) -> Option<PathBuf> {
        let wanted = normalize_font_name(key);
        self.font_files().find(|p| stem_matches(p, &wanted))
    }

    /// Resolve and parse the font for `face`.
    pub fn load(&self, face: &FontFace) -> Result<Font<'static>, BackendError> {
        let path = self.resolve(face)?;
        load_font_file(&path)
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FONT_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

fn stem_matches(path: &Path, wanted: &str) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| normalize_font_name(s) == wanted)
}

/// Lowercase and strip everything but letters and digits.
pub fn normalize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Read and parse a font file (first face of a collection).
pub fn load_font_file(path: &Path) -> Result<Font<'static>, BackendError> {
    let bytes = std::fs::read(path)?;
    Font::try_from_vec(bytes).ok_or_else(|| {
        BackendError::ProcessingFailed(format!("Invalid font file: {}", path.display()))
    })
}

/// Width and line height of `text` at `px`.
///
/// Width runs to the far edge of the last glyph's ink or advance, whichever
/// is larger; line height is ascent minus descent.
pub fn measure_text(font: &Font<'_>, px: f32, text: &str) -> (f32, f32) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let line_height = v_metrics.ascent - v_metrics.descent;

    let mut width: f32 = 0.0;
    for glyph in font.layout(text, scale, point(0.0, v_metrics.ascent)) {
        let advance_end = glyph.position().x + glyph.unpositioned().h_metrics().advance_width;
        width = width.max(advance_end);
        if let Some(bb) = glyph.pixel_bounding_box() {
            width = width.max(bb.max.x as f32);
        }
    }
    (width, line_height)
}

/// Top-left corner of a caption's line box on a `canvas_w` x `canvas_h` canvas.
pub fn caption_origin(
    canvas_w: u32,
    canvas_h: u32,
    text_w: f32,
    line_h: f32,
    caption: &Caption,
) -> (f32, f32) {
    let x = match caption.gravity {
        Gravity::South => (canvas_w as f32 - text_w) / 2.0 + caption.offset_x as f32,
        Gravity::SouthWest => caption.offset_x as f32,
    };
    let y = canvas_h as f32 - caption.offset_y as f32 - line_h;
    (x, y)
}

/// Extra horizontal strokes used to fake a bold weight at `px`.
fn bold_strokes(face: &FontFace, px: f32) -> u32 {
    if face.is_bold() {
        ((px / 24.0).round() as u32).max(1)
    } else {
        0
    }
}

/// Sample type of a drawing canvas, mapped to and from `0.0..=1.0`.
pub trait Channel: Primitive + 'static {
    fn to_unit(self) -> f32;
    fn from_unit(v: f32) -> Self;
}

impl Channel for u8 {
    fn to_unit(self) -> f32 {
        self as f32 / u8::MAX as f32
    }

    fn from_unit(v: f32) -> Self {
        (v.clamp(0.0, 1.0) * u8::MAX as f32).round() as u8
    }
}

impl Channel for u16 {
    fn to_unit(self) -> f32 {
        self as f32 / u16::MAX as f32
    }

    fn from_unit(v: f32) -> Self {
        (v.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16
    }
}

/// `color` as a pixel of a canvas with `S` samples.
pub fn color_pixel<S: Channel>(color: Color) -> Rgba<S> {
    Rgba([color.r, color.g, color.b, color.a].map(|c| S::from_unit(c.to_unit())))
}

/// Draw one caption onto `canvas`, alpha-blending the glyph coverage.
pub fn draw_caption<S: Channel>(
    canvas: &mut ImageBuffer<Rgba<S>, Vec<S>>,
    font: &Font<'_>,
    face: &FontFace,
    caption: &Caption,
)
where
    Rgba<S>: Pixel<Subpixel = S>,
{
    if caption.text.is_empty() || caption.size <= 0.0 {
        return;
    }
    let (text_w, line_h) = measure_text(font, caption.size, &caption.text);
    let (x, y) = caption_origin(canvas.width(), canvas.height(), text_w, line_h, caption);

    let scale = Scale::uniform(caption.size);
    let baseline = y + font.v_metrics(scale).ascent;

    for stroke in 0..=bold_strokes(face, caption.size) {
        let start = point(x + stroke as f32, baseline);
        for glyph in font.layout(&caption.text, scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if px >= canvas.width() || py >= canvas.height() {
                    return;
                }
                blend(canvas.get_pixel_mut(px, py), caption.color, coverage);
            });
        }
    }
}

/// Source-over blend of `color` scaled by `coverage` onto `dst`.
fn blend<S: Channel>(dst: &mut Rgba<S>, color: Color, coverage: f32) {
    let sa = coverage.clamp(0.0, 1.0) * color.a.to_unit();
    if sa <= 0.0 {
        return;
    }
    let inv = 1.0 - sa;
    for (d, c) in dst.0.iter_mut().zip([color.r, color.g, color.b]) {
        *d = S::from_unit(c.to_unit() * sa + d.to_unit() * inv);
    }
    let da = dst.0[3].to_unit();
    dst.0[3] = S::from_unit(sa + da * inv);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::find_test_font;
    use image::RgbaImage;
    use tempfile::TempDir;

    fn face(name: &str, family: &str) -> FontFace {
        FontFace {
            name: name.to_string(),
            family: family.to_string(),
            weight: 400,
        }
    }

    fn caption(text: &str, gravity: Gravity, offset_x: i64, offset_y: i64) -> Caption {
        Caption {
            text: text.to_string(),
            size: 20.0,
            color: Color::black(),
            gravity,
            offset_x,
            offset_y,
        }
    }

    #[test]
    fn normalize_ignores_case_and_punctuation() {
        assert_eq!(normalize_font_name("DejaVu Sans"), "dejavusans");
        assert_eq!(normalize_font_name("dejavu-sans_Bold"), "dejavusansbold");
    }

    #[test]
    fn resolve_by_stem_in_font_dir() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("truetype/inter");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Inter-Regular.ttf"), b"not really a font").unwrap();

        let resolver = FontResolver::new(vec![tmp.path().to_path_buf()]);
        let found = resolver.resolve(&face("inter regular", "")).unwrap();
        assert!(found.ends_with("Inter-Regular.ttf"));
    }

    #[test]
    fn resolve_falls_back_to_family() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Lato.otf"), b"x").unwrap();

        let resolver = FontResolver::new(vec![tmp.path().to_path_buf()]);
        let found = resolver.resolve(&face("Lato-Black", "Lato")).unwrap();
        assert!(found.ends_with("Lato.otf"));
    }

    #[test]
    fn resolve_ignores_non_font_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Lato.txt"), b"x").unwrap();

        let resolver = FontResolver::new(vec![tmp.path().to_path_buf()]);
        assert!(matches!(
            resolver.resolve(&face("Lato", "Lato")),
            Err(BackendError::FontNotFound(_))
        ));
    }

    #[test]
    fn font_files_lists_fonts_in_directory_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::create_dir_all(first.path().join("sub")).unwrap();
        std::fs::write(first.path().join("sub/B.otf"), b"x").unwrap();
        std::fs::write(first.path().join("A.TTF"), b"x").unwrap();
        std::fs::write(first.path().join("readme.txt"), b"x").unwrap();
        std::fs::write(second.path().join("0.ttc"), b"x").unwrap();

        let resolver = FontResolver::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        let names: Vec<String> = resolver
            .font_files()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["A.TTF", "B.otf", "0.ttc"]);
    }

    #[test]
    fn resolve_accepts_direct_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.ttf");
        std::fs::write(&path, b"x").unwrap();

        let resolver = FontResolver::new(Vec::new());
        let found = resolver
            .resolve(&face(path.to_str().unwrap(), ""))
            .unwrap();
        assert_eq!(found, path);
    }

    #[test]
    fn load_rejects_invalid_font_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(
            load_font_file(&path),
            Err(BackendError::ProcessingFailed(_))
        ));
    }

    #[test]
    fn origin_south_is_centered() {
        let c = caption("x", Gravity::South, 0, 39);
        let (x, y) = caption_origin(1000, 500, 200.0, 30.0, &c);
        assert_eq!(x, 400.0);
        assert_eq!(y, 500.0 - 39.0 - 30.0);
    }

    #[test]
    fn origin_south_west_uses_left_offset() {
        let c = caption("x", Gravity::SouthWest, 20, 55);
        let (x, y) = caption_origin(1000, 500, 200.0, 10.0, &c);
        assert_eq!(x, 20.0);
        assert_eq!(y, 435.0);
    }

    #[test]
    fn blend_full_coverage_replaces_color() {
        let mut px = Rgba([255u8, 255, 255, 255]);
        blend(&mut px, Color::black(), 1.0);
        assert_eq!(px, Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn blend_zero_coverage_is_noop() {
        let mut px = Rgba([10u8, 20, 30, 255]);
        blend(&mut px, Color::black(), 0.0);
        assert_eq!(px, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn blend_half_coverage_on_16_bit_keeps_precision() {
        let mut px = Rgba([u16::MAX; 4]);
        blend(&mut px, Color::black(), 0.5);
        assert_eq!(px, Rgba([32768, 32768, 32768, u16::MAX]));
    }

    #[test]
    fn color_pixel_scales_to_sample_depth() {
        let c = Color { r: 255, g: 128, b: 0, a: 255 };
        assert_eq!(color_pixel::<u8>(c), Rgba([255, 128, 0, 255]));
        assert_eq!(color_pixel::<u16>(c), Rgba([65535, 32896, 0, 65535]));
    }

    #[test]
    fn draw_caption_marks_bottom_band_only() {
        let Some(font_path) = find_test_font() else {
            eprintln!("no system font found, skipping");
            return;
        };
        let font = load_font_file(&font_path).unwrap();
        let mut canvas = RgbaImage::from_pixel(400, 200, Rgba([255, 255, 255, 255]));
        let c = caption("Hello", Gravity::South, 0, 10);

        draw_caption(&mut canvas, &font, &face("", ""), &c);

        let dark = |y_range: std::ops::Range<u32>| {
            y_range
                .flat_map(|y| (0..400).map(move |x| (x, y)))
                .filter(|&(x, y)| canvas.get_pixel(x, y).0[0] < 128)
                .count()
        };
        assert!(dark(150..200) > 0, "caption should be drawn near the bottom");
        assert_eq!(dark(0..100), 0, "nothing should be drawn at the top");
    }

    #[test]
    fn measure_text_grows_with_length() {
        let Some(font_path) = find_test_font() else {
            eprintln!("no system font found, skipping");
            return;
        };
        let font = load_font_file(&font_path).unwrap();
        let (short, h1) = measure_text(&font, 24.0, "ab");
        let (long, h2) = measure_text(&font, 24.0, "abcdef");
        assert!(long > short);
        assert_eq!(h1, h2);
    }
}

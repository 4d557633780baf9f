//! Profile configuration.
//!
//! A *profile* is one TOML document describing how a single output is
//! rendered: border proportions, caption font, resize target and output
//! codec. Profiles live in a profile directory (default `profiles/`), one
//! file per profile, keyed by file stem:
//!
//! ```text
//! profiles/
//! ├── default.toml     # used when no profile is named on the command line
//! ├── print.toml
//! └── web.toml
//! ```
//!
//! ## Profile Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//! name = "default"              # Used for logging (defaults to the file stem)
//!
//! [border]
//! bottom_scale = 0.06           # Fraction of (width + height)
//! top_side_scale = 0.02
//! color = "#ffffff"
//!
//! [font]
//! name = "DejaVuSans"           # Font file path, or font file stem to look up
//! family = "DejaVu Sans"        # Looked up when `name` is not found
//! weight = 400                  # 600 and above is drawn bold
//! color = "#000000"
//! scale_factor_title = 0.012    # Font size as a fraction of (width + height)
//! scale_factor_metadata = 0.007
//!
//! [author]
//! name = ""
//!
//! [resize]
//! enable = false
//! megapixels = 24.0
//!
//! [output]
//! suffix = "_b"                 # Replaces the input extension
//! codec = "jpeg"                # jpeg | png | tiff
//! quality = 90                  # JPEG only (1-100)
//!
//! [web]                         # Only used with --web
//! megapixels = 1.0
//! quality = 75
//! suffix = "_web"
//! ```
//!
//! ## Partial Profiles
//!
//! Profile files are sparse and are layered over the stock profile, so a
//! profile only has to name what differs:
//!
//! ```toml
//! name = "print"
//!
//! [output]
//! suffix = "_print"
//! codec = "tiff"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Codec, CodecChoice, Quality};
use crate::types::Color;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Profile loaded when no profile names are given.
pub const DEFAULT_PROFILE: &str = "default";

/// File extension of profile documents.
pub const PROFILE_EXTENSION: &str = "toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("profile '{name}' not found at {}", path.display())]
    NotFound { name: String, path: PathBuf },
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("profile '{name}' is malformed: {source}")]
    Parse {
        name: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("profile '{name}' is invalid: {message}")]
    Validation { name: String, message: String },
}

/// One rendering profile.
///
/// All fields have defaults matching the stock profile; see the
/// [module docs](self) for the file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    /// Identifier used in log output. Falls back to the file stem when empty.
    pub name: String,
    pub border: BorderConfig,
    pub font: FontConfig,
    pub author: AuthorConfig,
    pub resize: ResizeConfig,
    pub output: OutputConfig,
    pub web: WebConfig,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROFILE.to_string(),
            border: BorderConfig::default(),
            font: FontConfig::default(),
            author: AuthorConfig::default(),
            resize: ResizeConfig::default(),
            output: OutputConfig::default(),
            web: WebConfig::default(),
        }
    }
}

/// Border proportions, as fractions of `width + height` of the input image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BorderConfig {
    /// Bottom border; usually the thickest since it carries the captions.
    pub bottom_scale: f64,
    /// Left, right and (after cropping) top borders.
    pub top_side_scale: f64,
    pub color: Color,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            bottom_scale: 0.06,
            top_side_scale: 0.02,
            color: Color::white(),
        }
    }
}

/// Caption font settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Font file path, or the stem of a font file in a font directory.
    pub name: String,
    /// Secondary lookup key when `name` does not resolve.
    pub family: String,
    /// CSS-style weight; 600 and above is rendered bold.
    pub weight: u32,
    pub color: Color,
    /// Title font size as a fraction of `width + height`.
    pub scale_factor_title: f64,
    /// Author/copyright font size as a fraction of `width + height`.
    pub scale_factor_metadata: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            name: "DejaVuSans".to_string(),
            family: "DejaVu Sans".to_string(),
            weight: 400,
            color: Color::black(),
            scale_factor_title: 0.012,
            scale_factor_metadata: 0.007,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    pub name: String,
}

/// Optional downscale of the final image to a target pixel count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub enable: bool,
    pub megapixels: f64,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            enable: false,
            megapixels: 24.0,
        }
    }
}

impl ResizeConfig {
    /// Target pixel count, `megapixels * 1_000_000`.
    pub fn target_pixels(&self) -> u64 {
        (self.megapixels * 1_000_000.0) as u64
    }
}

/// Output file naming and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Replaces the input file's extension, e.g. `photo.jpg` → `photo_b.jpg`.
    pub suffix: String,
    /// `jpeg`, `png` or `tiff`. Anything else falls back to PNG.
    pub codec: String,
    /// JPEG quality (1-100). Ignored by the lossless codecs.
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: "_b".to_string(),
            codec: "jpeg".to_string(),
            quality: Quality::default().value(),
        }
    }
}

impl OutputConfig {
    /// Parse the configured codec; unknown names are kept for the fallback warning.
    pub fn codec_choice(&self) -> CodecChoice {
        CodecChoice::parse(&self.codec, Quality::new(self.quality))
    }
}

/// Secondary, smaller JPEG written alongside the main output with `--web`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebConfig {
    pub megapixels: f64,
    pub quality: u32,
    /// Appended after the profile's own suffix.
    pub suffix: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            megapixels: 1.0,
            quality: 75,
            suffix: "_web".to_string(),
        }
    }
}

impl WebConfig {
    pub fn target_pixels(&self) -> u64 {
        (self.megapixels * 1_000_000.0) as u64
    }

    pub fn codec(&self) -> Codec {
        Codec::Jpeg {
            quality: Quality::new(self.quality),
        }
    }
}

impl Profile {
    /// Validate values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::Validation {
            name: self.name.clone(),
            message: message.to_string(),
        };
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.border.bottom_scale) || !positive(self.border.top_side_scale) {
            return Err(invalid("border scales must be positive"));
        }
        if !positive(self.font.scale_factor_title) || !positive(self.font.scale_factor_metadata) {
            return Err(invalid("font scale factors must be positive"));
        }
        if self.resize.enable && !positive(self.resize.megapixels) {
            return Err(invalid("resize.megapixels must be positive"));
        }
        if !positive(self.web.megapixels) {
            return Err(invalid("web.megapixels must be positive"));
        }
        for (key, suffix) in [("output.suffix", &self.output.suffix), ("web.suffix", &self.web.suffix)] {
            if suffix.is_empty() {
                return Err(invalid(&format!("{key} must not be empty")));
            }
            if suffix.contains(['/', '\\']) {
                return Err(invalid(&format!("{key} must not contain a path separator")));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Profile loading, merging, and validation
// =============================================================================

/// Returns the stock profile as a `toml::Value::Table`.
///
/// This is the base layer every profile document is merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Profile::default()).expect("default profile must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Path of the document for profile `name` inside `dir`.
pub fn profile_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{PROFILE_EXTENSION}"))
}

/// Parse a profile document, layering it over the stock profile.
///
/// `name` is used for error messages and as the profile name when the
/// document does not set one.
pub fn parse_profile(name: &str, content: &str) -> Result<Profile, ConfigError> {
    let parse_err = |source| ConfigError::Parse {
        name: name.to_string(),
        source,
    };
    let overlay: toml::Value = toml::from_str(content).map_err(parse_err)?;
    // The stock layer always carries "default"; only an explicit name wins.
    let named_in_doc = overlay
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|n| !n.is_empty())
        .map(str::to_owned);

    let merged = merge_toml(stock_defaults_value(), overlay);
    let mut profile: Profile = merged.try_into().map_err(parse_err)?;
    profile.name = named_in_doc.unwrap_or_else(|| name.to_string());

    profile.validate()?;
    Ok(profile)
}

/// Load a single named profile from `dir`.
pub fn load_profile(dir: &Path, name: &str) -> Result<Profile, ConfigError> {
    let path = profile_path(dir, name);
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            name: name.to_string(),
            path,
        });
    }
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    parse_profile(name, &content)
}

/// Load every named profile, in order.
///
/// With no names, loads the `default` profile and warns about it. When
/// `default.toml` is absent too, the built-in stock profile is used.
/// Returns a freshly built list; nothing is cached between calls.
pub fn load_profiles(dir: &Path, names: &[String]) -> Result<Vec<Profile>, ConfigError> {
    if names.is_empty() {
        warn!("Using default profile as none was specified");
        let path = profile_path(dir, DEFAULT_PROFILE);
        if !path.is_file() {
            info!(
                "No {} found, using built-in default profile",
                path.display()
            );
            return Ok(vec![Profile::default()]);
        }
        return Ok(vec![load_profile(dir, DEFAULT_PROFILE)?]);
    }

    names.iter().map(|name| load_profile(dir, name)).collect()
}

/// Returns a fully-commented stock profile with all keys and explanations.
///
/// Printed by `--print-profile`.
pub fn stock_profile_toml() -> &'static str {
    r##"# Photo Border Profile
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Save as profiles/<name>.toml and select with --profiles <name>.
# Unknown keys will cause an error.

# Shown in log output. Defaults to the file name without extension.
name = "default"

# ---------------------------------------------------------------------------
# Border
# ---------------------------------------------------------------------------
[border]
# Thickness as a fraction of (image width + image height).
# The bottom border holds the captions and is normally the thickest.
bottom_scale = 0.06
top_side_scale = 0.02

# Any CSS color: hex (#rrggbb), rgb(r, g, b), hsl(...) or a color name.
color = "#ffffff"

# ---------------------------------------------------------------------------
# Caption font
# ---------------------------------------------------------------------------
[font]
# A path to a .ttf/.otf file, or a font file name looked up in the font
# directories (--font-dir) and the system font directories.
name = "DejaVuSans"
# Tried the same way when `name` is not found.
family = "DejaVu Sans"
# 600 and above is drawn bold.
weight = 400
color = "#000000"
# Font sizes as a fraction of (image width + image height).
scale_factor_title = 0.012
scale_factor_metadata = 0.007

# ---------------------------------------------------------------------------
# Author line (above the copyright line, bottom left)
# ---------------------------------------------------------------------------
[author]
name = ""

# ---------------------------------------------------------------------------
# Resize the finished image to a total pixel count
# ---------------------------------------------------------------------------
[resize]
enable = false
megapixels = 24.0

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Replaces the input extension: photo.jpg -> photo_b.jpg
suffix = "_b"
# jpeg, png or tiff. Anything else falls back to png with a warning.
codec = "jpeg"
# JPEG quality (1-100).
quality = 90

# ---------------------------------------------------------------------------
# Web variant (only written with --web)
# ---------------------------------------------------------------------------
[web]
megapixels = 1.0
quality = 75
# Appended after the output suffix: photo_b_web.jpg
suffix = "_web"
"##
}

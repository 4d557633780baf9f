//! # Photo Border
//!
//! Frames a photograph with a colored border and prints its title, the
//! author's name and a copyright line into the widened bottom border. One
//! run renders the same input under any number of named *profiles*, each a
//! small TOML file describing border proportions, font, colors, an optional
//! resize and the output codec.
//!
//! # Pipeline
//!
//! ```text
//! profiles/*.toml ──► config::load_profiles ──► [Profile]
//!                                                  │
//! photo.jpg ──► decode ──► per profile: composite ─► [resize] ─► encode ─► photo<suffix>.<ext>
//!                                                                     └──► [--web] photo<suffix>_web.jpg
//! ```
//!
//! Everything that needs pixels sits behind [`imaging::ImageBackend`], so
//! the geometry and the per-profile flow are tested against a recording mock
//! without decoding or encoding anything.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Profile TOML loading: stock defaults, sparse overlay, validation |
//! | [`imaging`] | Border geometry, compositing, captions, resize and encode |
//! | [`render`] | Runs one input through every profile with per-profile failure isolation |
//! | [`output`] | Output file naming and writing |
//! | [`types`] | Shared value types (`Color`) |
//!
//! # Design Decisions
//!
//! ## Proportional Geometry
//!
//! Border widths, caption offsets and font sizes are all fractions of
//! `width + height`. A profile therefore looks the same on a phone snapshot
//! and a 60 MP scan, and the same input always yields the same geometry.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, drawing and encoding use the `image` crate and glyphs are
//! rasterized with `rusttype`. No ImageMagick or system library is needed;
//! only a TrueType font has to be present.

pub mod config;
pub mod imaging;
pub mod output;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

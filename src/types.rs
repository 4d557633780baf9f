//! Shared types used by the profile schema and the imaging backend.
//!
//! [`Color`] is deserialized straight out of profile documents, so a bad
//! color is reported as a config error before any image is opened.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const CHANNELS: usize = 3;
const EXPECTING_MSG: &str = "a CSS color string or an [r, g, b] array";

/// An opaque-or-translucent RGBA color.
///
/// Strings use CSS color syntax (`#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`,
/// `rgba()`, `hsl()`, any CSS color name). `0x` and `$` are accepted as hex
/// prefixes for a full 24-bit value. In TOML an `[r, g, b]` array works too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn white() -> Self {
        Self::rgb(0xff, 0xff, 0xff)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ColorParseError {
    #[error("invalid color `{input}`: {source}")]
    Css {
        input: String,
        #[source]
        source: csscolorparser::ParseColorError,
    },
    #[error("`{0}` must be a 24-bit hex number")]
    ShortHex(String),
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(v: &str) -> Result<Self, Self::Err> {
        // Other hex prefixes are rewritten to the CSS one. They only
        // allow the full 24-bit form.
        let mut s = v.trim().to_lowercase();
        for prefix in ["0x", "$"] {
            if let Some(hex) = s.strip_prefix(prefix) {
                if hex.len() != 6 {
                    return Err(ColorParseError::ShortHex(v.to_string()));
                }
                s = format!("#{hex}");
                break;
            }
        }

        let [r, g, b, a] = csscolorparser::parse(&s)
            .map_err(|source| ColorParseError::Css {
                input: v.to_string(),
                source,
            })?
            .to_rgba8();
        Ok(Self { r, g, b, a })
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ColorVisitor)
    }
}

struct ColorVisitor;

impl<'de> Visitor<'de> for ColorVisitor {
    type Value = Color;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(EXPECTING_MSG)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Color::from_str(v).map_err(E::custom)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let expected = &"3";
        let mut channels = [0u8; CHANNELS];
        for (i, channel) in channels.iter_mut().enumerate() {
            *channel = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, expected))?;
        }
        if seq.next_element::<u8>()?.is_some() {
            return Err(de::Error::invalid_length(CHANNELS + 1, expected));
        }
        let [r, g, b] = channels;
        Ok(Color::rgb(r, g, b))
    }
}

//! Output naming and writing.
//!
//! Outputs are written next to the input, named by swapping the input's
//! extension for the profile suffix plus the codec's own extension:
//!
//! ```text
//! shots/harbour.jpg   --profiles default print web
//! shots/harbour_b.jpg          # default: suffix "_b",     jpeg
//! shots/harbour_print.tif      # print:   suffix "_print", tiff
//! shots/harbour_web.png        # web:     suffix "_web",   png
//! shots/harbour_b_web.jpg      # --web variant of default
//! ```
//!
//! Existing files are overwritten. Writes are not atomic.

use crate::imaging::Codec;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Input file name with its extension replaced by `suffix` + `.ext`.
///
/// A name without an extension just gets the suffix appended.
pub fn output_path(input: &Path, suffix: &str, codec: Codec) -> PathBuf {
    with_suffix(input, suffix, codec.extension())
}

/// Path of the `--web` variant: the profile suffix, then the web suffix, always `.jpg`.
pub fn web_output_path(input: &Path, profile_suffix: &str, web_suffix: &str) -> PathBuf {
    with_suffix(input, &format!("{profile_suffix}{web_suffix}"), "jpg")
}

fn with_suffix(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut name: OsString = input
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    name.push(".");
    name.push(extension);
    input.with_file_name(name)
}

/// Write encoded bytes to `path`, replacing any existing file.
pub fn write_image(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}

/// One-line summary of a finished run.
pub fn format_summary(succeeded: usize, failed: usize) -> String {
    match failed {
        0 => "All done!".to_string(),
        n => format!(
            "Finished with {n} failed profile{} ({succeeded} succeeded)",
            if n == 1 { "" } else { "s" }
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use tempfile::TempDir;

    const JPEG: Codec = Codec::Jpeg {
        quality: Quality(90),
    };

    #[test]
    fn output_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("/photos/harbour.jpg"), "_b", JPEG),
            PathBuf::from("/photos/harbour_b.jpg")
        );
    }

    #[test]
    fn output_path_uses_codec_extension() {
        let input = Path::new("shots/IMG_0042.JPG");
        assert_eq!(
            output_path(input, "_print", Codec::Tiff),
            PathBuf::from("shots/IMG_0042_print.tif")
        );
        assert_eq!(
            output_path(input, "_web", Codec::Png),
            PathBuf::from("shots/IMG_0042_web.png")
        );
    }

    #[test]
    fn output_path_only_last_extension_replaced() {
        assert_eq!(
            output_path(Path::new("a.b.jpeg"), "_x", JPEG),
            PathBuf::from("a.b_x.jpg")
        );
    }

    #[test]
    fn output_path_without_extension() {
        assert_eq!(
            output_path(Path::new("/tmp/scan"), "_b", Codec::Png),
            PathBuf::from("/tmp/scan_b.png")
        );
    }

    #[test]
    fn web_path_stacks_suffixes() {
        assert_eq!(
            web_output_path(Path::new("/p/harbour.tif"), "_b", "_web"),
            PathBuf::from("/p/harbour_b_web.jpg")
        );
    }

    #[test]
    fn write_image_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.jpg");
        write_image(&path, b"first version").unwrap();
        write_image(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn write_image_into_missing_dir_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing/out.jpg");
        assert!(write_image(&path, b"x").is_err());
    }

    #[test]
    fn summary_lines() {
        assert_eq!(format_summary(3, 0), "All done!");
        assert_eq!(
            format_summary(2, 1),
            "Finished with 1 failed profile (2 succeeded)"
        );
        assert_eq!(
            format_summary(0, 2),
            "Finished with 2 failed profiles (0 succeeded)"
        );
    }
}

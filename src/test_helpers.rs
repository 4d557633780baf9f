//! Shared test utilities.
//!
//! Synthetic images are generated in-process so the suite needs no external
//! tools. Fonts come from the host: tests that draw text call
//! [`find_test_font`] and skip themselves when it returns `None`.
//! Log output is asserted through [`capture_logs`].

use crate::imaging::text::{FontResolver, load_font_file};
use image::{ImageEncoder, RgbImage};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::Once;

/// Write a `width`x`height` gradient JPEG to `path`.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// First font on this machine that actually parses.
pub fn find_test_font() -> Option<PathBuf> {
    FontResolver::with_system_dirs(Vec::new())
        .font_files()
        .find(|path| load_font_file(path).is_ok())
}

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Records every log line on the thread that emitted it, so tests running
/// in parallel only see their own output.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        CAPTURED.with(|lines| {
            lines
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Run `f` and return its result with the log lines it emitted.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).expect("no other logger in unit tests");
        log::set_max_level(LevelFilter::Trace);
    });
    CAPTURED.with(|lines| lines.borrow_mut().clear());
    let result = f();
    (result, CAPTURED.with(RefCell::take))
}

/// Messages logged at `Warn`.
pub fn warnings(lines: &[(Level, String)]) -> Vec<&str> {
    lines
        .iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, message)| message.as_str())
        .collect()
}

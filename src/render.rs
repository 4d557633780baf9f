//! Rendering one input image under a list of profiles.
//!
//! ## Flow
//!
//! ```text
//! decode input ──┬── profile 1: composite → [resize] → encode → write [→ web variant]
//!                ├── profile 2: ...
//!                └── profile n: ...
//! ```
//!
//! The input is decoded once and only ever borrowed; each profile composites
//! its own copy, so profiles cannot see each other's output.
//!
//! ## Failure policy
//!
//! - An input that cannot be decoded aborts the whole run
//!   ([`RenderError::InputImage`]).
//! - Any other failure is confined to its profile: it is logged with the
//!   input path and profile name, recorded in the [`RunSummary`], and the
//!   remaining profiles still run.

use crate::config::Profile;
use crate::imaging::{
    BackendError, CaptionText, Dimensions, ImageBackend, render_image, render_web_variant,
};
use crate::output::{output_path, web_output_path, write_image};
use image::DynamicImage;
use log::{error, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot read input image {}: {source}", path.display())]
    InputImage {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Image processing failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Cannot write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What to render: one input plus its caption text.
#[derive(Debug, Clone)]
pub struct Job {
    pub path: PathBuf,
    pub title: String,
    pub year: String,
    /// Also write the smaller web variant for every profile.
    pub web: bool,
}

impl Job {
    fn caption_text(&self) -> CaptionText {
        CaptionText {
            title: self.title.clone(),
            year: self.year.clone(),
        }
    }
}

/// A profile that rendered successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub profile: String,
    pub output: PathBuf,
    pub dimensions: Dimensions,
    pub web_output: Option<PathBuf>,
}

/// A profile that failed.
#[derive(Debug)]
pub struct ProfileFailure {
    pub profile: String,
    pub error: RenderError,
}

/// Result of running every profile.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<RenderOutcome>,
    pub failures: Vec<ProfileFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render `job` once per profile, in order.
pub fn run(
    backend: &impl ImageBackend,
    job: &Job,
    profiles: &[Profile],
) -> Result<RunSummary, RenderError> {
    info!("\tInput image: {}", job.path.display());
    let source = backend
        .decode(&job.path)
        .map_err(|source| RenderError::InputImage {
            path: job.path.clone(),
            source,
        })?;
    info!("\tInput resolution: {}", Dimensions::of(&source));

    let mut summary = RunSummary::default();
    for profile in profiles {
        match render_profile(backend, job, &source, profile) {
            Ok(outcome) => summary.outcomes.push(outcome),
            Err(err) => {
                error!(
                    "\tProfile '{}' failed for {}: {}",
                    profile.name,
                    job.path.display(),
                    err
                );
                summary.failures.push(ProfileFailure {
                    profile: profile.name.clone(),
                    error: err,
                });
            }
        }
    }
    Ok(summary)
}

/// Render and write a single profile's output(s).
pub fn render_profile(
    backend: &impl ImageBackend,
    job: &Job,
    source: &DynamicImage,
    profile: &Profile,
) -> Result<RenderOutcome, RenderError> {
    info!("Running profile: {}", profile.name);

    let rendered = render_image(backend, source, profile, &job.caption_text())?;
    let output = output_path(&job.path, &profile.output.suffix, rendered.codec);
    info!("\tOutput image: {}", output.display());
    save(&output, &rendered.bytes)?;
    info!("\tSaved output image successfully");

    let web_output = if job.web {
        let bytes = render_web_variant(backend, &rendered, profile)?;
        let path = web_output_path(&job.path, &profile.output.suffix, &profile.web.suffix);
        info!("\tWeb image: {}", path.display());
        save(&path, &bytes)?;
        Some(path)
    } else {
        None
    };

    Ok(RenderOutcome {
        profile: profile.name.clone(),
        output,
        dimensions: rendered.dimensions(),
        web_output,
    })
}

fn save(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    write_image(path, bytes).map_err(|source| RenderError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Codec;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use tempfile::TempDir;

    fn job(dir: &Path, web: bool) -> Job {
        Job {
            path: dir.join("harbour.jpg"),
            title: "Harbour".to_string(),
            year: "2023".to_string(),
            web,
        }
    }

    fn profile(name: &str, suffix: &str, codec: &str) -> Profile {
        let mut p = Profile::default();
        p.name = name.to_string();
        p.output.suffix = suffix.to_string();
        p.output.codec = codec.to_string();
        p
    }

    fn backend_for(width: u32, height: u32) -> MockBackend {
        MockBackend::with_dimensions(vec![Dimensions { width, height }])
    }

    #[test]
    fn single_profile_writes_one_file() {
        let tmp = TempDir::new().unwrap();
        let backend = backend_for(600, 400);

        let summary = run(&backend, &job(tmp.path(), false), &[Profile::default()]).unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.outcomes.len(), 1);
        let outcome = &summary.outcomes[0];
        assert_eq!(outcome.output, tmp.path().join("harbour_b.jpg"));
        assert_eq!(outcome.dimensions, Dimensions { width: 640, height: 490 });
        assert_eq!(outcome.web_output, None);
        assert_eq!(std::fs::read(&outcome.output).unwrap(), b"jpeg (quality 90)");
    }

    #[test]
    fn two_profiles_produce_independent_outputs() {
        let tmp = TempDir::new().unwrap();
        let backend = backend_for(600, 400);
        let profiles = [profile("a", "_a", "png"), profile("b", "_b", "tiff")];

        let summary = run(&backend, &job(tmp.path(), false), &profiles).unwrap();

        let outputs: Vec<PathBuf> = summary.outcomes.iter().map(|o| o.output.clone()).collect();
        assert_eq!(
            outputs,
            vec![tmp.path().join("harbour_a.png"), tmp.path().join("harbour_b.tif")]
        );
        assert!(outputs.iter().all(|p| p.exists()));

        // Decoded once; both composites saw the untouched 600x400 source.
        let ops = backend.get_operations();
        let decodes = ops.iter().filter(|o| matches!(o, RecordedOp::Decode(_))).count();
        assert_eq!(decodes, 1);
        let sources: Vec<Dimensions> = ops
            .iter()
            .filter_map(|o| match o {
                RecordedOp::Composite { source, .. } => Some(*source),
                _ => None,
            })
            .collect();
        assert_eq!(sources, vec![Dimensions { width: 600, height: 400 }; 2]);
    }

    #[test]
    fn unknown_codec_writes_png() {
        let tmp = TempDir::new().unwrap();
        let backend = backend_for(60, 40);

        let summary = run(&backend, &job(tmp.path(), false), &[profile("x", "_x", "bmp")]).unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.outcomes[0].output, tmp.path().join("harbour_x.png"));
    }

    #[test]
    fn web_flag_writes_second_file() {
        let tmp = TempDir::new().unwrap();
        let backend = backend_for(60, 40);

        let summary = run(&backend, &job(tmp.path(), true), &[Profile::default()]).unwrap();

        let web = summary.outcomes[0].web_output.clone().unwrap();
        assert_eq!(web, tmp.path().join("harbour_b_web.jpg"));
        assert!(web.exists());
        let encodes: Vec<Codec> = backend
            .get_operations()
            .into_iter()
            .filter_map(|o| match o {
                RecordedOp::Encode { codec, .. } => Some(codec),
                _ => None,
            })
            .collect();
        assert_eq!(encodes.len(), 2);
    }

    #[test]
    fn undecodable_input_aborts_run() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();

        let result = run(&backend, &job(tmp.path(), false), &[Profile::default()]);
        assert!(matches!(result, Err(RenderError::InputImage { .. })));
    }

    #[test]
    fn failing_profile_does_not_stop_others() {
        let tmp = TempDir::new().unwrap();
        let backend = backend_for(600, 400).failing_on_caption("Broken Author");
        let mut broken = profile("broken", "_broken", "png");
        broken.author.name = "Broken Author".to_string();
        let profiles = [broken, profile("ok", "_ok", "png")];

        let summary = run(&backend, &job(tmp.path(), false), &profiles).unwrap();

        assert!(!summary.is_success());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].profile, "broken");
        assert!(matches!(summary.failures[0].error, RenderError::Backend(_)));
        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(summary.outcomes[0].profile, "ok");
        assert!(!tmp.path().join("harbour_broken.png").exists());
    }

    #[test]
    fn unwritable_output_is_profile_failure() {
        let tmp = TempDir::new().unwrap();
        let backend = backend_for(60, 40);
        let job = Job {
            path: tmp.path().join("missing-dir/harbour.jpg"),
            ..job(tmp.path(), false)
        };

        let summary = run(&backend, &job, &[Profile::default()]).unwrap();
        assert_eq!(summary.failures.len(), 1);
        assert!(matches!(
            summary.failures[0].error,
            RenderError::OutputWrite { .. }
        ));
    }

    #[test]
    fn rerun_gives_same_dimensions() {
        let tmp = TempDir::new().unwrap();
        let first = run(&backend_for(3000, 2000), &job(tmp.path(), false), &[Profile::default()])
            .unwrap();
        let second = run(&backend_for(3000, 2000), &job(tmp.path(), false), &[Profile::default()])
            .unwrap();
        assert_eq!(first.outcomes, second.outcomes);
    }
}

use clap::{ArgAction, Parser};
use log::{LevelFilter, debug, error, info};
use photo_border::imaging::RustBackend;
use photo_border::render::{self, Job};
use photo_border::{config, output};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Crate version on a release tag, `dev@<hash>` elsewhere.
fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("GIT_HASH") {
        "" => "dev@unknown",
        // Leaked once at startup
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "photo-border")]
#[command(about = "Add a border with title and copyright to a photograph")]
#[command(long_about = "\
Add a border with title and copyright to a photograph

The bottom border is widened to hold the title (centered), the author's
name and a copyright line (left). Border widths and text sizes scale with
the image, so a profile looks the same at any resolution.

Each profile is a TOML file in the profile directory:

  profiles/
  ├── default.toml      # used when --profiles is not given
  ├── print.toml        # e.g. TIFF for the print shop
  └── web.toml          # e.g. small PNG

Outputs are written next to the input, named by the profile suffix:

  harbour.jpg  →  harbour_b.jpg, harbour_print.tif, ...

Run 'photo-border --print-profile' to print a documented profile.")]
#[command(version = version_string())]
struct Cli {
    /// Input image
    #[arg(required_unless_present = "print_profile")]
    path: Option<PathBuf>,

    /// Image title, printed centered in the bottom border
    #[arg(required_unless_present = "print_profile")]
    title: Option<String>,

    /// Copyright year
    #[arg(required_unless_present = "print_profile")]
    year: Option<String>,

    /// Profiles to run, in order
    #[arg(long, num_args = 1..)]
    profiles: Vec<String>,

    /// Also write a small JPEG for the web next to each output
    #[arg(long)]
    web: bool,

    /// Directory holding <name>.toml profiles
    #[arg(long, default_value = "profiles")]
    profile_dir: PathBuf,

    /// Extra directory to search for fonts (repeatable)
    #[arg(long = "font-dir", default_value = "fonts")]
    font_dirs: Vec<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print a stock profile with all options documented and exit
    #[arg(long)]
    print_profile: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| match record.level() {
            log::Level::Error | log::Level::Warn => {
                writeln!(buf, "{}: {}", record.level(), record.args())
            }
            _ => writeln!(buf, "{}", record.args()),
        })
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.print_profile {
        print!("{}", config::stock_profile_toml());
        return ExitCode::SUCCESS;
    }

    init_logging(cli.verbose);

    // clap enforces all three unless --print-profile was given.
    let (Some(path), Some(title), Some(year)) = (cli.path, cli.title, cli.year) else {
        return ExitCode::FAILURE;
    };

    let profiles = match config::load_profiles(&cli.profile_dir, &cli.profiles) {
        Ok(profiles) => profiles,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let backend = RustBackend::with_font_dirs(cli.font_dirs);
    debug!("Font directories: {:?}", backend.fonts().dirs());
    let job = Job {
        path,
        title,
        year,
        web: cli.web,
    };

    match render::run(&backend, &job, &profiles) {
        Ok(summary) => {
            info!(
                "{}",
                output::format_summary(summary.outcomes.len(), summary.failures.len())
            );
            if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

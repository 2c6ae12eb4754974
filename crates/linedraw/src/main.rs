//! linedraw: turn raster images into stroke-animated SVG line drawings.
//!
//! Decodes an image, fits it inside the configured maximum size, runs
//! the edge pipeline and writes the SVG. The `animate` subcommand adds a
//! stroke-reveal animation to an existing SVG file.
//!
//! # Usage
//!
//! ```text
//! linedraw convert photo.jpg --animate --type sync --output photo.svg
//! linedraw animate drawing.svg --type scenario --duration 8 > animated.svg
//! ```

#![allow(clippy::print_stderr)]

mod raster;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use linedraw_export::{AnimationKind, AnimationOptions, ExportError, LengthMode, SvgMetadata};
use linedraw_pipeline::diagnostics::{Clock, process_staged_with_diagnostics};
use linedraw_pipeline::{EdgeOptions, PipelineError, ProcessResult};
use tracing_subscriber::EnvFilter;

use crate::raster::RasterError;

/// Raster-to-vector line drawing with stroke-reveal animation.
#[derive(Parser)]
#[command(name = "linedraw", version)]
struct Cli {
    /// Log pipeline stages at debug level (`RUST_LOG` takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an image (PNG, JPEG, BMP, WebP) into an SVG line drawing.
    Convert(ConvertArgs),
    /// Add a stroke-reveal animation to an existing SVG.
    Animate(AnimateArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Path to the input image.
    image_path: PathBuf,

    /// Write the SVG here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Animate the resulting drawing.
    #[arg(long)]
    animate: bool,

    #[command(flatten)]
    animation: AnimationArgs,

    #[command(flatten)]
    edge: EdgeArgs,

    /// Full edge options as a JSON string.
    ///
    /// When provided, the individual edge option flags are ignored.
    /// Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print per-stage timings and counts to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Print diagnostics as JSON instead of a report.
    #[arg(long, requires = "diagnostics")]
    json: bool,
}

#[derive(Args)]
struct AnimateArgs {
    /// Path to the input SVG.
    svg_path: PathBuf,

    /// Write the animated SVG here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    animation: AnimationArgs,
}

#[derive(Args)]
struct EdgeArgs {
    /// Longest side, in pixels, the image is shrunk to before processing.
    #[arg(long, default_value_t = EdgeOptions::DEFAULT_MAX_SIZE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    max_size: u32,

    /// Gradient magnitude above which a pixel is a weak edge.
    #[arg(long, default_value_t = EdgeOptions::DEFAULT_EDGE_LOWER_THRESHOLD)]
    edge_lower_threshold: f64,

    /// Gradient magnitude above which a pixel is a strong edge.
    #[arg(long, default_value_t = EdgeOptions::DEFAULT_EDGE_UPPER_THRESHOLD)]
    edge_upper_threshold: f64,

    /// Edge map value for weak edges.
    #[arg(long, default_value_t = EdgeOptions::DEFAULT_WEAK_EDGE_VALUE)]
    weak_edge_value: u8,

    /// Edge map value for strong edges.
    #[arg(long, default_value_t = EdgeOptions::DEFAULT_STRONG_EDGE_VALUE)]
    strong_edge_value: u8,

    /// Discard traced paths with this many points or fewer.
    #[arg(long, default_value_t = EdgeOptions::DEFAULT_MIN_PATH_LENGTH)]
    min_path_length: usize,

    /// Douglas-Peucker tolerance in pixels.
    #[arg(long, default_value_t = EdgeOptions::DEFAULT_SIMPLIFY_TOLERANCE)]
    simplify_tolerance: f64,
}

#[derive(Args)]
struct AnimationArgs {
    /// Delay policy: delayed, sync, oneByOne, scenario, scenario-sync.
    #[arg(long = "type", default_value_t = AnimationKind::default())]
    kind: AnimationKind,

    /// Total animation duration in seconds.
    #[arg(long, default_value_t = AnimationOptions::DEFAULT_DURATION)]
    duration: f64,

    /// Base start delay in seconds.
    #[arg(long, default_value_t = AnimationOptions::DEFAULT_DELAY)]
    delay: f64,

    /// Use a fixed dash length of 1000 instead of measuring each path.
    #[arg(long)]
    placeholder_length: bool,
}

impl AnimationArgs {
    const fn options(&self) -> AnimationOptions {
        AnimationOptions {
            kind: self.kind,
            duration: self.duration,
            delay: self.delay,
            length_mode: if self.placeholder_length {
                LengthMode::Placeholder
            } else {
                LengthMode::Measured
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("writing output: {0}")]
    Stdout(std::io::Error),

    #[error("parsing --config-json: {0}")]
    ConfigJson(serde_json::Error),

    #[error("serializing diagnostics: {0}")]
    DiagnosticsJson(serde_json::Error),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Build [`EdgeOptions`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual edge flags are ignored.
fn edge_options(args: &ConvertArgs) -> Result<EdgeOptions, CliError> {
    if let Some(ref json) = args.config_json {
        return serde_json::from_str(json).map_err(CliError::ConfigJson);
    }
    let edge = &args.edge;
    Ok(EdgeOptions {
        max_size: edge.max_size,
        edge_lower_threshold: edge.edge_lower_threshold,
        edge_upper_threshold: edge.edge_upper_threshold,
        weak_edge_value: edge.weak_edge_value,
        strong_edge_value: edge.strong_edge_value,
        min_path_length: edge.min_path_length,
        simplify_tolerance: edge.simplify_tolerance,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Convert(args) => run_convert(args),
        Command::Animate(args) => run_animate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; stdout may carry the SVG.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_convert(args: &ConvertArgs) -> Result<(), CliError> {
    let options = edge_options(args)?;
    options.validate()?;
    let animation = args.animation.options();
    if args.animate {
        animation.validate()?;
    }

    let bytes = read(&args.image_path)?;
    let grid = raster::load_grid(&bytes, options.max_size)?;
    tracing::info!(
        path = %args.image_path.display(),
        width = grid.width(),
        height = grid.height(),
        "loaded image"
    );

    let result = if args.diagnostics {
        let (staged, diagnostics) = process_staged_with_diagnostics(grid, &options, &StdClock)?;
        if args.json {
            let json =
                serde_json::to_string_pretty(&diagnostics).map_err(CliError::DiagnosticsJson)?;
            eprintln!("{json}");
        } else {
            eprintln!("{}", diagnostics.report());
        }
        staged.into_process_result()
    } else {
        linedraw_pipeline::process(grid, &options)?
    };

    let svg = render(&result, &args.image_path);
    let svg = if args.animate {
        linedraw_export::animate(&svg, &animation)?
    } else {
        svg
    };
    write(args.output.as_deref(), &svg)
}

fn run_animate(args: &AnimateArgs) -> Result<(), CliError> {
    let text = read_text(&args.svg_path)?;
    let svg = linedraw_export::animate(&text, &args.animation.options())?;
    write(args.output.as_deref(), &svg)
}

/// Serialize with the image's file stem as the document title.
fn render(result: &ProcessResult, image_path: &Path) -> String {
    if result.paths.is_empty() {
        tracing::warn!("no edges found; the drawing is empty");
    }
    let title = image_path.file_stem().and_then(|s| s.to_str());
    let metadata = SvgMetadata {
        title,
        description: Some("Line drawing generated by linedraw"),
    };
    linedraw_export::to_svg(&result.paths, result.dimensions, &metadata)
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Io {
        action: "reading",
        path: path.to_path_buf(),
        source,
    })
}

/// Read a UTF-8 document; invalid UTF-8 is an error, not replaced.
fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        action: "reading",
        path: path.to_path_buf(),
        source,
    })
}

fn write(output: Option<&Path>, svg: &str) -> Result<(), CliError> {
    match output {
        Some(path) => {
            std::fs::write(path, svg).map_err(|source| CliError::Io {
                action: "writing",
                path: path.to_path_buf(),
                source,
            })?;
            tracing::info!(path = %path.display(), bytes = svg.len(), "SVG written");
            Ok(())
        }
        None => std::io::stdout()
            .lock()
            .write_all(svg.as_bytes())
            .map_err(CliError::Stdout),
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("linedraw").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn convert_defaults_match_library() {
        let Command::Convert(args) = parse(&["convert", "in.png"]).command else {
            unreachable!("parsed convert");
        };
        assert_eq!(edge_options(&args).unwrap(), EdgeOptions::default());
        assert_eq!(args.animation.options(), AnimationOptions::default());
    }

    #[test]
    fn animation_flags_map_to_options() {
        let Command::Animate(args) = parse(&[
            "animate",
            "in.svg",
            "--type",
            "scenario-sync",
            "--duration",
            "2",
            "--delay",
            "0.5",
            "--placeholder-length",
        ])
        .command
        else {
            unreachable!("parsed animate");
        };
        let options = args.animation.options();
        assert_eq!(options.kind, AnimationKind::ScenarioSync);
        assert!((options.duration - 2.0).abs() < f64::EPSILON);
        assert!((options.delay - 0.5).abs() < f64::EPSILON);
        assert_eq!(options.length_mode, LengthMode::Placeholder);
    }

    #[test]
    fn unknown_animation_type_is_rejected() {
        let parsed = Cli::try_parse_from(["linedraw", "animate", "in.svg", "--type", "bounce"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn config_json_overrides_flags() {
        let Command::Convert(args) = parse(&[
            "convert",
            "in.png",
            "--max-size",
            "100",
            "--config-json",
            r#"{"minPathLength": 7}"#,
        ])
        .command
        else {
            unreachable!("parsed convert");
        };
        let options = edge_options(&args).unwrap();
        assert_eq!(options.min_path_length, 7);
        assert_eq!(options.max_size, EdgeOptions::DEFAULT_MAX_SIZE);
    }

    #[test]
    fn json_requires_diagnostics() {
        assert!(Cli::try_parse_from(["linedraw", "convert", "in.png", "--json"]).is_err());
    }

    #[test]
    fn animate_input_must_be_utf8() {
        let path = std::env::temp_dir().join(format!("linedraw-invalid-{}.svg", std::process::id()));
        std::fs::write(&path, [0xff, 0xfe, b'<']).unwrap();
        let Command::Animate(args) = parse(&["animate", path.to_str().unwrap()]).command else {
            unreachable!("parsed animate");
        };
        let err = run_animate(&args).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            err,
            CliError::Io { source, .. } if source.kind() == std::io::ErrorKind::InvalidData
        ));
    }

    #[test]
    fn zero_max_size_is_rejected_by_parser() {
        assert!(
            Cli::try_parse_from(["linedraw", "convert", "in.png", "--max-size", "0"]).is_err()
        );
    }
}

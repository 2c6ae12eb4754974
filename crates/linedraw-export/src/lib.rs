//! linedraw-export: SVG serialization and stroke animation (sans-IO).
//!
//! Turns pipeline polylines into an SVG document and rewrites SVG
//! documents so their paths draw themselves in. Everything here takes
//! and returns strings; reading and writing files is the caller's job.

pub mod animate;
pub mod dom;
pub mod error;
pub mod path_data;
pub mod svg;

use linedraw_pipeline::{EdgeOptions, PixelGrid};
use tracing::{debug, warn};

pub use crate::animate::{
    AnimationKind, AnimationOptions, LengthMode, PathAnimation, animate, schedule,
};
pub use crate::error::ExportError;
pub use crate::path_data::{parse_path_data, path_length};
pub use crate::svg::{SvgMetadata, build_path_data, to_svg};

/// Convert a grayscale grid into an SVG line drawing.
///
/// Runs the full [`linedraw_pipeline::process`] chain and serializes the
/// result with [`to_svg`]. A grid without edges yields a valid document
/// whose single path is empty.
///
/// # Errors
///
/// Returns [`ExportError::Pipeline`] if `options` fail validation.
#[tracing::instrument(skip_all, fields(width = grid.width(), height = grid.height()))]
pub fn convert(grid: PixelGrid, options: &EdgeOptions) -> Result<String, ExportError> {
    let result = linedraw_pipeline::process(grid, options)?;
    if result.paths.is_empty() {
        warn!("no edges survived the pipeline; emitting an empty path");
    }
    debug!(polylines = result.paths.len(), "serializing");
    Ok(to_svg(&result.paths, result.dimensions, &SvgMetadata::default()))
}

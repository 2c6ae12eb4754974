//! linedraw-pipeline: Pure raster-to-polyline pipeline (sans-IO).
//!
//! Converts a grayscale pixel grid into simplified, smoothed polylines
//! through:
//! Sobel gradient -> double-threshold classification -> greedy path
//! tracing -> point-count filter -> Douglas-Peucker -> smoothing.
//!
//! Decoding, resizing and grayscale conversion happen upstream; this
//! crate only consumes `width`, `height` and a row-major byte buffer. It
//! has **no I/O dependencies**. SVG serialization and animation live in
//! `linedraw-export`.

pub mod diagnostics;
pub mod edge;
pub mod gradient;
pub mod pipeline;
pub mod simplify;
pub mod smooth;
pub mod trace;
pub mod types;

pub use pipeline::Pipeline;
pub use trace::{PathTracer, PathTracerKind};
pub use types::{
    Dimensions, EdgeLabel, EdgeMap, EdgeOptions, GradientField, PathSet, PipelineError, PixelGrid,
    Point, Polyline, ProcessResult, StagedResult,
};

/// Run the full pipeline.
///
/// Takes a preprocessed grayscale grid and the edge options, then
/// produces the final polylines together with the grid dimensions (the
/// SVG emitter needs them for `viewBox`).
///
/// # Pipeline steps
///
/// 1. Sobel gradient magnitude
/// 2. Double-threshold edge classification
/// 3. Greedy path tracing
/// 4. Drop polylines with `min_path_length` points or fewer
/// 5. Douglas-Peucker simplification
/// 6. Three-point moving-average smoothing
///
/// A grid without edges is not an error: it produces an empty path set.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] if `options` fail validation.
#[tracing::instrument(skip_all, fields(width = grid.width(), height = grid.height()))]
pub fn process(grid: PixelGrid, options: &EdgeOptions) -> Result<ProcessResult, PipelineError> {
    let staged = Pipeline::new(grid, options.clone())?
        .compute_gradient()
        .classify_edges()
        .trace_paths()
        .filter_paths()
        .simplify()
        .smooth()
        .into_result();
    Ok(staged.into_process_result())
}

//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`] which runs the entire pipeline in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use linedraw_pipeline::{EdgeOptions, Pipeline, PipelineError, PixelGrid};
//! # fn run(grid: PixelGrid) -> Result<(), PipelineError> {
//! let staged = Pipeline::new(grid, EdgeOptions::default())?
//!     .compute_gradient()
//!     .classify_edges()
//!     .trace_paths()
//!     .filter_paths()
//!     .simplify()
//!     .smooth()
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state,
//! carrying the previously computed intermediates. Skipping a stage or
//! calling them out of order is a compile-time error.
//!
//! # Memory
//!
//! Every stage from [`GradientComputed`] onward retains the full
//! magnitude field (8 bytes per pixel) until [`Smoothed::into_result`]
//! hands it to the [`StagedResult`]. Callers that only need the final
//! paths should prefer [`crate::process`].

use tracing::debug;

use crate::edge::Thresholds;
use crate::trace::{PathTracer, PathTracerKind};
use crate::types::{
    Dimensions, EdgeMap, EdgeOptions, GradientField, PathSet, PipelineError, PixelGrid,
    StagedResult,
};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`compute_gradient`](Self::compute_gradient) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .compute_gradient() to continue"]
pub struct Pending {
    options: EdgeOptions,
    grid: PixelGrid,
}

impl Pending {
    /// The source pixel grid.
    #[must_use]
    pub const fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    /// Run the Sobel operator and advance to [`GradientComputed`].
    pub fn compute_gradient(self) -> GradientComputed {
        let gradient = crate::gradient::sobel(&self.grid);
        debug!(
            width = gradient.width(),
            height = gradient.height(),
            "gradient computed"
        );
        GradientComputed {
            options: self.options,
            dimensions: self.grid.dimensions(),
            gradient,
        }
    }
}

// ───────────────────────── Stage 1: GradientComputed ─────────────────

/// Pipeline state after the Sobel gradient.
///
/// Call [`classify_edges`](Self::classify_edges) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .classify_edges() to continue"]
pub struct GradientComputed {
    options: EdgeOptions,
    dimensions: Dimensions,
    gradient: GradientField,
}

impl GradientComputed {
    /// The gradient magnitude field.
    #[must_use]
    pub const fn gradient(&self) -> &GradientField {
        &self.gradient
    }

    /// Double-threshold the magnitudes and advance to [`EdgesClassified`].
    pub fn classify_edges(self) -> EdgesClassified {
        let edges = crate::edge::classify(&self.gradient, &Thresholds::from(&self.options));
        debug!(
            edge_pixels = edges.edge_pixel_count(),
            "edges classified"
        );
        EdgesClassified {
            options: self.options,
            dimensions: self.dimensions,
            gradient: self.gradient,
            edges,
        }
    }
}

// ───────────────────────── Stage 2: EdgesClassified ──────────────────

/// Pipeline state after edge classification.
///
/// Call [`trace_paths`](Self::trace_paths) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .trace_paths() to continue"]
pub struct EdgesClassified {
    options: EdgeOptions,
    dimensions: Dimensions,
    gradient: GradientField,
    edges: EdgeMap,
}

impl EdgesClassified {
    /// The classified edge map.
    #[must_use]
    pub const fn edges(&self) -> &EdgeMap {
        &self.edges
    }

    /// Walk the edge map into polylines and advance to [`PathsTraced`].
    ///
    /// An edge map with no traceable pixels yields an empty path set; that
    /// is not an error.
    pub fn trace_paths(self) -> PathsTraced {
        let traced = PathTracerKind::Greedy.trace(&self.edges);
        debug!(
            polylines = traced.len(),
            points = crate::diagnostics::total_points(&traced),
            "paths traced"
        );
        PathsTraced {
            options: self.options,
            dimensions: self.dimensions,
            gradient: self.gradient,
            edges: self.edges,
            traced,
        }
    }
}

// ───────────────────────── Stage 3: PathsTraced ──────────────────────

/// Pipeline state after path tracing.
///
/// Call [`filter_paths`](Self::filter_paths) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .filter_paths() to continue"]
pub struct PathsTraced {
    options: EdgeOptions,
    dimensions: Dimensions,
    gradient: GradientField,
    edges: EdgeMap,
    traced: PathSet,
}

impl PathsTraced {
    /// The raw traced polylines in discovery order.
    #[must_use]
    pub fn traced(&self) -> &[crate::Polyline] {
        &self.traced
    }

    /// Drop short polylines and advance to [`PathsFiltered`].
    pub fn filter_paths(self) -> PathsFiltered {
        let filtered = crate::simplify::filter_short(
            self.traced.clone(),
            self.options.min_path_length,
        );
        debug!(
            kept = filtered.len(),
            dropped = self.traced.len() - filtered.len(),
            min_path_length = self.options.min_path_length,
            "short paths filtered"
        );
        PathsFiltered {
            options: self.options,
            dimensions: self.dimensions,
            gradient: self.gradient,
            edges: self.edges,
            traced: self.traced,
            filtered,
        }
    }
}

// ───────────────────────── Stage 4: PathsFiltered ────────────────────

/// Pipeline state after the point-count filter.
///
/// Call [`simplify`](Self::simplify) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .simplify() to continue"]
pub struct PathsFiltered {
    options: EdgeOptions,
    dimensions: Dimensions,
    gradient: GradientField,
    edges: EdgeMap,
    traced: PathSet,
    filtered: PathSet,
}

impl PathsFiltered {
    /// The polylines that survived the filter.
    #[must_use]
    pub fn filtered(&self) -> &[crate::Polyline] {
        &self.filtered
    }

    /// Apply Douglas-Peucker and advance to [`Simplified`].
    pub fn simplify(self) -> Simplified {
        let simplified =
            crate::simplify::simplify_paths(&self.filtered, self.options.simplify_tolerance);
        debug!(
            points_before = crate::diagnostics::total_points(&self.filtered),
            points_after = crate::diagnostics::total_points(&simplified),
            tolerance = self.options.simplify_tolerance,
            "paths simplified"
        );
        Simplified {
            dimensions: self.dimensions,
            gradient: self.gradient,
            edges: self.edges,
            traced: self.traced,
            filtered: self.filtered,
            simplified,
        }
    }
}

// ───────────────────────── Stage 5: Simplified ───────────────────────

/// Pipeline state after simplification.
///
/// Call [`smooth`](Self::smooth) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .smooth() to continue"]
pub struct Simplified {
    dimensions: Dimensions,
    gradient: GradientField,
    edges: EdgeMap,
    traced: PathSet,
    filtered: PathSet,
    simplified: PathSet,
}

impl Simplified {
    /// The simplified polylines.
    #[must_use]
    pub fn simplified(&self) -> &[crate::Polyline] {
        &self.simplified
    }

    /// Apply the moving-average smoother and advance to [`Smoothed`].
    pub fn smooth(self) -> Smoothed {
        let smoothed = crate::smooth::smooth_paths(&self.simplified);
        debug!(polylines = smoothed.len(), "paths smoothed");
        Smoothed {
            dimensions: self.dimensions,
            gradient: self.gradient,
            edges: self.edges,
            traced: self.traced,
            filtered: self.filtered,
            simplified: self.simplified,
            smoothed,
        }
    }
}

// ───────────────────────── Stage 6: Smoothed ─────────────────────────

/// Final pipeline state.
#[must_use = "call .into_result() to collect the staged output"]
pub struct Smoothed {
    dimensions: Dimensions,
    gradient: GradientField,
    edges: EdgeMap,
    traced: PathSet,
    filtered: PathSet,
    simplified: PathSet,
    smoothed: PathSet,
}

impl Smoothed {
    /// The smoothed (final) polylines.
    #[must_use]
    pub fn smoothed(&self) -> &[crate::Polyline] {
        &self.smoothed
    }

    /// Collect every intermediate into a [`StagedResult`].
    pub fn into_result(self) -> StagedResult {
        StagedResult {
            gradient: self.gradient,
            edges: self.edges,
            traced: self.traced,
            filtered: self.filtered,
            simplified: self.simplified,
            smoothed: self.smoothed,
            dimensions: self.dimensions,
        }
    }
}

/// Entry point for the stage-by-stage API.
pub struct Pipeline;

impl Pipeline {
    /// Validate `options` and store the grid.
    ///
    /// No processing is performed yet.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if `options` fail
    /// [`EdgeOptions::validate`].
    #[allow(clippy::new_ret_no_self)]
    pub fn new(grid: PixelGrid, options: EdgeOptions) -> Result<Pending, PipelineError> {
        options.validate()?;
        Ok(Pending { options, grid })
    }
}

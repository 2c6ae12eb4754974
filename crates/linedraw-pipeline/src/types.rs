//! Shared types for the linedraw pipeline.

use serde::{Deserialize, Serialize};

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// An ordered sequence of points forming connected straight segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Cumulative Euclidean length of all segments.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Ordered collection of polylines.
///
/// Order is discovery order during tracing and is preserved through every
/// later stage; animation sequencing depends on it.
pub type PathSet = Vec<Polyline>;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total number of pixels (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Immutable single-channel raster, row-major, intensities 0-255.
///
/// Produced by an upstream preprocessing step (decode, fit inside
/// `max_size`, grayscale). The pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct PixelGrid {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelGrid {
    /// Wrap a row-major sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if either dimension is zero
    /// or `samples.len() != width * height`.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::invalid(
                "pixel_grid",
                format!("dimensions must be non-zero, got {width}x{height}"),
            ));
        }
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(PipelineError::invalid(
                "pixel_grid",
                format!(
                    "expected {expected} samples for {width}x{height}, got {}",
                    samples.len()
                ),
            ));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Build a grid by evaluating `f(x, y)` for every pixel.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if either dimension is zero.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> u8,
    ) -> Result<Self, PipelineError> {
        let mut samples = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self::new(width, height, samples)
    }

    /// Grid width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Row-major samples.
    #[must_use]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Intensity at `(x, y)`. Callers must stay in bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.samples[y as usize * self.width as usize + x as usize]
    }
}

/// Unchecked serialized form of [`PixelGrid`].
#[derive(Deserialize)]
struct RawGrid {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl TryFrom<RawGrid> for PixelGrid {
    type Error = PipelineError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height, raw.samples)
    }
}

/// Per-pixel Sobel gradient magnitude.
///
/// Border rows and columns are always `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientField {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) magnitude: Vec<f64>,
}

impl GradientField {
    /// Field width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Field height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major magnitudes.
    #[must_use]
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitude
    }

    /// Magnitude at `(x, y)`. Callers must stay in bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.magnitude[y as usize * self.width as usize + x as usize]
    }
}

/// Edge classification of a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeLabel {
    /// Magnitude at or below the lower threshold.
    #[default]
    None,
    /// Magnitude above the lower threshold, at or below the upper one.
    Weak,
    /// Magnitude above the upper threshold.
    Strong,
}

/// Classified edge map.
///
/// Each cell stores the intensity configured for its [`EdgeLabel`]
/// (`0` for [`EdgeLabel::None`]). Any non-zero cell is traceable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEdgeMap")]
pub struct EdgeMap {
    width: u32,
    height: u32,
    labels: Vec<u8>,
}

impl EdgeMap {
    /// Wrap a row-major label buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if either dimension is zero
    /// or `labels.len() != width * height`.
    pub fn new(width: u32, height: u32, labels: Vec<u8>) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 || labels.len() != width as usize * height as usize {
            return Err(PipelineError::invalid(
                "edge_map",
                format!(
                    "{} labels do not fill a {width}x{height} grid",
                    labels.len()
                ),
            ));
        }
        Ok(Self::from_parts(width, height, labels))
    }

    /// Unchecked constructor for buffers derived from a valid grid.
    pub(crate) const fn from_parts(width: u32, height: u32, labels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            labels,
        }
    }

    /// Map width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Map height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major label intensities.
    #[must_use]
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Label intensity at `(x, y)`. Callers must stay in bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Number of traceable (non-zero) cells.
    #[must_use]
    pub fn edge_pixel_count(&self) -> usize {
        self.labels.iter().filter(|&&v| v != 0).count()
    }
}

/// Unchecked serialized form of [`EdgeMap`].
#[derive(Deserialize)]
struct RawEdgeMap {
    width: u32,
    height: u32,
    labels: Vec<u8>,
}

impl TryFrom<RawEdgeMap> for EdgeMap {
    type Error = PipelineError;

    fn try_from(raw: RawEdgeMap) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height, raw.labels)
    }
}

/// Configuration for edge detection and path post-processing.
///
/// Field names serialize in camelCase (`edgeLowerThreshold`, ...) and
/// missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeOptions {
    /// Longest side the upstream preprocessing fits the image into.
    /// The pipeline itself never resizes.
    pub max_size: u32,

    /// Magnitudes above this (and at most `edge_upper_threshold`) are weak
    /// edges. Must not exceed `edge_upper_threshold`.
    pub edge_lower_threshold: f64,

    /// Magnitudes above this are strong edges.
    pub edge_upper_threshold: f64,

    /// Intensity stored in the edge map for weak edges.
    pub weak_edge_value: u8,

    /// Intensity stored in the edge map for strong edges.
    pub strong_edge_value: u8,

    /// Polylines with this many points or fewer are discarded.
    pub min_path_length: usize,

    /// Douglas-Peucker tolerance in pixels.
    pub simplify_tolerance: f64,
}

impl EdgeOptions {
    /// Default for [`max_size`](Self::max_size).
    pub const DEFAULT_MAX_SIZE: u32 = 800;
    /// Default for [`edge_lower_threshold`](Self::edge_lower_threshold).
    pub const DEFAULT_EDGE_LOWER_THRESHOLD: f64 = 40.0;
    /// Default for [`edge_upper_threshold`](Self::edge_upper_threshold).
    pub const DEFAULT_EDGE_UPPER_THRESHOLD: f64 = 80.0;
    /// Default for [`weak_edge_value`](Self::weak_edge_value).
    pub const DEFAULT_WEAK_EDGE_VALUE: u8 = 25;
    /// Default for [`strong_edge_value`](Self::strong_edge_value).
    pub const DEFAULT_STRONG_EDGE_VALUE: u8 = 255;
    /// Default for [`min_path_length`](Self::min_path_length).
    pub const DEFAULT_MIN_PATH_LENGTH: usize = 3;
    /// Default for [`simplify_tolerance`](Self::simplify_tolerance).
    pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 1.0;

    /// Check every option, reporting the first offending parameter.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] when `max_size` is zero, a
    /// threshold or the tolerance is negative or non-finite, the lower
    /// threshold exceeds the upper one, or an edge value is zero.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_size == 0 {
            return Err(PipelineError::invalid("max_size", "must be at least 1"));
        }
        for (name, value) in [
            ("edge_lower_threshold", self.edge_lower_threshold),
            ("edge_upper_threshold", self.edge_upper_threshold),
            ("simplify_tolerance", self.simplify_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::invalid(
                    name,
                    format!("must be a finite non-negative number, got {value}"),
                ));
            }
        }
        if self.edge_lower_threshold > self.edge_upper_threshold {
            return Err(PipelineError::invalid(
                "edge_lower_threshold",
                format!(
                    "{} exceeds edge_upper_threshold {}",
                    self.edge_lower_threshold, self.edge_upper_threshold
                ),
            ));
        }
        if self.weak_edge_value == 0 {
            return Err(PipelineError::invalid("weak_edge_value", "must be non-zero"));
        }
        if self.strong_edge_value == 0 {
            return Err(PipelineError::invalid(
                "strong_edge_value",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

impl Default for EdgeOptions {
    fn default() -> Self {
        Self {
            max_size: Self::DEFAULT_MAX_SIZE,
            edge_lower_threshold: Self::DEFAULT_EDGE_LOWER_THRESHOLD,
            edge_upper_threshold: Self::DEFAULT_EDGE_UPPER_THRESHOLD,
            weak_edge_value: Self::DEFAULT_WEAK_EDGE_VALUE,
            strong_edge_value: Self::DEFAULT_STRONG_EDGE_VALUE,
            min_path_length: Self::DEFAULT_MIN_PATH_LENGTH,
            simplify_tolerance: Self::DEFAULT_SIMPLIFY_TOLERANCE,
        }
    }
}

/// Result of running the full pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Filtered, simplified and smoothed polylines in discovery order.
    pub paths: PathSet,

    /// Dimensions of the source grid in pixels.
    ///
    /// The SVG emitter uses these for `viewBox`, `width` and `height`.
    pub dimensions: Dimensions,
}

/// Result of running the pipeline with every intermediate preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedResult {
    /// Stage 1: Sobel gradient magnitudes.
    pub gradient: GradientField,
    /// Stage 2: double-thresholded edge map.
    pub edges: EdgeMap,
    /// Stage 3: raw traced polylines.
    pub traced: PathSet,
    /// Stage 4: polylines longer than `min_path_length`.
    pub filtered: PathSet,
    /// Stage 5: Douglas-Peucker simplified polylines.
    pub simplified: PathSet,
    /// Stage 6: smoothed polylines (final output).
    pub smoothed: PathSet,
    /// Source grid dimensions in pixels.
    pub dimensions: Dimensions,
}

impl StagedResult {
    /// Drop the intermediates, keeping only the final paths.
    #[must_use]
    pub fn into_process_result(self) -> ProcessResult {
        ProcessResult {
            paths: self.smoothed,
            dimensions: self.dimensions,
        }
    }
}

/// Errors that can occur during pipeline processing.
///
/// Only malformed input can fail; every stage is total over valid input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A grid or option value is unusable.
    #[error("invalid input `{parameter}`: {reason}")]
    InvalidInput {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl PipelineError {
    /// Build a [`PipelineError::InvalidInput`].
    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter,
            reason: reason.into(),
        }
    }

    /// Name of the parameter that caused the error.
    #[must_use]
    pub const fn parameter(&self) -> &'static str {
        match self {
            Self::InvalidInput { parameter, .. } => parameter,
        }
    }
}

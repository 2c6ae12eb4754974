//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! The pipeline is sans-IO, so timestamps come from a caller-supplied
//! [`Clock`]. Durations are serialized as fractional seconds (`f64`) for
//! JSON compatibility, since `std::time::Duration` does not implement
//! serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::edge::Thresholds;
use crate::pipeline::Pipeline;
use crate::types::{
    EdgeLabel, EdgeOptions, GradientField, PipelineError, PixelGrid, Polyline, StagedResult,
};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of monotonic timestamps.
///
/// Native callers back this with `std::time::Instant`; tests can use a
/// fake clock.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: Sobel gradient.
    pub gradient: StageDiagnostics,
    /// Stage 2: double-threshold classification.
    pub edge_classification: StageDiagnostics,
    /// Stage 3: greedy path tracing.
    pub tracing: StageDiagnostics,
    /// Stage 4: point-count filter.
    pub filter: StageDiagnostics,
    /// Stage 5: Douglas-Peucker simplification.
    pub simplification: StageDiagnostics,
    /// Stage 6: moving-average smoothing.
    pub smoothing: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Sobel gradient metrics.
    Gradient {
        /// Grid width in pixels.
        width: u32,
        /// Grid height in pixels.
        height: u32,
        /// Largest magnitude in the field.
        max_magnitude: f64,
    },
    /// Edge classification metrics.
    EdgeClassification {
        /// Lower threshold.
        lower_threshold: f64,
        /// Upper threshold.
        upper_threshold: f64,
        /// Pixels labelled weak.
        weak_pixel_count: u64,
        /// Pixels labelled strong.
        strong_pixel_count: u64,
        /// Total pixel count for computing edge density.
        total_pixel_count: u64,
    },
    /// Path tracing metrics.
    Tracing {
        /// Number of polylines found.
        polyline_count: usize,
        /// Total number of points across all polylines.
        total_point_count: usize,
        /// Minimum points in any single polyline.
        min_polyline_points: usize,
        /// Maximum points in any single polyline.
        max_polyline_points: usize,
        /// Mean points per polyline.
        mean_polyline_points: f64,
    },
    /// Point-count filter metrics.
    Filter {
        /// Polylines with this many points or fewer were dropped.
        min_path_length: usize,
        /// Polylines kept.
        kept: usize,
        /// Polylines dropped.
        dropped: usize,
    },
    /// Path simplification metrics.
    Simplification {
        /// Douglas-Peucker tolerance in pixels.
        tolerance: f64,
        /// Total points before simplification.
        points_before: usize,
        /// Total points after simplification.
        points_after: usize,
        /// Reduction ratio: `1.0 - (after / before)`.
        reduction_ratio: f64,
    },
    /// Smoothing metrics.
    Smoothing {
        /// Number of polylines smoothed.
        polyline_count: usize,
        /// Total points (unchanged by smoothing).
        point_count: usize,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source grid width in pixels.
    pub image_width: u32,
    /// Source grid height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Number of polylines in the final output.
    pub final_polyline_count: usize,
    /// Points across all final polylines.
    pub final_point_count: usize,
}

/// Run the staged pipeline, timing each stage with `clock`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] if `options` are invalid.
pub fn process_staged_with_diagnostics<C: Clock>(
    grid: PixelGrid,
    options: &EdgeOptions,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    let total_start = clock.now();
    let dimensions = grid.dimensions();
    let pending = Pipeline::new(grid, options.clone())?;

    let start = clock.now();
    let stage = pending.compute_gradient();
    let gradient = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Gradient {
            width: dimensions.width,
            height: dimensions.height,
            max_magnitude: max_magnitude(stage.gradient()),
        },
    };

    let (weak, strong) = label_counts(stage.gradient(), &Thresholds::from(options));
    let start = clock.now();
    let stage = stage.classify_edges();
    let edge_classification = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::EdgeClassification {
            lower_threshold: options.edge_lower_threshold,
            upper_threshold: options.edge_upper_threshold,
            weak_pixel_count: weak,
            strong_pixel_count: strong,
            total_pixel_count: dimensions.pixel_count() as u64,
        },
    };

    let start = clock.now();
    let stage = stage.trace_paths();
    let stats = polyline_stats(stage.traced());
    let tracing = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Tracing {
            polyline_count: stage.traced().len(),
            total_point_count: stats.total,
            min_polyline_points: stats.min,
            max_polyline_points: stats.max,
            mean_polyline_points: stats.mean,
        },
    };
    let traced_count = stage.traced().len();

    let start = clock.now();
    let stage = stage.filter_paths();
    let filter = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Filter {
            min_path_length: options.min_path_length,
            kept: stage.filtered().len(),
            dropped: traced_count - stage.filtered().len(),
        },
    };
    let points_before = total_points(stage.filtered());

    let start = clock.now();
    let stage = stage.simplify();
    let points_after = total_points(stage.simplified());
    #[allow(clippy::cast_precision_loss)]
    let reduction_ratio = if points_before > 0 {
        1.0 - points_after as f64 / points_before as f64
    } else {
        0.0
    };
    let simplification = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Simplification {
            tolerance: options.simplify_tolerance,
            points_before,
            points_after,
            reduction_ratio,
        },
    };

    let start = clock.now();
    let stage = stage.smooth();
    let final_point_count = total_points(stage.smoothed());
    let final_polyline_count = stage.smoothed().len();
    let smoothing = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Smoothing {
            polyline_count: final_polyline_count,
            point_count: final_point_count,
        },
    };

    let staged = stage.into_result();
    let diagnostics = PipelineDiagnostics {
        gradient,
        edge_classification,
        tracing,
        filter,
        simplification,
        smoothing,
        total_duration: clock.elapsed(&total_start),
        summary: PipelineSummary {
            image_width: dimensions.width,
            image_height: dimensions.height,
            pixel_count: dimensions.pixel_count() as u64,
            final_polyline_count,
            final_point_count,
        },
    };
    Ok((staged, diagnostics))
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Gradient", &self.gradient),
            ("Edge Classification", &self.edge_classification),
            ("Path Tracing", &self.tracing),
            ("Filter", &self.filter),
            ("Simplification", &self.simplification),
            ("Smoothing", &self.smoothing),
        ];

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Paths: {}  |  Final points: {}",
            self.summary.final_polyline_count, self.summary.final_point_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Gradient {
            width,
            height,
            max_magnitude,
        } => format!("{width}x{height} max={max_magnitude:.1}"),
        StageMetrics::EdgeClassification {
            lower_threshold,
            upper_threshold,
            weak_pixel_count,
            strong_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                (weak_pixel_count + strong_pixel_count) as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!(
                "low={lower_threshold:.1} high={upper_threshold:.1} weak={weak_pixel_count} strong={strong_pixel_count} ({density:.1}%)",
            )
        }
        StageMetrics::Tracing {
            polyline_count,
            total_point_count,
            min_polyline_points,
            max_polyline_points,
            mean_polyline_points,
        } => format!(
            "{polyline_count} paths, {total_point_count} pts (min={min_polyline_points} max={max_polyline_points} mean={mean_polyline_points:.1})",
        ),
        StageMetrics::Filter {
            min_path_length,
            kept,
            dropped,
        } => format!("min={min_path_length} kept={kept} dropped={dropped}"),
        StageMetrics::Simplification {
            tolerance,
            points_before,
            points_after,
            reduction_ratio,
        } => format!(
            "tol={tolerance:.2} {points_before}->{points_after} pts ({:.1}% reduction)",
            reduction_ratio * 100.0,
        ),
        StageMetrics::Smoothing {
            polyline_count,
            point_count,
        } => format!("{polyline_count} paths, {point_count} pts"),
    }
}

/// Largest value in the magnitude field (0 for an all-zero field).
fn max_magnitude(field: &GradientField) -> f64 {
    field.magnitudes().iter().copied().fold(0.0, f64::max)
}

/// Weak and strong pixel counts, derived from magnitudes so equal
/// weak/strong intensities stay distinguishable.
fn label_counts(field: &GradientField, thresholds: &Thresholds) -> (u64, u64) {
    field
        .magnitudes()
        .iter()
        .fold((0, 0), |(weak, strong), &m| match thresholds.label(m) {
            EdgeLabel::None => (weak, strong),
            EdgeLabel::Weak => (weak + 1, strong),
            EdgeLabel::Strong => (weak, strong + 1),
        })
}

/// Statistics for a set of polylines.
pub(crate) struct PolylineStats {
    /// Total number of points across all polylines.
    pub total: usize,
    /// Minimum number of points in any single polyline.
    pub min: usize,
    /// Maximum number of points in any single polyline.
    pub max: usize,
    /// Mean number of points per polyline.
    pub mean: f64,
}

/// Compute point-count statistics from a set of polylines.
pub(crate) fn polyline_stats(polylines: &[Polyline]) -> PolylineStats {
    let total = total_points(polylines);
    let min = polylines.iter().map(Polyline::len).min().unwrap_or(0);
    let max = polylines.iter().map(Polyline::len).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if polylines.is_empty() {
        0.0
    } else {
        total as f64 / polylines.len() as f64
    };
    PolylineStats {
        total,
        min,
        max,
        mean,
    }
}

/// Total points across a slice of polylines.
pub(crate) fn total_points(polylines: &[Polyline]) -> usize {
    polylines.iter().map(Polyline::len).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::types::Point;

    /// Clock that advances one millisecond on every reading.
    struct TickClock {
        ticks: Cell<u64>,
    }

    impl Clock for TickClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.ticks.get() + 1;
            self.ticks.set(t);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now() - since)
        }
    }

    fn ring_grid() -> PixelGrid {
        PixelGrid::from_fn(16, 16, |x, y| {
            let (dx, dy) = (f64::from(x) - 7.5, f64::from(y) - 7.5);
            if dx.hypot(dy) < 5.0 { 200 } else { 10 }
        })
        .unwrap()
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let ms = duration_ms(Duration::from_millis(1234));
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn polyline_stats_empty() {
        let stats = polyline_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.min, 0);
        assert_eq!(stats.max, 0);
        assert!((stats.mean - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn polyline_stats_computes() {
        let polylines = vec![
            Polyline::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]),
            Polyline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(3.0, 0.0),
            ]),
        ];
        let stats = polyline_stats(&polylines);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.min, 2);
        assert_eq!(stats.max, 4);
        assert!((stats.mean - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn label_counts_split_weak_and_strong() {
        let field = GradientField {
            width: 4,
            height: 1,
            magnitude: vec![0.0, 50.0, 90.0, 100.0],
        };
        let thresholds = Thresholds::from(&EdgeOptions::default());
        assert_eq!(label_counts(&field, &thresholds), (1, 2));
    }

    #[test]
    fn diagnostics_cover_every_stage() {
        let clock = TickClock {
            ticks: Cell::new(0),
        };
        let (staged, diag) =
            process_staged_with_diagnostics(ring_grid(), &EdgeOptions::default(), &clock).unwrap();

        assert_eq!(diag.summary.image_width, 16);
        assert_eq!(diag.summary.pixel_count, 256);
        assert_eq!(diag.summary.final_polyline_count, staged.smoothed.len());
        assert!(diag.total_duration >= diag.gradient.duration);
        assert!(matches!(
            diag.filter.metrics,
            StageMetrics::Filter { kept, .. } if kept == staged.filtered.len()
        ));

        let report = diag.report();
        assert!(report.contains("Pipeline Diagnostics Report"));
        assert!(report.contains("Edge Classification"));
        assert!(report.contains("Smoothing"));
    }

    #[test]
    fn diagnostics_reject_invalid_options() {
        let clock = TickClock {
            ticks: Cell::new(0),
        };
        let options = EdgeOptions {
            max_size: 0,
            ..EdgeOptions::default()
        };
        let result = process_staged_with_diagnostics(ring_grid(), &options, &clock);
        assert!(result.is_err());
    }

    #[test]
    fn diagnostics_serde_round_trip() {
        let clock = TickClock {
            ticks: Cell::new(0),
        };
        let (_, diag) =
            process_staged_with_diagnostics(ring_grid(), &EdgeOptions::default(), &clock).unwrap();
        let json = serde_json::to_string(&diag).unwrap();
        let back: PipelineDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary.final_point_count, diag.summary.final_point_count);
        assert!(
            (back.total_duration.as_secs_f64() - diag.total_duration.as_secs_f64()).abs() < 1e-9
        );
    }
}

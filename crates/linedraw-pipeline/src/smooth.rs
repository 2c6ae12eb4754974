//! Three-point moving-average smoothing.
//!
//! Every point is replaced by the mean of itself and its two neighbors.
//! At the endpoints the missing neighbor is the point itself, so the
//! first and last points only move a third of the way toward their single
//! neighbor. One pass, point count unchanged.
//!
//! This is step 6 (the last) in the pipeline.

use crate::types::{PathSet, Point, Polyline};

/// Smooth a single polyline.
#[must_use = "returns the smoothed polyline"]
pub fn smooth(polyline: &Polyline) -> Polyline {
    let points = polyline.points();
    let smoothed = (0..points.len())
        .map(|i| {
            let current = points[i];
            let prev = if i == 0 { current } else { points[i - 1] };
            let next = points.get(i + 1).copied().unwrap_or(current);
            Point::new(
                (prev.x + current.x + next.x) / 3.0,
                (prev.y + current.y + next.y) / 3.0,
            )
        })
        .collect();
    Polyline::new(smoothed)
}

/// Smooth every polyline independently.
#[must_use = "returns the smoothed polylines"]
pub fn smooth_paths(polylines: &[Polyline]) -> PathSet {
    polylines.iter().map(smooth).collect()
}

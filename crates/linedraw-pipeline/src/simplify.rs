//! Path filtering and Douglas-Peucker simplification.
//!
//! [`filter_short`] drops polylines by point count (not geometric length),
//! then [`simplify`] reduces each survivor by removing points that stay
//! within a tolerance of the chord between their retained neighbors.
//!
//! These are steps 4 and 5 in the pipeline, between path tracing and
//! smoothing.

use crate::types::{PathSet, Point, Polyline};

/// Keep only polylines with more than `min_points` points.
///
/// Discovery order of the survivors is preserved.
#[must_use = "returns the filtered polylines"]
pub fn filter_short(polylines: PathSet, min_points: usize) -> PathSet {
    polylines
        .into_iter()
        .filter(|pl| pl.len() > min_points)
        .collect()
}

/// Simplify a single polyline using the Douglas-Peucker algorithm.
///
/// A point is retained when it is the farthest point from the current
/// chord and that distance exceeds `tolerance`; otherwise the whole span
/// collapses to its endpoints. The first and last points are always kept.
///
/// Polylines with 2 points or fewer are returned unchanged.
#[must_use = "returns the simplified polyline"]
pub fn simplify(polyline: &Polyline, tolerance: f64) -> Polyline {
    let points = polyline.points();
    if points.len() <= 2 {
        return polyline.clone();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    // Explicit work stack keeps depth bounded on long near-straight runs.
    let mut spans = vec![(0, points.len() - 1)];
    while let Some((start, end)) = spans.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = start;
        for i in (start + 1)..end {
            let d = perpendicular_distance(points[i], points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > tolerance {
            kept[max_idx] = true;
            spans.push((max_idx, end));
            spans.push((start, max_idx));
        }
    }

    let simplified: Vec<Point> = points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    Polyline::new(simplified)
}

/// Simplify multiple polylines, applying Douglas-Peucker to each independently.
#[must_use = "returns the simplified polylines"]
pub fn simplify_paths(polylines: &[Polyline], tolerance: f64) -> PathSet {
    polylines.iter().map(|pl| simplify(pl, tolerance)).collect()
}

/// Perpendicular distance from point `p` to the line through `a` and `b`.
///
/// Uses `|Δy·x - Δx·y + b.x·a.y - b.y·a.x| / |b - a|`. When `a` and `b`
/// coincide the chord has no direction and the distance from `p` to `a`
/// is returned instead.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let numerator = dy.mul_add(p.x, -(dx * p.y)) + b.x.mul_add(a.y, -(b.y * a.x));
    numerator.abs() / length_sq.sqrt()
}

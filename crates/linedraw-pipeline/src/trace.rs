//! Path tracing: walk a classified edge map into open polylines.
//!
//! This module defines the [`PathTracer`] trait for pluggable tracing
//! algorithms and the [`PathTracerKind`] enum for selecting one at runtime.
//!
//! # Greedy walk
//!
//! The only shipped strategy scans pixels row-major and, from every
//! unvisited traceable pixel, walks to the first unvisited traceable
//! 8-neighbor in the fixed order E, SE, S, SW, W, NW, N, NE until it runs
//! out of neighbors. It never backtracks: at a branch point the walk
//! commits to the first direction and the rest of the branch is either
//! picked up later from its own seed pixel or, if every pixel was already
//! consumed, lost. One connected edge component can therefore yield
//! several polylines. Output compatibility depends on this exact
//! behavior, so it is not "fixed" into a skeleton trace.

use serde::{Deserialize, Serialize};

use crate::types::{EdgeMap, PathSet, Point, Polyline};

/// Neighbor offsets in walk priority order: E, SE, S, SW, W, NW, N, NE.
const DIRECTIONS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Selects which tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PathTracerKind {
    /// Single-pass, no-backtrack greedy neighbor walk.
    #[default]
    Greedy,
}

/// Trait for path tracing strategies.
///
/// Input: an edge map where any non-zero cell is traceable.
/// Output: polylines in discovery order.
pub trait PathTracer {
    /// Trace polylines in the given edge map.
    fn trace(&self, edges: &EdgeMap) -> PathSet;
}

impl PathTracer for PathTracerKind {
    fn trace(&self, edges: &EdgeMap) -> PathSet {
        match *self {
            Self::Greedy => trace_greedy(edges),
        }
    }
}

/// State of a single walk.
#[derive(Debug, Clone, Copy)]
enum Walk {
    /// Standing on the pixel at this offset.
    At(usize),
    /// No unvisited traceable neighbor remains.
    Stuck,
}

/// Visited flags indexed by pixel offset, owned by one tracing pass.
struct Visited {
    width: usize,
    height: usize,
    flags: Vec<bool>,
}

impl Visited {
    fn new(edges: &EdgeMap) -> Self {
        let width = edges.width() as usize;
        let height = edges.height() as usize;
        Self {
            width,
            height,
            flags: vec![false; width * height],
        }
    }

    /// First in-bounds, traceable, unvisited neighbor of `offset`.
    fn next_step(&self, labels: &[u8], offset: usize) -> Walk {
        let x = (offset % self.width) as i64;
        let y = (offset / self.width) as i64;
        for (dx, dy) in DIRECTIONS {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 {
                continue;
            }
            // Non-negative here, and bounded by the grid on the next line.
            let (nx, ny) = (nx.unsigned_abs() as usize, ny.unsigned_abs() as usize);
            if nx >= self.width || ny >= self.height {
                continue;
            }
            let next = ny * self.width + nx;
            if labels[next] != 0 && !self.flags[next] {
                return Walk::At(next);
            }
        }
        Walk::Stuck
    }

    #[allow(clippy::cast_precision_loss)]
    fn point(&self, offset: usize) -> Point {
        Point::new((offset % self.width) as f64, (offset / self.width) as f64)
    }
}

/// Greedy row-major tracing over the edge map.
///
/// Walks that never leave their seed pixel are discarded: a single point
/// draws no segment.
fn trace_greedy(edges: &EdgeMap) -> PathSet {
    let labels = edges.labels();
    let mut visited = Visited::new(edges);
    let mut paths = Vec::new();

    for seed in 0..labels.len() {
        if labels[seed] == 0 || visited.flags[seed] {
            continue;
        }

        let mut points = Vec::new();
        let mut walk = Walk::At(seed);
        while let Walk::At(offset) = walk {
            visited.flags[offset] = true;
            points.push(visited.point(offset));
            walk = visited.next_step(labels, offset);
        }

        if points.len() > 1 {
            paths.push(Polyline::new(points));
        }
    }

    paths
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Build an edge map from `(x, y)` pixels set to 255.
    fn edge_map(width: u32, height: u32, pixels: &[(u32, u32)]) -> EdgeMap {
        let mut labels = vec![0; width as usize * height as usize];
        for &(x, y) in pixels {
            labels[(y * width + x) as usize] = 255;
        }
        EdgeMap::new(width, height, labels).unwrap()
    }

    fn coords(polyline: &Polyline) -> Vec<(f64, f64)> {
        polyline.points().iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn default_is_greedy() {
        assert_eq!(PathTracerKind::default(), PathTracerKind::Greedy);
    }

    #[test]
    fn empty_map_produces_no_paths() {
        let paths = PathTracerKind::Greedy.trace(&edge_map(10, 10, &[]));
        assert!(paths.is_empty());
    }

    #[test]
    fn diagonal_line_is_one_polyline() {
        let pixels: Vec<_> = (0..5).map(|i| (i + 2, i + 2)).collect();
        let paths = PathTracerKind::Greedy.trace(&edge_map(10, 10, &pixels));
        assert_eq!(paths.len(), 1);
        assert_eq!(
            coords(&paths[0]),
            vec![(2.0, 2.0), (3.0, 3.0), (4.0, 4.0), (5.0, 5.0), (6.0, 6.0)]
        );
    }

    #[test]
    fn east_is_preferred_over_south() {
        // L-shape: the walk from (0,0) goes east first and only turns
        // south once the horizontal run is exhausted.
        let pixels = [(0, 0), (1, 0), (2, 0), (0, 1), (0, 2)];
        let paths = PathTracerKind::Greedy.trace(&edge_map(4, 4, &pixels));
        assert_eq!(paths.len(), 2);
        assert_eq!(coords(&paths[0]), vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(coords(&paths[1]), vec![(0.0, 1.0), (0.0, 2.0)]);
    }

    #[test]
    fn branch_is_picked_up_from_its_own_seed() {
        // Horizontal run on row 0 with a vertical branch hanging off x=2.
        let pixels = [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (2, 1), (2, 2), (2, 3)];
        let paths = PathTracerKind::Greedy.trace(&edge_map(6, 5, &pixels));
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].len(), 5);
        assert_eq!(coords(&paths[1]), vec![(2.0, 1.0), (2.0, 2.0), (2.0, 3.0)]);
    }

    #[test]
    fn single_pixel_remnant_is_dropped() {
        // (2,1) is only adjacent to already-visited pixels once the row is
        // consumed, so its own walk never moves.
        let pixels = [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (2, 1)];
        let paths = PathTracerKind::Greedy.trace(&edge_map(6, 3, &pixels));
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 5);
    }

    #[test]
    fn walk_turns_back_through_south_west() {
        // From (2,0) east is empty, so the walk continues south-west.
        let pixels = [(0, 0), (1, 0), (2, 0), (1, 1)];
        let paths = PathTracerKind::Greedy.trace(&edge_map(4, 3, &pixels));
        assert_eq!(paths.len(), 1);
        assert_eq!(
            coords(&paths[0]),
            vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (1.0, 1.0)]
        );
    }

    #[test]
    fn weak_and_strong_labels_are_equally_traceable() {
        let labels = vec![25, 255, 25, 0];
        let map = EdgeMap::new(4, 1, labels).unwrap();
        let paths = PathTracerKind::Greedy.trace(&map);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 3);
    }

    #[test]
    fn no_pixel_appears_twice() {
        // Filled 5x5 block: many branch points.
        let pixels: Vec<_> = (0..5).flat_map(|y| (0..5).map(move |x| (x, y))).collect();
        let paths = PathTracerKind::Greedy.trace(&edge_map(5, 5, &pixels));
        let mut seen = std::collections::HashSet::new();
        for p in paths.iter().flat_map(Polyline::points) {
            assert!(seen.insert((p.x.to_bits(), p.y.to_bits())), "revisited {p:?}");
        }
        assert!(seen.len() <= 25);
    }

    #[test]
    fn consecutive_points_are_eight_connected() {
        let pixels: Vec<_> = (0..6).flat_map(|y| (0..6).map(move |x| (x, y))).collect();
        let paths = PathTracerKind::Greedy.trace(&edge_map(6, 6, &pixels));
        for path in &paths {
            for w in path.points().windows(2) {
                assert!((w[0].x - w[1].x).abs() <= 1.0 && (w[0].y - w[1].y).abs() <= 1.0);
            }
        }
    }
}

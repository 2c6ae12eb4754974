//! Integration test: a hand-labeled edge map through the post-tracing
//! stages and into path data.

#![allow(clippy::unwrap_used)]

use linedraw_export::{AnimationOptions, SvgMetadata, animate, build_path_data, parse_path_data, to_svg};
use linedraw_pipeline::simplify::{filter_short, simplify_paths};
use linedraw_pipeline::smooth::smooth_paths;
use linedraw_pipeline::{Dimensions, EdgeMap, EdgeOptions, PathTracer, PathTracerKind};

/// `size` x `size` map with strong labels on the main diagonal only.
fn diagonal(size: u32) -> EdgeMap {
    let strong = EdgeOptions::default().strong_edge_value;
    let labels = (0..size)
        .flat_map(|y| (0..size).map(move |x| if x == y { strong } else { 0 }))
        .collect();
    EdgeMap::new(size, size, labels).unwrap()
}

#[test]
fn diagonal_survives_filter_and_zero_tolerance_simplify() {
    let traced = PathTracerKind::Greedy.trace(&diagonal(5));
    assert_eq!(traced.len(), 1);
    assert_eq!(traced[0].len(), 5);

    let kept = filter_short(traced, 3);
    assert_eq!(kept.len(), 1, "five points is longer than three");

    let simplified = simplify_paths(&kept, 0.0);
    let smoothed = smooth_paths(&simplified);
    assert_eq!(smoothed.len(), 1);
    assert!(smoothed[0].len() >= 2, "{:?}", smoothed[0]);

    let d = build_path_data(&smoothed);
    assert!(d.starts_with('M'), "{d}");
    assert_eq!(d.matches('M').count(), 1);
    assert_eq!(parse_path_data(&d).unwrap().len(), 1);
}

#[test]
fn diagonal_animates_as_one_path() {
    let traced = PathTracerKind::Greedy.trace(&diagonal(5));
    let paths = smooth_paths(&simplify_paths(&filter_short(traced, 3), 0.0));
    let svg = to_svg(&paths, Dimensions { width: 5, height: 5 }, &SvgMetadata::default());

    let animated = animate(&svg, &AnimationOptions::default()).unwrap();
    assert_eq!(animated.matches("stroke-dasharray=").count(), 1);
    assert!(!animated.contains(r#"stroke-dasharray="0""#));
}

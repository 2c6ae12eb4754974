//! Property-based invariant tests for SVG emission and animation.
//!
//! 1. Emitted path data parses back to the same polylines (exactly for
//!    integer coordinates, within `f32` precision for fractional ones),
//!    and re-emitting the parsed polylines reproduces the data exactly.
//! 2. Measured length equals the sum of the parsed polylines' lengths.
//! 3. Every animated path gets dash attributes and an animation style.
//! 4. Scheduled delays are monotone for every policy; `sync` delays are
//!    constant and `oneByOne` delays are evenly spaced.

#![allow(clippy::unwrap_used)]

use linedraw_export::dom;
use linedraw_export::{
    AnimationKind, AnimationOptions, SvgMetadata, animate, build_path_data, parse_path_data,
    path_length, schedule, to_svg,
};
use linedraw_pipeline::{Dimensions, Point, Polyline};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Integer pixel coordinates survive `f32` formatting exactly.
fn polylines_strategy() -> impl Strategy<Value = Vec<Polyline>> {
    proptest::collection::vec(
        proptest::collection::vec((0u16..500, 0u16..500), 1..20).prop_map(|pts| {
            Polyline::new(
                pts.into_iter()
                    .map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
                    .collect(),
            )
        }),
        0..8,
    )
}

/// Fractional coordinates, including thirds that no float holds exactly.
fn fractional_polylines_strategy() -> impl Strategy<Value = Vec<Polyline>> {
    let coordinate = prop_oneof![
        0.0f64..500.0,
        (0u32..1500).prop_map(|n| f64::from(n) / 3.0),
    ];
    proptest::collection::vec(
        proptest::collection::vec((coordinate.clone(), coordinate), 1..20)
            .prop_map(|pts| Polyline::new(pts.into_iter().map(|(x, y)| Point::new(x, y)).collect())),
        0..8,
    )
}

fn kind_strategy() -> impl Strategy<Value = AnimationKind> {
    proptest::sample::select(AnimationKind::ALL.to_vec())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Path data
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn path_data_round_trips(polylines in polylines_strategy()) {
        let d = build_path_data(&polylines);
        let parsed = parse_path_data(&d).unwrap();
        prop_assert_eq!(&parsed, &polylines);
        prop_assert_eq!(build_path_data(&parsed), d);
    }

    #[test]
    fn fractional_path_data_round_trips_within_f32_precision(
        polylines in fractional_polylines_strategy(),
    ) {
        let d = build_path_data(&polylines);
        let parsed = parse_path_data(&d).unwrap();
        prop_assert_eq!(parsed.len(), polylines.len());
        for (got, want) in parsed.iter().zip(&polylines) {
            prop_assert_eq!(got.len(), want.len());
            for (a, b) in got.points().iter().zip(want.points()) {
                prop_assert!((a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3, "{:?} vs {:?}", a, b);
            }
        }
        prop_assert_eq!(build_path_data(&parsed), d);
    }

    #[test]
    fn measured_length_matches_polylines(polylines in polylines_strategy()) {
        let d = build_path_data(&polylines);
        let expected: f64 = polylines.iter().map(Polyline::length).sum();
        prop_assert!((path_length(&d).unwrap() - expected).abs() < 1e-6);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Animation attributes
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn animated_paths_carry_dash_and_style(
        polylines in polylines_strategy(),
        kind in kind_strategy(),
    ) {
        let svg = to_svg(&polylines, Dimensions { width: 500, height: 500 }, &SvgMetadata::default());
        let options = AnimationOptions { kind, ..AnimationOptions::default() };
        let animated = animate(&svg, &options).unwrap();
        let root = dom::parse(&animated).unwrap();
        for path in root.descendants_named("path") {
            prop_assert!(path.attribute("stroke-dasharray").is_some());
            prop_assert!(path.attribute("stroke-dashoffset").is_some());
            prop_assert!(path.attribute("style").unwrap().contains("linear forwards"));
        }
        prop_assert_eq!(animated.matches("<style>").count(), 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Scheduling
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn delays_never_decrease(
        lengths in proptest::collection::vec(0.0f64..1000.0, 0..30),
        kind in kind_strategy(),
        duration in 0.0f64..60.0,
        delay in 0.0f64..10.0,
    ) {
        let options = AnimationOptions { kind, duration, delay, ..AnimationOptions::default() };
        let timings = schedule(&lengths, &options);
        prop_assert_eq!(timings.len(), lengths.len());
        for pair in timings.windows(2) {
            prop_assert!(pair[0].delay <= pair[1].delay);
        }
        for t in &timings {
            prop_assert!(t.delay >= delay);
            prop_assert!(t.duration >= 0.0 && t.duration.is_finite());
        }
    }
}

proptest! {
    #[test]
    fn sync_delays_are_constant_and_one_by_one_evenly_spaced(
        lengths in proptest::collection::vec(0.0f64..1000.0, 1..30),
        duration in 0.0f64..60.0,
        delay in 0.0f64..10.0,
    ) {
        let sync = AnimationOptions { kind: AnimationKind::Sync, duration, delay, ..AnimationOptions::default() };
        prop_assert!(schedule(&lengths, &sync).iter().all(|t| t.delay == delay));

        let one_by_one = AnimationOptions { kind: AnimationKind::OneByOne, duration, delay, ..AnimationOptions::default() };
        let step = duration / lengths.len() as f64;
        for (i, t) in schedule(&lengths, &one_by_one).iter().enumerate() {
            prop_assert!((t.delay - (delay + i as f64 * step)).abs() < 1e-9);
            prop_assert!(t.duration == duration);
        }
    }
}

//! Path data parsing and measurement.
//!
//! Reads an SVG `d` attribute back into polylines, the inverse of
//! [`build_path_data`](crate::build_path_data). Every `M` starts a new
//! polyline. Relative commands, `H`/`V` and `Z` are resolved against the
//! current point; curve and arc commands contribute only their end point,
//! so lengths measured through them are chord approximations.

use svg::node::element::path::{Command, Data, Position};

use linedraw_pipeline::{PathSet, Point, Polyline};

use crate::error::ExportError;

/// Parse path data into polylines in document order.
///
/// # Errors
///
/// Returns [`ExportError::PathData`] if `d` is not valid path data or a
/// command carries an incomplete parameter group.
pub fn parse_path_data(d: &str) -> Result<PathSet, ExportError> {
    let data = Data::parse(d).map_err(|e| ExportError::PathData(e.to_string()))?;
    let mut cursor = Cursor::default();

    for command in data.iter() {
        match command {
            Command::Move(position, params) => {
                for (i, pair) in groups(params, 2, "M")?.enumerate() {
                    let p = cursor.resolve(position, pair[0], pair[1]);
                    if i == 0 {
                        cursor.move_to(p);
                    } else {
                        cursor.line_to(p);
                    }
                }
            }
            Command::Line(position, params) => {
                for pair in groups(params, 2, "L")? {
                    let p = cursor.resolve(position, pair[0], pair[1]);
                    cursor.line_to(p);
                }
            }
            Command::HorizontalLine(position, params) => {
                for x in groups(params, 1, "H")? {
                    let x = f64::from(x[0]);
                    let target = match position {
                        Position::Absolute => Point::new(x, cursor.current.y),
                        Position::Relative => Point::new(cursor.current.x + x, cursor.current.y),
                    };
                    cursor.line_to(target);
                }
            }
            Command::VerticalLine(position, params) => {
                for y in groups(params, 1, "V")? {
                    let y = f64::from(y[0]);
                    let target = match position {
                        Position::Absolute => Point::new(cursor.current.x, y),
                        Position::Relative => Point::new(cursor.current.x, cursor.current.y + y),
                    };
                    cursor.line_to(target);
                }
            }
            Command::CubicCurve(position, params) => {
                cursor.curve_to(position, groups(params, 6, "C")?);
            }
            Command::SmoothCubicCurve(position, params) => {
                cursor.curve_to(position, groups(params, 4, "S")?);
            }
            Command::QuadraticCurve(position, params) => {
                cursor.curve_to(position, groups(params, 4, "Q")?);
            }
            Command::SmoothQuadraticCurve(position, params) => {
                cursor.curve_to(position, groups(params, 2, "T")?);
            }
            Command::EllipticalArc(position, params) => {
                cursor.curve_to(position, groups(params, 7, "A")?);
            }
            Command::Close => cursor.close(),
        }
    }

    cursor.flush();
    Ok(cursor.paths)
}

/// Cumulative Euclidean length of every subpath in `d`.
///
/// # Errors
///
/// Returns [`ExportError::PathData`] if `d` cannot be parsed.
pub fn path_length(d: &str) -> Result<f64, ExportError> {
    Ok(parse_path_data(d)?.iter().map(Polyline::length).sum())
}

/// Split `params` into complete groups of `size`.
fn groups<'a>(
    params: &'a [f32],
    size: usize,
    command: &str,
) -> Result<std::slice::ChunksExact<'a, f32>, ExportError> {
    let chunks = params.chunks_exact(size);
    if !chunks.remainder().is_empty() || params.is_empty() {
        return Err(ExportError::PathData(format!(
            "`{command}` expects parameters in groups of {size}, got {}",
            params.len()
        )));
    }
    Ok(chunks)
}

/// Pen state while walking path commands.
#[derive(Default)]
struct Cursor {
    current: Point,
    start: Point,
    points: Vec<Point>,
    paths: PathSet,
}

impl Cursor {
    fn resolve(&self, position: &Position, x: f32, y: f32) -> Point {
        let (x, y) = (f64::from(x), f64::from(y));
        match position {
            Position::Absolute => Point::new(x, y),
            Position::Relative => Point::new(self.current.x + x, self.current.y + y),
        }
    }

    fn move_to(&mut self, p: Point) {
        self.flush();
        self.current = p;
        self.start = p;
        self.points.push(p);
    }

    fn line_to(&mut self, p: Point) {
        // A segment after `Z` restarts from the closed subpath's start.
        if self.points.is_empty() {
            self.points.push(self.current);
        }
        self.points.push(p);
        self.current = p;
    }

    /// Curves and arcs end at the last two parameters of each group.
    fn curve_to<'a>(&mut self, position: &Position, groups: impl Iterator<Item = &'a [f32]>) {
        for group in groups {
            let n = group.len();
            let p = self.resolve(position, group[n - 2], group[n - 1]);
            self.line_to(p);
        }
    }

    fn close(&mut self) {
        if !self.points.is_empty() && self.current != self.start {
            self.points.push(self.start);
        }
        self.flush();
        self.current = self.start;
    }

    fn flush(&mut self) {
        if !self.points.is_empty() {
            self.paths.push(Polyline::new(std::mem::take(&mut self.points)));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn coords(paths: &PathSet) -> Vec<Vec<(f64, f64)>> {
        paths
            .iter()
            .map(|pl| pl.points().iter().map(|p| (p.x, p.y)).collect())
            .collect()
    }

    #[test]
    fn empty_data_has_no_paths() {
        assert!(parse_path_data("").unwrap().is_empty());
        assert!(path_length("").unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn each_move_starts_a_polyline() {
        let paths = parse_path_data("M1,2 L3,4 L5,6 M10,10 L10,20").unwrap();
        assert_eq!(
            coords(&paths),
            vec![
                vec![(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)],
                vec![(10.0, 10.0), (10.0, 20.0)],
            ]
        );
    }

    #[test]
    fn compact_form_without_spaces_parses() {
        let paths = parse_path_data("M0,0L3,4M1,1L1,2").unwrap();
        assert_eq!(paths.len(), 2);
        assert!((path_length("M0,0L3,4M1,1L1,2").unwrap() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn relative_and_axis_commands_resolve() {
        let paths = parse_path_data("m1,1 l2,0 v3 h-2 V1").unwrap();
        assert_eq!(
            coords(&paths),
            vec![vec![(1.0, 1.0), (3.0, 1.0), (3.0, 4.0), (1.0, 4.0), (1.0, 1.0)]]
        );
    }

    #[test]
    fn close_returns_to_start() {
        let paths = parse_path_data("M0,0 L4,0 L4,3 Z").unwrap();
        assert_eq!(
            coords(&paths),
            vec![vec![(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 0.0)]]
        );
        assert!((path_length("M0,0 L4,0 L4,3 Z").unwrap() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn segment_after_close_starts_at_subpath_start() {
        let paths = parse_path_data("M0,0 L1,0 Z L0,5").unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(coords(&paths)[1], vec![(0.0, 0.0), (0.0, 5.0)]);
    }

    #[test]
    fn curves_contribute_their_end_point() {
        let paths = parse_path_data("M0,0 C1,1 2,1 3,0 Q4,4 6,0").unwrap();
        assert_eq!(coords(&paths), vec![vec![(0.0, 0.0), (3.0, 0.0), (6.0, 0.0)]]);
    }

    #[test]
    fn lone_move_is_a_single_point_polyline() {
        let paths = parse_path_data("M5,5").unwrap();
        assert_eq!(coords(&paths), vec![vec![(5.0, 5.0)]]);
        assert!(path_length("M5,5").unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            parse_path_data("M 1 2 L banana"),
            Err(ExportError::PathData(_))
        ));
    }
}

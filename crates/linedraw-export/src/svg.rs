//! SVG emitter.
//!
//! Serializes a path set into a standalone SVG document using the [`svg`]
//! crate for document construction and path data formatting. All
//! polylines share a single `<path>` element: each polyline contributes
//! one `M` command followed by `L` commands, so the emitted `d` attribute
//! reads `M x,y L x,y ... M x,y L x,y ...`.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::Value;
use svg::node::element::path::Data;
use svg::node::element::{Description, Path, Title};
use svg::node::Text;

use linedraw_pipeline::{Dimensions, Polyline};

/// XML declaration prepended to every emitted document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Optional accessibility metadata for the emitted document.
///
/// When present, a `<title>` and/or `<desc>` element is emitted right
/// after the opening `<svg>` tag, ahead of the path. Text is escaped by
/// the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, typically the source image's file stem.
    pub title: Option<&'a str>,
    /// Free-form description, e.g. the options used for the conversion.
    pub description: Option<&'a str>,
}

/// Build the `d` attribute for a set of polylines.
///
/// Every non-empty polyline starts with an `M` command; the rest of its
/// points become `L` commands. Empty polylines are skipped and an empty
/// set yields an empty string.
///
/// Coordinates are formatted by the [`svg`] crate using `f32` precision.
///
/// # Examples
///
/// ```
/// use linedraw_pipeline::{Point, Polyline};
/// use linedraw_export::build_path_data;
///
/// let polylines = vec![
///     Polyline::new(vec![Point::new(10.0, 20.0), Point::new(30.0, 40.0)]),
///     Polyline::new(vec![Point::new(1.0, 1.0), Point::new(2.5, 1.0)]),
/// ];
/// assert_eq!(build_path_data(&polylines), "M10,20 L30,40 M1,1 L2.5,1");
/// ```
#[must_use]
pub fn build_path_data(polylines: &[Polyline]) -> String {
    let mut data = Data::new();
    for polyline in polylines {
        let Some((first, rest)) = polyline.points().split_first() else {
            continue;
        };
        data = data.move_to((first.x, first.y));
        for p in rest {
            data = data.line_to((p.x, p.y));
        }
    }
    String::from(Value::from(data))
}

/// Serialize polylines into an SVG document string.
///
/// The root carries `width`, `height` and a `viewBox` of
/// `0 0 width height`, so path coordinates are in source pixels. The
/// document always holds exactly one `<path>` with `fill="none"`,
/// `stroke="black"` and `stroke-width="1"`; with no polylines its `d` is
/// empty.
///
/// # Examples
///
/// ```
/// use linedraw_pipeline::{Dimensions, Point, Polyline};
/// use linedraw_export::{SvgMetadata, to_svg};
///
/// let polylines = vec![
///     Polyline::new(vec![Point::new(10.0, 15.0), Point::new(12.5, 18.3)]),
/// ];
/// let dims = Dimensions { width: 800, height: 600 };
/// let metadata = SvgMetadata {
///     title: Some("portrait"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&polylines, dims, &metadata);
/// assert!(svg.contains("<title>portrait</title>"));
/// assert!(svg.contains("M10,15 L12.5,18.3"));
/// ```
#[must_use]
pub fn to_svg(polylines: &[Polyline], dimensions: Dimensions, metadata: &SvgMetadata<'_>) -> String {
    let Dimensions { width, height } = dimensions;
    let mut doc = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0, 0, width, height));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    let path = Path::new()
        .set("d", build_path_data(polylines))
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", 1);
    doc = doc.add(path);

    // The svg crate omits the XML declaration, so we prepend it.
    format!("{XML_DECLARATION}\n{doc}\n")
}

//! Double-threshold edge classification.
//!
//! Buckets each gradient magnitude into none, weak or strong and stores
//! the configured intensity for that bucket. There is no hysteresis:
//! weak pixels are kept whether or not they touch a strong one, and both
//! are equally traceable downstream.
//!
//! This is step 2 in the pipeline, between the Sobel gradient and path
//! tracing.

use crate::types::{EdgeLabel, EdgeMap, GradientField};

/// Threshold and intensity settings for [`classify`].
///
/// `lower <= upper` is a precondition. It is checked by
/// [`EdgeOptions::validate`](crate::EdgeOptions::validate), not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Magnitudes strictly above this are at least weak.
    pub lower: f64,
    /// Magnitudes strictly above this are strong.
    pub upper: f64,
    /// Intensity stored for weak pixels.
    pub weak_value: u8,
    /// Intensity stored for strong pixels.
    pub strong_value: u8,
}

impl Thresholds {
    /// Label for a single magnitude.
    #[must_use]
    pub fn label(&self, magnitude: f64) -> EdgeLabel {
        if magnitude > self.upper {
            EdgeLabel::Strong
        } else if magnitude > self.lower {
            EdgeLabel::Weak
        } else {
            EdgeLabel::None
        }
    }

    /// Intensity stored in the edge map for `label`.
    #[must_use]
    pub const fn intensity(&self, label: EdgeLabel) -> u8 {
        match label {
            EdgeLabel::None => 0,
            EdgeLabel::Weak => self.weak_value,
            EdgeLabel::Strong => self.strong_value,
        }
    }
}

impl From<&crate::EdgeOptions> for Thresholds {
    fn from(options: &crate::EdgeOptions) -> Self {
        Self {
            lower: options.edge_lower_threshold,
            upper: options.edge_upper_threshold,
            weak_value: options.weak_edge_value,
            strong_value: options.strong_edge_value,
        }
    }
}

/// Classify every pixel of `field`.
#[must_use = "returns the classified edge map"]
pub fn classify(field: &GradientField, thresholds: &Thresholds) -> EdgeMap {
    let labels = field
        .magnitudes()
        .iter()
        .map(|&m| thresholds.intensity(thresholds.label(m)))
        .collect();
    EdgeMap::from_parts(field.width(), field.height(), labels)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gradient::sobel;
    use crate::types::PixelGrid;

    const THRESHOLDS: Thresholds = Thresholds {
        lower: 40.0,
        upper: 80.0,
        weak_value: 25,
        strong_value: 255,
    };

    fn field(magnitudes: Vec<f64>, width: u32, height: u32) -> GradientField {
        GradientField {
            width,
            height,
            magnitude: magnitudes,
        }
    }

    #[test]
    fn labels_follow_strict_inequalities() {
        assert_eq!(THRESHOLDS.label(0.0), EdgeLabel::None);
        assert_eq!(THRESHOLDS.label(40.0), EdgeLabel::None);
        assert_eq!(THRESHOLDS.label(40.5), EdgeLabel::Weak);
        assert_eq!(THRESHOLDS.label(80.0), EdgeLabel::Weak);
        assert_eq!(THRESHOLDS.label(80.1), EdgeLabel::Strong);
    }

    #[test]
    fn classify_stores_configured_intensities() {
        let map = classify(&field(vec![10.0, 50.0, 100.0, 80.0], 2, 2), &THRESHOLDS);
        assert_eq!(map.labels(), &[0, 25, 255, 25]);
    }

    #[test]
    fn equal_thresholds_leave_no_weak_band() {
        let thresholds = Thresholds {
            lower: 60.0,
            upper: 60.0,
            ..THRESHOLDS
        };
        let map = classify(&field(vec![59.0, 60.0, 61.0], 3, 1), &thresholds);
        assert_eq!(map.labels(), &[0, 0, 255]);
    }

    #[test]
    fn isolated_weak_pixels_survive_without_hysteresis() {
        let map = classify(&field(vec![0.0, 50.0, 0.0], 3, 1), &THRESHOLDS);
        assert_eq!(map.get(1, 0), 25);
    }

    #[test]
    fn uniform_image_classifies_to_nothing() {
        let grid = PixelGrid::from_fn(10, 10, |_, _| 0).unwrap();
        let map = classify(&sobel(&grid), &THRESHOLDS);
        assert_eq!(map.edge_pixel_count(), 0);
        assert_eq!(map.width(), 10);
        assert_eq!(map.height(), 10);
    }

    #[test]
    fn thresholds_from_options() {
        let thresholds = Thresholds::from(&crate::EdgeOptions::default());
        assert_eq!(thresholds, THRESHOLDS);
    }
}

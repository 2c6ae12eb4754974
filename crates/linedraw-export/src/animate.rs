//! Stroke-reveal animation.
//!
//! Rewrites an SVG document so every `<path>` draws itself in: each path
//! gets a dash pattern as long as the path, an initial dash offset of the
//! same length, and a CSS animation that runs the offset down to zero. A
//! single `<style>` element carrying the shared keyframes is injected as
//! the root's first child.
//!
//! Timing is computed by [`schedule`] from the measured path lengths and
//! an [`AnimationKind`] policy:
//!
//! | kind            | delay of path `i` (of `n`)  | duration                |
//! |-----------------|-----------------------------|-------------------------|
//! | `delayed`       | `delay + i * delay / n`     | `duration * len / total`|
//! | `sync`          | `delay`                     | `duration * len / total`|
//! | `oneByOne`      | `delay + i * duration / n`  | `duration`              |
//! | `scenario`      | `delay + i * 0.1`           | `duration * len / total`|
//! | `scenario-sync` | `delay + i * duration / n`  | `duration * len / total`|

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dom::{self, Element};
use crate::error::ExportError;
use crate::path_data::path_length;
use crate::svg::XML_DECLARATION;

/// Dash length used for every path under [`LengthMode::Placeholder`].
pub const PLACEHOLDER_LENGTH: f64 = 1000.0;

/// Fixed per-path delay step, in seconds, for [`AnimationKind::Scenario`].
pub const SCENARIO_STEP: f64 = 0.1;

/// Name of the injected `@keyframes` rule.
pub const KEYFRAMES_NAME: &str = "linedraw-reveal";

/// Delay policy across the animated paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimationKind {
    /// Starts are spread across the `delay` window.
    #[serde(rename = "delayed")]
    Delayed,
    /// Every path starts at `delay`.
    #[serde(rename = "sync")]
    Sync,
    /// Paths play back to back, each for the full `duration`.
    #[default]
    #[serde(rename = "oneByOne")]
    OneByOne,
    /// Starts are [`SCENARIO_STEP`] apart.
    #[serde(rename = "scenario")]
    Scenario,
    /// Starts are spread across the `duration` window.
    #[serde(rename = "scenario-sync")]
    ScenarioSync,
}

impl AnimationKind {
    /// Every policy, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Delayed,
        Self::Sync,
        Self::OneByOne,
        Self::Scenario,
        Self::ScenarioSync,
    ];

    /// Name used on the command line and in JSON options.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delayed => "delayed",
            Self::Sync => "sync",
            Self::OneByOne => "oneByOne",
            Self::Scenario => "scenario",
            Self::ScenarioSync => "scenario-sync",
        }
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                ExportError::invalid(
                    "type",
                    format!("unknown animation type `{s}`, expected one of {}", names.join(", ")),
                )
            })
    }
}

/// How each path's dash length is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LengthMode {
    /// Euclidean length of the path's polylines.
    #[default]
    Measured,
    /// [`PLACEHOLDER_LENGTH`] for every path.
    Placeholder,
}

/// Options for [`animate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationOptions {
    /// Delay policy.
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Total animation duration in seconds.
    pub duration: f64,
    /// Base start delay in seconds.
    pub delay: f64,
    /// Dash length source.
    pub length_mode: LengthMode,
}

impl AnimationOptions {
    /// Seconds.
    pub const DEFAULT_DURATION: f64 = 5.0;
    /// Seconds.
    pub const DEFAULT_DELAY: f64 = 0.0;

    /// Check that timings are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidInput`] naming the offending field.
    pub fn validate(&self) -> Result<(), ExportError> {
        for (parameter, value) in [("duration", self.duration), ("delay", self.delay)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ExportError::invalid(
                    parameter,
                    format!("must be a finite number of seconds >= 0, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            kind: AnimationKind::default(),
            duration: Self::DEFAULT_DURATION,
            delay: Self::DEFAULT_DELAY,
            length_mode: LengthMode::default(),
        }
    }
}

/// Timing and dash parameters for one path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathAnimation {
    /// Path length in user units, measured or placeholder.
    pub length: f64,
    /// `stroke-dasharray` value; equals `length`.
    pub dash_array: f64,
    /// Initial `stroke-dashoffset` value; equals `length`.
    pub dash_offset: f64,
    /// Seconds.
    pub duration: f64,
    /// Seconds.
    pub delay: f64,
}

/// Compute per-path animation parameters from path lengths.
///
/// Under every policy except [`AnimationKind::OneByOne`] a path's
/// duration is its share of the total length. If the total length is
/// zero the paths split `duration` evenly instead.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn schedule(lengths: &[f64], options: &AnimationOptions) -> Vec<PathAnimation> {
    let n = lengths.len() as f64;
    let total: f64 = lengths.iter().sum();
    let AnimationOptions {
        kind,
        duration,
        delay,
        ..
    } = *options;

    lengths
        .iter()
        .enumerate()
        .map(|(i, &length)| {
            let i = i as f64;
            let start = match kind {
                AnimationKind::Delayed => i.mul_add(delay / n, delay),
                AnimationKind::Sync => delay,
                AnimationKind::OneByOne | AnimationKind::ScenarioSync => {
                    i.mul_add(duration / n, delay)
                }
                AnimationKind::Scenario => i.mul_add(SCENARIO_STEP, delay),
            };
            let run = match kind {
                AnimationKind::OneByOne => duration,
                _ if total > 0.0 => duration * length / total,
                _ => duration / n,
            };
            PathAnimation {
                length,
                dash_array: length,
                dash_offset: length,
                duration: run,
                delay: start,
            }
        })
        .collect()
}

/// Inject the stroke-reveal animation into an SVG document.
///
/// A document without `<path>` elements is returned unchanged.
///
/// Lengths and timings are written with at most three decimals, so
/// durations and delays are rounded to the millisecond; [`schedule`]
/// returns the unrounded values.
///
/// # Errors
///
/// Returns [`ExportError::InvalidInput`] for bad options,
/// [`ExportError::Parse`] if `svg_text` is not a well-formed SVG
/// document, or [`ExportError::PathData`] if a measured path has
/// malformed `d` data.
#[tracing::instrument(skip_all, fields(kind = %options.kind))]
pub fn animate(svg_text: &str, options: &AnimationOptions) -> Result<String, ExportError> {
    options.validate()?;
    let mut root = dom::parse(svg_text)?;

    let mut paths = root.descendants_named_mut("path");
    if paths.is_empty() {
        warn!("document has no <path> elements; nothing to animate");
        return Ok(svg_text.to_owned());
    }

    let lengths = paths
        .iter()
        .map(|path| match options.length_mode {
            LengthMode::Placeholder => Ok(PLACEHOLDER_LENGTH),
            LengthMode::Measured => path.attribute("d").map_or(Ok(0.0), path_length),
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let timings = schedule(&lengths, options);
    for (path, timing) in paths.iter_mut().zip(&timings) {
        apply(path, timing);
    }
    debug!(paths = timings.len(), total_length = lengths.iter().sum::<f64>(), "animated");

    root.prepend_child(Element::new("style").with_text(&keyframes_css()));
    Ok(format!("{XML_DECLARATION}\n{root}\n"))
}

fn apply(path: &mut Element, timing: &PathAnimation) {
    let length = format_number(timing.length);
    path.set_attribute("stroke-dasharray", &format_number(timing.dash_array));
    path.set_attribute("stroke-dashoffset", &format_number(timing.dash_offset));
    path.set_attribute(
        "style",
        &format!(
            "--path-length: {length}; animation: {KEYFRAMES_NAME} {}s {}s linear forwards;",
            format_number(timing.duration),
            format_number(timing.delay),
        ),
    );
}

/// Shared rules: paths start hidden and unanimated until their inline
/// style binds the keyframes, which run the dash offset down to zero.
fn keyframes_css() -> String {
    format!(
        "@keyframes {KEYFRAMES_NAME} {{ \
         0% {{ stroke-dashoffset: var(--path-length); }} \
         100% {{ stroke-dashoffset: 0; }} }} \
         path {{ stroke-dashoffset: var(--path-length); animation: none; }}"
    )
}

/// Rounded to three decimals, trailing zeros trimmed.
///
/// `5.0 / 3.0` becomes `1.667`.
fn format_number(value: f64) -> String {
    let fixed = format!("{value:.3}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}

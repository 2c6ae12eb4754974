//! Sobel gradient magnitude.
//!
//! Convolves every interior pixel with the fixed 3x3 Sobel kernels and
//! stores `sqrt(gx² + gy²)`. Pixels on the outer rows and columns lack a
//! full neighborhood and keep a magnitude of zero.
//!
//! This is step 1 in the pipeline, ahead of edge classification.

use crate::types::{GradientField, PixelGrid};

/// Horizontal Sobel kernel, row-major from the top-left.
const KERNEL_X: [i32; 9] = [-1, 0, 1, -2, 0, 2, -1, 0, 1];

/// Vertical Sobel kernel, row-major from the top-left.
const KERNEL_Y: [i32; 9] = [-1, -2, -1, 0, 0, 0, 1, 2, 1];

/// Compute the gradient magnitude field of `grid`.
#[must_use = "returns the gradient field"]
pub fn sobel(grid: &PixelGrid) -> GradientField {
    let width = grid.width() as usize;
    let height = grid.height() as usize;
    let samples = grid.samples();
    let mut magnitude = vec![0.0; width * height];

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mut gx = 0_i32;
            let mut gy = 0_i32;
            for (k, (&wx, &wy)) in KERNEL_X.iter().zip(&KERNEL_Y).enumerate() {
                let sy = y + k / 3 - 1;
                let sx = x + k % 3 - 1;
                let sample = i32::from(samples[sy * width + sx]);
                gx += sample * wx;
                gy += sample * wy;
            }
            let (gx, gy) = (f64::from(gx), f64::from(gy));
            magnitude[y * width + x] = gx.hypot(gy);
        }
    }

    GradientField {
        width: grid.width(),
        height: grid.height(),
        magnitude,
    }
}

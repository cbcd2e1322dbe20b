use ndarray::{s, Array3, ArrayViewMut2, Axis};
use rayon::prelude::*;

use crate::consts::{PARALLEL_PIXEL_THRESHOLD, PYRAMID_KERNEL};

const KERNEL_RADIUS: isize = 2;

/// Blur with the 5-tap binomial kernel and drop every other row and column.
///
/// Output size is `ceil(h / 2) x ceil(w / 2)`.
pub fn pyr_down(data: &Array3<f32>) -> Array3<f32> {
    let blurred = convolve_cols(&convolve_rows(data, 1.0), 1.0);
    blurred.slice(s![..;2, ..;2, ..]).to_owned()
}

/// Upsample to `(height, width)`: zero insertion followed by the binomial
/// kernel, scaled by 2 per axis so that flat regions keep their value.
pub fn pyr_up(data: &Array3<f32>, size: (usize, usize)) -> Array3<f32> {
    let (h, w, c) = data.dim();
    let (out_h, out_w) = size;
    let mut expanded = Array3::<f32>::zeros((out_h, out_w, c));

    for row in 0..h.min(out_h.div_ceil(2)) {
        for col in 0..w.min(out_w.div_ceil(2)) {
            for ch in 0..c {
                expanded[[row * 2, col * 2, ch]] = data[[row, col, ch]];
            }
        }
    }

    convolve_cols(&convolve_rows(&expanded, 2.0), 2.0)
}

/// Horizontal pass.
fn convolve_rows(data: &Array3<f32>, gain: f32) -> Array3<f32> {
    let (h, w, c) = data.dim();
    let mut result = Array3::<f32>::zeros((h, w, c));

    let pass = |row: usize, mut out: ArrayViewMut2<f32>| {
        for col in 0..w {
            for (ki, &kv) in PYRAMID_KERNEL.iter().enumerate() {
                let src_col = mirror_index(col as isize + ki as isize - KERNEL_RADIUS, w);
                for ch in 0..c {
                    out[[col, ch]] += data[[row, src_col, ch]] * kv * gain;
                }
            }
        }
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, out)| pass(row, out));
    } else {
        for (row, out) in result.axis_iter_mut(Axis(0)).enumerate() {
            pass(row, out);
        }
    }
    result
}

/// Vertical pass.
fn convolve_cols(data: &Array3<f32>, gain: f32) -> Array3<f32> {
    let (h, w, c) = data.dim();
    let mut result = Array3::<f32>::zeros((h, w, c));

    let pass = |row: usize, mut out: ArrayViewMut2<f32>| {
        for (ki, &kv) in PYRAMID_KERNEL.iter().enumerate() {
            let src_row = mirror_index(row as isize + ki as isize - KERNEL_RADIUS, h);
            out.scaled_add(kv * gain, &data.index_axis(Axis(0), src_row));
        }
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, out)| pass(row, out));
    } else {
        for (row, out) in result.axis_iter_mut(Axis(0)).enumerate() {
            pass(row, out);
        }
    }
    result
}

/// Mirror boundary handling: reflect index into [0, size) without repeating
/// the edge sample (`-1 -> 1`, `size -> size - 2`).
pub fn mirror_index(idx: isize, size: usize) -> usize {
    if size <= 1 {
        return 0;
    }
    let period = 2 * (size - 1);
    let m = idx.unsigned_abs() % period;

    if m < size {
        m
    } else {
        period - m
    }
}

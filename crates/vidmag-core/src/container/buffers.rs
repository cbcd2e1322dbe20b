use ndarray::{Array2, Array3, ArrayView1};
use num_complex::Complex32;

use crate::error::{Result, VidmagError};
use crate::frame::Layer;

/// Ring-buffered time series for every pixel x channel of one layer.
///
/// Row `series * channels + channel` holds one time series; column
/// `frame_id % depth` is the ring slot written for a frame. A layer of shape
/// (h, w, c) maps onto a column in standard (row-major, channel-interleaved)
/// order.
#[derive(Clone, Debug)]
pub struct TemporalBuffer {
    /// Raw layer samples.
    pub input: Array2<f32>,
    /// Filtered samples, read back for reconstruction.
    pub output: Array2<f32>,
    /// Transform scratch space: `depth / 2 + 1` complex bins per series.
    pub spectrum: Array2<Complex32>,
}

impl TemporalBuffer {
    pub fn new(rows: usize, depth: usize) -> Self {
        Self {
            input: Array2::zeros((rows, depth)),
            output: Array2::zeros((rows, depth)),
            spectrum: Array2::zeros((rows, depth / 2 + 1)),
        }
    }

    /// Number of series (pixels x channels).
    pub fn rows(&self) -> usize {
        self.input.nrows()
    }

    /// Ring buffer capacity in frames.
    pub fn depth(&self) -> usize {
        self.input.ncols()
    }

    pub fn input_row(&self, row: usize) -> Option<ArrayView1<'_, f32>> {
        (row < self.rows()).then(|| self.input.row(row))
    }

    pub fn output_row(&self, row: usize) -> Option<ArrayView1<'_, f32>> {
        (row < self.rows()).then(|| self.output.row(row))
    }

    /// Store `layer` as the input column at `slot`.
    pub fn write_column(&mut self, slot: usize, layer: &Layer) -> Result<()> {
        if layer.len() != self.rows() {
            return Err(VidmagError::ShapeMismatch {
                expected: (self.rows(), 1, 1),
                found: layer.dim(),
            });
        }
        let depth = self.depth();
        let mut column = self.input.column_mut(slot % depth);
        for (dst, &src) in column.iter_mut().zip(layer.iter()) {
            *dst = src;
        }
        Ok(())
    }

    /// Read the filtered column at `slot` back into a layer of `shape`.
    pub fn read_column(&self, slot: usize, shape: (usize, usize, usize)) -> Result<Layer> {
        let column = self.output.column(slot % self.depth());
        Array3::from_shape_vec(shape, column.to_vec()).map_err(|_| VidmagError::ShapeMismatch {
            expected: shape,
            found: (self.rows(), 1, 1),
        })
    }
}

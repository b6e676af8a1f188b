//! CPU spectral backend built on rustfft.
//!
//! A 2D transform is done as 1D transforms along y (contiguous columns of the
//! column-major grid) followed by 1D transforms along x, which run on a
//! transposed copy so they are contiguous too. Lines are distributed over the
//! rayon pool.

use std::sync::Arc;

use ewald2d_core::backend::SpectralBackend;
use ewald2d_core::field::Field2D;
use ewald2d_core::grid::Grid2D;
use num_complex::Complex64;
use parking_lot::Mutex;
use rayon::prelude::*;
use rustfft::{Fft, FftDirection, FftPlanner};

pub struct CpuBackend {
    planner: Mutex<FftPlanner<f64>>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
        }
    }

    /// Plans for the y and x lines of `grid`. rustfft caches plans by length, so
    /// repeated calls at a fixed grid are cheap.
    fn plans(&self, grid: Grid2D, direction: FftDirection) -> (Arc<dyn Fft<f64>>, Arc<dyn Fft<f64>>) {
        let mut planner = self.planner.lock();
        let fft_y = planner.plan_fft(grid.ny, direction);
        let fft_x = planner.plan_fft(grid.nx, direction);
        (fft_y, fft_x)
    }

    fn transform(&self, buffer: &mut Field2D, direction: FftDirection) {
        let grid = buffer.grid();
        if grid.is_empty() {
            return;
        }
        let (fft_y, fft_x) = self.plans(grid, direction);
        let data = buffer.as_mut_slice();

        process_lines(fft_y.as_ref(), data, grid.ny);

        let mut transposed = vec![Complex64::default(); grid.len()];
        transpose(data, &mut transposed, grid.nx, grid.ny);
        process_lines(fft_x.as_ref(), &mut transposed, grid.nx);
        transpose(&transposed, data, grid.ny, grid.nx);
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralBackend for CpuBackend {
    type Buffer = Field2D;

    fn alloc_field(&self, grid: Grid2D) -> Self::Buffer {
        Field2D::zeros(grid)
    }

    fn forward_fft_2d(&self, buffer: &mut Self::Buffer) {
        self.transform(buffer, FftDirection::Forward);
    }

    fn inverse_fft_2d(&self, buffer: &mut Self::Buffer) {
        self.transform(buffer, FftDirection::Inverse);
        let scale = 1.0 / buffer.len() as f64;
        buffer
            .as_mut_slice()
            .par_iter_mut()
            .for_each(|value| *value *= scale);
    }
}

/// Run `fft` over every contiguous line of length `line` in `data`.
fn process_lines(fft: &dyn Fft<f64>, data: &mut [Complex64], line: usize) {
    let scratch_len = fft.get_inplace_scratch_len();
    data.par_chunks_mut(line).for_each_init(
        || vec![Complex64::default(); scratch_len],
        |scratch, chunk| fft.process_with_scratch(chunk, scratch),
    );
}

/// Transpose a matrix stored as `outer` contiguous lines of length `inner`.
fn transpose(src: &[Complex64], dst: &mut [Complex64], outer: usize, inner: usize) {
    dst.par_chunks_mut(outer).enumerate().for_each(|(i, line)| {
        for (o, value) in line.iter_mut().enumerate() {
            *value = src[o * inner + i];
        }
    });
}

#[cfg(test)]
mod _tests_lib;

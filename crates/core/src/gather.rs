//! Gathering filtered grids back onto target points.
//!
//! Each target is placed exactly as a source would be and its stencil weights are
//! contracted against the filtered grid channels. Gathering only reads the grid,
//! so targets run in parallel without synchronization.

use rayon::prelude::*;

use crate::gaussian::{GaussianTable, Stencil};
use crate::mapper::GridMapper;
use crate::matrix::ColumnMatrix;

pub struct Gatherer<'a> {
    mapper: &'a GridMapper,
    table: &'a GaussianTable,
}

impl<'a> Gatherer<'a> {
    pub fn new(mapper: &'a GridMapper, table: &'a GaussianTable) -> Self {
        Self { mapper, table }
    }

    /// Convolve `C` real grid channels with the Gaussian at every column of
    /// `targets` (2 × N) and multiply by `scale`. Returns a `C × N` matrix.
    pub fn gather<const C: usize>(
        &self,
        targets: &ColumnMatrix,
        channels: [&[f64]; C],
        scale: f64,
    ) -> ColumnMatrix {
        let values: Vec<[f64; C]> = (0..targets.cols())
            .into_par_iter()
            .map(|target| {
                let stencil = self.table.stencil(self.mapper.place(targets.pair(target)));
                let sums = self.convolve(&stencil, &channels);
                sums.map(|value| value * scale)
            })
            .collect();
        ColumnMatrix::from_columns(&values)
    }

    /// Weighted stencil sum of every channel around one point.
    pub fn convolve<const C: usize>(&self, stencil: &Stencil, channels: &[&[f64]; C]) -> [f64; C] {
        let grid = self.mapper.grid();
        let [base_x, base_y] = stencil.base;
        let mut sums = [0.0; C];

        if self.mapper.interior_x(base_x) && self.mapper.interior_y(base_y) {
            let (base_x, base_y) = (base_x as usize, base_y as usize);
            for (i, &wx) in stencil.wx.iter().enumerate() {
                for (j, &wy) in stencil.wy.iter().enumerate() {
                    accumulate(&mut sums, wx * wy, channels, grid.idx(base_x + i, base_y + j));
                }
            }
        } else {
            for (i, &wx) in stencil.wx.iter().enumerate() {
                let ix = grid.wrap_x(base_x + i as isize);
                for (j, &wy) in stencil.wy.iter().enumerate() {
                    let idx = grid.idx(ix, grid.wrap_y(base_y + j as isize));
                    accumulate(&mut sums, wx * wy, channels, idx);
                }
            }
        }
        sums
    }
}

#[inline]
fn accumulate<const C: usize>(sums: &mut [f64; C], gaussian: f64, channels: &[&[f64]; C], idx: usize) {
    for c in 0..C {
        sums[c] += gaussian * channels[c][idx];
    }
}

//! Spreading weighted point sources onto the periodic grid.
//!
//! Every source adds a truncated Gaussian, scaled by its `C` channel weights, to
//! its `(P+1) × (P+1)` stencil. Sources run in parallel. Two sources may hit the
//! same grid cell, so writes are serialized in one of two ways:
//!
//! - [`SpreadStrategy::ColumnLocked`]: one lock per x-column. A source holds the
//!   lock of a single column while it writes the `P+1` entries of that column.
//! - [`SpreadStrategy::ThreadLocal`]: each rayon worker accumulates into a
//!   private grid. The private grids are summed at the end.
//!
//! Both give the same sums up to floating-point reordering.

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::field::RealField2D;
use crate::gaussian::{GaussianTable, Stencil};
use crate::grid::Grid2D;
use crate::mapper::GridMapper;
use crate::matrix::ColumnMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadStrategy {
    #[default]
    ColumnLocked,
    ThreadLocal,
}

impl std::fmt::Display for SpreadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadStrategy::ColumnLocked => f.write_str("column_locked"),
            SpreadStrategy::ThreadLocal => f.write_str("thread_local"),
        }
    }
}

pub struct Spreader<'a> {
    mapper: &'a GridMapper,
    table: &'a GaussianTable,
}

impl<'a> Spreader<'a> {
    pub fn new(mapper: &'a GridMapper, table: &'a GaussianTable) -> Self {
        Self { mapper, table }
    }

    /// Spread sources at the columns of `positions` (2 × N) with per-source
    /// channel weights onto `C` zero-initialized grid channels.
    pub fn spread<const C: usize>(
        &self,
        positions: &ColumnMatrix,
        weights: &[[f64; C]],
        strategy: SpreadStrategy,
    ) -> [RealField2D; C] {
        debug_assert_eq!(positions.cols(), weights.len());
        let grid = self.mapper.grid();
        let cells = match strategy {
            SpreadStrategy::ColumnLocked => self.spread_locked(positions, weights),
            SpreadStrategy::ThreadLocal => self.spread_thread_local(positions, weights),
        };
        split_channels(grid, &cells)
    }

    fn stencil(&self, positions: &ColumnMatrix, source: usize) -> Stencil {
        self.table.stencil(self.mapper.place(positions.pair(source)))
    }

    fn spread_locked<const C: usize>(
        &self,
        positions: &ColumnMatrix,
        weights: &[[f64; C]],
    ) -> Vec<[f64; C]> {
        let grid = self.mapper.grid();
        let columns: Vec<Mutex<Vec<[f64; C]>>> = (0..grid.nx)
            .map(|_| Mutex::new(vec![[0.0; C]; grid.ny]))
            .collect();

        weights.par_iter().enumerate().for_each(|(source, weight)| {
            let stencil = self.stencil(positions, source);
            for (i, &wx) in stencil.wx.iter().enumerate() {
                let ix = grid.wrap_x(stencil.base[0] + i as isize);
                let mut column = columns[ix].lock();
                self.deposit(&mut column, &stencil, wx, weight);
            }
        });

        let mut cells = vec![[0.0; C]; grid.len()];
        for (ix, column) in columns.into_iter().enumerate() {
            cells[grid.column_range(ix)].copy_from_slice(&column.into_inner());
        }
        cells
    }

    fn spread_thread_local<const C: usize>(
        &self,
        positions: &ColumnMatrix,
        weights: &[[f64; C]],
    ) -> Vec<[f64; C]> {
        let grid = self.mapper.grid();
        weights
            .par_iter()
            .enumerate()
            .fold(
                || vec![[0.0; C]; grid.len()],
                |mut cells, (source, weight)| {
                    let stencil = self.stencil(positions, source);
                    for (i, &wx) in stencil.wx.iter().enumerate() {
                        let ix = grid.wrap_x(stencil.base[0] + i as isize);
                        let column = &mut cells[grid.column_range(ix)];
                        self.deposit(column, &stencil, wx, weight);
                    }
                    cells
                },
            )
            .reduce(
                || vec![[0.0; C]; grid.len()],
                |mut total, partial| {
                    for (acc, cell) in total.iter_mut().zip(&partial) {
                        for c in 0..C {
                            acc[c] += cell[c];
                        }
                    }
                    total
                },
            )
    }

    /// Add one stencil column (weight `wx` times the y weights) into `column`.
    #[inline]
    fn deposit<const C: usize>(
        &self,
        column: &mut [[f64; C]],
        stencil: &Stencil,
        wx: f64,
        weight: &[f64; C],
    ) {
        let grid = self.mapper.grid();
        let base_y = stencil.base[1];
        if self.mapper.interior_y(base_y) {
            let start = base_y as usize;
            let cells = &mut column[start..start + stencil.wy.len()];
            for (cell, &wy) in cells.iter_mut().zip(&stencil.wy) {
                add_weighted(cell, wx * wy, weight);
            }
        } else {
            for (j, &wy) in stencil.wy.iter().enumerate() {
                let iy = grid.wrap_y(base_y + j as isize);
                add_weighted(&mut column[iy], wx * wy, weight);
            }
        }
    }
}

#[inline]
fn add_weighted<const C: usize>(cell: &mut [f64; C], gaussian: f64, weight: &[f64; C]) {
    for c in 0..C {
        cell[c] += gaussian * weight[c];
    }
}

fn split_channels<const C: usize>(grid: Grid2D, cells: &[[f64; C]]) -> [RealField2D; C] {
    std::array::from_fn(|c| RealField2D::from_vec(grid, cells.iter().map(|cell| cell[c]).collect()))
}

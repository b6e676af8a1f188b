//! Uniform periodic grid helpers.
//!
//! Node `(ix, iy)` sits at `(ix·hx − lx/2, iy·hy − ly/2)`, so the grid covers the
//! centred cell `[−lx/2, lx/2) × [−ly/2, ly/2)`. Storage is column-major: every
//! x-column is contiguous along y. [`Grid2D::idx`], [`Grid2D::column_range`] and
//! [`Grid2D::columns_mut`] are the only places that layout is spelled out.

use std::ops::Range;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid2D {
    pub nx: usize,
    pub ny: usize,
    #[serde(default = "default_length")]
    pub lx: f64,
    #[serde(default = "default_length")]
    pub ly: f64,
}

impl Grid2D {
    pub fn new(nx: usize, ny: usize, lx: f64, ly: f64) -> Self {
        Self { nx, ny, lx, ly }
    }

    /// Square grid of `n × n` nodes over an `l × l` cell.
    pub fn square(n: usize, l: f64) -> Self {
        Self::new(n, n, l, l)
    }

    #[inline]
    pub fn idx(&self, ix: usize, iy: usize) -> usize {
        ix * self.ny + iy
    }

    /// Storage range of x-column `ix`, contiguous along y.
    #[inline]
    pub fn column_range(&self, ix: usize) -> Range<usize> {
        ix * self.ny..(ix + 1) * self.ny
    }

    /// Mutable x-columns of `data`, in order of increasing `ix`.
    pub fn columns_mut<'a, T>(&self, data: &'a mut [T]) -> std::slice::ChunksExactMut<'a, T> {
        debug_assert_eq!(data.len(), self.len());
        data.chunks_exact_mut(self.ny.max(1))
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn hx(&self) -> f64 {
        self.lx / self.nx as f64
    }

    #[inline]
    pub fn hy(&self) -> f64 {
        self.ly / self.ny as f64
    }

    /// Grid spacing `[hx, hy]`.
    pub fn spacing(&self) -> [f64; 2] {
        [self.hx(), self.hy()]
    }

    /// Periodic wrap of a signed x index into `0..nx`.
    #[inline]
    pub fn wrap_x(&self, ix: isize) -> usize {
        wrap(ix, self.nx)
    }

    /// Periodic wrap of a signed y index into `0..ny`.
    #[inline]
    pub fn wrap_y(&self, iy: isize) -> usize {
        wrap(iy, self.ny)
    }
}

#[inline]
fn wrap(index: isize, n: usize) -> usize {
    index.rem_euclid(n as isize) as usize
}

fn default_length() -> f64 {
    1.0
}

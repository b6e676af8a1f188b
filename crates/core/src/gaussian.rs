//! Fast Gaussian gridding.
//!
//! The spreading Gaussian `exp(−a|r − r0|²)` with `a = 2ξ²/η`, sampled on the
//! `(P+1) × (P+1)` stencil of a point, factors into one weight vector per axis.
//! Along an axis with spacing `h` and folded offset `p`, node `i` has weight
//!
//! ```text
//! exp(−a(p² + 2wp)) · exp(2ahp)^i · exp(−ah²(i − P/2)²)
//! ```
//!
//! which equals `exp(−a(h(i − P/2) − p)²)` when `w = P·h/2`. Each axis carries
//! its own `w`, see [`EwaldParams::widths`]. The last factor does
//! not depend on the point and lives in [`GaussianTable`]; the first two cost one
//! `exp` each, so a whole stencil needs four exponentials instead of `(P+1)²`.

use crate::grid::Grid2D;
use crate::mapper::Placement;
use crate::params::EwaldParams;

/// Point-independent factors `exp(−a·h²·j²)`, `j = −P/2..=P/2`, per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianTable {
    decay: f64,
    widths: [f64; 2],
    spacing: [f64; 2],
    x: Vec<f64>,
    y: Vec<f64>,
}

impl GaussianTable {
    pub fn new(params: &EwaldParams, grid: Grid2D) -> Self {
        let decay = params.decay();
        let spacing = grid.spacing();
        Self {
            decay,
            widths: params.widths(grid),
            spacing,
            x: axis_table(decay, spacing[0], params.window),
            y: axis_table(decay, spacing[1], params.window),
        }
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn stencil_len(&self) -> usize {
        self.x.len()
    }

    /// Stencil weights for a placed point.
    pub fn stencil(&self, placement: Placement) -> Stencil {
        Stencil {
            base: placement.base(),
            wx: self.axis_weights(placement.x.offset, 0, &self.x),
            wy: self.axis_weights(placement.y.offset, 1, &self.y),
        }
    }

    fn axis_weights(&self, offset: f64, axis: usize, table: &[f64]) -> Vec<f64> {
        let width = self.widths[axis];
        let mut running = (-self.decay * (offset * offset + 2.0 * width * offset)).exp();
        let ratio = (2.0 * self.decay * self.spacing[axis] * offset).exp();
        table
            .iter()
            .map(|&e1| {
                let weight = running * e1;
                running *= ratio;
                weight
            })
            .collect()
    }
}

fn axis_table(decay: f64, spacing: f64, window: usize) -> Vec<f64> {
    let half = (window / 2) as isize;
    let scale = -decay * spacing * spacing;
    (-half..=half)
        .map(|j| (scale * (j * j) as f64).exp())
        .collect()
}

/// A placed `(P+1) × (P+1)` window with separable weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    /// First node index along x and y, before periodic wrapping.
    pub base: [isize; 2],
    pub wx: Vec<f64>,
    pub wy: Vec<f64>,
}

impl Stencil {
    #[inline]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.wx[i] * self.wy[j]
    }
}

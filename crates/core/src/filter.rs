//! Fourier-space Stokes filters.
//!
//! The spread grids are transformed and every Fourier mode `k = (k1, k2)` is
//! mapped independently by a closed-form filter. Both filters carry the damping
//! `exp(−(1−η)|k|²/(4ξ²))`, the part of the Ewald screening not already
//! provided by the two Gaussian convolutions.
//!
//! # Zero mode
//!
//! Both filters divide by `|k|²`. At `k = 0` that produces a non-finite value,
//! which [`SpectralFilter::apply`] overwrites with an exact zero in every channel.
//! Dropping the mean is what makes the periodic problem well posed: the net
//! force (or stress) in the cell must vanish.

use std::f64::consts::PI;

use num_complex::Complex64;
use rayon::prelude::*;

use crate::grid::Grid2D;
use crate::params::EwaldParams;

/// Fluid viscosity μ. The sums are computed in units where μ = 1.
pub const VISCOSITY: f64 = 1.0;

/// Signed wavenumbers in FFT order: `0, 1, …, n/2, −(n/2 − 1), …, −1` times `2π/L`.
pub fn wavenumbers(n: usize, length: f64) -> Vec<f64> {
    let two_pi = 2.0 * PI;
    (0..n)
        .map(|i| {
            let centered = if i <= n / 2 {
                i as isize
            } else {
                i as isize - n as isize
            };
            two_pi * centered as f64 / length
        })
        .collect()
}

/// A per-mode linear map on `C` spectral channels.
pub trait ModeFilter<const C: usize>: Sync {
    fn apply(&self, k: [f64; 2], modes: [Complex64; C]) -> [Complex64; C];
}

/// Stokeslet filter: force spectrum to divergence-free velocity spectrum.
///
/// `û = (|k|²I − kkᵀ) f̂ · B(k)` with
/// `B(k) = (1/|k|⁴ + 1/(4ξ²|k|²)) · exp(−(1−η)|k|²/(4ξ²))`.
#[derive(Debug, Clone, Copy)]
pub struct StokesletFilter {
    xi: f64,
    eta: f64,
}

impl StokesletFilter {
    pub fn new(params: &EwaldParams) -> Self {
        Self {
            xi: params.xi,
            eta: params.eta,
        }
    }

    pub fn scale(&self, ksq: f64) -> f64 {
        let xi2 = self.xi * self.xi;
        (1.0 / (ksq * ksq) + 0.25 / (ksq * xi2)) * (-0.25 * (1.0 - self.eta) / xi2 * ksq).exp()
    }
}

impl ModeFilter<2> for StokesletFilter {
    #[inline]
    fn apply(&self, k: [f64; 2], modes: [Complex64; 2]) -> [Complex64; 2] {
        let [k1, k2] = k;
        let [f1, f2] = modes;
        let b = self.scale(k1 * k1 + k2 * k2);
        [
            (f1 * k2 - f2 * k1) * (k2 * b),
            (f2 * k1 - f1 * k2) * (k1 * b),
        ]
    }
}

/// Stresslet filter on the dipole spectrum.
///
/// Channels in and out are ordered `(1,1), (2,1), (1,2), (2,2)`; the input
/// channels carry `f1n1, f2n1, f1n2, f2n2`. The output is a pressure-like
/// projection `kᵢkⱼ(·)/|k|²` on the diagonal minus a viscous correction scaled by
/// `μ(1/|k|² + 1/(4ξ²))`, all damped by `exp(−(1−η)|k|²/(4ξ²))`.
#[derive(Debug, Clone, Copy)]
pub struct StressletFilter {
    xi: f64,
    eta: f64,
    viscosity: f64,
}

impl StressletFilter {
    pub fn new(params: &EwaldParams) -> Self {
        Self {
            xi: params.xi,
            eta: params.eta,
            viscosity: VISCOSITY,
        }
    }
}

impl ModeFilter<4> for StressletFilter {
    #[inline]
    fn apply(&self, k: [f64; 2], modes: [Complex64; 4]) -> [Complex64; 4] {
        let [k1, k2] = k;
        let [s11, s21, s12, s22] = modes;
        let xi2 = self.xi * self.xi;
        let ksq = k1 * k1 + k2 * k2;
        let e = (-ksq * (1.0 - self.eta) / (4.0 * xi2)).exp();
        let visc = self.viscosity * (1.0 / ksq + 0.25 / xi2);

        let proj = (s11 * (k1 * k1) + (s12 + s21) * (k1 * k2) + s22 * (k2 * k2)) / ksq;
        let trace = s11 + s22;
        // k-contractions of the dipole along each index
        let q = (s11 * k1 + s12 * k2) + (s11 * k1 + s21 * k2);
        let r = (s21 * k1 + s22 * k2) + (s12 * k1 + s22 * k2);

        let t11 = (proj
            - (trace * (2.0 * k1 * k1) + q * (2.0 * k1) - proj * (4.0 * k1 * k1)) * visc)
            * e;
        let off = -(trace * (2.0 * k1 * k2) + q * k2 + r * k1 - proj * (4.0 * k1 * k2))
            * (visc * e);
        let t22 = (proj
            - (trace * (2.0 * k2 * k2) + r * (2.0 * k2) - proj * (4.0 * k2 * k2)) * visc)
            * e;
        [t11, off, off, t22]
    }
}

/// Applies a [`ModeFilter`] over all modes of a grid in FFT order.
#[derive(Debug, Clone)]
pub struct SpectralFilter {
    grid: Grid2D,
    kx: Vec<f64>,
    ky: Vec<f64>,
}

impl SpectralFilter {
    pub fn new(grid: Grid2D) -> Self {
        Self {
            grid,
            kx: wavenumbers(grid.nx, grid.lx),
            ky: wavenumbers(grid.ny, grid.ly),
        }
    }

    pub fn kx(&self) -> &[f64] {
        &self.kx
    }

    pub fn ky(&self) -> &[f64] {
        &self.ky
    }

    /// Filter `C` spectral channels in place, then zero the `k = 0` mode.
    ///
    /// Columns (fixed x wavenumber) are processed in parallel; they touch
    /// disjoint parts of every channel.
    pub fn apply<const C: usize, F: ModeFilter<C>>(
        &self,
        filter: &F,
        channels: [&mut [Complex64]; C],
    ) {
        let mut columns: Vec<Vec<&mut [Complex64]>> = (0..self.grid.nx)
            .map(|_| Vec::with_capacity(C))
            .collect();
        for channel in channels {
            debug_assert_eq!(channel.len(), self.grid.len());
            for (column, chunk) in columns.iter_mut().zip(self.grid.columns_mut(channel)) {
                column.push(chunk);
            }
        }

        columns
            .into_par_iter()
            .enumerate()
            .for_each(|(ix, mut column)| {
                let k1 = self.kx[ix];
                for (iy, &k2) in self.ky.iter().enumerate() {
                    let modes: [Complex64; C] = std::array::from_fn(|c| column[c][iy]);
                    let filtered = filter.apply([k1, k2], modes);
                    for (chunk, value) in column.iter_mut().zip(filtered) {
                        chunk[iy] = value;
                    }
                }
                if ix == 0 {
                    for chunk in column.iter_mut() {
                        chunk[0] = Complex64::new(0.0, 0.0);
                    }
                }
            });
    }
}

//! Brute-force evaluation of the truncated Ewald k-space sum.
//!
//! Sums the filtered plane waves directly over every non-zero grid mode,
//!
//! ```text
//! u(x) = 4π/(Lx·Ly) Σₖ S(k) · exp(−η|k|²/(4ξ²)) · Σₛ wₛ cos(k·(x − xₛ))
//! ```
//!
//! where `S` is the Stokeslet or stresslet filter (which already carries the
//! remaining `exp(−(1−η)|k|²/(4ξ²))`). This is what the spectral pipeline
//! approximates, at O(Nsrc·Ntar·Mx·My) cost. Meant for validation on small
//! problems only.

use std::f64::consts::PI;

use num_complex::Complex64;
use rayon::prelude::*;

use crate::{
    error::EwaldError,
    filter::{wavenumbers, ModeFilter, StokesletFilter, StressletFilter},
    grid::Grid2D,
    kspace::{check_points, dipole_weights},
    matrix::ColumnMatrix,
    params::EwaldParams,
};

/// Direct Stokeslet velocity, same contract as [`crate::kspace::compute_velocity`].
pub fn direct_velocity(
    sources: &ColumnMatrix,
    targets: &ColumnMatrix,
    forces: &ColumnMatrix,
    params: &EwaldParams,
    grid: Grid2D,
) -> Result<ColumnMatrix, EwaldError> {
    check_points(sources, targets)?;
    forces.require_rows("forces", 2)?;
    forces.require_cols("forces", sources.cols())?;
    params.validate(grid)?;

    let weights: Vec<[f64; 2]> = (0..forces.cols()).map(|col| forces.pair(col)).collect();
    Ok(direct_sum(
        sources,
        targets,
        &weights,
        &StokesletFilter::new(params),
        params,
        grid,
    ))
}

/// Direct stresslet stress, same contract as [`crate::kspace::compute_stress`].
pub fn direct_stress(
    sources: &ColumnMatrix,
    targets: &ColumnMatrix,
    forces: &ColumnMatrix,
    normals: &ColumnMatrix,
    params: &EwaldParams,
    grid: Grid2D,
) -> Result<ColumnMatrix, EwaldError> {
    check_points(sources, targets)?;
    forces.require_rows("forces", 2)?;
    normals.require_rows("normals", 2)?;
    forces.require_cols("forces", sources.cols())?;
    normals.require_cols("normals", sources.cols())?;
    params.validate(grid)?;

    let weights = dipole_weights(forces, normals);
    Ok(direct_sum(
        sources,
        targets,
        &weights,
        &StressletFilter::new(params),
        params,
        grid,
    ))
}

fn direct_sum<const C: usize, F: ModeFilter<C>>(
    sources: &ColumnMatrix,
    targets: &ColumnMatrix,
    weights: &[[f64; C]],
    filter: &F,
    params: &EwaldParams,
    grid: Grid2D,
) -> ColumnMatrix {
    let kx = wavenumbers(grid.nx, grid.lx);
    let ky = wavenumbers(grid.ny, grid.ly);
    let xi2 = params.xi * params.xi;
    let prefactor = 4.0 * PI / (grid.lx * grid.ly);

    let values: Vec<[f64; C]> = (0..targets.cols())
        .into_par_iter()
        .map(|target| {
            let x = targets.pair(target);
            let mut total = [0.0; C];
            for &k1 in &kx {
                for &k2 in &ky {
                    let ksq = k1 * k1 + k2 * k2;
                    if ksq == 0.0 {
                        continue;
                    }
                    let mut waves = [Complex64::new(0.0, 0.0); C];
                    for (source, weight) in weights.iter().enumerate() {
                        let s = sources.pair(source);
                        let phase = (k1 * (x[0] - s[0]) + k2 * (x[1] - s[1])).cos();
                        for c in 0..C {
                            waves[c].re += weight[c] * phase;
                        }
                    }
                    let damping = (-params.eta * ksq / (4.0 * xi2)).exp();
                    let filtered = filter.apply([k1, k2], waves);
                    for c in 0..C {
                        total[c] += filtered[c].re * damping;
                    }
                }
            }
            total.map(|value| value * prefactor)
        })
        .collect();
    ColumnMatrix::from_columns(&values)
}

//! Tests for the CPU backend.
//!
//! These tests verify that the CPU backend implements the `SpectralBackend`
//! contract: unnormalized forward transform, normalized inverse, standard
//! frequency layout on the column-major grid.

#![cfg(test)]

use crate::CpuBackend;
use ewald2d_core::backend::{SpectralBackend, SpectralBuffer};
use ewald2d_core::field::Field2D;
use ewald2d_core::grid::Grid2D;
use num_complex::Complex64;
use std::f64::consts::PI;

fn naive_dft(field: &Field2D) -> Vec<Complex64> {
    let grid = field.grid();
    let mut out = vec![Complex64::default(); grid.len()];
    for kx in 0..grid.nx {
        for ky in 0..grid.ny {
            let mut sum = Complex64::default();
            for ix in 0..grid.nx {
                for iy in 0..grid.ny {
                    let angle = -2.0
                        * PI
                        * ((kx * ix) as f64 / grid.nx as f64 + (ky * iy) as f64 / grid.ny as f64);
                    sum += field.as_slice()[grid.idx(ix, iy)] * Complex64::from_polar(1.0, angle);
                }
            }
            out[grid.idx(kx, ky)] = sum;
        }
    }
    out
}

// ============================================================================
// FFT Tests
// ============================================================================

#[test]
fn fft_roundtrip_recovers_signal() {
    let backend = CpuBackend::new();
    let grid = Grid2D::new(4, 4, 1.0, 1.0);
    let mut field = Field2D::zeros(grid);

    for (idx, value) in field.as_mut_slice().iter_mut().enumerate() {
        *value = Complex64::new(idx as f64, -(idx as f64));
    }
    let original = field.clone();

    backend.forward_fft_2d(&mut field);
    backend.inverse_fft_2d(&mut field);

    for (rec, expect) in field.as_slice().iter().zip(original.as_slice()) {
        let diff = (*rec - *expect).norm();
        assert!(diff < 1e-9, "FFT roundtrip diverged: diff={diff}");
    }
}

#[test]
fn fft_roundtrip_preserves_energy_norm() {
    let backend = CpuBackend::new();
    let grid = Grid2D::new(6, 2, 1.0, 1.0);
    let mut field = Field2D::zeros(grid);

    for (idx, value) in field.as_mut_slice().iter_mut().enumerate() {
        *value = Complex64::new((idx as f64).sin(), (idx as f64).cos());
    }

    let before = field.as_slice().iter().map(|v| v.norm_sqr()).sum::<f64>();
    backend.forward_fft_2d(&mut field);
    backend.inverse_fft_2d(&mut field);
    let after = field.as_slice().iter().map(|v| v.norm_sqr()).sum::<f64>();

    assert!(
        (before - after).abs() < 1e-9,
        "energy drifted by {}",
        after - before
    );
}

#[test]
fn forward_fft_of_constant_concentrates_in_zero_mode() {
    let backend = CpuBackend::new();
    let grid = Grid2D::new(4, 6, 1.0, 1.0);
    let mut field = Field2D::zeros(grid);
    field.as_mut_slice().fill(Complex64::new(1.0, 0.0));

    backend.forward_fft_2d(&mut field);

    let dc = field.as_slice()[0];
    assert!((dc - Complex64::new(grid.len() as f64, 0.0)).norm() < 1e-9);
    for (idx, value) in field.as_slice().iter().enumerate().skip(1) {
        assert!(value.norm() < 1e-9, "mode {idx} should vanish, got {value}");
    }
}

#[test]
fn forward_fft_of_x_plane_wave_peaks_at_first_x_mode() {
    let backend = CpuBackend::new();
    let grid = Grid2D::new(8, 4, 1.0, 1.0);
    let mut field = Field2D::zeros(grid);
    for ix in 0..grid.nx {
        for iy in 0..grid.ny {
            let phase = 2.0 * PI * ix as f64 / grid.nx as f64;
            field.as_mut_slice()[grid.idx(ix, iy)] = Complex64::from_polar(1.0, phase);
        }
    }

    backend.forward_fft_2d(&mut field);

    // columns are contiguous along y, so mode (1, 0) lives at index ny
    let peak = grid.idx(1, 0);
    assert_eq!(peak, grid.ny);
    for (idx, value) in field.as_slice().iter().enumerate() {
        if idx == peak {
            assert!((value.re - grid.len() as f64).abs() < 1e-9);
            assert!(value.im.abs() < 1e-9);
        } else {
            assert!(value.norm() < 1e-9, "unexpected energy at {idx}: {value}");
        }
    }
}

#[test]
fn forward_fft_matches_naive_dft_on_rectangular_grid() {
    let backend = CpuBackend::new();
    let grid = Grid2D::new(6, 4, 2.0, 1.0);
    let mut field = Field2D::zeros(grid);
    for (idx, value) in field.as_mut_slice().iter_mut().enumerate() {
        let t = idx as f64;
        *value = Complex64::new((0.7 * t).sin() + 0.1 * t, (0.3 * t).cos());
    }
    let expected = naive_dft(&field);

    backend.forward_fft_2d(&mut field);

    for (idx, (got, want)) in field.as_slice().iter().zip(&expected).enumerate() {
        assert!(
            (*got - *want).norm() < 1e-9,
            "mode {idx}: expected {want}, got {got}"
        );
    }
}

#[test]
fn real_transforms_roundtrip_and_carry_explicit_imaginary_part() {
    let backend = CpuBackend::new();
    let grid = Grid2D::new(8, 8, 1.0, 1.0);
    let real: Vec<f64> = (0..grid.len()).map(|idx| (idx as f64 * 0.37).cos()).collect();

    let spectrum = backend.forward_real(grid, &real);
    assert_eq!(spectrum.len(), grid.len());
    assert_eq!(SpectralBuffer::grid(&spectrum), grid);
    // a generic real signal has a non-trivial imaginary spectrum
    assert!(spectrum.as_slice().iter().any(|value| value.im.abs() > 1e-6));

    let recovered = backend.inverse_real(spectrum);
    for (got, want) in recovered.iter().zip(&real) {
        assert!((got - want).abs() < 1e-12);
    }
}

#[test]
fn inverse_of_hermitian_spectrum_has_zero_imaginary_part() {
    let backend = CpuBackend::new();
    let grid = Grid2D::new(4, 4, 1.0, 1.0);
    let mut field = Field2D::zeros(grid);
    field.as_mut_slice()[grid.idx(1, 0)] = Complex64::new(1.0, 2.0);
    field.as_mut_slice()[grid.idx(3, 0)] = Complex64::new(1.0, -2.0);

    backend.inverse_fft_2d(&mut field);

    for value in field.as_slice() {
        assert!(value.im.abs() < 1e-12, "imaginary residue {value}");
    }
}

// ============================================================================
// Field Allocation Tests
// ============================================================================

#[test]
fn alloc_field_creates_correct_grid() {
    let backend = CpuBackend::new();
    let grid = Grid2D::new(5, 7, 2.0, 3.0);
    let field = backend.alloc_field(grid);

    assert_eq!(field.grid().nx, 5);
    assert_eq!(field.grid().ny, 7);
    assert_eq!(field.as_slice().len(), 35);
}

#[test]
fn alloc_field_initializes_to_zero() {
    let backend = CpuBackend::new();
    let grid = Grid2D::new(4, 4, 1.0, 1.0);
    let field = backend.alloc_field(grid);

    for &value in field.as_slice() {
        assert_eq!(value, Complex64::default());
    }
}

#[test]
fn repeated_transforms_reuse_plans_consistently() {
    let backend = CpuBackend::default();
    let grid = Grid2D::new(8, 6, 1.0, 1.0);
    let real: Vec<f64> = (0..grid.len()).map(|idx| idx as f64).collect();

    let first = backend.forward_real(grid, &real);
    let second = backend.forward_real(grid, &real);

    assert_eq!(first.as_slice(), second.as_slice());
}

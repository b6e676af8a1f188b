//! Backend traits for spectral operations.
//!
//! The pipeline only needs a forward and an inverse 2D transform over an
//! `nx × ny` grid in the standard frequency layout: index 0 is the zero mode,
//! `1..=n/2` ascending positive frequencies, `n/2+1..n` the wrapped negative ones.
//!
//! Buffers always carry both real and imaginary parts. A transform of purely
//! real data still hands back a full complex buffer (zeros where the imaginary
//! part vanishes), so consumers never see a missing half.

use num_complex::Complex64;

use crate::field::Field2D;
use crate::grid::Grid2D;

pub trait SpectralBuffer {
    fn len(&self) -> usize;
    fn grid(&self) -> Grid2D;
    fn as_slice(&self) -> &[Complex64];
    fn as_mut_slice(&mut self) -> &mut [Complex64];

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpectralBuffer for Field2D {
    fn len(&self) -> usize {
        self.len()
    }

    fn grid(&self) -> Grid2D {
        self.grid()
    }

    fn as_slice(&self) -> &[Complex64] {
        self.as_slice()
    }

    fn as_mut_slice(&mut self) -> &mut [Complex64] {
        self.as_mut_slice()
    }
}

pub trait SpectralBackend {
    type Buffer: SpectralBuffer;

    fn alloc_field(&self, grid: Grid2D) -> Self::Buffer;

    /// Unnormalized forward transform, `X[k] = Σ x[n]·exp(−2πi·kn/N)` per axis.
    fn forward_fft_2d(&self, buffer: &mut Self::Buffer);

    /// Inverse transform including the `1/(nx·ny)` factor, so that
    /// `inverse(forward(x)) == x`.
    fn inverse_fft_2d(&self, buffer: &mut Self::Buffer);

    /// Real-to-complex forward transform of one real grid.
    fn forward_real(&self, grid: Grid2D, real: &[f64]) -> Self::Buffer {
        assert_eq!(real.len(), grid.len(), "data length must match grid size");
        let mut buffer = self.alloc_field(grid);
        for (value, &re) in buffer.as_mut_slice().iter_mut().zip(real) {
            *value = Complex64::new(re, 0.0);
        }
        self.forward_fft_2d(&mut buffer);
        buffer
    }

    /// Complex-to-real inverse transform; the imaginary residue is dropped.
    fn inverse_real(&self, mut buffer: Self::Buffer) -> Vec<f64> {
        self.inverse_fft_2d(&mut buffer);
        buffer.as_slice().iter().map(|value| value.re).collect()
    }
}

//! Reciprocal-space spectral Ewald sums for doubly-periodic 2D Stokes flow.
//!
//! Point forces (Stokeslet) or force dipoles (stresslet) in a periodic
//! rectangular cell are spread to a uniform grid with truncated Gaussians,
//! filtered in Fourier space and gathered back onto arbitrary targets. The FFT
//! itself is supplied through [`backend::SpectralBackend`].

pub mod backend;
pub mod error;
pub mod field;
pub mod filter;
pub mod gather;
pub mod gaussian;
pub mod grid;
pub mod io;
pub mod kspace;
pub mod mapper;
pub mod matrix;
pub mod metrics;
pub mod params;
pub mod reference;
pub mod spread;

pub use error::{EwaldError, ParameterError, ShapeError};
pub use grid::Grid2D;
pub use kspace::{compute_stress, compute_velocity, KSpaceSum};
pub use matrix::ColumnMatrix;
pub use params::{EwaldParams, Kernel};
pub use spread::SpreadStrategy;

#[cfg(test)]
mod _tests_field;
#[cfg(test)]
mod _tests_spread;

//! Contiguous field storage on a uniform 2D grid.
//!
//! [`Field2D`] holds the complex spectrum handed to and from the FFT backend.
//! Both the real and imaginary parts always exist; a transform whose result is
//! purely real simply carries zeros in the imaginary part. [`RealField2D`] holds
//! the real-valued grids produced by spreading and consumed by gathering.

use num_complex::Complex64;

use crate::grid::Grid2D;

#[derive(Debug, Clone)]
pub struct Field2D {
    grid: Grid2D,
    data: Vec<Complex64>,
}

impl Field2D {
    pub fn zeros(grid: Grid2D) -> Self {
        Self {
            data: vec![Complex64::default(); grid.len()],
            grid,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn grid(&self) -> Grid2D {
        self.grid
    }

    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Complex64] {
        &mut self.data
    }
}

/// Real-valued grid channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RealField2D {
    grid: Grid2D,
    data: Vec<f64>,
}

impl RealField2D {
    pub fn from_vec(grid: Grid2D, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), grid.len(), "data length must match grid size");
        Self { grid, data }
    }

    pub fn grid(&self) -> Grid2D {
        self.grid
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

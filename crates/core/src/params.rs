//! Ewald splitting parameters and kernel selection.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::grid::Grid2D;

/// Relative mismatch between `width` and `P·h/2` above which a warning is logged.
const WIDTH_MISMATCH_WARN: f64 = 1e-8;

/// Which periodic Green's function is summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    /// Single-layer potential: velocity from point forces.
    #[default]
    Stokeslet,
    /// Double-layer potential: stress from force dipoles `f ⊗ n`.
    Stresslet,
}

impl Kernel {
    /// Number of grid channels (and output rows per target).
    pub fn channels(self) -> usize {
        match self {
            Kernel::Stokeslet => 2,
            Kernel::Stresslet => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kernel::Stokeslet => "stokeslet",
            Kernel::Stresslet => "stresslet",
        }
    }
}

impl std::fmt::Display for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of the spectral Ewald k-space sum.
///
/// * `xi`: Ewald splitting parameter ξ.
/// * `eta`: fraction η of the Gaussian width carried by spreading and gathering;
///   the remaining `1 − η` is applied as a damping factor in Fourier space.
/// * `window`: the window parameter P; every point touches a `(P+1) × (P+1)` stencil.
/// * `width`: physical half-width w of the truncated Gaussian along x, normally
///   `P·hx/2`. Along y the width is rescaled to the y spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EwaldParams {
    pub xi: f64,
    pub eta: f64,
    pub window: usize,
    pub width: f64,
}

impl EwaldParams {
    pub fn new(xi: f64, eta: f64, window: usize, width: f64) -> Self {
        Self {
            xi,
            eta,
            window,
            width,
        }
    }

    /// Parameters with the conventional width `w = P·hx/2`.
    pub fn with_default_width(xi: f64, eta: f64, window: usize, grid: Grid2D) -> Self {
        Self::new(xi, eta, window, default_width(window, grid))
    }

    /// Stencil extent along each axis.
    #[inline]
    pub fn stencil_len(&self) -> usize {
        self.window + 1
    }

    /// Half-widths `[w, w·hy/hx]`. With the default width both equal `P·h/2`
    /// for their own axis, which centres the Gaussian on the stencil even when
    /// `hx ≠ hy`.
    pub fn widths(&self, grid: Grid2D) -> [f64; 2] {
        [self.width, self.width * grid.hy() / grid.hx()]
    }

    /// Gaussian decay rate `2ξ²/η` used by spreading and gathering.
    #[inline]
    pub fn decay(&self) -> f64 {
        2.0 * self.xi * self.xi / self.eta
    }

    /// Scale turning the discrete gather sum into the continuum field:
    /// `(4ξ²/η)²·hx·hy/π`.
    pub fn normalization(&self, grid: Grid2D) -> f64 {
        let c = 4.0 * self.xi * self.xi / self.eta;
        c * c * grid.hx() * grid.hy() / PI
    }

    /// Check every parameter and the grid before any work is done.
    pub fn validate(&self, grid: Grid2D) -> Result<(), ParameterError> {
        validate_grid(grid)?;
        require_positive("xi", self.xi)?;
        require_positive("eta", self.eta)?;
        require_positive("width", self.width)?;
        if self.window == 0 || self.window % 2 != 0 {
            return Err(ParameterError::OddWindow {
                window: self.window,
            });
        }
        Ok(())
    }

    /// Log parameters that are legal but unlikely to be intended.
    pub(crate) fn warn_if_unusual(&self, grid: Grid2D) {
        if self.eta > 1.0 {
            log::warn!(
                "eta={} exceeds 1; the Fourier-space damping exp(-(1-eta)k^2/4xi^2) grows with k",
                self.eta
            );
        }
        let expected = default_width(self.window, grid);
        if ((self.width - expected) / expected).abs() > WIDTH_MISMATCH_WARN {
            log::warn!(
                "width={} differs from P*hx/2={expected}; the spreading Gaussian is off-centre",
                self.width
            );
        }
    }
}

/// `P·hx/2`, the width that centres the Gaussian on its stencil.
pub fn default_width(window: usize, grid: Grid2D) -> f64 {
    0.5 * window as f64 * grid.hx()
}

pub fn validate_grid(grid: Grid2D) -> Result<(), ParameterError> {
    for (axis, size) in [('x', grid.nx), ('y', grid.ny)] {
        if size == 0 {
            return Err(ParameterError::EmptyGrid { axis });
        }
        if size % 2 != 0 {
            return Err(ParameterError::OddGridSize { axis, size });
        }
    }
    require_positive("lx", grid.lx)?;
    require_positive("ly", grid.ly)?;
    Ok(())
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if !value.is_finite() {
        return Err(ParameterError::NonFinite { name });
    }
    if value <= 0.0 {
        return Err(ParameterError::NonPositive { name, value });
    }
    Ok(())
}

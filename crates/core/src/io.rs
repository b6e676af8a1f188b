//! Configuration file parsing.
//!
//! A k-space job is described by a TOML file and converted into a validated
//! [`EwaldJob`].
//!
//! # File Format
//!
//! ```toml
//! kernel = "stokeslet"        # or "stresslet"
//! spreading = "column_locked" # or "thread_local"
//! sources = [[0.0, 0.0]]
//! forces = [[1.0, 0.0]]
//! normals = [[0.0, 1.0]]      # stresslet only
//! targets = [[0.0, 0.0], [0.5, 0.25]]
//!
//! [grid]
//! nx = 32
//! ny = 32
//! lx = 6.283185307179586
//! ly = 6.283185307179586
//!
//! [ewald]
//! xi = 5.0
//! eta = 0.9
//! window = 16
//! # width defaults to window * hx / 2
//!
//! [metrics]                   # optional
//! enabled = true
//! output = "metrics.jsonl"
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    backend::SpectralBackend,
    error::EwaldError,
    grid::Grid2D,
    kspace::KSpaceSum,
    matrix::ColumnMatrix,
    metrics::{MetricsConfig, MetricsRecorder},
    params::{default_width, validate_grid, EwaldParams, Kernel},
    reference,
    spread::SpreadStrategy,
};

/// Ewald parameters as written in a job file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EwaldConfig {
    pub xi: f64,
    pub eta: f64,
    pub window: usize,
    /// Gaussian half-width w; defaults to `window · hx / 2`.
    #[serde(default)]
    pub width: Option<f64>,
}

impl EwaldConfig {
    pub fn resolve(&self, grid: Grid2D) -> EwaldParams {
        let width = self
            .width
            .unwrap_or_else(|| default_width(self.window, grid));
        EwaldParams::new(self.xi, self.eta, self.window, width)
    }
}

/// Job configuration (loadable from TOML).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub kernel: Kernel,
    #[serde(default)]
    pub spreading: SpreadStrategy,
    pub grid: Grid2D,
    pub ewald: EwaldConfig,
    pub sources: Vec<[f64; 2]>,
    pub forces: Vec<[f64; 2]>,
    #[serde(default)]
    pub normals: Vec<[f64; 2]>,
    pub targets: Vec<[f64; 2]>,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl JobConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

/// A validated job ready to run.
#[derive(Debug, Clone)]
pub struct EwaldJob {
    pub kernel: Kernel,
    pub strategy: SpreadStrategy,
    pub grid: Grid2D,
    pub params: EwaldParams,
    pub sources: ColumnMatrix,
    pub targets: ColumnMatrix,
    pub forces: ColumnMatrix,
    pub normals: Option<ColumnMatrix>,
}

impl TryFrom<JobConfig> for EwaldJob {
    type Error = ConfigError;

    fn try_from(value: JobConfig) -> Result<Self, Self::Error> {
        validate_grid(value.grid).map_err(EwaldError::from)?;
        let params = value.ewald.resolve(value.grid);
        params.validate(value.grid).map_err(EwaldError::from)?;

        let sources = ColumnMatrix::from_columns(&value.sources);
        let forces = ColumnMatrix::from_columns(&value.forces);
        forces
            .require_cols("forces", sources.cols())
            .map_err(EwaldError::from)?;
        let normals = match value.kernel {
            Kernel::Stokeslet => None,
            Kernel::Stresslet => {
                if value.normals.is_empty() && !value.sources.is_empty() {
                    return Err(ConfigError::MissingNormals);
                }
                let normals = ColumnMatrix::from_columns(&value.normals);
                normals
                    .require_cols("normals", sources.cols())
                    .map_err(EwaldError::from)?;
                Some(normals)
            }
        };

        Ok(Self {
            kernel: value.kernel,
            strategy: value.spreading,
            grid: value.grid,
            params,
            sources,
            targets: ColumnMatrix::from_columns(&value.targets),
            forces,
            normals,
        })
    }
}

impl EwaldJob {
    /// Run the spectral pipeline for this job.
    pub fn run<B: SpectralBackend>(
        &self,
        backend: B,
        metrics: Option<&MetricsRecorder>,
    ) -> Result<ColumnMatrix, ConfigError> {
        let sum = KSpaceSum::new(backend, self.grid, self.params)?.with_strategy(self.strategy);
        let output = match self.kernel {
            Kernel::Stokeslet => {
                sum.velocity_with_metrics(&self.sources, &self.targets, &self.forces, metrics)?
            }
            Kernel::Stresslet => sum.stress_with_metrics(
                &self.sources,
                &self.targets,
                &self.forces,
                self.normals()?,
                metrics,
            )?,
        };
        Ok(output)
    }

    /// Evaluate the same job with the brute-force reference sum.
    pub fn run_reference(&self) -> Result<ColumnMatrix, ConfigError> {
        let output = match self.kernel {
            Kernel::Stokeslet => reference::direct_velocity(
                &self.sources,
                &self.targets,
                &self.forces,
                &self.params,
                self.grid,
            )?,
            Kernel::Stresslet => reference::direct_stress(
                &self.sources,
                &self.targets,
                &self.forces,
                self.normals()?,
                &self.params,
                self.grid,
            )?,
        };
        Ok(output)
    }

    fn normals(&self) -> Result<&ColumnMatrix, ConfigError> {
        self.normals.as_ref().ok_or(ConfigError::MissingNormals)
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Ewald(#[from] EwaldError),

    #[error("stresslet jobs require one normal per source")]
    MissingNormals,
}

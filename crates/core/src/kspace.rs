//! The reciprocal-space Ewald sum: spread, transform, filter, transform back,
//! gather.
//!
//! ```text
//! sources ─spread→ H ─FFT→ Ĥ ─filter→ Ĥ′ ─IFFT→ H̃ ─gather→ targets
//! ```
//!
//! [`KSpaceSum`] validates the grid and parameters once and keeps the Gaussian
//! tables, so repeated evaluations at fixed geometry reuse them. Each call
//! allocates its own grids and drops them before returning.

use std::{any::type_name, time::Instant};

use log::{debug, info};

use crate::{
    backend::{SpectralBackend, SpectralBuffer},
    error::EwaldError,
    filter::{ModeFilter, SpectralFilter, StokesletFilter, StressletFilter},
    gather::Gatherer,
    gaussian::GaussianTable,
    grid::Grid2D,
    mapper::GridMapper,
    matrix::ColumnMatrix,
    metrics::{duration_ms, MetricsEvent, MetricsRecorder, Stage},
    params::{EwaldParams, Kernel},
    spread::{SpreadStrategy, Spreader},
};

pub struct KSpaceSum<B: SpectralBackend> {
    backend: B,
    grid: Grid2D,
    params: EwaldParams,
    mapper: GridMapper,
    table: GaussianTable,
    filter: SpectralFilter,
    strategy: SpreadStrategy,
}

impl<B: SpectralBackend> KSpaceSum<B> {
    pub fn new(backend: B, grid: Grid2D, params: EwaldParams) -> Result<Self, EwaldError> {
        params.validate(grid)?;
        params.warn_if_unusual(grid);
        Ok(Self {
            backend,
            grid,
            params,
            mapper: GridMapper::new(grid, params.window),
            table: GaussianTable::new(&params, grid),
            filter: SpectralFilter::new(grid),
            strategy: SpreadStrategy::default(),
        })
    }

    pub fn with_strategy(mut self, strategy: SpreadStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn grid(&self) -> Grid2D {
        self.grid
    }

    pub fn params(&self) -> &EwaldParams {
        &self.params
    }

    pub fn strategy(&self) -> SpreadStrategy {
        self.strategy
    }

    /// Stokeslet velocity (2 × Ntar) at `targets` induced by `forces` at `sources`.
    pub fn velocity(
        &self,
        sources: &ColumnMatrix,
        targets: &ColumnMatrix,
        forces: &ColumnMatrix,
    ) -> Result<ColumnMatrix, EwaldError> {
        self.velocity_with_metrics(sources, targets, forces, None)
    }

    pub fn velocity_with_metrics(
        &self,
        sources: &ColumnMatrix,
        targets: &ColumnMatrix,
        forces: &ColumnMatrix,
        metrics: Option<&MetricsRecorder>,
    ) -> Result<ColumnMatrix, EwaldError> {
        check_points(sources, targets)?;
        forces.require_rows("forces", 2)?;
        forces.require_cols("forces", sources.cols())?;

        let weights: Vec<[f64; 2]> = (0..forces.cols()).map(|col| forces.pair(col)).collect();
        let filter = StokesletFilter::new(&self.params);
        Ok(self.run(Kernel::Stokeslet, sources, targets, &weights, &filter, metrics))
    }

    /// Stresslet stress (4 × Ntar, rows `t11, t21, t12, t22`) at `targets`
    /// induced by dipoles `forces ⊗ normals` at `sources`.
    pub fn stress(
        &self,
        sources: &ColumnMatrix,
        targets: &ColumnMatrix,
        forces: &ColumnMatrix,
        normals: &ColumnMatrix,
    ) -> Result<ColumnMatrix, EwaldError> {
        self.stress_with_metrics(sources, targets, forces, normals, None)
    }

    pub fn stress_with_metrics(
        &self,
        sources: &ColumnMatrix,
        targets: &ColumnMatrix,
        forces: &ColumnMatrix,
        normals: &ColumnMatrix,
        metrics: Option<&MetricsRecorder>,
    ) -> Result<ColumnMatrix, EwaldError> {
        check_points(sources, targets)?;
        forces.require_rows("forces", 2)?;
        normals.require_rows("normals", 2)?;
        forces.require_cols("forces", sources.cols())?;
        normals.require_cols("normals", sources.cols())?;

        let weights = dipole_weights(forces, normals);
        let filter = StressletFilter::new(&self.params);
        Ok(self.run(Kernel::Stresslet, sources, targets, &weights, &filter, metrics))
    }

    fn run<const C: usize, F: ModeFilter<C>>(
        &self,
        kernel: Kernel,
        sources: &ColumnMatrix,
        targets: &ColumnMatrix,
        weights: &[[f64; C]],
        filter: &F,
        metrics: Option<&MetricsRecorder>,
    ) -> ColumnMatrix {
        let pipeline_start = Instant::now();
        info!(
            "[kspace] kernel={} backend={} grid={}x{} sources={} targets={} P={} xi={} eta={} strategy={}",
            kernel,
            type_name::<B>(),
            self.grid.nx,
            self.grid.ny,
            sources.cols(),
            targets.cols(),
            self.params.window,
            self.params.xi,
            self.params.eta,
            self.strategy
        );
        if let Some(recorder) = metrics {
            recorder.emit(MetricsEvent::PipelineStart {
                kernel,
                backend: type_name::<B>(),
                grid_nx: self.grid.nx,
                grid_ny: self.grid.ny,
                sources: sources.cols(),
                targets: targets.cols(),
                window: self.params.window,
                xi: self.params.xi,
                eta: self.params.eta,
            });
        }
        let stage = |name: Stage, started: Instant| {
            let elapsed = started.elapsed();
            debug!("[kspace] {kernel} {name:?} in {elapsed:.2?}");
            if let Some(recorder) = metrics {
                recorder.stage(kernel, name, started);
            }
        };

        let started = Instant::now();
        let spreader = Spreader::new(&self.mapper, &self.table);
        let grids = spreader.spread(sources, weights, self.strategy);
        stage(Stage::Spread, started);

        let started = Instant::now();
        let mut spectra = grids.map(|channel| self.backend.forward_real(self.grid, channel.as_slice()));
        stage(Stage::Fft, started);

        let started = Instant::now();
        self.filter
            .apply(filter, spectra.each_mut().map(|buffer| buffer.as_mut_slice()));
        stage(Stage::Filter, started);

        let started = Instant::now();
        let filtered = spectra.map(|buffer| self.backend.inverse_real(buffer));
        stage(Stage::InverseFft, started);

        let started = Instant::now();
        let gatherer = Gatherer::new(&self.mapper, &self.table);
        let output = gatherer.gather(
            targets,
            filtered.each_ref().map(|channel| channel.as_slice()),
            self.params.normalization(self.grid),
        );
        stage(Stage::Gather, started);

        let elapsed = pipeline_start.elapsed();
        debug!("[kspace] {kernel} done in {elapsed:.2?}");
        if let Some(recorder) = metrics {
            recorder.emit(MetricsEvent::PipelineDone {
                kernel,
                duration_ms: duration_ms(elapsed),
            });
        }
        output
    }
}

/// One-shot Stokeslet k-space velocity.
pub fn compute_velocity<B: SpectralBackend>(
    backend: B,
    sources: &ColumnMatrix,
    targets: &ColumnMatrix,
    forces: &ColumnMatrix,
    params: &EwaldParams,
    grid: Grid2D,
) -> Result<ColumnMatrix, EwaldError> {
    check_points(sources, targets)?;
    KSpaceSum::new(backend, grid, *params)?.velocity(sources, targets, forces)
}

/// One-shot stresslet k-space stress.
pub fn compute_stress<B: SpectralBackend>(
    backend: B,
    sources: &ColumnMatrix,
    targets: &ColumnMatrix,
    forces: &ColumnMatrix,
    normals: &ColumnMatrix,
    params: &EwaldParams,
    grid: Grid2D,
) -> Result<ColumnMatrix, EwaldError> {
    check_points(sources, targets)?;
    KSpaceSum::new(backend, grid, *params)?.stress(sources, targets, forces, normals)
}

/// Dipole spread weights `[f1n1, f2n1, f1n2, f2n2]` for each source.
pub fn dipole_weights(forces: &ColumnMatrix, normals: &ColumnMatrix) -> Vec<[f64; 4]> {
    (0..forces.cols())
        .map(|col| {
            let [f1, f2] = forces.pair(col);
            let [n1, n2] = normals.pair(col);
            [f1 * n1, f2 * n1, f1 * n2, f2 * n2]
        })
        .collect()
}

pub(crate) fn check_points(sources: &ColumnMatrix, targets: &ColumnMatrix) -> Result<(), EwaldError> {
    sources.require_rows("sources", 2)?;
    targets.require_rows("targets", 2)?;
    sources.require_finite("sources")?;
    targets.require_finite("targets")?;
    Ok(())
}

#![cfg(test)]

use super::field::RealField2D;
use super::gaussian::GaussianTable;
use super::grid::Grid2D;
use super::mapper::GridMapper;
use super::matrix::ColumnMatrix;
use super::params::EwaldParams;
use super::spread::{SpreadStrategy, Spreader};

fn total(field: &RealField2D) -> f64 {
    field.as_slice().iter().sum()
}

fn at(field: &RealField2D, ix: usize, iy: usize) -> f64 {
    field.as_slice()[field.grid().idx(ix, iy)]
}

struct Setup {
    grid: Grid2D,
    mapper: GridMapper,
    table: GaussianTable,
}

impl Setup {
    fn new(n: usize, window: usize) -> Self {
        let grid = Grid2D::square(n, 2.0);
        let params = EwaldParams::with_default_width(4.0, 0.9, window, grid);
        Self {
            grid,
            mapper: GridMapper::new(grid, window),
            table: GaussianTable::new(&params, grid),
        }
    }

    fn spreader(&self) -> Spreader<'_> {
        Spreader::new(&self.mapper, &self.table)
    }

    fn stencil_mass(&self, point: [f64; 2]) -> f64 {
        let stencil = self.table.stencil(self.mapper.place(point));
        stencil.wx.iter().sum::<f64>() * stencil.wy.iter().sum::<f64>()
    }
}

fn max_diff(a: &RealField2D, b: &RealField2D) -> f64 {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .fold(0.0, |acc, (x, y)| acc.max((x - y).abs()))
}

fn scattered_points(count: usize) -> Vec<[f64; 2]> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            [(0.73 * t).sin() * 0.99, (1.31 * t + 0.2).cos() * 0.99]
        })
        .collect()
}

#[test]
fn spread_conserves_weighted_stencil_mass() {
    let setup = Setup::new(16, 6);
    let points = scattered_points(9);
    let weights: Vec<[f64; 2]> = (0..points.len())
        .map(|i| [1.0 + i as f64, -0.5 * i as f64])
        .collect();
    let [first, second] = setup.spreader().spread(
        &ColumnMatrix::from_columns(&points),
        &weights,
        SpreadStrategy::ColumnLocked,
    );

    let expected: [f64; 2] = points.iter().zip(&weights).fold([0.0, 0.0], |acc, (p, w)| {
        let mass = setup.stencil_mass(*p);
        [acc[0] + w[0] * mass, acc[1] + w[1] * mass]
    });
    assert!((total(&first) - expected[0]).abs() < 1e-10 * expected[0].abs());
    assert!((total(&second) - expected[1]).abs() < 1e-10 * expected[1].abs());
}

#[test]
fn strategies_agree_up_to_rounding() {
    let setup = Setup::new(16, 8);
    let points = scattered_points(64);
    let weights: Vec<[f64; 2]> = (0..points.len())
        .map(|i| [(i as f64).cos(), (i as f64 * 0.5).sin()])
        .collect();
    let positions = ColumnMatrix::from_columns(&points);

    let locked = setup
        .spreader()
        .spread(&positions, &weights, SpreadStrategy::ColumnLocked);
    let local = setup
        .spreader()
        .spread(&positions, &weights, SpreadStrategy::ThreadLocal);

    for c in 0..2 {
        assert!(max_diff(&locked[c], &local[c]) < 1e-12);
    }
}

#[test]
fn zero_weights_give_exact_zero_grid() {
    let setup = Setup::new(8, 4);
    let points = scattered_points(5);
    let weights = vec![[0.0, 0.0]; points.len()];
    for strategy in [SpreadStrategy::ColumnLocked, SpreadStrategy::ThreadLocal] {
        let grids = setup
            .spreader()
            .spread(&ColumnMatrix::from_columns(&points), &weights, strategy);
        for grid in &grids {
            assert!(grid.as_slice().iter().all(|&value| value == 0.0));
        }
    }
}

#[test]
fn no_sources_give_zero_grids_of_the_right_size() {
    let setup = Setup::new(8, 4);
    let grids = setup
        .spreader()
        .spread::<2>(&ColumnMatrix::zeros(2, 0), &[], SpreadStrategy::ThreadLocal);
    assert_eq!(grids[0].len(), setup.grid.len());
    assert_eq!(total(&grids[1]), 0.0);
}

#[test]
fn source_at_the_corner_wraps_around_both_axes() {
    let setup = Setup::new(8, 4);
    let [grid] = setup.spreader().spread(
        &ColumnMatrix::from_columns(&[[-1.0, -1.0]]),
        &[[1.0]],
        SpreadStrategy::ColumnLocked,
    );
    // node (0, 0) sits on the corner; its periodic neighbours are at index 7
    assert!((at(&grid, 0, 0) - 1.0).abs() < 1e-15);
    assert!(at(&grid, 7, 7) > 0.0);
    assert!((at(&grid, 7, 0) - at(&grid, 1, 0)).abs() < 1e-15);
    assert!((at(&grid, 0, 7) - at(&grid, 0, 1)).abs() < 1e-15);
    assert_eq!(at(&grid, 4, 4), 0.0);
}

#[test]
fn shifting_a_source_by_the_cell_length_leaves_the_grid_unchanged() {
    let setup = Setup::new(16, 6);
    let point = [0.37, -0.81];
    let shifted = [point[0] + setup.grid.lx, point[1] - setup.grid.ly];
    let spread = |p: [f64; 2]| {
        let [grid] = setup.spreader().spread(
            &ColumnMatrix::from_columns(&[p]),
            &[[1.0]],
            SpreadStrategy::ColumnLocked,
        );
        grid
    };
    assert!(max_diff(&spread(point), &spread(shifted)) < 1e-10);
}

#[test]
fn each_channel_scales_the_same_gaussian() {
    let setup = Setup::new(16, 6);
    let positions = ColumnMatrix::from_columns(&[[0.2, 0.1], [-0.6, 0.9]]);
    let [unit] = setup
        .spreader()
        .spread(&positions, &[[1.0], [1.0]], SpreadStrategy::ThreadLocal);
    let weights = [[2.0, -1.0, 0.5, 3.0], [2.0, -1.0, 0.5, 3.0]];
    let channels = setup
        .spreader()
        .spread(&positions, &weights, SpreadStrategy::ThreadLocal);

    for (c, channel) in channels.iter().enumerate() {
        for (got, base) in channel.as_slice().iter().zip(unit.as_slice()) {
            assert!((got - weights[0][c] * base).abs() < 1e-12);
        }
    }
}

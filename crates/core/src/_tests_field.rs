#![cfg(test)]

use num_complex::Complex64;

use super::field::{Field2D, RealField2D};
use super::grid::Grid2D;

#[test]
fn zeros_initializes_all_entries_to_zero() {
    let grid = Grid2D::new(2, 3, 1.0, 1.0);
    let field = Field2D::zeros(grid);
    assert_eq!(field.len(), grid.len());
    assert_eq!(field.grid(), grid);
    assert!(
        field
            .as_slice()
            .iter()
            .all(|value| *value == Complex64::new(0.0, 0.0))
    );
}

#[test]
fn mutable_slice_writes_follow_grid_layout() {
    let grid = Grid2D::new(3, 2, 1.0, 1.0);
    let mut field = Field2D::zeros(grid);
    for ix in 0..grid.nx {
        for iy in 0..grid.ny {
            field.as_mut_slice()[grid.idx(ix, iy)] = Complex64::new(ix as f64, iy as f64);
        }
    }

    assert_eq!(field.as_slice()[0], Complex64::new(0.0, 0.0));
    assert_eq!(field.as_slice()[5], Complex64::new(2.0, 1.0));
}

#[test]
fn real_field_keeps_its_grid_and_values() {
    let grid = Grid2D::new(2, 3, 1.0, 1.0);
    let field = RealField2D::from_vec(grid, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(field.grid(), grid);
    assert_eq!(field.len(), 6);
    assert_eq!(field.as_slice()[grid.idx(1, 0)], 3.0);
    assert_eq!(field.as_slice()[grid.idx(0, 2)], 2.0);
    assert!(!field.is_empty());
}

#[test]
#[should_panic(expected = "data length must match grid size")]
fn real_field_rejects_mismatched_lengths() {
    let grid = Grid2D::new(2, 2, 1.0, 1.0);
    let _ = RealField2D::from_vec(grid, vec![0.0; 3]);
}

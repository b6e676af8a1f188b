//! Error types for the k-space pipeline.
//!
//! All failures are detected before any grid is allocated. Once validation has
//! passed, the numerical pipeline runs to completion.

use thiserror::Error;

/// Top-level error returned by every public entry point.
#[derive(Debug, Error, PartialEq)]
pub enum EwaldError {
    #[error("input shape error: {0}")]
    InputShape(#[from] ShapeError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),
}

/// Wrong row count, mismatched column counts or inconsistent buffer length.
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("{name} must be a {expected}xN matrix, got {rows} rows")]
    RowCount {
        name: &'static str,
        expected: usize,
        rows: usize,
    },

    #[error("{name} has {cols} columns but there are {expected} sources")]
    ColumnMismatch {
        name: &'static str,
        cols: usize,
        expected: usize,
    },

    #[error("buffer of length {len} cannot be shaped as {rows}x{cols}")]
    DataLength { rows: usize, cols: usize, len: usize },
}

/// Non-positive, non-finite or structurally unusable parameter.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be finite")]
    NonFinite { name: &'static str },

    #[error("grid must have at least one node along {axis}")]
    EmptyGrid { axis: char },

    #[error("grid size along {axis} must be even, got {size}")]
    OddGridSize { axis: char, size: usize },

    #[error("window parameter P must be a positive even integer, got {window}")]
    OddWindow { window: usize },
}

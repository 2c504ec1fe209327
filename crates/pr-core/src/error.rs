//! Core error type.
//!
//! Downstream crates wrap `CoreError` as one variant of their own enums.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("unknown travel mode {0:?}: expected \"drive\" or \"walk\"")]
    UnknownMode(String),

    #[error("invalid coordinate (lat {lat}, lon {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("matrix rows must all have length {expected}, row {row} has {got}")]
    RaggedMatrix { expected: usize, row: usize, got: usize },

    #[error("matrix of size {n} must have n² cells, got {cells}")]
    MatrixShape { n: usize, cells: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;

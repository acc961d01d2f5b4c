//! Closed-form stop/draw decisions against an opponent with a fixed stand
//! threshold.

pub mod evaluator;
pub mod matrix;
pub mod opponent;

use crate::model::points::Points;
use core::fmt;

pub use evaluator::{Evaluation, PolicyEvaluator, RowOutcome, SoftTieRule};
pub use matrix::StationaryMatrix;
pub use opponent::OpponentPolicy;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The agent's own total already meets the bust threshold.
    BustedTotal { total: Points, bust: u8 },
    RowOutOfRange { row: i64, rows: usize },
    ColumnOutOfRange { column: i64, columns: usize },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::BustedTotal { total, bust } => {
                write!(f, "total {total} is at or past the bust threshold {bust}")
            }
            EvalError::RowOutOfRange { row, rows } => {
                write!(f, "matrix row {row} is outside 0..{rows}")
            }
            EvalError::ColumnOutOfRange { column, columns } => {
                write!(f, "matrix column {column} is outside 0..{columns}")
            }
        }
    }
}

impl std::error::Error for EvalError {}

#[derive(Debug, Clone, PartialEq)]
pub enum MatrixError {
    InvalidThresholds { policy: u8, bust: u8 },
    Empty,
    EmptyDeck,
    RowLength { row: usize, expected: usize, found: usize },
    InvalidProbability { row: usize, column: usize, value: f64 },
    RowSum { row: usize, sum: f64 },
    Json(String),
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixError::InvalidThresholds { policy, bust } => write!(
                f,
                "policy threshold {policy} must be positive and below bust threshold {bust}"
            ),
            MatrixError::Empty => f.write_str("matrix has no rows"),
            MatrixError::EmptyDeck => f.write_str("cannot derive a matrix from an empty deck"),
            MatrixError::RowLength {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} columns, expected {expected}"),
            MatrixError::InvalidProbability { row, column, value } => {
                write!(f, "entry ({row}, {column}) = {value} is not a probability")
            }
            MatrixError::RowSum { row, sum } => write!(f, "row {row} sums to {sum}, not 1"),
            MatrixError::Json(message) => write!(f, "invalid matrix json: {message}"),
        }
    }
}

impl std::error::Error for MatrixError {}

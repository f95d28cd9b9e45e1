use std::fmt;
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    LengthMismatch { rows: usize, targets: usize },
    NotEnoughPoints { len: usize, needed: usize },
    RaggedRow { row: usize, len: usize, expected: usize },
    NonFiniteInput,
    Solver(&'static str),
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::LengthMismatch { rows, targets } => {
                write!(f, "feature rows and targets differ in length: {rows} vs {targets}")
            },
            FitError::NotEnoughPoints { len, needed } => {
                write!(f, "not enough points: got {len}, need at least {needed}")
            },
            FitError::RaggedRow { row, len, expected } => {
                write!(f, "row {row} has {len} features, expected {expected}")
            },
            FitError::NonFiniteInput => write!(f, "non-finite value in training data"),
            FitError::Solver(msg) => write!(f, "least squares solver failed: {msg}"),
        }
    }
}

impl std::error::Error for FitError {}

pub type FitResult<T> = Result<T, FitError>;

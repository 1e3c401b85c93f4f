use thiserror::Error;

/// Violation of the matrix contract. Indicates a bug in a builder or solver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Index ({row}, {col}) out of range for a {rows}x{cols} matrix")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Malformed problem definition, detected when the problem is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("Constraint {index} has {found} coefficients, expected {expected}")]
    InvalidConstraint {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("Objective has {found} coefficients, expected {expected}")]
    InvalidObjective { expected: usize, found: usize },
    #[error("Variable index {index} out of range for {num_variables} variables")]
    InvalidVariable { index: usize, num_variables: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error(transparent)]
    Problem(#[from] ProblemError),
    #[error("Internal matrix error: {0}")]
    Matrix(#[from] MatrixError),
    #[error("Iteration limit of {0} pivots reached")]
    IterationLimit(usize),
    #[error("Tableau has no feasible starting basis")]
    InfeasibleStart,
}

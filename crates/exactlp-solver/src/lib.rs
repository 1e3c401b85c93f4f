//! Exact-arithmetic linear programming.
//!
//! Problems are minimized with a two-phase simplex method over arbitrary
//! precision rationals, so optimal vertices and feasibility verdicts carry no
//! rounding error.

mod error;
mod matrix;
mod phase_one;
mod phase_two;
mod problem;
mod rational;
mod simplex;
mod solution;
pub mod standard_form;

pub use error::{MatrixError, ProblemError, SolveError};
pub use matrix::Matrix;
pub use phase_one::{PhaseOneSolver, PhaseOneState};
pub use phase_two::{Extracted, PhaseTwoSolver, Step};
pub use problem::{Constraint, Problem, Relation};
pub use rational::{ParseRationalError, Rational};
pub use simplex::{Path, Solver};
pub use solution::{Feasibility, FeasibilityReport, Solution, SolutionStatus};
pub use standard_form::{ColumnLayout, PhaseOneTableau, Tableau, TableauKind};

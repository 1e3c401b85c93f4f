use std::fmt;

use crate::phase_one::PhaseOneState;
use crate::rational::Rational;
use crate::simplex::Path;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    Optimal,
    Infeasible,
    Unbounded,
}

/// Result of an optimization run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Minimal objective value, only when optimal
    pub objective_value: Option<Rational>,
    /// Variable values (empty unless optimal)
    pub values: Vec<Rational>,
    /// Tableau the optimum was found on
    pub path: Path,
    /// Pivots performed across both phases
    pub iterations: usize,
}

impl Solution {
    pub fn optimal(
        objective_value: Rational,
        values: Vec<Rational>,
        path: Path,
        iterations: usize,
    ) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            objective_value: Some(objective_value),
            values,
            path,
            iterations,
        }
    }

    pub fn infeasible(path: Path, iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            objective_value: None,
            values: Vec::new(),
            path,
            iterations,
        }
    }

    pub fn unbounded(path: Path, iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            objective_value: None,
            values: Vec::new(),
            path,
            iterations,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.objective_value) {
            (SolutionStatus::Optimal, Some(objective)) => {
                writeln!(f, "Value of objective function: {objective}")?;
                for (i, value) in self.values.iter().enumerate() {
                    writeln!(f, "Value of var[{i}] = {value}")?;
                }
                Ok(())
            }
            (SolutionStatus::Unbounded, _) => writeln!(f, "Solution is unbounded"),
            _ => writeln!(f, "The problem is infeasible."),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feasibility {
    Feasible,
    Infeasible,
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feasibility::Feasible => f.write_str("The problem is feasible."),
            Feasibility::Infeasible => f.write_str("The problem is infeasible."),
        }
    }
}

/// Outcome of a phase-one feasibility check.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeasibilityReport {
    pub verdict: Feasibility,
    /// State phase one stopped in
    pub state: PhaseOneState,
    /// Point read off the final tableau and checked against the constraints
    pub point: Vec<Rational>,
    /// Indices of the constraints `point` violates
    pub violated: Vec<usize>,
    pub iterations: usize,
}

impl FeasibilityReport {
    pub fn is_feasible(&self) -> bool {
        self.verdict == Feasibility::Feasible
    }
}

impl fmt::Display for FeasibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verdict)
    }
}

use std::fmt;

use log::debug;

use crate::error::SolveError;
use crate::phase_one::{restore_feasible_basis, PhaseOneSolver};
use crate::phase_two::{PhaseTwoSolver, Step};
use crate::problem::Problem;
use crate::solution::{FeasibilityReport, Solution};
use crate::standard_form::{self, ColumnLayout, Tableau};

/// Which tableau a problem is optimized on.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Path {
    /// Dual when every objective coefficient is non-negative, primal otherwise
    #[default]
    Auto,
    Primal,
    Dual,
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Path::Auto => "auto",
            Path::Primal => "primal",
            Path::Dual => "dual",
        };
        f.write_str(name)
    }
}

/// Exact two-phase simplex solver
#[derive(Debug, Clone, Default)]
pub struct Solver {
    path: Path,
    /// Maximum pivots over all phases of one call, unlimited when `None`
    max_iterations: Option<usize>,
}

enum Outcome {
    Optimal(PhaseTwoSolver),
    Unbounded,
    Infeasible,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn path(&self) -> Path {
        self.path
    }

    pub fn max_iterations(&self) -> Option<usize> {
        self.max_iterations
    }

    /// Resolves [`Path::Auto`]: the all-slack primal start has no improving
    /// column exactly when every split objective coefficient is non-negative,
    /// and then the dual starts feasible instead.
    pub fn choose_path(&self, problem: &Problem) -> Path {
        match self.path {
            Path::Auto => {
                let costs = ColumnLayout::for_problem(problem).split_row(problem.objective());
                if costs.iter().all(|c| !c.is_negative()) {
                    Path::Dual
                } else {
                    Path::Primal
                }
            }
            forced => forced,
        }
    }

    /// Minimizes the objective of `problem`.
    pub fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        problem.validate()?;
        let path = self.choose_path(problem);
        debug!(
            "solving {} constraints over {} variables on the {} path",
            problem.num_constraints(),
            problem.num_variables(),
            path
        );

        let mut used = 0;
        let solution = match path {
            Path::Dual => {
                let tableau = standard_form::dual(problem)?;
                match self.optimize(tableau, &mut used)? {
                    Outcome::Optimal(solver) => self.optimal(problem, &solver, path, used),
                    Outcome::Unbounded => {
                        debug!("dual is unbounded, primal is infeasible");
                        Solution::infeasible(path, used)
                    }
                    Outcome::Infeasible => {
                        debug!("dual is infeasible, checking primal feasibility");
                        if self.feasibility(problem, &mut used)?.is_feasible() {
                            Solution::unbounded(path, used)
                        } else {
                            Solution::infeasible(path, used)
                        }
                    }
                }
            }
            _ => {
                let tableau = standard_form::primal(problem)?;
                match self.optimize(tableau, &mut used)? {
                    Outcome::Optimal(solver) => self.optimal(problem, &solver, Path::Primal, used),
                    Outcome::Unbounded => Solution::unbounded(Path::Primal, used),
                    Outcome::Infeasible => Solution::infeasible(Path::Primal, used),
                }
            }
        };

        debug!("{:?} after {} pivots", solution.status, solution.iterations);
        Ok(solution)
    }

    /// Decides whether `problem` has any feasible point, ignoring the objective.
    pub fn check_feasibility(&self, problem: &Problem) -> Result<FeasibilityReport, SolveError> {
        let mut used = 0;
        self.feasibility(problem, &mut used)
    }

    fn feasibility(
        &self,
        problem: &Problem,
        used: &mut usize,
    ) -> Result<FeasibilityReport, SolveError> {
        let mut solver = PhaseOneSolver::new(standard_form::phase_one(problem)?);
        solver.run(self.remaining(*used)).map_err(|e| self.at_cap(e))?;
        *used += solver.iterations();
        let report = solver.report();
        debug!("feasibility verdict: {}", report.verdict);
        Ok(report)
    }

    fn optimize(&self, tableau: Tableau, used: &mut usize) -> Result<Outcome, SolveError> {
        let tableau = if tableau.has_feasible_start() {
            tableau
        } else {
            debug!("no feasible starting basis, running restoration");
            let (restored, spent) =
                restore_feasible_basis(tableau, self.remaining(*used)).map_err(|e| self.at_cap(e))?;
            *used += spent;
            match restored {
                Some(tableau) => tableau,
                None => return Ok(Outcome::Infeasible),
            }
        };

        let mut solver = PhaseTwoSolver::new(tableau)?;
        let step = solver.run(self.remaining(*used)).map_err(|e| self.at_cap(e))?;
        *used += solver.iterations();
        Ok(match step {
            Step::Unbounded => Outcome::Unbounded,
            _ => Outcome::Optimal(solver),
        })
    }

    fn optimal(
        &self,
        problem: &Problem,
        solver: &PhaseTwoSolver,
        path: Path,
        used: usize,
    ) -> Solution {
        let extracted = solver.extract();
        debug_assert!(problem.violated_constraints(&extracted.values).is_empty());
        debug_assert_eq!(problem.objective_value(&extracted.values), extracted.objective_value);
        Solution::optimal(extracted.objective_value, extracted.values, path, used)
    }

    fn remaining(&self, used: usize) -> Option<usize> {
        self.max_iterations.map(|cap| cap.saturating_sub(used))
    }

    /// Reports a runner's limit in terms of the whole call's cap.
    fn at_cap(&self, err: SolveError) -> SolveError {
        match (err, self.max_iterations) {
            (SolveError::IterationLimit(_), Some(cap)) => SolveError::IterationLimit(cap),
            (err, _) => err,
        }
    }
}

use log::{debug, trace};
use num_traits::Zero;

use crate::error::SolveError;
use crate::phase_one::min_ratio_row;
use crate::rational::Rational;
use crate::standard_form::{Tableau, TableauKind};

/// Outcome of a single phase-two step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    NotOptimal,
    Optimal,
    Unbounded,
}

/// Optimizes a phase-two [`Tableau`] that starts from a feasible basis.
#[derive(Debug, Clone)]
pub struct PhaseTwoSolver {
    tableau: Tableau,
    iterations: usize,
}

/// Values read off an optimal phase-two tableau, in terms of the problem the
/// tableau was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub values: Vec<Rational>,
    pub objective_value: Rational,
}

impl PhaseTwoSolver {
    pub fn new(tableau: Tableau) -> Result<Self, SolveError> {
        if !tableau.has_feasible_start() {
            return Err(SolveError::InfeasibleStart);
        }
        Ok(Self {
            tableau,
            iterations: 0,
        })
    }

    pub fn tableau(&self) -> &Tableau {
        &self.tableau
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Largest positive objective-row entry, first on ties.
    fn entering_column(&self) -> Option<usize> {
        let t = &self.tableau;
        let objective = t.objective_row();
        let mut best: Option<(usize, &Rational)> = None;
        for col in 0..t.rhs_col() {
            let value = &t.matrix[(objective, col)];
            if value.is_positive() && best.is_none_or(|(_, b)| value > b) {
                best = Some((col, value));
            }
        }
        best.map(|(col, _)| col)
    }

    pub fn is_optimal(&self) -> bool {
        self.entering_column().is_none()
    }

    /// Performs one pivot, or reports why none is possible.
    pub fn step(&mut self) -> Step {
        let Some(col) = self.entering_column() else {
            return Step::Optimal;
        };
        let t = &mut self.tableau;
        let Some(row) = min_ratio_row(&t.matrix, col, t.num_constraints()) else {
            trace!("column {col} has no positive entry, objective unbounded");
            return Step::Unbounded;
        };
        trace!(
            "phase two pivot {}: column {} enters, row {} leaves",
            self.iterations + 1,
            col,
            row
        );
        let all_rows = t.matrix.num_rows();
        t.matrix.pivot(row, col, 0..all_rows);
        t.basis[row] = Some(col);
        self.iterations += 1;
        Step::NotOptimal
    }

    /// Steps until optimal or unbounded. With `limit`, fails once `limit`
    /// pivots were made and the tableau is still not optimal.
    pub fn run(&mut self, limit: Option<usize>) -> Result<Step, SolveError> {
        loop {
            if let Some(limit) = limit.filter(|&l| self.iterations >= l) {
                if !self.is_optimal() {
                    return Err(SolveError::IterationLimit(limit));
                }
            }
            match self.step() {
                Step::NotOptimal => continue,
                done => {
                    debug!("phase two finished: {:?} after {} pivots", done, self.iterations);
                    return Ok(done);
                }
            }
        }
    }

    /// Current objective value of the tableau's own LP.
    pub fn objective_value(&self) -> &Rational {
        let t = &self.tableau;
        &t.matrix[(t.objective_row(), t.rhs_col())]
    }

    /// Reads the primal solution off the tableau. For a dual tableau this is
    /// the solution of the primal problem it was built from.
    pub fn extract(&self) -> Extracted {
        let t = &self.tableau;
        let layout = &t.layout;
        let objective = t.objective_row();
        let rhs = t.rhs_col();

        match t.kind {
            TableauKind::Primal => {
                let mut columns = vec![Rational::zero(); layout.num_columns()];
                for (row, basic) in t.basis.iter().enumerate() {
                    let Some(col) = *basic else { continue };
                    debug_assert_eq!(
                        t.matrix.is_unit_column_within(col, 0..t.num_constraints()),
                        Some(row)
                    );
                    if col < columns.len() {
                        columns[col] = t.matrix[(row, rhs)].clone();
                    }
                }
                Extracted {
                    values: layout.reconstruct(&columns),
                    objective_value: t.matrix[(objective, rhs)].clone(),
                }
            }
            TableauKind::Dual { slack_start } => {
                let columns: Vec<Rational> = (0..layout.num_columns())
                    .map(|j| -&t.matrix[(objective, slack_start + j)])
                    .collect();
                Extracted {
                    values: layout.reconstruct(&columns),
                    objective_value: -&t.matrix[(objective, rhs)],
                }
            }
        }
    }
}

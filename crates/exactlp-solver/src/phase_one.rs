//! Phase one of the simplex method: finding a feasible basis with artificial
//! variables.

use log::{debug, trace};
use num_traits::Zero;

use crate::error::SolveError;
use crate::matrix::Matrix;
use crate::rational::Rational;
use crate::solution::{Feasibility, FeasibilityReport};
use crate::standard_form::{self, PhaseOneTableau, Tableau};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOneState {
    Iterating,
    Optimal,
    Unbounded,
}

enum Pivot {
    At { row: usize, col: usize },
    Done(PhaseOneState),
}

/// Runs phase one on a [`PhaseOneTableau`] it owns.
#[derive(Debug, Clone)]
pub struct PhaseOneSolver {
    tableau: PhaseOneTableau,
    state: PhaseOneState,
    iterations: usize,
}

impl PhaseOneSolver {
    pub fn new(tableau: PhaseOneTableau) -> Self {
        Self {
            tableau,
            state: PhaseOneState::Iterating,
            iterations: 0,
        }
    }

    pub fn state(&self) -> PhaseOneState {
        self.state
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn tableau(&self) -> &PhaseOneTableau {
        &self.tableau
    }

    /// Most negative `Zj - Cj` entry, artificial columns excluded.
    fn entering_column(&self) -> Option<usize> {
        let t = &self.tableau;
        let reduced = t.reduced_cost_row();
        let mut best: Option<(usize, &Rational)> = None;
        for col in (0..t.rhs_col()).filter(|&c| !t.is_artificial(c)) {
            let value = &t.matrix[(reduced, col)];
            if value.is_negative() && best.is_none_or(|(_, b)| value < b) {
                best = Some((col, value));
            }
        }
        best.map(|(col, _)| col)
    }

    /// Row with the smallest `rhs / entry` over strictly positive entries of
    /// `col`. Zero ratios count.
    fn leaving_row(&self, col: usize) -> Option<usize> {
        min_ratio_row(&self.tableau.matrix, col, self.tableau.num_constraints())
    }

    fn select_pivot(&self) -> Pivot {
        let Some(col) = self.entering_column() else {
            return Pivot::Done(PhaseOneState::Optimal);
        };
        match self.leaving_row(col) {
            Some(row) => Pivot::At { row, col },
            None => Pivot::Done(PhaseOneState::Unbounded),
        }
    }

    fn apply_pivot(&mut self, row: usize, col: usize) {
        let t = &mut self.tableau;
        trace!(
            "phase one pivot {}: column {} enters, column {} leaves row {}",
            self.iterations + 1,
            col,
            t.basis[row],
            row
        );
        t.artificial_rows.retain(|&r| r != row);
        t.basis[row] = col;
        let m = t.num_constraints();
        t.matrix.pivot(row, col, 0..m);
        t.compute_trailer_rows();
        self.iterations += 1;
    }

    /// Performs at most one pivot and returns the resulting state.
    pub fn step(&mut self) -> PhaseOneState {
        if self.state != PhaseOneState::Iterating {
            return self.state;
        }
        match self.select_pivot() {
            Pivot::At { row, col } => self.apply_pivot(row, col),
            Pivot::Done(state) => self.state = state,
        }
        self.state
    }

    /// Pivots until a terminal state. With `limit`, fails once `limit` pivots
    /// were made and another one is needed.
    pub fn run(&mut self, limit: Option<usize>) -> Result<PhaseOneState, SolveError> {
        while self.state == PhaseOneState::Iterating {
            match self.select_pivot() {
                Pivot::At { row, col } => {
                    if let Some(limit) = limit.filter(|&l| self.iterations >= l) {
                        return Err(SolveError::IterationLimit(limit));
                    }
                    self.apply_pivot(row, col);
                }
                Pivot::Done(state) => self.state = state,
            }
        }
        debug!(
            "phase one finished: {:?} after {} pivots, artificial sum {}",
            self.state,
            self.iterations,
            self.artificial_sum()
        );
        Ok(self.state)
    }

    /// Current sum of the artificial variables.
    pub fn artificial_sum(&self) -> Rational {
        let rhs = self.tableau.rhs_col();
        self.tableau
            .artificial_rows
            .iter()
            .map(|&row| &self.tableau.matrix[(row, rhs)])
            .sum()
    }

    /// Value of every structural column: the RHS of the row it is basic in,
    /// zero otherwise.
    pub fn column_values(&self) -> Vec<Rational> {
        let t = &self.tableau;
        let rhs = t.rhs_col();
        let mut values = vec![Rational::zero(); t.layout.num_columns()];
        for (row, &col) in t.basis.iter().enumerate() {
            if col < values.len() {
                values[col] = t.matrix[(row, rhs)].clone();
            }
        }
        values
    }

    /// Current point in terms of the problem variables.
    pub fn values(&self) -> Vec<Rational> {
        self.tableau.layout.reconstruct(&self.column_values())
    }

    /// Checks the current point against the untransformed constraints.
    ///
    /// The verdict comes from exact substitution alone: a point satisfying every
    /// constraint proves feasibility, and at a phase-one optimum with a positive
    /// artificial sum the point always violates one.
    pub fn report(&self) -> FeasibilityReport {
        let point = self.values();
        let violated: Vec<usize> = self
            .tableau
            .original
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_satisfied_by(&point))
            .map(|(i, _)| i)
            .collect();
        let verdict = if violated.is_empty() {
            Feasibility::Feasible
        } else {
            Feasibility::Infeasible
        };
        FeasibilityReport {
            verdict,
            state: self.state,
            point,
            violated,
            iterations: self.iterations,
        }
    }

    /// Turns a finished restoration run into a phase-two tableau for `source`.
    ///
    /// Artificial variables still basic at level zero are pivoted out on any
    /// nonzero entry of a real column; rows where none exists are redundant and
    /// dropped. The artificial columns are then removed and the objective row of
    /// `source` is reduced against the new basis. Returns `None` when the rows
    /// of `source` have no feasible solution.
    pub fn into_feasible_tableau(mut self, source: Tableau) -> Result<Option<Tableau>, SolveError> {
        if self.state != PhaseOneState::Optimal || !self.report().is_feasible() {
            return Ok(None);
        }

        let n = source.rhs_col();
        let m = self.tableau.num_constraints();
        let mut redundant = Vec::new();
        for row in 0..m {
            if !self.tableau.is_artificial(self.tableau.basis[row]) {
                continue;
            }
            let col = (0..n).find(|&c| !self.tableau.matrix[(row, c)].is_zero());
            match col {
                Some(col) => {
                    trace!("driving artificial out of row {row} through column {col}");
                    self.tableau.basis[row] = col;
                    self.tableau.matrix.pivot(row, col, 0..m);
                }
                None => {
                    trace!("dropping redundant row {row}");
                    redundant.push(row);
                }
            }
        }

        let from = self.tableau.rhs_col();
        let mut rows = Vec::with_capacity(m - redundant.len() + 1);
        let mut basis = Vec::with_capacity(m - redundant.len());
        for row in (0..m).filter(|r| !redundant.contains(r)) {
            let cells = self.tableau.matrix.row(row)?;
            let mut kept = cells[..n].to_vec();
            kept.push(cells[from].clone());
            rows.push(kept);
            basis.push(Some(self.tableau.basis[row]));
        }

        let mut objective = source.matrix.row(source.objective_row())?.to_vec();
        for (row, basic) in rows.iter().zip(&basis) {
            let Some(col) = *basic else { continue };
            let factor = objective[col].clone();
            if factor.is_zero() {
                continue;
            }
            for (cell, value) in objective.iter_mut().zip(row) {
                *cell = &*cell - &(&factor * value);
            }
        }
        rows.push(objective);

        let tableau = Tableau {
            matrix: Matrix::from_rows(rows)?,
            basis,
            layout: source.layout,
            kind: source.kind,
        };
        debug_assert!(tableau.has_feasible_start());
        Ok(Some(tableau))
    }
}

/// Minimum-ratio row over the first `rows` rows of `matrix` for column `col`,
/// first index on ties.
pub(crate) fn min_ratio_row(matrix: &Matrix, col: usize, rows: usize) -> Option<usize> {
    let rhs = matrix.num_cols() - 1;
    let mut best: Option<(usize, Rational)> = None;
    for row in 0..rows {
        let entry = &matrix[(row, col)];
        if !entry.is_positive() {
            continue;
        }
        let ratio = &matrix[(row, rhs)] / entry;
        if best.as_ref().is_none_or(|(_, b)| &ratio < b) {
            best = Some((row, ratio));
        }
    }
    best.map(|(row, _)| row)
}

/// Gives `tableau` a feasible starting basis by running a restoration phase
/// one on it. Returns the new tableau, or `None` if its rows are infeasible,
/// together with the pivots spent.
pub(crate) fn restore_feasible_basis(
    tableau: Tableau,
    limit: Option<usize>,
) -> Result<(Option<Tableau>, usize), SolveError> {
    let mut solver = PhaseOneSolver::new(standard_form::restoration(&tableau)?);
    solver.run(limit)?;
    let iterations = solver.iterations();
    Ok((solver.into_feasible_tableau(tableau)?, iterations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Problem, Relation};

    fn ints(values: &[i64]) -> Vec<Rational> {
        values.iter().map(|&v| Rational::from(v)).collect()
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_feasible_problem() {
        init_logger();
        let mut problem = Problem::new(2);
        problem
            .add_constraint(ints(&[1, 2]), Relation::Le, Rational::from(4))
            .unwrap()
            .add_constraint(ints(&[3, 1]), Relation::Ge, Rational::from(3))
            .unwrap()
            .add_constraint(ints(&[1, -1]), Relation::Eq, Rational::from(-1))
            .unwrap();

        let mut solver = PhaseOneSolver::new(standard_form::phase_one(&problem).unwrap());
        assert_eq!(solver.run(None).unwrap(), PhaseOneState::Optimal);
        assert!(solver.artificial_sum().is_zero());

        let report = solver.report();
        assert!(report.is_feasible());
        assert!(report.violated.is_empty());
        assert!(problem.violated_constraints(&report.point).is_empty());
    }

    #[test]
    fn test_infeasible_problem() {
        init_logger();
        let mut problem = Problem::new(1);
        problem
            .add_constraint(ints(&[1]), Relation::Le, Rational::from(5))
            .unwrap()
            .add_constraint(ints(&[1]), Relation::Ge, Rational::from(6))
            .unwrap();

        let mut solver = PhaseOneSolver::new(standard_form::phase_one(&problem).unwrap());
        assert_eq!(solver.run(None).unwrap(), PhaseOneState::Optimal);
        assert_eq!(solver.artificial_sum(), Rational::from(1));

        let report = solver.report();
        assert_eq!(report.verdict, Feasibility::Infeasible);
        assert_eq!(report.point, ints(&[5]));
        assert_eq!(report.violated, vec![1]);
    }

    #[test]
    fn test_zero_ratio_row_leaves_first() {
        let mut problem = Problem::new(2);
        problem
            .add_constraint(ints(&[1, -1]), Relation::Le, Rational::from(0))
            .unwrap()
            .add_constraint(ints(&[1, 1]), Relation::Ge, Rational::from(2))
            .unwrap();

        let mut solver = PhaseOneSolver::new(standard_form::phase_one(&problem).unwrap());
        assert_eq!(solver.step(), PhaseOneState::Iterating);
        // x enters; the degenerate row 0 has ratio 0 and wins over row 1.
        assert_eq!(solver.tableau().basis(), &[0, 4]);
        let rhs = solver.tableau().rhs_col();
        assert!((0..2).all(|r| !solver.tableau().matrix()[(r, rhs)].is_negative()));

        assert_eq!(solver.run(None).unwrap(), PhaseOneState::Optimal);
        assert_eq!(solver.iterations(), 2);
        let report = solver.report();
        assert!(report.is_feasible());
        assert_eq!(report.point, ints(&[1, 1]));
    }

    #[test]
    fn test_step_after_termination_is_noop() {
        let problem = Problem::new(2);
        let mut solver = PhaseOneSolver::new(standard_form::phase_one(&problem).unwrap());
        assert_eq!(solver.step(), PhaseOneState::Optimal);
        assert_eq!(solver.step(), PhaseOneState::Optimal);
        assert_eq!(solver.iterations(), 0);
        assert!(solver.report().is_feasible());
    }

    #[test]
    fn test_iteration_limit() {
        let mut problem = Problem::new(1);
        problem
            .add_constraint(ints(&[1]), Relation::Ge, Rational::from(1))
            .unwrap();
        let mut solver = PhaseOneSolver::new(standard_form::phase_one(&problem).unwrap());
        assert_eq!(solver.run(Some(0)).unwrap_err(), SolveError::IterationLimit(0));
        assert_eq!(solver.run(Some(1)).unwrap(), PhaseOneState::Optimal);
    }

    #[test]
    fn test_restoration_of_mixed_rows() {
        init_logger();
        let mut problem = Problem::new(2);
        problem
            .add_constraint(ints(&[1, 2]), Relation::Le, Rational::from(4))
            .unwrap()
            .add_constraint(ints(&[3, 1]), Relation::Ge, Rational::from(3))
            .unwrap()
            .add_constraint(ints(&[1, -1]), Relation::Eq, Rational::from(-1))
            .unwrap();
        problem.set_objective(ints(&[2, 5])).unwrap();

        let tableau = standard_form::primal(&problem).unwrap();
        let (restored, _) = restore_feasible_basis(tableau, None).unwrap();
        let restored = restored.unwrap();
        assert!(restored.has_feasible_start());
        assert_eq!(restored.num_constraints(), 3);

        let objective = restored.matrix().row(restored.objective_row()).unwrap();
        for basic in restored.basis().iter().flatten() {
            assert!(objective[*basic].is_zero());
        }
    }

    #[test]
    fn test_restoration_drops_redundant_row() {
        let mut problem = Problem::new(2);
        problem
            .add_constraint(ints(&[1, 1]), Relation::Eq, Rational::from(2))
            .unwrap()
            .add_constraint(ints(&[2, 2]), Relation::Eq, Rational::from(4))
            .unwrap();
        problem.set_objective(ints(&[1, 2])).unwrap();

        let tableau = standard_form::primal(&problem).unwrap();
        let (restored, iterations) = restore_feasible_basis(tableau, None).unwrap();
        let restored = restored.unwrap();
        assert_eq!(iterations, 1);
        assert_eq!(restored.basis(), &[Some(0)]);
        assert_eq!(restored.matrix().row(0).unwrap(), ints(&[1, 1, 0, 0, 2]).as_slice());
        assert_eq!(restored.matrix().row(1).unwrap(), ints(&[0, -1, 0, 0, 2]).as_slice());
    }

    #[test]
    fn test_restoration_reports_infeasible_rows() {
        let mut problem = Problem::new(1);
        problem
            .add_constraint(ints(&[1]), Relation::Eq, Rational::from(-1))
            .unwrap();
        let tableau = standard_form::primal(&problem).unwrap();
        let (restored, _) = restore_feasible_basis(tableau, None).unwrap();
        assert!(restored.is_none());
    }
}

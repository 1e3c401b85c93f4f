//! Conversion of a [`Problem`] into the tableaus the two simplex phases work on.
//!
//! Every builder reads the problem through a shared reference and returns a
//! freshly allocated tableau, so the caller's problem is never touched and the
//! returned tableau is owned by exactly one solver.

use std::collections::BTreeSet;

use num_traits::{One, Zero};

use crate::error::{MatrixError, SolveError};
use crate::matrix::Matrix;
use crate::problem::{Constraint, Problem, Relation};
use crate::rational::Rational;

/// Maps problem variables to tableau columns.
///
/// A sign-restricted variable owns one column. A free variable owns an adjacent
/// `(x+, x-)` pair and is read back as `x+ - x-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<(usize, Option<usize>)>,
    num_columns: usize,
}

impl ColumnLayout {
    pub fn for_problem(problem: &Problem) -> Self {
        let mut columns = Vec::with_capacity(problem.num_variables());
        let mut next = 0;
        for var in 0..problem.num_variables() {
            if problem.is_free(var) {
                columns.push((next, Some(next + 1)));
                next += 2;
            } else {
                columns.push((next, None));
                next += 1;
            }
        }
        Self {
            columns,
            num_columns: next,
        }
    }

    /// One column per variable, nothing split.
    pub fn identity(num_variables: usize) -> Self {
        Self {
            columns: (0..num_variables).map(|c| (c, None)).collect(),
            num_columns: num_variables,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.columns.len()
    }

    /// Number of tableau columns the variables occupy.
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Spreads one coefficient per variable over the tableau columns, giving
    /// the negative-part column of a free variable the opposite sign.
    pub fn split_row(&self, coefficients: &[Rational]) -> Vec<Rational> {
        let mut row = Vec::with_capacity(self.num_columns);
        for (coefficient, (_, negative)) in coefficients.iter().zip(&self.columns) {
            row.push(coefficient.clone());
            if negative.is_some() {
                row.push(-coefficient);
            }
        }
        row
    }

    /// Folds per-column values back into one value per variable.
    pub fn reconstruct(&self, column_values: &[Rational]) -> Vec<Rational> {
        self.columns
            .iter()
            .map(|&(positive, negative)| match negative {
                Some(negative) => &column_values[positive] - &column_values[negative],
                None => column_values[positive].clone(),
            })
            .collect()
    }
}

/// Which LP a phase-two tableau encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableauKind {
    Primal,
    /// Dual of the problem; the slack of dual constraint `j` sits in column
    /// `slack_start + j` and corresponds to primal column `j`.
    Dual { slack_start: usize },
}

/// Phase-two tableau: constraint rows followed by one objective row.
///
/// The objective row holds the negated minimization coefficients, so a
/// positive entry marks an improving column. The last column is the RHS.
#[derive(Debug, Clone)]
pub struct Tableau {
    pub(crate) matrix: Matrix,
    pub(crate) basis: Vec<Option<usize>>,
    pub(crate) layout: ColumnLayout,
    pub(crate) kind: TableauKind,
}

impl Tableau {
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Basic column of each constraint row, `None` where the row has none yet.
    pub fn basis(&self) -> &[Option<usize>] {
        &self.basis
    }

    pub fn kind(&self) -> TableauKind {
        self.kind
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn num_constraints(&self) -> usize {
        self.matrix.num_rows() - 1
    }

    pub fn objective_row(&self) -> usize {
        self.matrix.num_rows() - 1
    }

    pub fn rhs_col(&self) -> usize {
        self.matrix.num_cols() - 1
    }

    /// Whether the recorded basis is complete and primal feasible, i.e. phase
    /// two can start pivoting right away.
    pub fn has_feasible_start(&self) -> bool {
        let rhs = self.rhs_col();
        self.basis.iter().enumerate().all(|(row, basic)| {
            let unit = basic.is_some_and(|col| {
                self.matrix.is_unit_column_within(col, 0..self.num_constraints()) == Some(row)
            });
            unit && !self.matrix[(row, rhs)].is_negative()
        })
    }
}

/// Phase-one tableau: constraint rows followed by the `Zj`, `Cj` and `Zj - Cj`
/// trailer rows.
#[derive(Debug, Clone)]
pub struct PhaseOneTableau {
    pub(crate) matrix: Matrix,
    pub(crate) basis: Vec<usize>,
    /// Columns of artificial variables, `Cj = -1` there.
    pub(crate) artificial_columns: BTreeSet<usize>,
    /// Rows whose basic variable is still artificial.
    pub(crate) artificial_rows: Vec<usize>,
    pub(crate) layout: ColumnLayout,
    /// Constraints the verdict is checked against, untransformed.
    pub(crate) original: Vec<Constraint>,
}

impl PhaseOneTableau {
    fn new(
        rows: Vec<Vec<Rational>>,
        basis: Vec<usize>,
        artificial_columns: BTreeSet<usize>,
        layout: ColumnLayout,
        original: Vec<Constraint>,
    ) -> Result<Self, MatrixError> {
        let num_constraints = rows.len();
        let width = match rows.first() {
            Some(row) => row.len(),
            None => layout.num_columns() + 1,
        };
        let mut all_rows = rows;
        all_rows.extend((0..3).map(|_| vec![Rational::zero(); width]));
        let matrix = Matrix::from_rows(all_rows)?;

        let artificial_rows = (0..num_constraints)
            .filter(|&r| artificial_columns.contains(&basis[r]))
            .collect();

        let mut tableau = Self {
            matrix,
            basis,
            artificial_columns,
            artificial_rows,
            layout,
            original,
        };
        tableau.compute_trailer_rows();
        Ok(tableau)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn num_constraints(&self) -> usize {
        self.matrix.num_rows() - 3
    }

    pub fn rhs_col(&self) -> usize {
        self.matrix.num_cols() - 1
    }

    pub(crate) fn zj_row(&self) -> usize {
        self.num_constraints()
    }

    pub(crate) fn cj_row(&self) -> usize {
        self.num_constraints() + 1
    }

    pub(crate) fn reduced_cost_row(&self) -> usize {
        self.num_constraints() + 2
    }

    pub fn is_artificial(&self, col: usize) -> bool {
        self.artificial_columns.contains(&col)
    }

    /// Recomputes `Zj`, `Cj` and `Zj - Cj` from the constraint rows.
    pub(crate) fn compute_trailer_rows(&mut self) {
        let (zj, cj, zj_cj) = (self.zj_row(), self.cj_row(), self.reduced_cost_row());
        for col in 0..self.matrix.num_cols() {
            let z = -self
                .artificial_rows
                .iter()
                .map(|&row| &self.matrix[(row, col)])
                .sum::<Rational>();
            let c = if self.artificial_columns.contains(&col) {
                -Rational::one()
            } else {
                Rational::zero()
            };
            self.matrix[(zj_cj, col)] = &z - &c;
            self.matrix[(zj, col)] = z;
            self.matrix[(cj, col)] = c;
        }
    }
}

/// Builds the primal phase-two tableau.
///
/// Each constraint gets one auxiliary column: a `+1` slack for `<=`, an empty
/// column for `=`, and for `>=` a `-1` surplus after which the whole row is
/// negated, turning the surplus into a slack over `-a . x <= -b`.
pub fn primal(problem: &Problem) -> Result<Tableau, SolveError> {
    problem.validate()?;
    let layout = ColumnLayout::for_problem(problem);
    let m = problem.num_constraints();
    let structural = layout.num_columns();
    let width = structural + m + 1;

    let mut rows = Vec::with_capacity(m + 1);
    let mut basis = Vec::with_capacity(m);
    for (i, constraint) in problem.constraints().iter().enumerate() {
        let mut row = layout.split_row(&constraint.coefficients);
        row.resize(width, Rational::zero());
        row[width - 1] = constraint.rhs.clone();
        match constraint.relation {
            Relation::Le => {
                row[structural + i] = Rational::one();
                basis.push(Some(structural + i));
            }
            Relation::Eq => basis.push(None),
            Relation::Ge => {
                row[structural + i] = -Rational::one();
                for cell in &mut row {
                    *cell = -&*cell;
                }
                basis.push(Some(structural + i));
            }
        }
        rows.push(row);
    }

    let mut objective: Vec<Rational> = layout
        .split_row(problem.objective())
        .into_iter()
        .map(|c| -c)
        .collect();
    objective.resize(width, Rational::zero());
    rows.push(objective);

    Ok(Tableau {
        matrix: Matrix::from_rows(rows)?,
        basis,
        layout,
        kind: TableauKind::Primal,
    })
}

/// Builds the tableau of the dual problem.
///
/// The primal is read as `min c.x, G x >= h, x >= 0` over the split columns:
/// `<=` rows are negated and `=` rows contribute both orientations. The dual
/// `max h.y, G^T y <= c, y >= 0` gets one slack per constraint, so its slack
/// basis is feasible exactly when every split objective coefficient is
/// non-negative.
pub fn dual(problem: &Problem) -> Result<Tableau, SolveError> {
    problem.validate()?;
    let layout = ColumnLayout::for_problem(problem);

    let mut g_rows: Vec<Vec<Rational>> = Vec::new();
    let mut h: Vec<Rational> = Vec::new();
    for constraint in problem.constraints() {
        let row = layout.split_row(&constraint.coefficients);
        let negated = || row.iter().map(|v| -v).collect::<Vec<_>>();
        match constraint.relation {
            Relation::Le => {
                g_rows.push(negated());
                h.push(-&constraint.rhs);
            }
            Relation::Ge => {
                g_rows.push(row.clone());
                h.push(constraint.rhs.clone());
            }
            Relation::Eq => {
                g_rows.push(negated());
                h.push(-&constraint.rhs);
                g_rows.push(row.clone());
                h.push(constraint.rhs.clone());
            }
        }
    }

    let dual_vars = g_rows.len();
    let dual_cons = layout.num_columns();
    let width = dual_vars + dual_cons + 1;
    let costs = layout.split_row(problem.objective());

    let mut rows = Vec::with_capacity(dual_cons + 1);
    for (j, cost) in costs.into_iter().enumerate() {
        let mut row: Vec<Rational> = g_rows.iter().map(|g| g[j].clone()).collect();
        row.resize(width, Rational::zero());
        row[dual_vars + j] = Rational::one();
        row[width - 1] = cost;
        rows.push(row);
    }
    let mut objective = h;
    objective.resize(width, Rational::zero());
    rows.push(objective);

    Ok(Tableau {
        matrix: Matrix::from_rows(rows)?,
        basis: (0..dual_cons).map(|j| Some(dual_vars + j)).collect(),
        layout,
        kind: TableauKind::Dual {
            slack_start: dual_vars,
        },
    })
}

/// Builds the phase-one tableau used for the feasibility check.
///
/// Rows with a negative RHS are negated first (flipping `<=` and `>=`). Then
/// `<=` rows get a slack, `=` rows an artificial, and `>=` rows a `-1` surplus
/// followed by an artificial, in row order.
pub fn phase_one(problem: &Problem) -> Result<PhaseOneTableau, SolveError> {
    problem.validate()?;
    let layout = ColumnLayout::for_problem(problem);
    let structural = layout.num_columns();

    let mut normalized = Vec::with_capacity(problem.num_constraints());
    let mut aux_count = 0;
    for constraint in problem.constraints() {
        let mut row = layout.split_row(&constraint.coefficients);
        let mut rhs = constraint.rhs.clone();
        let mut relation = constraint.relation;
        if rhs.is_negative() {
            row = row.into_iter().map(|v| -v).collect();
            rhs = -rhs;
            relation = relation.flipped();
        }
        aux_count += if relation == Relation::Ge { 2 } else { 1 };
        normalized.push((row, relation, rhs));
    }

    let width = structural + aux_count + 1;
    let mut rows = Vec::with_capacity(normalized.len());
    let mut basis = Vec::with_capacity(normalized.len());
    let mut artificial_columns = BTreeSet::new();
    let mut next = structural;
    for (mut row, relation, rhs) in normalized {
        row.resize(width, Rational::zero());
        row[width - 1] = rhs;
        match relation {
            Relation::Le => {
                row[next] = Rational::one();
                basis.push(next);
                next += 1;
            }
            Relation::Eq => {
                row[next] = Rational::one();
                artificial_columns.insert(next);
                basis.push(next);
                next += 1;
            }
            Relation::Ge => {
                row[next] = -Rational::one();
                row[next + 1] = Rational::one();
                artificial_columns.insert(next + 1);
                basis.push(next + 1);
                next += 2;
            }
        }
        rows.push(row);
    }

    Ok(PhaseOneTableau::new(
        rows,
        basis,
        artificial_columns,
        layout,
        problem.constraints().to_vec(),
    )?)
}

/// Builds a phase-one tableau that searches a feasible basis for the
/// constraint rows of `tableau`, read as equalities over its columns.
///
/// Rows with a negative RHS are negated. A row keeps its recorded basic column
/// when that column is still a `+1` unit column; every other row gets an
/// artificial column appended after the existing ones.
pub fn restoration(tableau: &Tableau) -> Result<PhaseOneTableau, MatrixError> {
    let m = tableau.num_constraints();
    let n = tableau.rhs_col();

    let mut rows: Vec<Vec<Rational>> = Vec::with_capacity(m);
    let mut original = Vec::with_capacity(m);
    for r in 0..m {
        let row = tableau.matrix.row(r)?;
        original.push(Constraint {
            coefficients: row[..n].to_vec(),
            relation: Relation::Eq,
            rhs: row[n].clone(),
        });
        if row[n].is_negative() {
            rows.push(row.iter().map(|v| -v).collect());
        } else {
            rows.push(row.to_vec());
        }
    }

    let keeps_basis = |r: usize| {
        tableau.basis[r].filter(|&col| {
            rows[r][col].is_one() && (0..m).all(|o| o == r || rows[o][col].is_zero())
        })
    };
    let kept: Vec<Option<usize>> = (0..m).map(keeps_basis).collect();
    let num_artificial = kept.iter().filter(|k| k.is_none()).count();
    let width = n + num_artificial + 1;

    let mut basis = Vec::with_capacity(m);
    let mut artificial_columns = BTreeSet::new();
    let mut next = n;
    for (r, row) in rows.iter_mut().enumerate() {
        let rhs = row.pop().unwrap_or_else(Rational::zero);
        row.resize(width, Rational::zero());
        row[width - 1] = rhs;
        match kept[r] {
            Some(col) => basis.push(col),
            None => {
                row[next] = Rational::one();
                artificial_columns.insert(next);
                basis.push(next);
                next += 1;
            }
        }
    }

    PhaseOneTableau::new(rows, basis, artificial_columns, ColumnLayout::identity(n), original)
}

use std::fmt;
use std::ops::{Index, IndexMut, Range};

use num_traits::{One, Zero};

use crate::error::MatrixError;
use crate::rational::Rational;

/// Dense row-major matrix of exact rationals with fixed dimensions.
///
/// Every cell is populated from construction on. `Clone` is a deep copy: the
/// solvers snapshot tableaus and rely on clones never sharing cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<Rational>>,
}

impl Matrix {
    /// Zero-filled `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![vec![Rational::zero(); cols]; rows],
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::new(size, size);
        for i in 0..size {
            matrix.data[i][i] = Rational::one();
        }
        matrix
    }

    /// Builds a matrix from rows, which must all have the same length.
    pub fn from_rows(rows: Vec<Vec<Rational>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(MatrixError::DimensionMismatch {
                expected: cols,
                found: bad.len(),
            });
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_cols(&self) -> usize {
        self.cols
    }

    fn check(&self, row: usize, col: usize) -> Result<(), MatrixError> {
        if row < self.rows && col < self.cols {
            Ok(())
        } else {
            Err(MatrixError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    fn check_row(&self, row: usize) -> Result<(), MatrixError> {
        if row < self.rows {
            Ok(())
        } else {
            Err(MatrixError::OutOfRange {
                row,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    fn check_col(&self, col: usize) -> Result<(), MatrixError> {
        if col < self.cols {
            Ok(())
        } else {
            Err(MatrixError::OutOfRange {
                row: 0,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<&Rational, MatrixError> {
        self.check(row, col)?;
        Ok(&self.data[row][col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: Rational) -> Result<(), MatrixError> {
        self.check(row, col)?;
        self.data[row][col] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Result<&[Rational], MatrixError> {
        self.check_row(row)?;
        Ok(&self.data[row])
    }

    /// Copies out column `col`.
    pub fn column(&self, col: usize) -> Result<Vec<Rational>, MatrixError> {
        self.check_col(col)?;
        Ok(self.data.iter().map(|r| r[col].clone()).collect())
    }

    /// Replaces row `row` with `values`.
    pub fn set_row(&mut self, row: usize, values: Vec<Rational>) -> Result<(), MatrixError> {
        self.check_row(row)?;
        if values.len() != self.cols {
            return Err(MatrixError::DimensionMismatch {
                expected: self.cols,
                found: values.len(),
            });
        }
        self.data[row] = values;
        Ok(())
    }

    /// Copies `values` into row `row`.
    pub fn add_row(&mut self, values: &[Rational], row: usize) -> Result<(), MatrixError> {
        self.set_row(row, values.to_vec())
    }

    pub fn multiply_row_by_scalar(
        &mut self,
        row: usize,
        scalar: &Rational,
    ) -> Result<(), MatrixError> {
        self.check_row(row)?;
        for cell in &mut self.data[row] {
            *cell = &*cell * scalar;
        }
        Ok(())
    }

    pub fn multiply_column_by_scalar(
        &mut self,
        col: usize,
        scalar: &Rational,
    ) -> Result<(), MatrixError> {
        self.check_col(col)?;
        for row in &mut self.data {
            row[col] = &row[col] * scalar;
        }
        Ok(())
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) -> Result<(), MatrixError> {
        self.check_row(a)?;
        self.check_row(b)?;
        self.data.swap(a, b);
        Ok(())
    }

    pub fn swap_columns(&mut self, a: usize, b: usize) -> Result<(), MatrixError> {
        self.check_col(a)?;
        self.check_col(b)?;
        for row in &mut self.data {
            row.swap(a, b);
        }
        Ok(())
    }

    /// Returns the row holding the single `1` when column `col` is a unit
    /// vector (one entry equal to 1, every other entry 0).
    pub fn does_column_contain_one_only(&self, col: usize) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        let mut one_at = None;
        for (i, row) in self.data.iter().enumerate() {
            let cell = &row[col];
            if cell.is_zero() {
                continue;
            }
            if !cell.is_one() || one_at.is_some() {
                return None;
            }
            one_at = Some(i);
        }
        one_at
    }

    /// Same as [`Matrix::does_column_contain_one_only`] but only looks at the
    /// rows in `rows`.
    pub(crate) fn is_unit_column_within(&self, col: usize, rows: Range<usize>) -> Option<usize> {
        let mut one_at = None;
        for i in rows {
            let cell = &self.data[i][col];
            if cell.is_zero() {
                continue;
            }
            if !cell.is_one() || one_at.is_some() {
                return None;
            }
            one_at = Some(i);
        }
        one_at
    }

    /// Gauss-Jordan step on `(row, col)`: scales the pivot row by the inverse of
    /// the pivot value, then clears column `col` from every other row in
    /// `eliminate`.
    ///
    /// # Panics
    ///
    /// Panics if the pivot value is zero or an index is out of range.
    pub fn pivot(&mut self, row: usize, col: usize, eliminate: Range<usize>) {
        let pivot_value = self.data[row][col].clone();
        let scaled: Vec<Rational> = self.data[row].iter().map(|v| v / &pivot_value).collect();

        for i in eliminate {
            if i == row {
                continue;
            }
            let factor = self.data[i][col].clone();
            if factor.is_zero() {
                continue;
            }
            for (cell, pivot_cell) in self.data[i].iter_mut().zip(&scaled) {
                if !pivot_cell.is_zero() {
                    *cell = &*cell - &(&factor * pivot_cell);
                }
            }
        }

        self.data[row] = scaled;
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(other, |a, b| a - b)
    }

    fn zip_with(
        &self,
        other: &Matrix,
        f: impl Fn(&Rational, &Rational) -> Rational,
    ) -> Result<Matrix, MatrixError> {
        if self.rows != other.rows {
            return Err(MatrixError::DimensionMismatch {
                expected: self.rows,
                found: other.rows,
            });
        }
        if self.cols != other.cols {
            return Err(MatrixError::DimensionMismatch {
                expected: self.cols,
                found: other.cols,
            });
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| f(x, y)).collect())
            .collect();
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Matrix product `self * other`.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::DimensionMismatch {
                expected: self.cols,
                found: other.rows,
            });
        }
        let mut result = Matrix::new(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                result.data[i][j] = (0..self.cols)
                    .map(|k| &self.data[i][k] * &other.data[k][j])
                    .sum();
            }
        }
        Ok(result)
    }

    pub fn transpose(&self) -> Matrix {
        let mut result = Matrix::new(self.cols, self.rows);
        for (i, row) in self.data.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                result.data[j][i] = cell.clone();
            }
        }
        result
    }

    /// Lossy floating point copy, for interop with floating point tools.
    pub fn to_f64(&self) -> Vec<Vec<f64>> {
        self.data
            .iter()
            .map(|row| row.iter().map(Rational::to_f64).collect())
            .collect()
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Rational;

    fn index(&self, (row, col): (usize, usize)) -> &Rational {
        &self.data[row][col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Rational {
        &mut self.data[row][col]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{cell}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    fn sample() -> Matrix {
        Matrix::from_rows(vec![
            vec![r(12, 5), r(20, 3)],
            vec![r(8, 7), r(-4, 6)],
            vec![r(7, 8), r(1, -6)],
            vec![r(4, 7), r(64, 16)],
        ])
        .unwrap()
    }

    #[test]
    fn test_display() {
        assert_eq!(sample().to_string(), "12/5 20/3\n8/7 -2/3\n7/8 -1/6\n4/7 4");
    }

    #[test]
    fn test_add_and_sub() {
        let other = Matrix::from_rows(vec![
            vec![r(16, 6), r(78, 65)],
            vec![r(4, 6), r(7, -9)],
            vec![r(23, 4), r(63, 21)],
            vec![r(6, 2), r(3, 49)],
        ])
        .unwrap();

        let sum = sample().add(&other).unwrap();
        assert_eq!(sum.to_string(), "76/15 118/15\n38/21 -13/9\n53/8 17/6\n25/7 199/49");

        let back = sum.sub(&other).unwrap();
        assert_eq!(back, sample());

        assert!(matches!(
            sample().add(&Matrix::new(4, 3)),
            Err(MatrixError::DimensionMismatch { expected: 2, found: 3 })
        ));
    }

    #[test]
    fn test_mul_and_transpose() {
        let a = Matrix::from_rows(vec![vec![r(1, 1), r(2, 1)], vec![r(3, 1), r(4, 1)]]).unwrap();
        let b = Matrix::from_rows(vec![vec![r(1, 2), r(0, 1)], vec![r(0, 1), r(1, 3)]]).unwrap();
        assert_eq!(a.mul(&b).unwrap().to_string(), "1/2 2/3\n3/2 4/3");
        assert_eq!(a.mul(&Matrix::identity(2)).unwrap(), a);
        assert_eq!(a.transpose().to_string(), "1 3\n2 4");
        assert!(a.mul(&Matrix::new(3, 1)).is_err());
    }

    #[test]
    fn test_bounds_checks() {
        let mut m = Matrix::new(2, 3);
        assert!(matches!(m.get(2, 0), Err(MatrixError::OutOfRange { row: 2, col: 0, .. })));
        assert!(matches!(m.set(0, 3, r(1, 1)), Err(MatrixError::OutOfRange { .. })));
        assert!(matches!(
            m.set_row(0, vec![r(1, 1)]),
            Err(MatrixError::DimensionMismatch { expected: 3, found: 1 })
        ));
        assert!(m.add_row(&[r(1, 1), r(2, 1), r(3, 1)], 5).is_err());
        m.add_row(&[r(1, 1), r(2, 1), r(3, 1)], 1).unwrap();
        assert_eq!(m.get(1, 2).unwrap(), &r(3, 1));
        assert!(Matrix::from_rows(vec![vec![r(1, 1)], vec![]]).is_err());

        let no_cols = Matrix::new(2, 0);
        assert!(no_cols.row(1).unwrap().is_empty());
        assert!(matches!(no_cols.row(2), Err(MatrixError::OutOfRange { row: 2, .. })));
        let no_rows = Matrix::new(0, 2);
        assert!(no_rows.column(1).unwrap().is_empty());
        assert!(matches!(no_rows.column(2), Err(MatrixError::OutOfRange { col: 2, .. })));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = sample();
        let mut copy = original.clone();
        copy.set(0, 0, r(99, 1)).unwrap();
        copy.multiply_row_by_scalar(1, &r(-1, 1)).unwrap();
        assert_eq!(original.get(0, 0).unwrap(), &r(12, 5));
        assert_eq!(original.get(1, 0).unwrap(), &r(8, 7));

        let mut source = sample();
        let snapshot = source.clone();
        source.swap_rows(0, 3).unwrap();
        source.multiply_column_by_scalar(1, &r(2, 1)).unwrap();
        assert_eq!(snapshot, sample());
    }

    #[test]
    fn test_scaling_and_swapping() {
        let mut m = sample();
        m.multiply_row_by_scalar(0, &r(5, 4)).unwrap();
        assert_eq!(m.row(0).unwrap(), &[r(3, 1), r(25, 3)]);
        m.multiply_column_by_scalar(1, &r(-3, 1)).unwrap();
        assert_eq!(m.column(1).unwrap(), vec![r(-25, 1), r(2, 1), r(1, 2), r(-12, 1)]);
        m.swap_rows(0, 1).unwrap();
        assert_eq!(m.row(0).unwrap(), &[r(8, 7), r(2, 1)]);
        m.swap_columns(0, 1).unwrap();
        assert_eq!(m.row(0).unwrap(), &[r(2, 1), r(8, 7)]);
        assert!(m.swap_columns(0, 2).is_err());
    }

    #[test]
    fn test_unit_column_detection() {
        let m = Matrix::from_rows(vec![
            vec![r(1, 1), r(0, 1), r(2, 1), r(1, 1)],
            vec![r(0, 1), r(0, 1), r(0, 1), r(1, 1)],
            vec![r(0, 1), r(1, 1), r(0, 1), r(0, 1)],
        ])
        .unwrap();
        assert_eq!(m.does_column_contain_one_only(0), Some(0));
        assert_eq!(m.does_column_contain_one_only(1), Some(2));
        assert_eq!(m.does_column_contain_one_only(2), None);
        assert_eq!(m.does_column_contain_one_only(3), None);
        assert_eq!(m.does_column_contain_one_only(9), None);
        assert_eq!(m.is_unit_column_within(3, 1..3), Some(1));
    }

    #[test]
    fn test_pivot() {
        let mut m = Matrix::from_rows(vec![
            vec![r(2, 1), r(1, 1), r(4, 1)],
            vec![r(1, 1), r(3, 1), r(7, 1)],
            vec![r(-3, 1), r(-2, 1), r(0, 1)],
        ])
        .unwrap();
        m.pivot(0, 0, 0..3);
        assert_eq!(m.to_string(), "1 1/2 2\n0 5/2 5\n0 -1/2 6");
        assert_eq!(m.does_column_contain_one_only(0), Some(0));

        // Rows outside the elimination range are left alone.
        let mut partial =
            Matrix::from_rows(vec![vec![r(2, 1), r(2, 1)], vec![r(1, 1), r(5, 1)]]).unwrap();
        partial.pivot(0, 0, 0..1);
        assert_eq!(partial.to_string(), "1 1\n1 5");
    }

    #[test]
    fn test_to_f64() {
        let m = Matrix::from_rows(vec![vec![r(1, 2), r(-3, 4)]]).unwrap();
        assert_eq!(m.to_f64(), vec![vec![0.5, -0.75]]);
    }
}

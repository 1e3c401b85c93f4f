use std::collections::BTreeSet;
use std::fmt;

use num_traits::Zero;

use crate::error::ProblemError;
use crate::rational::Rational;

/// Represents a linear program: minimize `objective · x` subject to the
/// constraints, with `x >= 0` except for the variables declared free.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub(crate) num_variables: usize,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Vec<Rational>,
    pub(crate) free_variables: BTreeSet<usize>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// Coefficients for each variable
    pub coefficients: Vec<Rational>,
    /// Comparison operator
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: Rational,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Equal (=)
    Eq,
    /// Greater than or equal (>=)
    Ge,
}

impl Relation {
    /// The relation obtained by multiplying both sides by -1.
    pub fn flipped(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Eq => Relation::Eq,
            Relation::Ge => Relation::Le,
        }
    }

    pub fn holds(self, lhs: &Rational, rhs: &Rational) -> bool {
        match self {
            Relation::Le => lhs <= rhs,
            Relation::Eq => lhs == rhs,
            Relation::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Relation::Le => "<=",
            Relation::Eq => "=",
            Relation::Ge => ">=",
        };
        f.write_str(symbol)
    }
}

impl Constraint {
    /// Left-hand side evaluated at `values`.
    pub fn evaluate(&self, values: &[Rational]) -> Rational {
        self.coefficients.iter().zip(values).map(|(a, x)| a * x).sum()
    }

    pub fn is_satisfied_by(&self, values: &[Rational]) -> bool {
        self.relation.holds(&self.evaluate(values), &self.rhs)
    }
}

impl Problem {
    /// Empty problem over `num_variables` variables with a zero objective.
    pub fn new(num_variables: usize) -> Self {
        Self {
            num_variables,
            constraints: Vec::new(),
            objective: vec![Rational::zero(); num_variables],
            free_variables: BTreeSet::new(),
        }
    }

    pub fn add_constraint(
        &mut self,
        coefficients: Vec<Rational>,
        relation: Relation,
        rhs: Rational,
    ) -> Result<&mut Self, ProblemError> {
        if coefficients.len() != self.num_variables {
            return Err(ProblemError::InvalidConstraint {
                index: self.constraints.len(),
                expected: self.num_variables,
                found: coefficients.len(),
            });
        }
        self.constraints.push(Constraint {
            coefficients,
            relation,
            rhs,
        });
        Ok(self)
    }

    /// Sets the coefficients of the objective to minimize.
    pub fn set_objective(
        &mut self,
        coefficients: Vec<Rational>,
    ) -> Result<&mut Self, ProblemError> {
        if coefficients.len() != self.num_variables {
            return Err(ProblemError::InvalidObjective {
                expected: self.num_variables,
                found: coefficients.len(),
            });
        }
        self.objective = coefficients;
        Ok(self)
    }

    /// Declares variable `index` as free (not restricted to non-negative values).
    pub fn declare_free(&mut self, index: usize) -> Result<&mut Self, ProblemError> {
        if index >= self.num_variables {
            return Err(ProblemError::InvalidVariable {
                index,
                num_variables: self.num_variables,
            });
        }
        self.free_variables.insert(index);
        Ok(self)
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &[Rational] {
        &self.objective
    }

    pub fn free_variables(&self) -> &BTreeSet<usize> {
        &self.free_variables
    }

    pub fn is_free(&self, index: usize) -> bool {
        self.free_variables.contains(&index)
    }

    /// Objective value at `values`.
    pub fn objective_value(&self, values: &[Rational]) -> Rational {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// Indices of the constraints violated by `values`, compared exactly.
    pub fn violated_constraints(&self, values: &[Rational]) -> Vec<usize> {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_satisfied_by(values))
            .map(|(i, _)| i)
            .collect()
    }

    /// Re-checks every arity invariant. Problems built through the methods above
    /// always pass; deserialized ones might not.
    pub fn validate(&self) -> Result<(), ProblemError> {
        for (index, c) in self.constraints.iter().enumerate() {
            if c.coefficients.len() != self.num_variables {
                return Err(ProblemError::InvalidConstraint {
                    index,
                    expected: self.num_variables,
                    found: c.coefficients.len(),
                });
            }
        }
        if self.objective.len() != self.num_variables {
            return Err(ProblemError::InvalidObjective {
                expected: self.num_variables,
                found: self.objective.len(),
            });
        }
        if let Some(&index) = self.free_variables.iter().find(|&&i| i >= self.num_variables) {
            return Err(ProblemError::InvalidVariable {
                index,
                num_variables: self.num_variables,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |values: &[Rational]| {
            values.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
        };
        writeln!(f, "variables {}", self.num_variables)?;
        writeln!(f, "minimize {}", join(&self.objective))?;
        for c in &self.constraints {
            writeln!(f, "{} {} {}", join(&c.coefficients), c.relation, c.rhs)?;
        }
        if !self.free_variables.is_empty() {
            let free: Vec<String> = self.free_variables.iter().map(ToString::to_string).collect();
            writeln!(f, "free {}", free.join(" "))?;
        }
        Ok(())
    }
}

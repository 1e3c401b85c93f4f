use exactlp_solver::{ParseRationalError, Problem, ProblemError, Rational, Relation};
use log::debug;
use thiserror::Error;

use crate::lexer::{Lexer, Span, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Line {line}: expected {expected}, found {found:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        span: Span,
    },
    #[error("Line {line}: {source}")]
    InvalidNumber {
        line: usize,
        span: Span,
        #[source]
        source: ParseRationalError,
    },
    #[error("Line {line}: {text:?} is not a variable index")]
    InvalidIndex { text: String, line: usize, span: Span },
    #[error("Line {line}: duplicate {what} declaration")]
    Duplicate { what: &'static str, line: usize },
    #[error("Missing objective (expected a `minimize` line)")]
    MissingObjective,
    #[error("Line {line}: {source}")]
    Problem {
        line: usize,
        #[source]
        source: ProblemError,
    },
}

/// A constraint line before the variable count is known.
struct RawConstraint {
    coefficients: Vec<Rational>,
    relation: Relation,
    rhs: Rational,
    line: usize,
}

/// Parses the line-oriented problem format:
///
/// ```text
/// variables 2          # optional
/// minimize -8 -6       # or `min`
/// 5 3 <= 30            # <=, =, >= or LE, EQ, GE
/// free 1
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Problem, ParseError> {
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_problem()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn skip_comment(&mut self) {
        if self.peek_kind() == TokenKind::Comment {
            self.advance();
        }
    }

    fn skip_blank_lines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(token) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: if token.kind == TokenKind::Eof {
                    "end of file".to_string()
                } else {
                    token.text.clone()
                },
                line: token.line,
                span: token.span,
            },
            None => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: "end of file".to_string(),
                line: self.tokens.last().map_or(1, |t| t.line),
                span: self.tokens.last().map_or(Span::new(0, 0), |t| t.span),
            },
        }
    }

    /// Consumes the end of a line: an optional comment, then a newline or EOF.
    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        self.skip_comment();
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn expect_number(&mut self, expected: &str) -> Result<Token, ParseError> {
        if self.peek_kind() != TokenKind::Number {
            return Err(self.unexpected(expected));
        }
        self.advance().ok_or_else(|| self.unexpected(expected))
    }

    fn number(token: &Token) -> Result<Rational, ParseError> {
        token.text.parse().map_err(|source| ParseError::InvalidNumber {
            line: token.line,
            span: token.span,
            source,
        })
    }

    /// Reads numbers until the next non-number token.
    fn parse_numbers(&mut self) -> Result<Vec<Rational>, ParseError> {
        let mut values = Vec::new();
        while self.peek_kind() == TokenKind::Number {
            if let Some(token) = self.advance() {
                values.push(Self::number(&token)?);
            }
        }
        Ok(values)
    }

    fn parse_index(token: &Token) -> Result<usize, ParseError> {
        token.text.parse().map_err(|_| ParseError::InvalidIndex {
            text: token.text.clone(),
            line: token.line,
            span: token.span,
        })
    }

    fn parse_relation(&mut self) -> Result<Relation, ParseError> {
        let relation = match self.peek_kind() {
            TokenKind::Le => Relation::Le,
            TokenKind::Eq => Relation::Eq,
            TokenKind::Ge => Relation::Ge,
            _ => return Err(self.unexpected("<=, =, >=, LE, EQ or GE")),
        };
        self.advance();
        Ok(relation)
    }

    fn parse_problem(&mut self) -> Result<Problem, ParseError> {
        let mut declared: Option<usize> = None;
        let mut objective: Option<(Vec<Rational>, usize)> = None;
        let mut constraints: Vec<RawConstraint> = Vec::new();
        let mut free: Vec<(usize, usize)> = Vec::new();

        loop {
            self.skip_blank_lines();
            let line = self.current().map_or(1, |t| t.line);

            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Variables => {
                    self.advance();
                    if declared.is_some() {
                        return Err(ParseError::Duplicate { what: "variables", line });
                    }
                    let token = self.expect_number("variable count")?;
                    declared = Some(Self::parse_index(&token)?);
                }
                TokenKind::Minimize => {
                    self.advance();
                    if objective.is_some() {
                        return Err(ParseError::Duplicate { what: "objective", line });
                    }
                    objective = Some((self.parse_numbers()?, line));
                }
                TokenKind::Free => {
                    self.advance();
                    while self.peek_kind() == TokenKind::Number {
                        if let Some(token) = self.advance() {
                            free.push((Self::parse_index(&token)?, line));
                        }
                    }
                }
                TokenKind::Number => {
                    let coefficients = self.parse_numbers()?;
                    let relation = self.parse_relation()?;
                    let token = self.expect_number("right-hand side")?;
                    constraints.push(RawConstraint {
                        coefficients,
                        relation,
                        rhs: Self::number(&token)?,
                        line,
                    });
                }
                _ => return Err(self.unexpected("variables, minimize, free or a constraint")),
            }
            self.expect_line_end()?;
        }

        let (objective, objective_line) = objective.ok_or(ParseError::MissingObjective)?;
        // A declared count must match the objective.
        if let Some(expected) = declared.filter(|&n| n != objective.len()) {
            return Err(ParseError::Problem {
                line: objective_line,
                source: ProblemError::InvalidObjective {
                    expected,
                    found: objective.len(),
                },
            });
        }
        let num_variables = objective.len();
        debug!(
            "parsed {} constraints over {} variables",
            constraints.len(),
            num_variables
        );

        let mut problem = Problem::new(num_variables);
        problem
            .set_objective(objective)
            .map_err(|source| ParseError::Problem { line: objective_line, source })?;
        for c in constraints {
            problem
                .add_constraint(c.coefficients, c.relation, c.rhs)
                .map_err(|source| ParseError::Problem { line: c.line, source })?;
        }
        for (index, line) in free {
            problem
                .declare_free(index)
                .map_err(|source| ParseError::Problem { line, source })?;
        }
        Ok(problem)
    }
}

/// Parses one whitespace-separated row of coefficients such as `"5 -3/4 0"`.
pub fn parse_row(text: &str) -> Result<Vec<Rational>, ParseError> {
    let mut parser = Parser::new(Lexer::tokenize(text));
    let row = parser.parse_numbers()?;
    parser.skip_comment();
    if parser.peek_kind() != TokenKind::Eof {
        return Err(parser.unexpected("coefficient"));
    }
    Ok(row)
}

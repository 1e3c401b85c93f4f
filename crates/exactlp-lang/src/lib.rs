pub mod lexer;
pub mod parser;
pub mod samples;

pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{parse_row, ParseError, Parser};
pub use samples::{sample, Sample, SAMPLES};

use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Variables,
    Minimize,
    Free,

    // Literals
    Ident,
    Number,

    // Relations, symbolic or tagged (LE, EQ, GE)
    Le,
    Eq,
    Ge,

    // Special
    Newline,
    Comment,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
    /// 1-based line the token starts on
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
            line,
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    line: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            line: 1,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(
            kind,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
            self.line,
        )
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        self.token(TokenKind::Comment, start)
    }

    fn read_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// `int` or `int/int`, each part with an optional leading `-`. A slash
    /// without digits after it stays in the token so the parser can reject it.
    fn read_number(&mut self) -> Token {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        self.read_digits();

        if self.peek() == Some('/') {
            self.advance();
            if self.peek() == Some('-') {
                self.advance();
            }
            self.read_digits();
        }

        // Trailing garbage such as "5x" or "1.5" makes the whole word invalid.
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '#' | '<' | '>' | '=') {
                break;
            }
            self.advance();
        }

        self.token(TokenKind::Number, start)
    }

    fn read_word(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let kind = match &self.source[start..self.pos] {
            "variables" => TokenKind::Variables,
            "minimize" | "min" => TokenKind::Minimize,
            "free" => TokenKind::Free,
            "LE" => TokenKind::Le,
            "EQ" => TokenKind::Eq,
            "GE" => TokenKind::Ge,
            _ => TokenKind::Ident,
        };
        self.token(kind, start)
    }

    /// `<=`, `>=` or `=`; a lone `<` or `>` is an error token.
    fn read_relation(&mut self) -> Token {
        let start = self.pos;
        let first = self.advance();
        if first == Some('=') {
            return self.token(TokenKind::Eq, start);
        }
        if self.peek() != Some('=') {
            return self.token(TokenKind::Error, start);
        }
        self.advance();
        let kind = if first == Some('<') {
            TokenKind::Le
        } else {
            TokenKind::Ge
        };
        self.token(kind, start)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return self.token(TokenKind::Eof, start);
        };

        match c {
            '\n' => {
                self.advance();
                let token = self.token(TokenKind::Newline, start);
                self.line += 1;
                token
            }
            '#' => self.skip_comment(),
            '<' | '>' | '=' => self.read_relation(),
            '-' if self.peek_next().is_some_and(|n| n.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_word(),
            _ => {
                self.advance();
                self.token(TokenKind::Error, start)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("variables minimize min free x"),
            vec![
                TokenKind::Variables,
                TokenKind::Minimize,
                TokenKind::Minimize,
                TokenKind::Free,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::tokenize("100 -3/4 5/-2 0 -7");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["100", "-3/4", "5/-2", "0", "-7", ""]);
        assert!(tokens[..5].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn test_malformed_numbers_stay_whole() {
        let tokens = Lexer::tokenize("1.5 3/ 4x");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["1.5", "3/", "4x", ""]);
    }

    #[test]
    fn test_relations() {
        assert_eq!(
            kinds("<= = >= LE EQ GE < !"),
            vec![
                TokenKind::Le,
                TokenKind::Eq,
                TokenKind::Ge,
                TokenKind::Le,
                TokenKind::Eq,
                TokenKind::Ge,
                TokenKind::Error,
                TokenKind::Error,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = Lexer::tokenize("min 1 # cost\n1 <= 2");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Minimize,
                TokenKind::Number,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Number,
                TokenKind::Le,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[3].line, 1);
        assert_eq!(tokens[4].line, 2);
        assert_eq!(tokens[4].span, Span::new(13, 14));
    }
}

//! Hand-rolled lexer for the sandboxed scripting language subset this
//! workspace parses and evaluates.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    /// An identifier starting with an uppercase letter (a module segment).
    UpperIdent(String),
    /// An identifier starting with a lowercase letter or `_` (a variable or
    /// local function name).
    LowerIdent(String),
    True,
    False,
    Nil,
    If,
    Do,
    Else,
    End,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Amp,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Eq,
    Dot,
    Comma,
    Semicolon,
    LParen,
    RParen,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at line {}, column {}", self.kind, self.line, self.col)
    }
}

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src: src.as_bytes(), pos: 0, line: 1, col: 1 }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(b'#') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let (line, col) = (self.line, self.col);
            let Some(c) = self.peek() else {
                tokens.push(Token { kind: TokenKind::Eof, line, col });
                break;
            };

            let kind = match c {
                b'0'..=b'9' => self.lex_number(),
                b'"' => self.lex_string()?,
                b'a'..=b'z' | b'_' => self.lex_ident(false),
                b'A'..=b'Z' => self.lex_ident(true),
                b'+' => { self.advance(); TokenKind::Plus }
                b'-' => { self.advance(); TokenKind::Minus }
                b'*' => { self.advance(); TokenKind::Star }
                b'/' => { self.advance(); TokenKind::Slash }
                b'%' => { self.advance(); TokenKind::Percent }
                b'.' => { self.advance(); TokenKind::Dot }
                b',' => { self.advance(); TokenKind::Comma }
                b';' => { self.advance(); TokenKind::Semicolon }
                b'(' => { self.advance(); TokenKind::LParen }
                b')' => { self.advance(); TokenKind::RParen }
                b'&' => {
                    self.advance();
                    if self.peek() == Some(b'&') {
                        self.advance();
                        TokenKind::AndAnd
                    } else {
                        TokenKind::Amp
                    }
                }
                b'=' => {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::EqEq
                    } else {
                        TokenKind::Eq
                    }
                }
                b'!' => {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::NotEq
                    } else {
                        TokenKind::Bang
                    }
                }
                b'<' => {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::LtEq
                    } else {
                        TokenKind::Lt
                    }
                }
                b'>' => {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::GtEq
                    } else {
                        TokenKind::Gt
                    }
                }
                b'|' => {
                    self.advance();
                    if self.peek() == Some(b'|') {
                        self.advance();
                        TokenKind::OrOr
                    } else {
                        return Err(format!("unexpected character '|' at line {line}, column {col}"));
                    }
                }
                other => return Err(format!("unexpected character '{}' at line {line}, column {col}", other as char)),
            };
            tokens.push(Token { kind, line, col });
        }
        Ok(tokens)
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        if is_float {
            TokenKind::Float(text.parse().unwrap())
        } else {
            TokenKind::Int(text.parse().unwrap())
        }
    }

    fn lex_string(&mut self) -> Result<TokenKind, String> {
        let (line, col) = (self.line, self.col);
        self.advance();
        let mut s = String::new();
        loop {
            match self.advance() {
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(b'n') => s.push('\n'),
                    Some(b't') => s.push('\t'),
                    Some(b'"') => s.push('"'),
                    Some(b'\\') => s.push('\\'),
                    Some(c) => s.push(c as char),
                    None => return Err(format!("unterminated string at line {line}, column {col}")),
                },
                Some(c) => s.push(c as char),
                None => return Err(format!("unterminated string at line {line}, column {col}")),
            }
        }
        Ok(TokenKind::Str(s))
    }

    fn lex_ident(&mut self, _upper: bool) -> TokenKind {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_') {
            self.advance();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap().to_owned();
        match text.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            "if" => TokenKind::If,
            "do" => TokenKind::Do,
            "else" => TokenKind::Else,
            "end" => TokenKind::End,
            _ if text.chars().next().is_some_and(|c| c.is_ascii_uppercase()) => TokenKind::UpperIdent(text),
            _ => TokenKind::LowerIdent(text),
        }
    }
}

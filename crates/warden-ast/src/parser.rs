//! Recursive-descent parser producing [`AstNode`] trees from source text.

use thiserror::Error;

use crate::lexer::{Lexer, Token, TokenKind};
use crate::node::{AstNode, BinOp, CallTarget, CaptureTarget};

/// A syntax error, reported with its source location (§4.3 step 1).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

type PResult<T> = Result<T, ParseError>;

/// Parse `source` into a top-level [`AstNode::Block`].
pub fn parse(source: &str) -> PResult<AstNode> {
    let tokens = Lexer::new(source).tokenize().map_err(|message| ParseError { message })?;
    let mut parser = Parser { tokens, pos: 0 };
    let block = parser.parse_block_until_eof()?;
    Ok(block)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("expected {kind:?}")))
        }
    }

    fn unexpected(&self, context: &str) -> ParseError {
        ParseError { message: format!("{context}, found {}", self.peek()) }
    }

    fn at_stmt_terminator(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof | TokenKind::End | TokenKind::Else)
    }

    fn parse_block_until_eof(&mut self) -> PResult<AstNode> {
        let stmts = self.parse_stmts(&TokenKind::Eof)?;
        self.expect(TokenKind::Eof)?;
        Ok(AstNode::Block(stmts))
    }

    fn parse_stmts(&mut self, _terminator: &TokenKind) -> PResult<Vec<AstNode>> {
        let mut stmts = Vec::new();
        loop {
            while self.check(&TokenKind::Semicolon) {
                self.advance();
            }
            if self.at_stmt_terminator() {
                break;
            }
            stmts.push(self.parse_stmt()?);
            if self.check(&TokenKind::Semicolon) {
                continue;
            }
            if self.at_stmt_terminator() {
                break;
            }
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> PResult<AstNode> {
        if let TokenKind::LowerIdent(name) = self.peek().kind.clone() {
            if self.tokens.get(self.pos + 1).map(|t| &t.kind) == Some(&TokenKind::Eq) {
                self.advance();
                self.advance();
                let value = self.parse_expr()?;
                return Ok(AstNode::Assign { name, value: Box::new(value) });
            }
        }
        self.parse_expr()
    }

    fn parse_expr(&mut self) -> PResult<AstNode> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PResult<AstNode> {
        let mut lhs = self.parse_and()?;
        while self.check(&TokenKind::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = AstNode::BinOp { op: BinOp::Or, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PResult<AstNode> {
        let mut lhs = self.parse_equality()?;
        while self.check(&TokenKind::AndAnd) {
            self.advance();
            let rhs = self.parse_equality()?;
            lhs = AstNode::BinOp { op: BinOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> PResult<AstNode> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = AstNode::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> PResult<AstNode> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = AstNode::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> PResult<AstNode> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_factor()?;
            lhs = AstNode::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> PResult<AstNode> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = AstNode::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<AstNode> {
        match self.peek().kind {
            TokenKind::Minus => {
                self.advance();
                Ok(AstNode::Neg(Box::new(self.parse_unary()?)))
            }
            TokenKind::Bang => {
                self.advance();
                Ok(AstNode::Not(Box::new(self.parse_unary()?)))
            }
            TokenKind::Amp => {
                self.advance();
                self.parse_capture()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_capture(&mut self) -> PResult<AstNode> {
        // &Mod.fun/arity or &fun/arity
        let target = match self.peek().kind.clone() {
            TokenKind::UpperIdent(module) => {
                self.advance();
                self.expect(TokenKind::Dot)?;
                let function = self.expect_lower_ident()?;
                CaptureTarget::Remote { target: CallTarget::Alias(module), function }
            }
            TokenKind::LowerIdent(name) => {
                self.advance();
                CaptureTarget::Local(name)
            }
            _ => return Err(self.unexpected("expected capture target")),
        };
        self.expect(TokenKind::Slash)?;
        let arity_tok = self.expect_int()?;
        Ok(AstNode::Capture { target, arity: arity_tok as u32 })
    }

    fn expect_lower_ident(&mut self) -> PResult<String> {
        match self.peek().kind.clone() {
            TokenKind::LowerIdent(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("expected identifier")),
        }
    }

    fn expect_int(&mut self) -> PResult<i64> {
        match self.peek().kind.clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(self.unexpected("expected integer")),
        }
    }

    fn parse_primary(&mut self) -> PResult<AstNode> {
        match self.peek().kind.clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(AstNode::IntLit(n))
            }
            TokenKind::Float(n) => {
                self.advance();
                Ok(AstNode::FloatLit(n))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(AstNode::StrLit(s))
            }
            TokenKind::True => {
                self.advance();
                Ok(AstNode::BoolLit(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(AstNode::BoolLit(false))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(AstNode::NilLit)
            }
            TokenKind::If => self.parse_if(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::UpperIdent(module) => {
                self.advance();
                self.expect(TokenKind::Dot)?;
                let function = self.expect_lower_ident()?;
                let args = self.parse_call_args()?;
                Ok(AstNode::Call { target: CallTarget::Alias(module), function, args })
            }
            TokenKind::LowerIdent(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    Ok(AstNode::Local { name, args })
                } else {
                    Ok(AstNode::Var(name))
                }
            }
            _ => Err(self.unexpected("expected an expression")),
        }
    }

    fn parse_call_args(&mut self) -> PResult<Vec<AstNode>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.check(&TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_if(&mut self) -> PResult<AstNode> {
        self.expect(TokenKind::If)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Do)?;
        let then_stmts = self.parse_stmts(&TokenKind::End)?;
        let then_branch = Box::new(AstNode::Block(then_stmts));
        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            let else_stmts = self.parse_stmts(&TokenKind::End)?;
            Some(Box::new(AstNode::Block(else_stmts)))
        } else {
            None
        };
        self.expect(TokenKind::End)?;
        Ok(AstNode::If { cond: Box::new(cond), then_branch, else_branch })
    }
}

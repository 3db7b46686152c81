//! Recursive-descent query parser.
//!
//! Precedence, loosest first: pipe, `or`, `and`, equality, relational,
//! unary, postfix index/slice, primary. Binary levels are left-associative.
//! Fail-fast: the first unexpected token aborts the parse.

use crate::error::SyntaxError;

use super::ast::{BinaryOp, Expr, Literal, UnaryOp};
use super::lexer::{Token, TokenKind};

/// Functions parsed as calls even when written in selector form (`.map(...)`).
const DOTTED_FUNCTIONS: [&str; 4] = ["map", "contains", "startswith", "endswith"];

/// Parses a complete token stream (as produced by [`super::lexer::tokenize`]).
///
/// # Errors
///
/// Returns a syntax error for empty input, dangling pipes or dots, or any
/// token that does not fit the grammar.
pub fn parse(tokens: &[Token]) -> Result<Expr, SyntaxError> {
    let Some(first) = tokens.first() else {
        return Err(SyntaxError {
            message: "empty query".to_string(),
            token: TokenKind::Eof.to_string(),
            offset: 0,
            line: 1,
            column: 1,
        });
    };
    if first.kind == TokenKind::Eof {
        return Err(error_at(first, "empty query"));
    }
    let mut parser = QueryParser { tokens, index: 0 };
    let expr = parser.parse_pipe_expression()?;
    if !parser.at(&TokenKind::Eof) {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

fn error_at(token: &Token, message: impl Into<String>) -> SyntaxError {
    SyntaxError {
        message: message.into(),
        token: token.kind.to_string(),
        offset: token.offset,
        line: token.line,
        column: token.column,
    }
}

// ---------------------------------------------------------------------------
// Parser state
// ---------------------------------------------------------------------------

struct QueryParser<'t> {
    tokens: &'t [Token],
    index: usize,
}

impl<'t> QueryParser<'t> {
    fn peek(&self) -> &'t Token {
        // The stream may lack a trailing Eof when handed in directly; stick on the last token.
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn advance(&mut self) -> &'t Token {
        let token = self.peek();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<(), SyntaxError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(error_at(self.peek(), message))
        }
    }

    fn unexpected(&self) -> SyntaxError {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => error_at(token, "unexpected end of query"),
            _ => error_at(token, "unexpected token"),
        }
    }

    // -----------------------------------------------------------------------
    // Binary levels
    // -----------------------------------------------------------------------

    fn parse_pipe_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_or_expression()?;
        while self.eat(&TokenKind::Pipe) {
            let right = self.parse_or_expression()?;
            left = Expr::Pipe(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_or_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and_expression()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and_expression()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_equality_expression()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_equality_expression()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_relational_expression()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_relational_expression()?;
            left = binary(op, left, right);
        }
    }

    fn parse_relational_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary_expression()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary_expression()?;
            left = binary(op, left, right);
        }
    }

    // -----------------------------------------------------------------------
    // Unary, postfix, primary
    // -----------------------------------------------------------------------

    fn parse_unary_expression(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.peek().kind {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_postfix_expression(),
        };
        self.advance();
        let operand = self.parse_unary_expression()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix_expression(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary_expression()?;
        while self.eat(&TokenKind::LBracket) {
            let start = if self.at(&TokenKind::Colon) {
                None
            } else {
                Some(self.parse_pipe_expression()?)
            };
            expr = if self.eat(&TokenKind::Colon) {
                let end = if self.at(&TokenKind::RBracket) {
                    None
                } else {
                    Some(Box::new(self.parse_pipe_expression()?))
                };
                Expr::Slice {
                    target: Box::new(expr),
                    start: start.map(Box::new),
                    end,
                }
            } else {
                let Some(index) = start else {
                    return Err(self.unexpected());
                };
                Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                }
            };
            self.expect(&TokenKind::RBracket, "expected ']'")?;
        }
        Ok(expr)
    }

    fn parse_primary_expression(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Dot => {
                self.advance();
                let TokenKind::Ident(name) = &self.peek().kind else {
                    return Err(error_at(self.peek(), "expected selector name after '.'"));
                };
                self.advance();
                let args = self.parse_optional_args()?;
                selector(name, args, token)
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Expr::Literal(Literal::String(value.clone())))
            }
            TokenKind::Number(text) => {
                self.advance();
                number(text, token)
            }
            TokenKind::Ident(name) => {
                self.advance();
                match name.as_str() {
                    "true" => Ok(Expr::Literal(Literal::Bool(true))),
                    "false" => Ok(Expr::Literal(Literal::Bool(false))),
                    "null" => Ok(Expr::Literal(Literal::Null)),
                    _ if self.at(&TokenKind::LParen) => {
                        let args = self.parse_args()?;
                        call(name, args, token)
                    }
                    _ => Ok(Expr::Identifier(name.clone())),
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_pipe_expression()?;
                self.expect(&TokenKind::RParen, "expected ')'")?;
                Ok(expr)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_optional_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        if self.at(&TokenKind::LParen) {
            self.parse_args()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.expect(&TokenKind::LParen, "expected '('")?;
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_pipe_expression()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RParen, "expected ',' or ')'")?;
            return Ok(args);
        }
    }
}

// ---------------------------------------------------------------------------
// Node construction
// ---------------------------------------------------------------------------

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn filter(mut args: Vec<Expr>, token: &Token) -> Result<Expr, SyntaxError> {
    match args.pop() {
        Some(predicate) if args.is_empty() => Ok(Expr::Filter(Box::new(predicate))),
        _ => Err(error_at(token, "select expects exactly one predicate")),
    }
}

fn selector(name: &str, args: Vec<Expr>, token: &Token) -> Result<Expr, SyntaxError> {
    match name {
        "select" | "filter" => filter(args, token),
        _ if DOTTED_FUNCTIONS.contains(&name) => Ok(Expr::Function {
            name: name.to_string(),
            args,
        }),
        _ => Ok(Expr::Selector {
            name: name.to_string(),
            args,
        }),
    }
}

fn call(name: &str, args: Vec<Expr>, token: &Token) -> Result<Expr, SyntaxError> {
    match name {
        "select" | "filter" => filter(args, token),
        _ => Ok(Expr::Function {
            name: name.to_string(),
            args,
        }),
    }
}

fn number(text: &str, token: &Token) -> Result<Expr, SyntaxError> {
    let literal = if text.contains('.') {
        text.parse().map(Literal::Float).ok()
    } else {
        text.parse().map(Literal::Int).ok()
    };
    literal
        .map(Expr::Literal)
        .ok_or_else(|| error_at(token, "number out of range"))
}

#[cfg(test)]
#[path = "../tests/parser.rs"]
mod tests;

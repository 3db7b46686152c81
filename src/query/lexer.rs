//! Query tokenizer.
//!
//! Converts a query string into tokens terminated by [`TokenKind::Eof`],
//! stopping at the first error. Positions are tracked for diagnostics:
//! byte offset, 1-based line and 1-based column.

use std::fmt;

use crate::error::LexError;

/// Token category, with payload for literals and identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `.`
    Dot,
    /// `|`
    Pipe,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `-` not followed by a digit.
    Minus,
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// Quoted string with escapes resolved.
    String(String),
    /// Numeric literal as written.
    Number(String),
    /// Identifier.
    Ident(String),
    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Dot => ".",
            Self::Pipe => "|",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Minus => "-",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::String(s) => return write!(f, "string {s:?}"),
            Self::Number(n) => return write!(f, "number {n}"),
            Self::Ident(name) => return write!(f, "identifier {name}"),
            Self::Eof => return f.write_str("end of query"),
        };
        write!(f, "'{symbol}'")
    }
}

/// A token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Category and payload.
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

/// Tokenizes `query`, returning every token through the end-of-input marker.
///
/// # Errors
///
/// Returns the first unterminated string, invalid escape, or stray character.
pub fn tokenize(query: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(query).run()
}

struct Lexer {
    chars: Vec<(usize, char)>,
    len: usize,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(query: &str) -> Self {
        Self {
            chars: query.char_indices().collect(),
            len: query.len(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or(self.len, |&(i, _)| i)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
                self.bump();
            }
            let (offset, line, column) = (self.offset(), self.line, self.column);
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    offset,
                    line,
                    column,
                });
                return Ok(tokens);
            };
            let kind = self.token(c)?;
            tokens.push(Token {
                kind,
                offset,
                line,
                column,
            });
        }
    }

    fn token(&mut self, c: char) -> Result<TokenKind, LexError> {
        let single = match c {
            '.' => Some(TokenKind::Dot),
            '|' => Some(TokenKind::Pipe),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            _ => None,
        };
        if let Some(kind) = single {
            self.bump();
            return Ok(kind);
        }
        match c {
            '=' | '!' => {
                if self.peek_at(1) != Some('=') {
                    return Err(self.error(format!(
                        "unexpected character '{c}', did you mean '{c}='?"
                    )));
                }
                self.bump();
                self.bump();
                Ok(if c == '=' {
                    TokenKind::Eq
                } else {
                    TokenKind::NotEq
                })
            }
            '<' | '>' => {
                self.bump();
                let or_equal = self.peek() == Some('=');
                if or_equal {
                    self.bump();
                }
                Ok(match (c, or_equal) {
                    ('<', false) => TokenKind::Lt,
                    ('<', true) => TokenKind::LtEq,
                    (_, false) => TokenKind::Gt,
                    (_, true) => TokenKind::GtEq,
                })
            }
            '"' | '\'' => self.string(c),
            '-' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => Ok(self.number()),
            '-' => {
                self.bump();
                Ok(TokenKind::Minus)
            }
            c if c.is_ascii_digit() => Ok(self.number()),
            c if c.is_alphabetic() || c == '_' => Ok(self.identifier()),
            c => Err(self.error(format!("unexpected character '{c}'"))),
        }
    }

    fn string(&mut self, quote: char) -> Result<TokenKind, LexError> {
        let start = self.error("unterminated string");
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(start),
                Some('\n') => return Err(self.error("newline in string literal")),
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(TokenKind::String(value));
                }
                Some('\\') => {
                    let escape = self.error("invalid escape");
                    self.bump();
                    let resolved = match self.bump() {
                        None => return Err(start),
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some(c @ ('\\' | '"' | '\'')) => c,
                        Some(other) => {
                            return Err(LexError {
                                message: format!("invalid escape '\\{other}'"),
                                ..escape
                            })
                        }
                    };
                    value.push(resolved);
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        let mut text = String::new();
        if self.peek() == Some('-') {
            self.bump();
            text.push('-');
        }
        self.digits(&mut text);
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            text.push('.');
            self.digits(&mut text);
        }
        TokenKind::Number(text)
    }

    fn digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            self.bump();
            text.push(c);
        }
    }

    fn identifier(&mut self) -> TokenKind {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            self.bump();
            name.push(c);
        }
        match name.as_str() {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            _ => TokenKind::Ident(name),
        }
    }
}

#[cfg(test)]
#[path = "../tests/lexer.rs"]
mod tests;

//! Query syntax tree.

use std::fmt;

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `left | right`: evaluate right with left's result as the current value.
    Pipe(Box<Expr>, Box<Expr>),
    /// `.name` or `.name(args)`.
    Selector {
        /// Selector name.
        name: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },
    /// `select(predicate)` / `filter(predicate)`.
    Filter(Box<Expr>),
    /// Built-in function call such as `map(.text)` or `contains("x")`.
    Function {
        /// Function name.
        name: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },
    /// Binary operator application.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Unary operator application.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Constant.
    Literal(Literal),
    /// Bare name: a bound variable or a property of the current value.
    Identifier(String),
    /// `target[index]`.
    Index {
        /// Indexed expression.
        target: Box<Expr>,
        /// Index expression.
        index: Box<Expr>,
    },
    /// `target[start:end]`, either bound optional.
    Slice {
        /// Sliced expression.
        target: Box<Expr>,
        /// Inclusive start.
        start: Option<Box<Expr>>,
        /// Exclusive end.
        end: Option<Box<Expr>>,
    },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `and`
    And,
    /// `or`
    Or,
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
}

impl BinaryOp {
    /// Operator as written in a query.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation.
    Not,
    /// Numeric negation.
    Neg,
}

/// Literal constants.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Number with a fractional part.
    Float(f64),
    /// Quoted string.
    String(String),
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
    f.write_str("(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipe(left, right) => write!(f, "{left} | {right}"),
            Self::Selector { name, args } => {
                write!(f, ".{name}")?;
                if args.is_empty() {
                    Ok(())
                } else {
                    write_args(f, args)
                }
            }
            Self::Filter(predicate) => write!(f, "select({predicate})"),
            Self::Function { name, args } => {
                f.write_str(name)?;
                write_args(f, args)
            }
            Self::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Self::Unary {
                op: UnaryOp::Not,
                operand,
            } => write!(f, "not {operand}"),
            Self::Unary {
                op: UnaryOp::Neg,
                operand,
            } => write!(f, "-{operand}"),
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::Identifier(name) => f.write_str(name),
            Self::Index { target, index } => write!(f, "{target}[{index}]"),
            Self::Slice { target, start, end } => {
                write!(f, "{target}[")?;
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                f.write_str(":")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

//! Syntax tree of cut expressions

#![allow(missing_docs)]

use crate::numeric::Float;

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}
//
impl BinaryOp {
    /// Apply the operator to two numbers
    pub fn apply(self, a: Float, b: Float) -> Float {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
            BinaryOp::Power => a.powf(b),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}
//
impl CmpOp {
    /// Compare two numbers
    ///
    /// Any comparison involving NaN is false, `!=` included, so that a missing
    /// value never passes a cut by accident.
    ///
    pub fn apply(self, a: Float, b: Float) -> bool {
        match self {
            CmpOp::Less => a < b,
            CmpOp::LessEqual => a <= b,
            CmpOp::Greater => a > b,
            CmpOp::GreaterEqual => a >= b,
            CmpOp::Equal => a == b,
            CmpOp::NotEqual => !a.is_nan() && !b.is_nan() && a != b,
        }
    }
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Xor,
}
//
impl LogicOp {
    /// Combine two truth values
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            LogicOp::And => a && b,
            LogicOp::Or => a || b,
            LogicOp::Xor => a ^ b,
        }
    }
}

/// Elementary functions available in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Exp,
    /// Natural logarithm
    Log,
    Log10,
    Abs,
}
//
impl Function {
    /// Look up a function by the name used in expressions
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Function::Sqrt),
            "exp" => Some(Function::Exp),
            "log" => Some(Function::Log),
            "log10" => Some(Function::Log10),
            "abs" => Some(Function::Abs),
            _ => None,
        }
    }

    /// Name used in expressions
    pub fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Log10 => "log10",
            Function::Abs => "abs",
        }
    }

    /// Evaluate the function (out-of-domain inputs give NaN or infinities)
    pub fn apply(self, x: Float) -> Float {
        match self {
            Function::Sqrt => x.sqrt(),
            Function::Exp => x.exp(),
            Function::Log => x.ln(),
            Function::Log10 => x.log10(),
            Function::Abs => x.abs(),
        }
    }
}

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Float),
    Bool(bool),
    Column(String),
    Negate(Box<Expr>),
    Not(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Comparison chain `first op1 e1 op2 e2 ...`
    Compare {
        first: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
    Logic {
        op: LogicOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        function: Function,
        arg: Box<Expr>,
    },
}
//
impl Expr {
    /// Shorthand for building arithmetic nodes
    pub fn binary(lhs: Expr, op: BinaryOp, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Collect the names of the columns referenced by this expression
    pub fn visit_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) | Expr::Bool(_) => {}
            Expr::Column(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name.as_str())
                }
            }
            Expr::Negate(e) | Expr::Not(e) | Expr::Call { arg: e, .. } => e.visit_columns(out),
            Expr::Binary { lhs, rhs, .. } | Expr::Logic { lhs, rhs, .. } => {
                lhs.visit_columns(out);
                rhs.visit_columns(out);
            }
            Expr::Compare { first, rest } => {
                first.visit_columns(out);
                for (_, e) in rest {
                    e.visit_columns(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::reals::NAN;

    #[test]
    fn nan_never_compares_true() {
        for op in [
            CmpOp::Less,
            CmpOp::LessEqual,
            CmpOp::Greater,
            CmpOp::GreaterEqual,
            CmpOp::Equal,
            CmpOp::NotEqual,
        ] {
            assert!(!op.apply(NAN, 1.), "{op:?}");
            assert!(!op.apply(1., NAN), "{op:?}");
        }
        assert!(CmpOp::NotEqual.apply(1., 2.));
    }

    #[test]
    fn functions_roundtrip_names() {
        for f in [
            Function::Sqrt,
            Function::Exp,
            Function::Log,
            Function::Log10,
            Function::Abs,
        ] {
            assert_eq!(Function::from_name(f.name()), Some(f));
        }
        assert_eq!(Function::Log.apply(1.), 0.);
        assert!(Function::Sqrt.apply(-1.).is_nan());
    }
}

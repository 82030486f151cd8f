//! Column-wise evaluation of expression trees

use super::ast::{CmpOp, Expr, LogicOp};
use crate::{
    error::{CutError, Result},
    numeric::Float,
    scheduling::map_rows,
    table::{Column, EventTable},
};

use std::borrow::Cow;

/// Intermediate result of evaluating a sub-expression
///
/// Constants stay scalar until they meet a column, and column references
/// borrow from the table, so simple predicates do not copy any data.
///
#[derive(Debug, Clone)]
pub enum Value<'t> {
    Scalar(Float),
    Flag(bool),
    Numbers(Cow<'t, [Float]>),
    Mask(Cow<'t, [bool]>),
}
//
impl Value<'_> {
    /// Truth that this value does not vary across rows
    fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_) | Value::Flag(_))
    }

    /// Truth that this value holds booleans
    fn is_boolean(&self) -> bool {
        matches!(self, Value::Flag(_) | Value::Mask(_))
    }

    /// Numeric value at some row (booleans count as 0 or 1)
    fn number_at(&self, row: usize) -> Float {
        match self {
            Value::Scalar(x) => *x,
            Value::Flag(b) => Float::from(u8::from(*b)),
            Value::Numbers(v) => v[row],
            Value::Mask(v) => Float::from(u8::from(v[row])),
        }
    }

    /// Truth value at some row (only meaningful for boolean values)
    fn truth_at(&self, row: usize) -> bool {
        match self {
            Value::Flag(b) => *b,
            Value::Mask(v) => v[row],
            Value::Scalar(_) | Value::Numbers(_) => false,
        }
    }

    /// Turn into a table column of `num_rows` rows
    pub fn into_column(self, num_rows: usize) -> Column {
        match self {
            Value::Scalar(x) => Column::Float(vec![x; num_rows]),
            Value::Flag(b) => Column::Bool(vec![b; num_rows]),
            Value::Numbers(v) => Column::Float(v.into_owned()),
            Value::Mask(v) => Column::Bool(v.into_owned()),
        }
    }
}

/// Evaluation context: the table being read and the source text for errors
pub struct Evaluator<'t, 's> {
    table: &'t EventTable,
    text: &'s str,
}
//
impl<'t, 's> Evaluator<'t, 's> {
    /// Prepare to evaluate expressions over a table
    pub fn new(table: &'t EventTable, text: &'s str) -> Self {
        Self { table, text }
    }

    /// Evaluate an expression tree
    pub fn eval(&self, expr: &Expr) -> Result<Value<'t>> {
        let num_rows = self.table.num_rows();
        match expr {
            Expr::Number(x) => Ok(Value::Scalar(*x)),
            Expr::Bool(b) => Ok(Value::Flag(*b)),
            Expr::Column(name) => Ok(match self.table.column(name)? {
                Column::Float(v) => Value::Numbers(Cow::Borrowed(v)),
                Column::Bool(v) => Value::Mask(Cow::Borrowed(v)),
            }),

            Expr::Negate(operand) => {
                let x = self.eval(operand)?;
                Ok(self.numeric(&x, |row| -x.number_at(row)))
            }

            Expr::Call { function, arg } => {
                let x = self.eval(arg)?;
                Ok(self.numeric(&x, |row| function.apply(x.number_at(row))))
            }

            Expr::Binary { op, lhs, rhs } => {
                let (a, b) = (self.eval(lhs)?, self.eval(rhs)?);
                if a.is_scalar() && b.is_scalar() {
                    return Ok(Value::Scalar(op.apply(a.number_at(0), b.number_at(0))));
                }
                let out = map_rows(num_rows, |row| op.apply(a.number_at(row), b.number_at(row)));
                Ok(Value::Numbers(Cow::Owned(out)))
            }

            Expr::Compare { first, rest } => {
                let mut lhs = self.eval(first)?;
                let mut result: Option<Value<'t>> = None;
                for (op, rhs) in rest {
                    let rhs = self.eval(rhs)?;
                    let step = self.compare(*op, &lhs, &rhs);
                    result = Some(match result {
                        None => step,
                        Some(acc) => self.logic(LogicOp::And, &acc, &step),
                    });
                    lhs = rhs;
                }
                // The parser never produces an empty chain
                Ok(result.unwrap_or(Value::Flag(true)))
            }

            Expr::Not(operand) => {
                let x = self.eval(operand)?;
                self.require_boolean(&x, "'~' applied to a number")?;
                if let Value::Flag(b) = x {
                    return Ok(Value::Flag(!b));
                }
                Ok(Value::Mask(Cow::Owned(map_rows(num_rows, |row| !x.truth_at(row)))))
            }

            Expr::Logic { op, lhs, rhs } => {
                let (a, b) = (self.eval(lhs)?, self.eval(rhs)?);
                self.require_boolean(&a, "logical operator applied to a number")?;
                self.require_boolean(&b, "logical operator applied to a number")?;
                Ok(self.logic(*op, &a, &b))
            }
        }
    }

    /// Evaluate an expression that must produce one truth value per row
    pub fn eval_mask(&self, expr: &Expr) -> Result<Vec<bool>> {
        match self.eval(expr)?.into_column(self.table.num_rows()) {
            Column::Bool(mask) => Ok(mask),
            Column::Float(_) => Err(self.type_error("expression does not yield a truth value")),
        }
    }

    /// Apply a numeric unary kernel, folding scalars
    fn numeric(&self, x: &Value<'t>, kernel: impl Fn(usize) -> Float + Send + Sync) -> Value<'t> {
        if x.is_scalar() {
            Value::Scalar(kernel(0))
        } else {
            Value::Numbers(Cow::Owned(map_rows(self.table.num_rows(), kernel)))
        }
    }

    fn compare(&self, op: CmpOp, a: &Value<'t>, b: &Value<'t>) -> Value<'t> {
        if a.is_scalar() && b.is_scalar() {
            return Value::Flag(op.apply(a.number_at(0), b.number_at(0)));
        }
        let out = map_rows(self.table.num_rows(), |row| {
            op.apply(a.number_at(row), b.number_at(row))
        });
        Value::Mask(Cow::Owned(out))
    }

    fn logic(&self, op: LogicOp, a: &Value<'t>, b: &Value<'t>) -> Value<'t> {
        if a.is_scalar() && b.is_scalar() {
            return Value::Flag(op.apply(a.truth_at(0), b.truth_at(0)));
        }
        let out = map_rows(self.table.num_rows(), |row| {
            op.apply(a.truth_at(row), b.truth_at(row))
        });
        Value::Mask(Cow::Owned(out))
    }

    fn require_boolean(&self, x: &Value<'t>, reason: &'static str) -> Result<()> {
        if x.is_boolean() {
            Ok(())
        } else {
            Err(self.type_error(reason))
        }
    }

    fn type_error(&self, reason: &'static str) -> CutError {
        CutError::Type {
            expression: self.text.to_owned(),
            reason,
        }
    }
}

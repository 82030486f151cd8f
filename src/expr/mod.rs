//! Algebraic expressions over event table columns
//!
//! Cuts are traditionally written down as short expression strings, such as
//! `"(s1 > largest_other_s1) & (s2 > largest_other_s2)"`. This module parses
//! such strings once, at cut construction time, and evaluates them over whole
//! columns at a time.
//!
//! Column names are only resolved when an expression is evaluated, since cuts
//! may reference columns that an earlier preparation step creates.

mod ast;
mod eval;
mod lexer;
mod parser;

use crate::{
    error::{CutError, Result},
    table::{Column, EventTable},
};

use thiserror::Error;

/// Syntax errors in expression strings
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("expected {expected}, found {found} at offset {offset}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("expected {expected}, found end of expression")]
    UnexpectedEnd { expected: &'static str },

    #[error("unknown function '{name}' at offset {offset}")]
    UnknownFunction { name: String, offset: usize },

    #[error("{function}() takes exactly one argument, {found} given")]
    Arity {
        function: &'static str,
        found: usize,
    },
}

/// A parsed expression, along with the text it was parsed from
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// Source text, kept for provenance and error messages
    text: String,

    /// Syntax tree
    ast: ast::Expr,
}
//
impl Expression {
    /// Parse an expression string
    pub fn parse(text: &str) -> Result<Self> {
        let ast = parser::parse(text).map_err(|source| CutError::Parse {
            expression: text.to_owned(),
            source,
        })?;
        Ok(Self {
            text: text.to_owned(),
            ast,
        })
    }

    /// Source text of the expression
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Names of the columns this expression reads, in order of appearance
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.ast.visit_columns(&mut out);
        out
    }

    /// Evaluate into one truth value per event
    pub fn evaluate_mask(&self, table: &EventTable) -> Result<Vec<bool>> {
        eval::Evaluator::new(table, &self.text).eval_mask(&self.ast)
    }

    /// Evaluate into a column, numeric or boolean depending on the expression
    pub fn evaluate(&self, table: &EventTable) -> Result<Column> {
        let value = eval::Evaluator::new(table, &self.text).eval(&self.ast)?;
        Ok(value.into_column(table.num_rows()))
    }
}

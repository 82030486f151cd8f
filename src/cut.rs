//! The unit of event selection
//!
//! A cut reads some columns of an [`EventTable`] and adds one boolean column,
//! named after the cut, telling which events pass. Cuts never drop events.
//!
//! Evaluation happens in three steps, which [`Cut::run`] chains together:
//!
//! * `prepare` computes derived quantities the predicate needs (a radius, a
//!   p-value...), possibly into the scratch column [`TEMP_COLUMN`]
//! * `evaluate` computes the pass/fail column itself
//! * `finalize` cleans up, by default removing the scratch column so that
//!   sibling cuts cannot trip on each other's intermediate results

use crate::{
    error::Result,
    expr::Expression,
    numeric::Float,
    table::EventTable,
};

use std::fmt;

/// Name of the scratch column shared by all cuts
pub const TEMP_COLUMN: &str = "temp";

/// Version of a cut definition
///
/// Versions are provenance only: they tell which definition produced a given
/// pass/fail column, but are never used to pick behaviour at run time.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Version {
    /// Plain revision number, as most cuts use
    Integer(i32),

    /// Decimal revision number
    Decimal(Float),

    /// Library release, as used by cut sets
    Release(&'static str),
}
//
impl Version {
    /// Version of this library, which cut sets are stamped with
    pub const LIBRARY: Version = Version::Release(env!("CARGO_PKG_VERSION"));
}

impl From<i32> for Version {
    fn from(v: i32) -> Self {
        Version::Integer(v)
    }
}

impl From<Float> for Version {
    fn from(v: Float) -> Self {
        Version::Decimal(v)
    }
}

impl From<&'static str> for Version {
    fn from(v: &'static str) -> Self {
        Version::Release(v)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Integer(v) => write!(f, "{v}"),
            // Debug formatting keeps the trailing ".0" of round decimals
            Version::Decimal(v) => write!(f, "{v:?}"),
            Version::Release(v) => write!(f, "{v}"),
        }
    }
}

/// Identity of a cut: output column name, version, and description
#[derive(Debug, Clone, PartialEq)]
pub struct CutId {
    name: String,
    version: Version,
    doc: &'static str,
}
//
impl CutId {
    /// Identify a cut from its short identifier, e.g. `S2Threshold`
    ///
    /// The output column is called `Cut<identifier>`.
    ///
    pub fn new(identifier: &str, version: impl Into<Version>) -> Self {
        Self {
            name: format!("Cut{identifier}"),
            version: version.into(),
            doc: "",
        }
    }

    /// Output column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version of the definition
    pub fn version(&self) -> Version {
        self.version
    }

    /// Free-form description (physics rationale, contact, reference note)
    pub fn doc(&self) -> &'static str {
        self.doc
    }

    /// Attach a description
    pub fn with_doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    /// Same definition under a new version number
    pub fn with_version(mut self, version: impl Into<Version>) -> Self {
        self.version = version.into();
        self
    }
}

/// An event selection criterion
pub trait Cut: fmt::Debug {
    /// Identity of the cut
    fn id(&self) -> &CutId;

    /// Name of the boolean column produced by this cut
    fn name(&self) -> &str {
        self.id().name()
    }

    /// Version of the definition
    fn version(&self) -> Version {
        self.id().version()
    }

    /// Nested cuts, for cuts that are made of other cuts
    fn members(&self) -> &[Box<dyn Cut>] {
        &[]
    }

    /// Compute the quantities that `evaluate` needs
    ///
    /// Only adds columns (or refreshes columns this cut derived earlier).
    ///
    fn prepare(&self, _table: &mut EventTable) -> Result<()> {
        Ok(())
    }

    /// Add the pass/fail column named after this cut
    fn evaluate(&self, table: &mut EventTable) -> Result<()>;

    /// Clean up after evaluation
    fn finalize(&self, table: &mut EventTable) -> Result<()> {
        table.remove(TEMP_COLUMN);
        Ok(())
    }

    /// Apply the cut: prepare, evaluate, then finalize
    ///
    /// Running a cut again recomputes its column and overwrites the previous
    /// one with identical values, given identical inputs.
    ///
    fn run(&self, table: &mut EventTable) -> Result<()> {
        self.prepare(table)?;
        self.evaluate(table)?;
        self.finalize(table)
    }
}

/// A column computed from an expression during a cut's preparation step
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedColumn {
    /// Name of the column to be written
    pub column: String,

    /// How it is computed
    pub expression: Expression,
}
//
impl DerivedColumn {
    /// Parse the expression of a derived column
    pub fn new(column: &str, expression: &str) -> Result<Self> {
        Ok(Self {
            column: column.to_owned(),
            expression: Expression::parse(expression)?,
        })
    }

    /// Compute the column and add it to the table
    pub fn apply(&self, table: &mut EventTable) -> Result<()> {
        let values = self.expression.evaluate(table)?;
        table.insert(self.column.as_str(), values)
    }
}

/// Compute a list of derived columns, in order
pub fn apply_all(derived: &[DerivedColumn], table: &mut EventTable) -> Result<()> {
    derived.iter().try_for_each(|d| d.apply(table))
}

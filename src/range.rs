//! Cuts keeping one variable within an open interval

use crate::{
    cut::{self, Cut, CutId, DerivedColumn},
    error::{CutError, Result},
    numeric::Float,
    scheduling::map_rows,
    table::EventTable,
};

/// Cut on `lo < variable < hi`
///
/// Both bounds are exclusive, and NaN values fail the cut. The variable may be
/// a column computed by the cut itself during preparation, see
/// [`RangeCut::derive`].
///
#[derive(Debug, Clone)]
pub struct RangeCut {
    id: CutId,
    variable: Option<String>,
    allowed_range: Option<(Float, Float)>,
    derived: Vec<DerivedColumn>,
}
//
impl RangeCut {
    /// Start defining a range cut, to be completed by [`Self::variable`] and
    /// [`Self::allowed_range`]
    pub fn new(identifier: &str, version: impl Into<cut::Version>) -> Self {
        Self {
            id: CutId::new(identifier, version),
            variable: None,
            allowed_range: None,
            derived: Vec::new(),
        }
    }

    /// Select the column to be tested
    pub fn variable(mut self, name: &str) -> Self {
        self.variable = Some(name.to_owned());
        self
    }

    /// Set the exclusive bounds of the accepted interval
    pub fn allowed_range(mut self, lo: Float, hi: Float) -> Self {
        self.allowed_range = Some((lo, hi));
        self
    }

    /// Compute an extra column during preparation
    pub fn derive(mut self, column: &str, expression: &str) -> Result<Self> {
        self.derived.push(DerivedColumn::new(column, expression)?);
        Ok(self)
    }

    /// Attach a description
    pub fn with_doc(mut self, doc: &'static str) -> Self {
        self.id = self.id.with_doc(doc);
        self
    }

    /// Tested column, if configured
    pub fn variable_name(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    /// Accepted interval, if configured
    pub fn range(&self) -> Option<(Float, Float)> {
        self.allowed_range
    }

    fn not_configured(&self, what: &'static str) -> CutError {
        CutError::NotConfigured {
            cut: self.id.name().to_owned(),
            what,
        }
    }
}
//
impl Cut for RangeCut {
    fn id(&self) -> &CutId {
        &self.id
    }

    fn prepare(&self, table: &mut EventTable) -> Result<()> {
        cut::apply_all(&self.derived, table)
    }

    fn evaluate(&self, table: &mut EventTable) -> Result<()> {
        let variable = self
            .variable
            .as_deref()
            .ok_or_else(|| self.not_configured("no variable to cut on"))?;
        let (lo, hi) = self
            .allowed_range
            .ok_or_else(|| self.not_configured("no allowed range"))?;
        // NaN bounds are rejected here too
        if !(lo <= hi) {
            return Err(self.not_configured("allowed range has lo > hi"));
        }

        let values = table.floats(variable)?;
        let pass = map_rows(values.len(), |row| lo < values[row] && values[row] < hi);
        table.insert(self.id.name(), pass)
    }
}

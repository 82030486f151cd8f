//! Cuts defined by a boolean expression over table columns

use crate::{
    cut::{self, Cut, CutId, DerivedColumn, Version},
    error::Result,
    expr::Expression,
    table::EventTable,
};

/// Cut passing the events for which an expression is true
///
/// The expression is parsed on construction, so that typos in a catalog are
/// caught when the cut set is built, while column names are only resolved
/// when the cut is run.
///
#[derive(Debug, Clone)]
pub struct ExpressionCut {
    id: CutId,
    expression: Expression,
    derived: Vec<DerivedColumn>,
}
//
impl ExpressionCut {
    /// Define a cut from its identifier, version and expression string
    pub fn new(identifier: &str, version: impl Into<Version>, expression: &str) -> Result<Self> {
        Ok(Self {
            id: CutId::new(identifier, version),
            expression: Expression::parse(expression)?,
            derived: Vec::new(),
        })
    }

    /// Compute an extra column during preparation, before the predicate
    ///
    /// Derived columns are computed in the order they were declared, and may
    /// reuse each other.
    ///
    pub fn derive(mut self, column: &str, expression: &str) -> Result<Self> {
        self.derived.push(DerivedColumn::new(column, expression)?);
        Ok(self)
    }

    /// Attach a description
    pub fn with_doc(mut self, doc: &'static str) -> Self {
        self.id = self.id.with_doc(doc);
        self
    }

    /// Source text of the predicate
    pub fn expression(&self) -> &str {
        self.expression.text()
    }

    /// Columns computed during preparation
    pub fn derived(&self) -> &[DerivedColumn] {
        &self.derived
    }
}
//
impl Cut for ExpressionCut {
    fn id(&self) -> &CutId {
        &self.id
    }

    fn prepare(&self, table: &mut EventTable) -> Result<()> {
        cut::apply_all(&self.derived, table)
    }

    fn evaluate(&self, table: &mut EventTable) -> Result<()> {
        let pass = self.expression.evaluate_mask(table)?;
        table.insert(self.id.name(), pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cut::TEMP_COLUMN, error::CutError, numeric::reals::NAN, table::Column};

    #[test]
    fn interaction_exists() {
        let mut table = EventTable::from_columns([("cs1", vec![-1., 0., 1., 200.])]).unwrap();
        let cut = ExpressionCut::new("InteractionExists", 0, "0 < cs1").unwrap();
        cut.run(&mut table).unwrap();
        assert_eq!(
            table.bools("CutInteractionExists").unwrap(),
            &[false, false, true, true]
        );
        assert_eq!(cut.expression(), "0 < cs1");
        assert_eq!(cut.version(), Version::Integer(0));
    }

    #[test]
    fn derived_columns_feed_the_predicate() {
        let mut table =
            EventTable::from_columns([("x", vec![3., 30.]), ("y", vec![4., 40.])]).unwrap();
        let cut = ExpressionCut::new("Inside", 1, "r < 10")
            .unwrap()
            .derive("r", "sqrt(x*x + y*y)")
            .unwrap();
        cut.run(&mut table).unwrap();
        assert_eq!(table.floats("r").unwrap(), &[5., 50.]);
        assert_eq!(table.bools("CutInside").unwrap(), &[true, false]);
        assert_eq!(cut.derived().len(), 1);
    }

    #[test]
    fn scratch_column_is_dropped() {
        let mut table = EventTable::from_columns([
            ("s1", vec![4., 4.]),
            ("s1_pattern_fit", vec![1., 100.]),
        ])
        .unwrap();
        let cut = ExpressionCut::new("Pattern", 0, "s1_pattern_fit < temp")
            .unwrap()
            .derive(TEMP_COLUMN, "10 * s1 ** 0.5")
            .unwrap();
        cut.run(&mut table).unwrap();
        assert_eq!(table.bools("CutPattern").unwrap(), &[true, false]);
        assert!(!table.contains(TEMP_COLUMN));
    }

    #[test]
    fn rerunning_overwrites_identically() {
        let mut table = EventTable::from_columns([("s2", vec![100., 200., NAN])]).unwrap();
        let cut = ExpressionCut::new("S2Threshold", 0, "200 < s2").unwrap();
        cut.run(&mut table).unwrap();
        let first = table.column("CutS2Threshold").unwrap().clone();
        cut.run(&mut table).unwrap();
        assert_eq!(table.column("CutS2Threshold").unwrap(), &first);
        assert_eq!(first, Column::Bool(vec![false, false, false]));
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["s2", "CutS2Threshold"]);
    }

    #[test]
    fn errors() {
        assert!(matches!(
            ExpressionCut::new("Broken", 0, "s2 >"),
            Err(CutError::Parse { .. })
        ));

        let mut table = EventTable::from_columns([("s2", vec![1.])]).unwrap();
        let cut = ExpressionCut::new("Missing", 0, "s2 > largest_other_s2").unwrap();
        assert!(matches!(
            cut.run(&mut table),
            Err(CutError::UnresolvedColumn { .. })
        ));
        let cut = ExpressionCut::new("Numeric", 0, "s2 * 2").unwrap();
        assert!(matches!(cut.run(&mut table), Err(CutError::Type { .. })));
        assert!(!table.contains("CutNumeric"));
    }
}

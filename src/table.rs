//! Column-oriented storage for reconstructed events
//!
//! An [`EventTable`] is what every cut reads from and writes to. Each row is
//! an event and each column a named feature. Cuts add columns and may replace
//! their own, but the number and order of rows is fixed at construction.

use crate::{
    error::{CutError, Result},
    numeric::Float,
};

/// A single named feature, stored for all events
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric feature (energies, positions, times...)
    Float(Vec<Float>),

    /// Pass/fail flag or other boolean feature
    Bool(Vec<bool>),
}
//
impl Column {
    /// Number of events covered by this column
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Bool(v) => v.len(),
        }
    }

    /// Whether this column is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable name of the data type, for error reporting
    pub fn type_name(&self) -> &'static str {
        match self {
            Column::Float(_) => "numeric",
            Column::Bool(_) => "boolean",
        }
    }

    /// Keep only the rows selected by a mask of the same length
    fn select(&self, mask: &[bool]) -> Self {
        fn pick<T: Copy>(data: &[T], mask: &[bool]) -> Vec<T> {
            data.iter()
                .zip(mask)
                .filter_map(|(&x, &keep)| keep.then_some(x))
                .collect()
        }
        match self {
            Column::Float(v) => Column::Float(pick(v, mask)),
            Column::Bool(v) => Column::Bool(pick(v, mask)),
        }
    }
}

impl From<Vec<Float>> for Column {
    fn from(v: Vec<Float>) -> Self {
        Column::Float(v)
    }
}

impl From<Vec<bool>> for Column {
    fn from(v: Vec<bool>) -> Self {
        Column::Bool(v)
    }
}

/// In-memory table of events
///
/// Columns are kept in insertion order, which makes debugging output and
/// column listings stable across runs.
///
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    /// Number of events (rows)
    num_rows: usize,

    /// Named columns, in insertion order
    columns: Vec<(String, Column)>,
}
//
impl EventTable {
    /// Create a table of `num_rows` events without any feature yet
    pub fn new(num_rows: usize) -> Self {
        Self {
            num_rows,
            columns: Vec::new(),
        }
    }

    /// Build a table from a set of named columns
    ///
    /// The row count is taken from the first column, and every other column
    /// must agree with it. A table without columns has no rows.
    ///
    pub fn from_columns<N, C>(columns: impl IntoIterator<Item = (N, C)>) -> Result<Self>
    where
        N: Into<String>,
        C: Into<Column>,
    {
        let mut table: Option<Self> = None;
        for (name, column) in columns {
            let column = column.into();
            let num_rows = column.len();
            table
                .get_or_insert_with(|| Self::new(num_rows))
                .insert(name, column)?;
        }
        Ok(table.unwrap_or_else(|| Self::new(0)))
    }

    /// Number of events in the table
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Whether the table holds no event
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Names of the columns, in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Truth that a column of this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Access a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.position(name)
            .map(|idx| &self.columns[idx].1)
            .ok_or_else(|| CutError::UnresolvedColumn {
                column: name.to_owned(),
            })
    }

    /// Access a numeric column by name
    pub fn floats(&self, name: &str) -> Result<&[Float]> {
        match self.column(name)? {
            Column::Float(v) => Ok(v),
            other => Err(CutError::ColumnType {
                column: name.to_owned(),
                expected: "numeric",
                found: other.type_name(),
            }),
        }
    }

    /// Access a boolean column by name
    pub fn bools(&self, name: &str) -> Result<&[bool]> {
        match self.column(name)? {
            Column::Bool(v) => Ok(v),
            other => Err(CutError::ColumnType {
                column: name.to_owned(),
                expected: "boolean",
                found: other.type_name(),
            }),
        }
    }

    /// Add a column, or replace the existing column of the same name
    ///
    /// A replaced column keeps its position in the column order.
    ///
    pub fn insert(&mut self, name: impl Into<String>, column: impl Into<Column>) -> Result<()> {
        let name = name.into();
        let column = column.into();
        if column.len() != self.num_rows {
            return Err(CutError::LengthMismatch {
                column: name,
                expected: self.num_rows,
                found: column.len(),
            });
        }
        match self.position(&name) {
            Some(idx) => self.columns[idx].1 = column,
            None => self.columns.push((name, column)),
        }
        Ok(())
    }

    /// Remove a column, returning it if it was present
    pub fn remove(&mut self, name: &str) -> Option<Column> {
        self.position(name).map(|idx| self.columns.remove(idx).1)
    }

    /// Number of events for which a boolean column is true
    pub fn count_true(&self, name: &str) -> Result<usize> {
        Ok(self.bools(name)?.iter().filter(|&&pass| pass).count())
    }

    /// Build a new table holding only the rows selected by `mask`
    ///
    /// Cuts never do this, since they only annotate events. It exists for
    /// display-oriented collaborators that want to look at a subset.
    ///
    pub fn select_rows(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.num_rows {
            return Err(CutError::LengthMismatch {
                column: "<row mask>".to_owned(),
                expected: self.num_rows,
                found: mask.len(),
            });
        }
        Ok(Self {
            num_rows: mask.iter().filter(|&&keep| keep).count(),
            columns: self
                .columns
                .iter()
                .map(|(name, col)| (name.clone(), col.select(mask)))
                .collect(),
        })
    }

    /// Index of a column in the column list
    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EventTable {
        EventTable::from_columns([
            ("cs1", Column::from(vec![1., 2., 3.])),
            ("flag", Column::from(vec![true, false, true])),
        ])
        .unwrap()
    }

    #[test]
    fn from_columns_checks_lengths() {
        let table = sample();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["cs1", "flag"]);

        let err = EventTable::from_columns([
            ("a", Column::from(vec![1., 2.])),
            ("b", Column::from(vec![1.])),
        ])
        .unwrap_err();
        assert!(matches!(err, CutError::LengthMismatch { expected: 2, found: 1, .. }));

        let empty = EventTable::from_columns(Vec::<(String, Column)>::new()).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.num_columns(), 0);
    }

    #[test]
    fn typed_access() {
        let table = sample();
        assert_eq!(table.floats("cs1").unwrap(), &[1., 2., 3.]);
        assert_eq!(table.bools("flag").unwrap(), &[true, false, true]);
        assert!(matches!(
            table.floats("flag"),
            Err(CutError::ColumnType { expected: "numeric", .. })
        ));
        assert!(matches!(
            table.bools("nope"),
            Err(CutError::UnresolvedColumn { ref column }) if column == "nope"
        ));
        assert_eq!(table.count_true("flag").unwrap(), 2);
    }

    #[test]
    fn replacing_keeps_position() {
        let mut table = sample();
        table.insert("extra", vec![0., 0., 0.]).unwrap();
        table.insert("cs1", vec![false, false, true]).unwrap();
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            ["cs1", "flag", "extra"]
        );
        assert_eq!(table.bools("cs1").unwrap(), &[false, false, true]);
        assert!(table.insert("short", vec![1.]).is_err());
    }

    #[test]
    fn remove_and_select() {
        let mut table = sample();
        assert!(table.remove("flag").is_some());
        assert!(table.remove("flag").is_none());
        assert!(!table.contains("flag"));

        let subset = table.select_rows(&[true, false, true]).unwrap();
        assert_eq!(subset.num_rows(), 2);
        assert_eq!(subset.floats("cs1").unwrap(), &[1., 3.]);
        assert!(table.select_rows(&[true]).is_err());
    }
}

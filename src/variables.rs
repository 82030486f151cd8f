//! Registry of the event features that cut acceptance is usually shown for,
//! along with the window in which each of them is worth looking at

use crate::{
    error::Result,
    numeric::Float,
    scheduling::map_rows,
    table::EventTable,
};

/// A named event feature and its display window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    /// Column name
    pub name: &'static str,

    /// Inclusive display window (low, high)
    pub range: (Float, Float),
}

/// All registered variables, most commonly used first
pub const VARIABLES: [Variable; 13] = [
    var("r", 0., 50.),
    var("z", -100., 0.),
    var("s1", 0., 100.),
    var("s2", 0., 1e4),
    var("cs1", 0., 100.),
    var("cs2", 0., 1000.),
    var("largest_other_s1", 0., 100.),
    var("largest_other_s2", 0., 500.),
    var("s1_range_50p_area", 0., 10_000.),
    var("s2_range_50p_area", 0., 100_000.),
    var("s1_area_fraction_top", 0., 1.),
    var("s2_area_fraction_top", 0.4, 0.9),
    var("area_before_main_s2", 0., 2000.),
];

/// Number of variables that are shown when not in verbose mode
const NUM_ESSENTIAL: usize = 4;

const fn var(name: &'static str, lo: Float, hi: Float) -> Variable {
    Variable {
        name,
        range: (lo, hi),
    }
}

/// Registered variables: all of them in verbose mode, else the position and
/// raw signal sizes only
pub fn get_variables(verbose: bool) -> &'static [Variable] {
    if verbose {
        &VARIABLES
    } else {
        &VARIABLES[..NUM_ESSENTIAL]
    }
}

/// Look up a variable by column name
pub fn lookup(name: &str) -> Option<&'static Variable> {
    VARIABLES.iter().find(|v| v.name == name)
}

/// Truth that each event lies within the window of every listed variable
///
/// Window bounds are inclusive. NaN values are outside of any window.
///
pub fn window_mask(table: &EventTable, variables: &[Variable]) -> Result<Vec<bool>> {
    let mut mask = vec![true; table.num_rows()];
    for variable in variables {
        let (lo, hi) = variable.range;
        let values = table.floats(variable.name)?;
        mask = map_rows(mask.len(), |row| {
            mask[row] && lo <= values[row] && values[row] <= hi
        });
    }
    Ok(mask)
}

/// Keep only the events lying within the window of every listed variable,
/// and if `squash` is set, only the columns of these variables
pub fn reduce(table: &EventTable, variables: &[Variable], squash: bool) -> Result<EventTable> {
    let mask = window_mask(table, variables)?;
    let selected = table.select_rows(&mask)?;
    if !squash {
        return Ok(selected);
    }
    let columns = variables
        .iter()
        .map(|v| Ok((v.name, selected.column(v.name)?.clone())))
        .collect::<Result<Vec<_>>>()?;
    let mut squashed = EventTable::new(selected.num_rows());
    for (name, column) in columns {
        squashed.insert(name, column)?;
    }
    Ok(squashed)
}

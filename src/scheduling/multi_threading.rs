//! Multi-threaded back-end of the column computations

use crate::scheduling::MIN_ROWS_PER_TASK;

use rayon::prelude::*;

/// Compute per-row values in multi-threaded mode
///
/// Rows are split into contiguous chunks of at least `MIN_ROWS_PER_TASK`
/// rows. Since every value only depends on its own row, the output does not
/// depend on how rows were distributed across threads.
///
pub fn map_rows_impl<T, F>(num_rows: usize, kernel: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    (0..num_rows)
        .into_par_iter()
        .with_min_len(MIN_ROWS_PER_TASK)
        .map(kernel)
        .collect()
}

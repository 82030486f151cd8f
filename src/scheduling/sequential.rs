//! Sequential back-end of the column computations

/// Compute per-row values in sequential mode
pub fn map_rows_impl<T, F>(num_rows: usize, kernel: F) -> Vec<T>
where
    F: Fn(usize) -> T,
{
    (0..num_rows).map(kernel).collect()
}

//! This module takes care of scheduling column computations, encapsulating use
//! of multiple threads behind a single row-kernel interface

#[cfg(feature = "multi-threading")]
mod multi_threading;
#[cfg(not(feature = "multi-threading"))]
mod sequential;

/// Minimal number of rows handled by one parallel task
///
/// Per-row kernels are cheap (a handful of floating-point operations), so
/// tasks must cover a fair amount of rows to amortize scheduling overhead.
/// This only affects performance, never results.
///
#[cfg_attr(not(feature = "multi-threading"), allow(dead_code))]
const MIN_ROWS_PER_TASK: usize = 4_096;

/// Compute one value per row, in the manner that was configured at build time
///
/// The kernel receives a row index and must only depend on that row's data.
/// Results are returned in row order, and are bit-identical whether or not
/// the computation was spread across threads.
///
pub fn map_rows<T, F>(num_rows: usize, kernel: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    // ...in sequential mode
    #[cfg(not(feature = "multi-threading"))]
    {
        sequential::map_rows_impl(num_rows, kernel)
    }

    // ...in multi-threaded mode
    #[cfg(feature = "multi-threading")]
    {
        multi_threading::map_rows_impl(num_rows, kernel)
    }
}

/// Combine two columns element-wise
pub fn zip_with<A, B, T, F>(a: &[A], b: &[B], kernel: F) -> Vec<T>
where
    A: Sync,
    B: Sync,
    T: Send,
    F: Fn(&A, &B) -> T + Send + Sync,
{
    debug_assert_eq!(a.len(), b.len(), "Columns should have the same length");
    map_rows(a.len().min(b.len()), |row| kernel(&a[row], &b[row]))
}

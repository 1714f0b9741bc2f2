pub(crate) mod background;
pub(crate) mod fringe;

use rayon::prelude::*;

/// Apply `f(y, row)` to every `row_bytes`-wide row of `buf`, summing the returned counts.
///
/// With `parallel` set the rows are spread over the current rayon pool. `f` only ever sees
/// its own row mutably, so any cross-row reads must come from a snapshot taken beforehand.
pub(crate) fn for_each_row<F>(buf: &mut [u8], row_bytes: usize, parallel: bool, f: F) -> usize
where
    F: Fn(usize, &mut [u8]) -> usize + Sync + Send,
{
    if row_bytes == 0 {
        return 0;
    }
    if parallel {
        buf.par_chunks_exact_mut(row_bytes)
            .enumerate()
            .map(|(y, row)| f(y, row))
            .sum()
    } else {
        buf.chunks_exact_mut(row_bytes)
            .enumerate()
            .map(|(y, row)| f(y, row))
            .sum()
    }
}

use crate::foundation::error::{ReelError, ReelResult};
use rayon::prelude::*;

/// Build the bounded pool used for independent per-image work.
pub(crate) fn build_thread_pool(threads: usize) -> ReelResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("slidereel-worker-{i}"))
        .build()
        .map_err(|e| ReelError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

/// Map `f` over `items` on at most `threads` workers, keeping input order.
///
/// The first error (in input order) wins; every item is still attempted.
pub(crate) fn bounded_map<I, T, F>(threads: usize, items: &[I], f: F) -> ReelResult<Vec<T>>
where
    I: Sync,
    T: Send,
    F: Fn(&I) -> ReelResult<T> + Sync,
{
    if items.len() <= 1 || threads <= 1 {
        return items.iter().map(&f).collect();
    }
    let pool = build_thread_pool(threads.min(items.len()))?;
    let results: Vec<ReelResult<T>> = pool.install(|| items.par_iter().map(&f).collect());
    results.into_iter().collect()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/pool.rs"]
mod tests;

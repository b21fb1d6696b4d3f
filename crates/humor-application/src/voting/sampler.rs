//! Uniform sampling without replacement.

use rand::Rng;

/// Draws up to `count` items from `pool`, each with equal probability.
///
/// Runs a partial Fisher-Yates pass over the first `count` slots, so the cost
/// is proportional to the sample rather than to the pool. When the pool holds
/// fewer than `count` items all of them are returned, in random order.
pub fn sample_without_replacement<T, R>(mut pool: Vec<T>, count: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    let take = count.min(pool.len());
    for i in 0..take {
        let j = rng.gen_range(i..pool.len());
        pool.swap(i, j);
    }
    pool.truncate(take);
    pool
}

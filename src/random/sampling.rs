//! Uniform sampling from iterators of known length. The herd uses these for picking a mate,
//! drawing the surveillance sample and choosing who gets vaccinated.

use rand::seq::index::sample as choose_range;
use rand::Rng;

/// Sample a random element uniformly from a container of known length.
///
/// The container need not be randomly indexable, only iterable.
pub fn sample_single_from_known_length<I, R, T>(rng: &mut R, mut iter: I) -> Option<T>
where
    R: Rng,
    I: ExactSizeIterator<Item = T>,
{
    let len = iter.len();
    if len == 0 {
        return None;
    }
    // Drawing a `u32` index is measurably faster than a `usize` one.
    let index = rng.random_range(0..len as u32) as usize;
    iter.nth(index)
}

/// Sample `requested` elements uniformly without replacement from a container of known length.
/// If more are requested than the container holds, every element is returned.
///
/// Selected elements keep the container's iteration order. Exactly one index draw is made
/// (none when `requested` is zero or the container is empty), so the number of values consumed
/// from `rng` does not depend on which elements get picked.
pub fn sample_multiple_from_known_length<I, R, T>(rng: &mut R, iter: I, requested: usize) -> Vec<T>
where
    R: Rng,
    I: ExactSizeIterator<Item = T>,
{
    let len = iter.len();
    let requested = requested.min(len);
    if requested == 0 {
        return Vec::new();
    }

    let mut indexes = choose_range(rng, len, requested).into_vec();
    indexes.sort_unstable();
    let mut index_iterator = indexes.into_iter();
    let mut next_idx = index_iterator.next();
    let mut selected = Vec::with_capacity(requested);

    for (idx, item) in iter.enumerate() {
        if Some(idx) == next_idx {
            selected.push(item);
            next_idx = index_iterator.next();
            if next_idx.is_none() {
                break;
            }
        }
    }

    selected
}

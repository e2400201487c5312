/// Stochastic mechanics: uniform index draws, picks and permutations.
/// Note: uses `bevy_prng::WyRand` behind `&RefCell<>` so the trainer and its
/// sessions can share one seeded generator through an `Rc`.
use bevy_prng::WyRand;
use rand_core::RngCore;
use std::cell::RefCell;

/// Uniform index in `0..n` via widening multiply. `n <= 1` yields 0.
#[inline]
pub fn below(rng: &RefCell<WyRand>, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let x = rng.borrow_mut().next_u64();
    ((x as u128 * n as u128) >> 64) as usize
}

/// Uniform pick from a slice.
#[inline]
pub fn choose<'a, T>(rng: &RefCell<WyRand>, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(below(rng, items.len()))
}

/// Fisher–Yates, in place.
pub fn shuffle_in_place<T>(rng: &RefCell<WyRand>, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = below(rng, i + 1);
        items.swap(i, j);
    }
}

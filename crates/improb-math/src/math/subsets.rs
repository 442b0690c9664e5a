//! Bitmask combinatorics over finite index sets.
//!
//! A subset of `{0, .., n-1}` is a `u64` whose bit `i` marks membership, so
//! spaces are limited to [`MAX_ELEMENTS`] elements.

/// Largest index set representable as a `u64` mask.
pub const MAX_ELEMENTS: usize = 64;

/// Mask with the lowest `n` bits set.
pub fn full_mask(n: usize) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

pub fn popcount(mask: u64) -> usize {
    mask.count_ones() as usize
}

/// Indices of the set bits, ascending.
pub fn bits(mask: u64) -> impl Iterator<Item = usize> {
    let mut rest = mask;
    std::iter::from_fn(move || {
        if rest == 0 {
            return None;
        }
        let idx = rest.trailing_zeros() as usize;
        rest &= rest - 1;
        Some(idx)
    })
}

/// Every sub-mask of `mask`, ascending by value (so `0` first, `mask` last).
pub fn submasks(mask: u64) -> impl Iterator<Item = u64> {
    let mut next = Some(0u64);
    std::iter::from_fn(move || {
        let current = next?;
        next = if current == mask {
            None
        } else {
            Some(current.wrapping_sub(mask) & mask)
        };
        Some(current)
    })
}

/// Every sub-mask of `mask`, ordered by popcount then value.
pub fn subsets_of(mask: u64) -> Vec<u64> {
    let mut subs: Vec<u64> = submasks(mask).collect();
    subs.sort_by_key(|s| (s.count_ones(), *s));
    subs
}

/// All masks over `n` elements ordered by popcount then value.
pub fn masks_by_size(n: usize) -> Vec<u64> {
    subsets_of(full_mask(n))
}

/// All sub-masks of `mask` with exactly `size` elements, ascending by value.
pub fn submasks_of_size(mask: u64, size: usize) -> impl Iterator<Item = u64> {
    submasks(mask).filter(move |s| popcount(*s) == size)
}

/// Lexicographic `k`-combinations of `0..n`, as index vectors.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Combinations {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();
        let k = self.indices.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] < self.n - k + i {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }
        Some(current)
    }
}

/// `k`-combinations of a slice, cloned.
pub fn combinations<T: Clone>(items: &[T], k: usize) -> impl Iterator<Item = Vec<T>> + '_ {
    Combinations::new(items.len(), k).map(move |idx| idx.into_iter().map(|i| items[i].clone()).collect())
}

//! # Candidate enumeration
//!
//! Walks all `k`-subsets of `n` ranked variables and, for each subset, the axis
//! orderings worth scoring. The smallest index of a subset stays first (the
//! anchor); the remaining `k − 1` indices run through their permutations in
//! lexicographic order, of which only the first half is produced, since the
//! second half mirrors orderings already seen.
//!
//! Subsets are visited as a `k`-digit counter whose least significant digit is
//! the first one: `{0,1,2}, {0,1,3}, {0,2,3}, {1,2,3}, {0,1,4}, ...`.

use crate::error::{Result, VizRankError};

/// An ordered tuple of indices into the ranked variable list.
pub type CandidateState = Vec<usize>;

fn factorial(n: usize) -> Option<u128> {
    (1..=n as u128).try_fold(1u128, |acc, i| acc.checked_mul(i))
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `C(n, k)`, or `None` when it does not fit in a `u128`.
fn binomial(n: usize, k: usize) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result = 1u128;
    for i in 0..k {
        // result · (n − i) is divisible by (i + 1); divide first so the
        // intermediate never exceeds the next binomial.
        let (num, den) = ((n - i) as u128, (i + 1) as u128);
        let g = gcd(result, den);
        result = (result / g).checked_mul(num / (den / g))?;
    }
    Some(result)
}

/// Orderings produced per subset: half of the `(k − 1)!` tail permutations,
/// but at least one. Saturates at `u128::MAX`, a count no run can reach.
pub fn orderings_per_subset(k: usize) -> u128 {
    factorial(k.saturating_sub(1)).map_or(u128::MAX, |f| (f / 2).max(1))
}

/// Number of candidates produced for `n` variables taken `k` at a time.
///
/// Equals `n! / (2 · (n − k)! · k)` for `k ≥ 3`; subsets of two variables
/// have a single ordering, giving `C(n, 2)`. Counts beyond `u128` saturate at
/// `u128::MAX`.
pub fn state_count(n: usize, k: usize) -> u128 {
    if k == 0 || k > n {
        return 0;
    }
    binomial(n, k)
        .and_then(|subsets| subsets.checked_mul(orderings_per_subset(k)))
        .unwrap_or(u128::MAX)
}

/// Rearranges `values` into the next lexicographic permutation; `false` when
/// `values` was the last one.
fn next_permutation(values: &mut [usize]) -> bool {
    if values.len() < 2 {
        return false;
    }
    let mut i = values.len() - 1;
    while i > 0 && values[i - 1] >= values[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = values.len() - 1;
    while values[j] <= values[i - 1] {
        j -= 1;
    }
    values.swap(i - 1, j);
    values[i..].reverse();
    true
}

/// Lexicographic rank of `values` among the permutations of its elements, or
/// `None` when the rank does not fit in a `u128`. Elements must be distinct.
fn permutation_rank(values: &[usize]) -> Option<u128> {
    let len = values.len();
    let mut rank = 0u128;
    for (i, &v) in values.iter().enumerate() {
        let smaller_later = values[i + 1..].iter().filter(|&&w| w < v).count() as u128;
        if smaller_later > 0 {
            let step = factorial(len - i - 1)?.checked_mul(smaller_later)?;
            rank = rank.checked_add(step)?;
        }
    }
    Some(rank)
}

/// Lazy, resumable producer of [`CandidateState`]s for fixed `(n, k)`.
#[derive(Debug, Clone)]
pub struct SubsetEnumerator {
    n: usize,
    k: usize,
    subset: Vec<usize>,
    tail: Vec<usize>,
    ordering: u128,
    per_subset: u128,
    exhausted: bool,
}

impl SubsetEnumerator {
    /// Starts at the subset `{0, 1, ..., k − 1}`.
    pub fn new(n: usize, k: usize) -> Result<Self> {
        if k == 0 || k > n {
            return Err(VizRankError::InvalidConfiguration(format!(
                "subset size {} is outside [1, {}]",
                k, n
            )));
        }
        let subset: Vec<usize> = (0..k).collect();
        Ok(SubsetEnumerator {
            n,
            k,
            tail: subset[1..].to_vec(),
            subset,
            ordering: 0,
            per_subset: orderings_per_subset(k),
            exhausted: false,
        })
    }

    /// Continues right after `last`, a state this enumeration produced earlier.
    pub fn resume_after(n: usize, k: usize, last: &[usize]) -> Result<Self> {
        let mut enumerator = Self::new(n, k)?;
        if last.len() != k {
            return Err(VizRankError::InvalidConfiguration(format!(
                "resume state {:?} does not have {} elements",
                last, k
            )));
        }

        let tail = last[1..].to_vec();
        let mut subset = last.to_vec();
        subset.sort_unstable();
        let valid = subset[0] == last[0]
            && subset.windows(2).all(|w| w[0] < w[1])
            && subset[k - 1] < n;
        let ordering = permutation_rank(&tail).filter(|&rank| rank < enumerator.per_subset);
        let Some(ordering) = ordering.filter(|_| valid) else {
            return Err(VizRankError::InvalidConfiguration(format!(
                "{:?} is not a state of the enumeration for n = {}, k = {}",
                last, n, k
            )));
        };

        enumerator.subset = subset;
        enumerator.tail = tail;
        enumerator.ordering = ordering;
        enumerator.advance();
        Ok(enumerator)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn state_count(&self) -> u128 {
        state_count(self.n, self.k)
    }

    fn current(&self) -> CandidateState {
        let mut state = Vec::with_capacity(self.k);
        state.push(self.subset[0]);
        state.extend_from_slice(&self.tail);
        state
    }

    /// Steps the least significant digit, carrying overflow upward.
    fn next_subset(&mut self) {
        let k = self.k;
        for up in 0..k {
            self.subset[up] += 1;
            if up + 1 == k || self.subset[up] < self.subset[up + 1] {
                break;
            }
            self.subset[up] = up;
        }
        if self.subset[k - 1] >= self.n {
            self.exhausted = true;
        }
    }

    fn advance(&mut self) {
        self.ordering += 1;
        if self.ordering < self.per_subset && next_permutation(&mut self.tail) {
            return;
        }
        self.ordering = 0;
        self.next_subset();
        if !self.exhausted {
            self.tail.copy_from_slice(&self.subset[1..]);
        }
    }
}

impl Iterator for SubsetEnumerator {
    type Item = CandidateState;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let state = self.current();
        self.advance();
        Some(state)
    }
}

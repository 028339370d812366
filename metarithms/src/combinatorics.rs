// Index combinatorics for voicing and voice-leading search.
//
// Combinations are k-subsets of `0..n` in lexicographic order, produced lazily
// by `Combinations` or collected by `nchoosek`. Callers map index sets onto a
// table (chord tones, voices) with `select`.

/// Lazy lexicographic k-subsets of `0..n`.
///
/// `k == 0` yields a single empty combination; `k > n` yields nothing.
#[derive(Clone, Debug)]
pub struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        let current = (k <= n).then(|| (0..k).collect());
        Combinations { n, current }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let combo = self.current.take()?;
        let k = combo.len();
        // Rightmost position that can still advance.
        if let Some(i) = (0..k).rev().find(|&i| combo[i] < self.n - k + i) {
            let mut successor = combo.clone();
            successor[i] += 1;
            for j in i + 1..k {
                successor[j] = successor[j - 1] + 1;
            }
            self.current = Some(successor);
        }
        Some(combo)
    }
}

/// All k-subsets of `0..n`, lexicographic.
pub fn nchoosek(n: usize, k: usize) -> Vec<Vec<usize>> {
    Combinations::new(n, k).collect()
}

pub fn nchoose2(n: usize) -> Vec<(usize, usize)> {
    Combinations::new(n, 2).map(|c| (c[0], c[1])).collect()
}

pub fn nchoose3(n: usize) -> Vec<(usize, usize, usize)> {
    Combinations::new(n, 3).map(|c| (c[0], c[1], c[2])).collect()
}

/// Number of k-subsets of an n-set, or `None` if it does not fit in a `u64`.
pub fn binomial(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    // Each partial product is itself a binomial coefficient, so the division
    // is exact. Partial coefficients only grow up to `k`, so once one passes
    // `u64::MAX` the result cannot fit either.
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc.checked_mul((n - i) as u128)? / (i + 1) as u128;
        if acc > u128::from(u64::MAX) {
            return None;
        }
    }
    u64::try_from(acc).ok()
}

/// The entries of `items` at the indices of `combo`, or `None` if an index
/// is out of range.
pub fn select<T: Clone>(items: &[T], combo: &[usize]) -> Option<Vec<T>> {
    combo.iter().map(|&i| items.get(i).cloned()).collect()
}

/// Alternate entries starting from `right`, then append whatever is left of
/// the longer input.
pub fn interleave<T: Clone>(left: &[T], right: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    for (r, l) in right.iter().zip(left) {
        out.push(r.clone());
        out.push(l.clone());
    }
    let paired = left.len().min(right.len());
    out.extend_from_slice(&right[paired..]);
    out.extend_from_slice(&left[paired..]);
    out
}

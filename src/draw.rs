//! Random selection helpers used by possession resolution.
//!
//! The rank-weighted draw models "better players get the ball more": for
//! `n` candidates ranked best first, a roll in `1..=n(n+1)/2` is split into
//! bands of width `n, n-1, ..., 1`. With five players that is the 1-15
//! range, giving the top-ranked player 5/15 and the last one 1/15.

use rand::Rng;

/// Uniformly pick one element.
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[rng.gen_range(0..items.len())])
    }
}

/// Map a roll in `1..=n(n+1)/2` to a rank position in `0..n`.
pub fn band_for_roll(roll: usize, n: usize) -> usize {
    let mut upper = 0;
    for rank in 0..n {
        upper += n - rank;
        if roll <= upper {
            return rank;
        }
    }
    n.saturating_sub(1)
}

/// Draw from `items` with rank weights, ranking by `score` (highest first).
///
/// Ties keep the input order, so callers passing a ranked roster get a
/// stable result.
pub fn rank_weighted<'a, T, R, F>(rng: &mut R, items: &'a [T], score: F) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f64,
{
    let n = items.len();
    if n == 0 {
        return None;
    }
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by(|a, b| score(b).total_cmp(&score(a)));
    let roll = rng.gen_range(1..=n * (n + 1) / 2);
    Some(ranked[band_for_roll(roll, n)])
}

/// Bernoulli trial that tolerates probabilities outside `[0, 1]`.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    if p.is_nan() || p <= 0.0 {
        false
    } else if p >= 1.0 {
        true
    } else {
        rng.gen_bool(p)
    }
}

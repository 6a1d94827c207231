//! Approximate string similarity strategies for the result guardrail.
//!
//! Every strategy scores on 0.0–1.0 where 1.0 means identical. Inputs are
//! compared as given; callers lowercase beforehand.

/// Pluggable similarity measure.
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// `1 - levenshtein(a, b) / max(len(a), len(b))`, counted in chars.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl Similarity for NormalizedLevenshtein {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let longest = a.chars().count().max(b.chars().count());
        if longest == 0 {
            return 1.0;
        }
        1.0 - edit_distance(a, b) as f64 / longest as f64
    }
}

/// Ratcliff/Obershelp ratio: `2·M / (len(a) + len(b))` where `M` is the
/// number of chars in recursively found longest common blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl Similarity for SequenceRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a_chars: Vec<char> = a.chars().collect();
        let b_chars: Vec<char> = b.chars().collect();
        let total = a_chars.len() + b_chars.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * matching_chars(&a_chars, &b_chars) as f64 / total as f64
    }
}

/// Compute Levenshtein edit distance between two strings.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 { return n; }
    if n == 0 { return m; }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for (i, &a_ch) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &b_ch) in b_chars.iter().enumerate() {
            let cost = if a_ch == b_ch { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Total size of the matching blocks between `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(&a[alo..ahi], &b[blo..bhi]);
        if size == 0 {
            continue;
        }
        matched += size;
        let (i, j) = (alo + i, blo + j);
        pending.push((alo, i, blo, j));
        pending.push((i + size, ahi, j + size, bhi));
    }

    matched
}

/// Longest common substring as `(start_in_a, start_in_b, len)`.
/// Ties resolve to the earliest position in `a`.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];

    for (i, &a_ch) in a.iter().enumerate() {
        let mut curr = vec![0usize; b.len() + 1];
        for (j, &b_ch) in b.iter().enumerate() {
            if a_ch == b_ch {
                let run = prev[j] + 1;
                curr[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        prev = curr;
    }

    best
}

//! String similarity used for fuzzy symptom matching.
//!
//! The default metric is the gestalt (Ratcliff/Obershelp) ratio:
//! `2 * M / (|a| + |b|)`, where `M` is the number of characters covered by
//! matching blocks. Blocks are found by taking the longest common substring
//! and recursing on the unmatched pieces to its left and right.
//! Levenshtein and Jaro-Winkler scores from `strsim` are available as
//! alternatives.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Similarity metric used by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Ratcliff/Obershelp gestalt pattern matching.
    #[default]
    Gestalt,
    /// `1 - levenshtein / max_len`.
    Levenshtein,
    /// Jaro-Winkler with the standard prefix scale.
    JaroWinkler,
}

impl SimilarityMetric {
    /// Score two strings in `[0, 1]`; 1 means identical.
    #[must_use]
    pub fn score(self, a: &str, b: &str) -> f64 {
        match self {
            Self::Gestalt => gestalt_ratio(a, b),
            Self::Levenshtein => strsim::normalized_levenshtein(a, b),
            Self::JaroWinkler => strsim::jaro_winkler(a, b),
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gestalt => write!(f, "gestalt"),
            Self::Levenshtein => write!(f, "levenshtein"),
            Self::JaroWinkler => write!(f, "jaro_winkler"),
        }
    }
}

impl FromStr for SimilarityMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gestalt" | "ratcliff" | "difflib" => Ok(Self::Gestalt),
            "levenshtein" => Ok(Self::Levenshtein),
            "jaro_winkler" | "jaro-winkler" | "jarowinkler" => Ok(Self::JaroWinkler),
            other => Err(format!("Unknown similarity metric: {other}")),
        }
    }
}

/// A candidate accepted by [`close_matches`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseMatch {
    /// Index into the candidate slice.
    pub index: usize,
    pub score: f64,
}

/// Gestalt similarity ratio of two strings, computed on `char`s.
///
/// Two empty strings are identical (ratio 1.0).
#[must_use]
pub fn gestalt_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_of(&a, &b)
}

fn ratio_of(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(a, b) as f64 / total as f64
}

/// Upper bound on the ratio from the multiset of shared characters.
fn quick_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let mut available: HashMap<char, usize> = HashMap::new();
    for &c in b {
        *available.entry(c).or_insert(0) += 1;
    }
    let mut matches = 0usize;
    for c in a {
        if let Some(n) = available.get_mut(c) {
            if *n > 0 {
                *n -= 1;
                matches += 1;
            }
        }
    }
    2.0 * matches as f64 / total as f64
}

/// Upper bound on the ratio from lengths alone.
fn real_quick_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * a.len().min(b.len()) as f64 / total as f64
}

/// Total size of all matching blocks between `a` and `b`.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, size)`. Among blocks of maximal size the one that ends
/// earliest in `a` wins, then the one earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo + 1;
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; width];
    let mut cur = vec![0usize; width];

    for i in alo..ahi {
        cur.iter_mut().for_each(|v| *v = 0);
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j - blo] + 1;
                cur[j - blo + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

/// Candidates whose similarity to `word` is at least `cutoff`, best first.
///
/// At most `n` results. Equal scores are ordered by descending candidate
/// string, so results are deterministic regardless of candidate order.
#[must_use]
pub fn close_matches<S: AsRef<str>>(
    metric: SimilarityMetric,
    word: &str,
    candidates: &[S],
    n: usize,
    cutoff: f64,
) -> Vec<CloseMatch> {
    if n == 0 {
        return Vec::new();
    }

    let word_chars: Vec<char> = word.chars().collect();
    let mut accepted: Vec<CloseMatch> = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let candidate = candidate.as_ref();
        let score = match metric {
            SimilarityMetric::Gestalt => {
                let cand_chars: Vec<char> = candidate.chars().collect();
                if real_quick_ratio(&cand_chars, &word_chars) < cutoff
                    || quick_ratio(&cand_chars, &word_chars) < cutoff
                {
                    continue;
                }
                ratio_of(&cand_chars, &word_chars)
            }
            other => other.score(candidate, word),
        };
        if score >= cutoff {
            accepted.push(CloseMatch { index, score });
        }
    }

    accepted.sort_by(|x, y| {
        y.score
            .total_cmp(&x.score)
            .then_with(|| candidates[y.index].as_ref().cmp(candidates[x.index].as_ref()))
    });
    accepted.truncate(n);
    accepted
}

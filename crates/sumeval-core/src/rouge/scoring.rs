//! ROUGE-N and ROUGE-L over token sequences.
//!
//! All functions take the reference first and the candidate second.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Precision, recall and F1 for one metric on one pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl Score {
    fn new(precision: f64, recall: f64) -> Self {
        let fmeasure = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            fmeasure,
        }
    }

    /// Score from a hit count and the candidate/reference unit totals.
    /// Either total being zero yields zero.
    fn from_hits(hits: usize, candidate_total: usize, reference_total: usize) -> Self {
        if candidate_total == 0 || reference_total == 0 {
            return Self::default();
        }
        Self::new(
            hits as f64 / candidate_total as f64,
            hits as f64 / reference_total as f64,
        )
    }
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// Clipped n-gram overlap.
pub fn rouge_n(reference: &[String], candidate: &[String], n: usize) -> Score {
    let ref_grams = ngram_counts(reference, n);
    let cand_grams = ngram_counts(candidate, n);

    let hits: usize = cand_grams
        .iter()
        .map(|(gram, &count)| count.min(ref_grams.get(gram).copied().unwrap_or(0)))
        .sum();

    Score::from_hits(
        hits,
        cand_grams.values().sum(),
        ref_grams.values().sum(),
    )
}

/// Dynamic-programming table where `t[i][j]` is the LCS length of
/// `reference[..i]` and `candidate[..j]`.
fn lcs_table(reference: &[String], candidate: &[String]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0usize; candidate.len() + 1]; reference.len() + 1];
    for i in 1..=reference.len() {
        for j in 1..=candidate.len() {
            table[i][j] = if reference[i - 1] == candidate[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table
}

/// Indices into `reference` of one longest common subsequence.
fn lcs_indices(reference: &[String], candidate: &[String]) -> Vec<usize> {
    let table = lcs_table(reference, candidate);
    let (mut i, mut j) = (reference.len(), candidate.len());
    let mut indices = Vec::with_capacity(table[i][j]);
    while i > 0 && j > 0 {
        if reference[i - 1] == candidate[j - 1] {
            indices.push(i - 1);
            i -= 1;
            j -= 1;
        } else if table[i][j - 1] > table[i - 1][j] {
            j -= 1;
        } else {
            i -= 1;
        }
    }
    indices.reverse();
    indices
}

/// Longest-common-subsequence overlap of two token sequences.
pub fn rouge_l(reference: &[String], candidate: &[String]) -> Score {
    if reference.is_empty() || candidate.is_empty() {
        return Score::default();
    }
    let lcs = lcs_table(reference, candidate)[reference.len()][candidate.len()];
    Score::from_hits(lcs, candidate.len(), reference.len())
}

/// Summary-level LCS over sentences.
///
/// For every reference sentence the union of its LCS positions against each
/// candidate sentence is taken; each matched token counts as a hit at most
/// as often as it occurs on both sides.
pub fn rouge_l_summary(reference: &[Vec<String>], candidate: &[Vec<String>]) -> Score {
    let ref_total: usize = reference.iter().map(Vec::len).sum();
    let cand_total: usize = candidate.iter().map(Vec::len).sum();
    if ref_total == 0 || cand_total == 0 {
        return Score::default();
    }

    let mut ref_budget: HashMap<&str, usize> = HashMap::new();
    for token in reference.iter().flatten() {
        *ref_budget.entry(token.as_str()).or_insert(0) += 1;
    }
    let mut cand_budget: HashMap<&str, usize> = HashMap::new();
    for token in candidate.iter().flatten() {
        *cand_budget.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut hits = 0usize;
    for ref_sentence in reference {
        let union: BTreeSet<usize> = candidate
            .iter()
            .flat_map(|cand_sentence| lcs_indices(ref_sentence, cand_sentence))
            .collect();

        for idx in union {
            let token = ref_sentence[idx].as_str();
            let (Some(r), Some(c)) = (ref_budget.get_mut(token), cand_budget.get_mut(token)) else {
                continue;
            };
            if *r > 0 && *c > 0 {
                *r -= 1;
                *c -= 1;
                hits += 1;
            }
        }
    }

    Score::from_hits(hits, cand_total, ref_total)
}

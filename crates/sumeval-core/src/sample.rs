//! Reproducible corpus sampling.
//!
//! The random source is always passed in, so callers decide between a seeded
//! `StdRng` (reproducible runs) and an entropy-backed one.

use std::fmt::Write as _;

use rand::seq::index;
use rand::Rng;

use crate::domain::{CorpusRecord, EvalError, Result};

/// Draw `k` distinct records from `corpus` without replacement.
///
/// Fails with [`EvalError::Configuration`] when `k` exceeds the corpus size.
pub fn sample<R: Rng + ?Sized>(
    corpus: &[CorpusRecord],
    k: usize,
    rng: &mut R,
) -> Result<Vec<CorpusRecord>> {
    if k > corpus.len() {
        return Err(EvalError::Configuration(format!(
            "cannot sample {k} records from a corpus of {}",
            corpus.len()
        )));
    }
    Ok(index::sample(rng, corpus.len(), k)
        .into_iter()
        .map(|i| corpus[i].clone())
        .collect())
}

/// Human-readable dump of one record, each text field cut to `max_chars`.
pub fn render_sample(record: &CorpusRecord, max_chars: Option<usize>) -> String {
    let clip = |text: &str| match max_chars {
        Some(max) if text.chars().count() > max => {
            format!("{}...", text.chars().take(max).collect::<String>())
        }
        _ => text.to_string(),
    };

    let mut out = String::new();
    if let Some(id) = &record.id {
        let _ = writeln!(out, "Id: {id}");
    }
    let _ = writeln!(out, "Article: {}", clip(&record.article));
    let _ = writeln!(out, "Highlights: {}", clip(&record.highlights));
    out
}

//! Tokenization and sentence splitting for overlap scoring.

use std::sync::OnceLock;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

/// Tokens of this length or shorter are never stemmed.
const MIN_STEM_LEN: usize = 3;

/// Turns text into the tokens compared by the overlap metrics.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static pattern"))
}

fn sentence_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[.!?]+["')\]]*\s+|\s*\n\s*"#).expect("static pattern"))
}

/// Lowercases, splits on anything outside `[a-z0-9]`, optionally applies the
/// English Porter stemmer to tokens longer than three characters.
pub struct DefaultTokenizer {
    stemmer: Option<Stemmer>,
}

impl DefaultTokenizer {
    pub fn new(use_stemmer: bool) -> Self {
        Self {
            stemmer: use_stemmer.then(|| Stemmer::create(Algorithm::English)),
        }
    }

    pub fn uses_stemmer(&self) -> bool {
        self.stemmer.is_some()
    }
}

impl std::fmt::Debug for DefaultTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultTokenizer")
            .field("use_stemmer", &self.uses_stemmer())
            .finish()
    }
}

impl Tokenizer for DefaultTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        non_alphanumeric()
            .split(&lowered)
            .filter(|t| !t.is_empty())
            .map(|t| match &self.stemmer {
                Some(stemmer) if t.len() > MIN_STEM_LEN => stemmer.stem(t).into_owned(),
                _ => t.to_string(),
            })
            .collect()
    }
}

/// Split text into sentences on newlines and on `.`, `!` or `?` followed by
/// whitespace. Terminal punctuation stays with its sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in sentence_boundary().find_iter(text) {
        let sentence = text[start..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

//! Fitted TF-IDF vectorizer.
//!
//! Reproduces the transform side of a standard TF-IDF pipeline: analyze the
//! text into n-grams, count the ones present in the fitted vocabulary, apply
//! term-frequency scaling and IDF weights, then normalize the row.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use strum::Display;

use super::sparse::SparseVector;
use super::Vectorizer;
use crate::error::InferenceError;

/// Runs of two or more whitespace characters, collapsed before char analysis.
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").expect("valid regex"));

/// Unit of n-gram extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Analyzer {
    /// Token n-grams; tokens are `token_pattern` matches.
    #[default]
    Word,
    /// Character n-grams over the whole text.
    Char,
    /// Character n-grams inside word boundaries, words padded with spaces.
    CharWb,
}

/// Row normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Norm {
    /// Sum of absolute values is 1.
    L1,
    /// Euclidean length is 1.
    L2,
}

/// Serialized vectorizer parameters as written by the training pipeline.
///
/// Unknown keys are rejected so that a transform setting this crate does not
/// implement fails at load time instead of silently changing the features.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TfidfParams {
    /// Term to column index.
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column. Absent means no IDF weighting.
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    /// N-gram unit.
    #[serde(default)]
    pub analyzer: Analyzer,
    /// Inclusive `(min_n, max_n)`.
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    /// Lowercase before analysis.
    #[serde(default = "default_true")]
    pub lowercase: bool,
    /// Token regex for the word analyzer.
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    /// Tokens dropped by the word analyzer.
    #[serde(default)]
    pub stop_words: Vec<String>,
    /// Only `null` is supported; accent folding is not implemented.
    #[serde(default)]
    pub strip_accents: Option<String>,
    /// Clamp every nonzero count to 1 before weighting.
    #[serde(default)]
    pub binary: bool,
    /// Use `1 + ln(tf)` instead of raw counts.
    #[serde(default)]
    pub sublinear_tf: bool,
    /// Row normalization; `null` disables it.
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    r"(?u)\b\w\w+\b".to_string()
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// A validated, ready-to-use TF-IDF vectorizer.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    analyzer: Analyzer,
    min_n: usize,
    max_n: usize,
    lowercase: bool,
    token_pattern: Regex,
    stop_words: HashSet<String>,
    binary: bool,
    sublinear_tf: bool,
    norm: Option<Norm>,
    dim: usize,
}

impl TryFrom<TfidfParams> for TfidfVectorizer {
    type Error = String;

    fn try_from(params: TfidfParams) -> Result<Self, Self::Error> {
        if params.vocabulary.is_empty() {
            return Err("vocabulary is empty".to_string());
        }

        if let Some(mode) = &params.strip_accents {
            return Err(format!("strip_accents {mode:?} is not supported"));
        }

        let (min_n, max_n) = params.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }

        let dim = match &params.idf {
            Some(idf) => {
                if let Some(bad) = idf.iter().find(|w| !w.is_finite()) {
                    return Err(format!("idf contains non-finite weight {bad}"));
                }
                idf.len()
            }
            None => params.vocabulary.len(),
        };

        if let Some((term, col)) = params.vocabulary.iter().find(|(_, col)| **col >= dim) {
            return Err(format!(
                "vocabulary term {term:?} maps to column {col}, outside {dim} features"
            ));
        }

        let token_pattern = Regex::new(&params.token_pattern)
            .map_err(|e| format!("invalid token_pattern: {e}"))?;

        Ok(Self {
            vocabulary: params.vocabulary,
            idf: params.idf,
            analyzer: params.analyzer,
            min_n,
            max_n,
            lowercase: params.lowercase,
            token_pattern,
            stop_words: params.stop_words.into_iter().collect(),
            binary: params.binary,
            sublinear_tf: params.sublinear_tf,
            norm: params.norm,
            dim,
        })
    }
}

impl TfidfVectorizer {
    /// Number of vocabulary terms.
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Raw term counts for `text`, keyed by column.
    fn count_terms(&self, text: &str) -> HashMap<usize, u32> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut counts = HashMap::new();
        let mut record = |gram: &str| {
            if let Some(&col) = self.vocabulary.get(gram) {
                *counts.entry(col).or_insert(0) += 1;
            }
        };

        match self.analyzer {
            Analyzer::Word => self.word_ngrams(&text, &mut record),
            Analyzer::Char => self.char_ngrams(&text, &mut record),
            Analyzer::CharWb => self.char_wb_ngrams(&text, &mut record),
        }

        counts
    }

    fn word_ngrams(&self, text: &str, emit: &mut impl FnMut(&str)) {
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        for n in self.min_n..=self.max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                emit(&window.join(" "));
            }
        }
    }

    fn char_ngrams(&self, text: &str, emit: &mut impl FnMut(&str)) {
        let collapsed = WHITESPACE_RUNS.replace_all(text, " ");
        let chars: Vec<char> = collapsed.chars().collect();

        for n in self.min_n..=self.max_n.min(chars.len()) {
            for window in chars.windows(n) {
                emit(&window.iter().collect::<String>());
            }
        }
    }

    fn char_wb_ngrams(&self, text: &str, emit: &mut impl FnMut(&str)) {
        for word in text.split(is_separator).filter(|w| !w.is_empty()) {
            let padded: Vec<char> = std::iter::once(' ')
                .chain(word.chars())
                .chain(std::iter::once(' '))
                .collect();

            for n in self.min_n..=self.max_n {
                if n >= padded.len() {
                    // A word no longer than n yields itself once, whatever n.
                    emit(&padded.iter().collect::<String>());
                    break;
                }
                for window in padded.windows(n) {
                    emit(&window.iter().collect::<String>());
                }
            }
        }
    }
}

/// Word separators for char_wb. Unicode whitespace plus the ASCII
/// information separators U+001C..=U+001F, which Python's `str.split()`
/// also splits on.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<SparseVector, InferenceError> {
        let entries = self
            .count_terms(text)
            .into_iter()
            .map(|(col, count)| {
                let count = if self.binary { 1.0 } else { f64::from(count) };
                let tf = if self.sublinear_tf {
                    1.0 + count.ln()
                } else {
                    count
                };
                let weight = match &self.idf {
                    Some(idf) => tf * idf[col],
                    None => tf,
                };
                (col, weight)
            })
            .collect();

        let mut row = SparseVector::from_entries(self.dim, entries);
        match self.norm {
            Some(Norm::L1) => row.normalize_l1(),
            Some(Norm::L2) => row.normalize_l2(),
            None => {}
        }
        Ok(row)
    }

    fn n_features(&self) -> usize {
        self.dim
    }

    fn describe(&self) -> String {
        format!(
            "tfidf(analyzer={}, ngram_range=({}, {}), vocabulary={}, features={})",
            self.analyzer,
            self.min_n,
            self.max_n,
            self.vocabulary.len(),
            self.dim
        )
    }
}

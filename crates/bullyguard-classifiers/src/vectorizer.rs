//! TF-IDF vectorizer over unigrams and bigrams of normalized text
//!
//! Fitting follows the usual document-frequency pruning: terms present in
//! more than `max_df × n_docs` documents (or fewer than `min_df`) are
//! discarded, the remaining terms are ranked by corpus frequency and capped
//! at `max_features`. Columns are assigned in alphabetical term order.
//! Idf is smoothed, `ln((1 + n) / (1 + df)) + 1`, and every transformed
//! vector is L2-normalized.

use bullyguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Vectorizer fit parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Vocabulary cap
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Inclusive n-gram length range
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Minimum number of documents a term must appear in
    #[serde(default = "default_min_df")]
    pub min_df: usize,

    /// Maximum fraction of documents a term may appear in
    #[serde(default = "default_max_df")]
    pub max_df: f64,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            ngram_range: default_ngram_range(),
            min_df: default_min_df(),
            max_df: default_max_df(),
        }
    }
}

impl VectorizerParams {
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        if self.max_features == 0 {
            return Err(Error::config("max_features must be positive"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        Ok(())
    }
}

fn default_max_features() -> usize {
    1000
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

fn default_min_df() -> usize {
    1
}

fn default_max_df() -> f64 {
    0.9
}

/// Sparse weight vector, entries sorted by column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from `(column, weight)` pairs; pairs are sorted by column
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|(index, _)| *index);
        Self { entries }
    }

    /// Weight at `index`, 0 when absent
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest column index present
    pub fn max_index(&self) -> Option<usize> {
        self.entries.last().map(|(index, _)| *index)
    }

    pub fn to_dense(&self, dim: usize) -> Vec<f64> {
        let mut dense = vec![0.0; dim];
        for (index, weight) in self.iter() {
            if index < dim {
                dense[index] = weight;
            }
        }
        dense
    }
}

/// Fitted TF-IDF vocabulary and weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    params: VectorizerParams,

    /// term → column
    vocabulary: BTreeMap<String, usize>,

    /// Inverse document frequency per column
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and idf weights from normalized documents
    pub fn fit<S: AsRef<str>>(params: VectorizerParams, documents: &[S]) -> Result<Self> {
        params.validate()?;

        if documents.is_empty() {
            return Err(Error::training("cannot fit vectorizer on an empty corpus"));
        }

        let n_docs = documents.len();
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = ngrams(doc.as_ref(), params.ngram_range);
            let mut doc_terms = HashSet::new();
            for term in terms {
                *term_freq.entry(term.clone()).or_insert(0) += 1;
                doc_terms.insert(term);
            }
            for term in doc_terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = params.max_df * n_docs as f64;
        let mut ranked: Vec<(String, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                df >= params.min_df && (df as f64) <= max_doc_count
            })
            .collect();

        if ranked.is_empty() {
            return Err(Error::training(
                "no terms remain after document-frequency pruning",
            ));
        }

        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(params.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs as f64) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        Ok(Self {
            params,
            vocabulary,
            idf,
        })
    }

    /// Weight a normalized text against the fitted vocabulary.
    ///
    /// Terms outside the vocabulary are ignored; a text with no known term
    /// yields an empty vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        // Column order fixes the summation order of the norm
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in ngrams(text, self.params.ngram_range) {
            if let Some(index) = self.vocabulary.get(&term) {
                *counts.entry(*index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in entries.iter_mut() {
                *weight /= norm;
            }
        }

        SparseVector::from_entries(entries)
    }

    /// Number of columns
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn params(&self) -> &VectorizerParams {
        &self.params
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|index| self.idf[*index])
    }

    /// Check that columns form `0..n` and every column has an idf weight
    pub fn validate(&self) -> Result<()> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(Error::model_corrupt(format!(
                "vocabulary has {} terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }

        let mut seen = vec![false; self.idf.len()];
        for (term, index) in &self.vocabulary {
            match seen.get_mut(*index) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(Error::model_corrupt(format!(
                        "term '{term}' has invalid column {index}"
                    )))
                }
            }
        }

        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err(Error::model_corrupt("non-finite idf weight"));
        }
        Ok(())
    }
}

/// Space-joined n-grams of whitespace tokens, shortest n first
fn ngrams(text: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut terms = Vec::new();
    for n in min_n..=max_n {
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(docs: &[&str]) -> TfidfVectorizer {
        TfidfVectorizer::fit(VectorizerParams::default(), docs).unwrap()
    }

    #[test]
    fn test_fit_builds_unigrams_and_bigrams() {
        let vectorizer = fit(&["ugly loser", "nice day", "nice loser"]);
        let terms: Vec<&str> = vectorizer.vocabulary().keys().map(String::as_str).collect();

        assert_eq!(
            terms,
            ["day", "loser", "nice", "nice day", "nice loser", "ugly", "ugly loser"]
        );
        assert_eq!(vectorizer.vocabulary()["day"], 0);
        assert_eq!(vectorizer.vocabulary()["ugly loser"], 6);
    }

    #[test]
    fn test_max_df_prunes_ubiquitous_terms() {
        // "common" is in 3 of 3 documents, above 0.9 × 3
        let vectorizer = fit(&["common alpha", "common beta", "common gamma"]);
        assert!(vectorizer.idf("common").is_none());
        assert!(vectorizer.idf("alpha").is_some());
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let params = VectorizerParams {
            max_features: 2,
            ngram_range: (1, 1),
            ..Default::default()
        };
        let docs = ["alpha alpha beta", "alpha gamma", "delta"];
        let vectorizer = TfidfVectorizer::fit(params, &docs).unwrap();

        // alpha (3) first, then beta/delta/gamma tie on 1 and sort alphabetically
        let terms: Vec<&String> = vectorizer.vocabulary().keys().collect();
        assert_eq!(terms, ["alpha", "beta"]);
    }

    #[test]
    fn test_smoothed_idf() {
        let vectorizer = fit(&["alpha beta", "alpha gamma", "delta"]);
        let expected = (4.0f64 / 3.0).ln() + 1.0;
        assert!((vectorizer.idf("alpha").unwrap() - expected).abs() < 1e-12);
        let expected = (4.0f64 / 2.0).ln() + 1.0;
        assert!((vectorizer.idf("beta").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_transform_is_l2_normalized_and_ignores_unseen() {
        let vectorizer = fit(&["ugly loser", "nice day", "nice loser"]);
        let vector = vectorizer.transform("ugly loser unknown");

        let norm: f64 = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert_eq!(vector.nnz(), 3);
        assert!(vector.get(vectorizer.vocabulary()["ugly loser"]) > 0.0);
    }

    #[test]
    fn test_transform_is_bit_identical_across_calls() {
        let docs = [
            "ugly loser nobody like",
            "nice day lovely weather",
            "stupid idiot hate",
            "great job presentation",
            "worthless trash kill",
        ];
        let vectorizer = fit(&docs);
        let text = "ugly loser nobody like nice day lovely weather stupid idiot hate great job \
                    presentation worthless trash kill";

        let first: Vec<(usize, u64)> = vectorizer
            .transform(text)
            .iter()
            .map(|(i, w)| (i, w.to_bits()))
            .collect();
        assert!(first.len() > 17);

        for _ in 0..200 {
            let again: Vec<(usize, u64)> = vectorizer
                .transform(text)
                .iter()
                .map(|(i, w)| (i, w.to_bits()))
                .collect();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_transform_empty_text() {
        let vectorizer = fit(&["ugly loser", "nice day"]);
        assert!(vectorizer.transform("").is_empty());
        assert!(vectorizer.transform("completely unseen").is_empty());
    }

    #[test]
    fn test_fit_rejects_degenerate_corpus() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            TfidfVectorizer::fit(VectorizerParams::default(), &empty),
            Err(Error::Training(_))
        ));

        // A single document puts every term above max_df
        assert!(matches!(
            TfidfVectorizer::fit(VectorizerParams::default(), &["only one"]),
            Err(Error::Training(_))
        ));
    }

    #[test]
    fn test_validate_detects_tampering() {
        let mut vectorizer = fit(&["ugly loser", "nice day"]);
        assert!(vectorizer.validate().is_ok());

        vectorizer.idf.pop();
        assert!(matches!(vectorizer.validate(), Err(Error::ModelCorrupt(_))));
    }
}

//! Text normalization for the lexical model
//!
//! `normalize` lowercases, strips everything that is not an ASCII letter or
//! whitespace, drops stopwords and tokens of two characters or fewer, and
//! reduces each remaining token to its noun lemma.

use bullyguard_core::{Error, Result};
use regex::Regex;
use std::collections::HashSet;

/// Standard English stopword list
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Irregular plurals and words whose trailing `s` is not inflectional
const LEMMA_EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"),
    ("people", "people"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("wolves", "wolf"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("thieves", "thief"),
    ("yes", "yes"),
    ("news", "news"),
    ("always", "always"),
    ("perhaps", "perhaps"),
    ("series", "series"),
    ("species", "species"),
    ("lens", "lens"),
    ("gas", "gas"),
    ("bias", "bias"),
];

/// Suffix rewrites tried in order; the first match wins
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("shes", "sh"),
    ("ches", "ch"),
    ("xes", "x"),
    ("men", "man"),
];

/// Lowercase/strip/stopword/lemma normalizer
#[derive(Debug, Clone)]
pub struct Normalizer {
    strip: Regex,
    stopwords: HashSet<&'static str>,
}

impl Normalizer {
    pub fn new() -> Result<Self> {
        let strip = Regex::new(r"[^a-zA-Z\s]+")
            .map_err(|e| Error::internal(format!("Failed to compile strip regex: {e}")))?;

        Ok(Self {
            strip,
            stopwords: STOPWORDS.iter().copied().collect(),
        })
    }

    /// Normalized content tokens of `text`
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let stripped = self.strip.replace_all(&lowered, "");

        stripped
            .split_whitespace()
            .filter(|token| token.len() > 2 && !self.stopwords.contains(token))
            .map(lemmatize)
            .collect()
    }

    /// Normalized text: content tokens joined by single spaces.
    ///
    /// Returns an empty string when nothing survives filtering.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new().expect("Failed to create normalizer")
    }
}

/// Reduce a lowercase token to its noun lemma
pub fn lemmatize(token: &str) -> String {
    if let Some((_, lemma)) = LEMMA_EXCEPTIONS.iter().find(|(word, _)| *word == token) {
        return lemma.to_string();
    }

    if let Some(stem) = token.strip_suffix("ies") {
        // "dies", "lies", "ties" only lose the plural s
        return if token.len() > 4 {
            format!("{stem}y")
        } else {
            token[..token.len() - 1].to_string()
        };
    }

    for (suffix, replacement) in SUFFIX_RULES {
        if let Some(stem) = token.strip_suffix(suffix) {
            if !stem.is_empty() {
                return format!("{stem}{replacement}");
            }
        }
    }

    if token.len() > 3
        && token.ends_with('s')
        && !(token.ends_with("ss") || token.ends_with("us") || token.ends_with("is"))
    {
        return token[..token.len() - 1].to_string();
    }

    token.to_string()
}

//! Descriptive message statistics
//!
//! These features are diagnostic: they are exposed to callers and the CLI
//! but are not an input of the trained classifier, which only consumes the
//! TF-IDF vector.

use crate::lexicon::Lexicon;
use bullyguard_core::Theme;
use serde::{Serialize, Serializer};

/// Named scalar features of one raw message
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub length: usize,
    pub word_count: usize,
    pub avg_word_length: f64,
    pub uppercase_ratio: f64,
    pub exclamation_count: usize,
    pub question_count: usize,

    /// Phrases present per theme, in [`Theme::OFFENSIVE`] order
    pub keyword_counts: [(Theme, usize); 4],
}

impl FeatureVector {
    /// Features as ordered `(name, value)` pairs
    pub fn to_pairs(&self) -> Vec<(String, f64)> {
        let mut pairs = vec![
            ("length".to_string(), self.length as f64),
            ("word_count".to_string(), self.word_count as f64),
            ("avg_word_length".to_string(), self.avg_word_length),
            ("uppercase_ratio".to_string(), self.uppercase_ratio),
            ("exclamation_count".to_string(), self.exclamation_count as f64),
            ("question_count".to_string(), self.question_count as f64),
        ];
        pairs.extend(
            self.keyword_counts
                .iter()
                .map(|(theme, count)| (format!("{theme}_keyword_count"), *count as f64)),
        );
        pairs
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.to_pairs()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let pairs = self.to_pairs();
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for (name, value) in &pairs {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Compute the descriptive features of `text`
pub fn extract_features(lexicon: &Lexicon, text: &str) -> FeatureVector {
    let length = text.chars().count();
    let words: Vec<&str> = text.split_whitespace().collect();

    let avg_word_length = if words.is_empty() {
        0.0
    } else {
        let letters: usize = words.iter().map(|w| w.chars().count()).sum();
        letters as f64 / words.len() as f64
    };

    let uppercase_ratio = if length == 0 {
        0.0
    } else {
        text.chars().filter(|c| c.is_uppercase()).count() as f64 / length as f64
    };

    let matches = lexicon.scan(text);
    let keyword_counts = Theme::OFFENSIVE.map(|theme| (theme, matches.count(theme)));

    FeatureVector {
        length,
        word_count: words.len(),
        avg_word_length,
        uppercase_ratio,
        exclamation_count: text.matches('!').count(),
        question_count: text.matches('?').count(),
        keyword_counts,
    }
}

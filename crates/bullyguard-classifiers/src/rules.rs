//! Keyword-ratio fallback classifier
//!
//! Used whenever no trained model is loaded. The offensive ratio is the
//! number of lexicon phrases present in the message divided by the size of
//! the whole lexicon.

use crate::classifier::Prediction;
use crate::lexicon::{Lexicon, LexiconMatches};
use bullyguard_core::Label;

/// Default offensive-ratio threshold (1% of the lexicon)
pub const DEFAULT_RULE_THRESHOLD: f64 = 0.01;

/// Rule-based classifier over a lexicon scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleClassifier {
    threshold: f64,
}

impl RuleClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify raw text
    pub fn classify(&self, lexicon: &Lexicon, text: &str) -> Prediction {
        self.classify_matches(lexicon, &lexicon.scan(text))
    }

    /// Classify from an existing scan of the same lexicon
    pub fn classify_matches(&self, lexicon: &Lexicon, matches: &LexiconMatches) -> Prediction {
        let total = lexicon.total_phrases();
        let ratio = if total == 0 {
            0.0
        } else {
            matches.total() as f64 / total as f64
        };

        if ratio > self.threshold {
            Prediction::new(Label::Cyberbullying, ratio)
        } else {
            Prediction::new(Label::Safe, 1.0 - ratio)
        }
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULE_THRESHOLD)
    }
}

//! Classifier trait and common types

use async_trait::async_trait;
use bullyguard_core::{ClassificationResult, Label, Result};

/// Trait for message classifiers that can be shared across async tasks
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Label and confidence produced by a single decision procedure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Label,

    /// Confidence score (0.0-1.0)
    pub confidence: f64,
}

impl Prediction {
    pub fn new(label: Label, confidence: f64) -> Self {
        Self { label, confidence }
    }
}

/// Which decision procedure produced a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSource {
    /// The trained TF-IDF + random forest model
    Model,
    /// Keyword-ratio rules, used when no model is loaded
    Rules,
    /// Lexicon hits overturned a `Safe` model prediction
    Lexicon,
}

impl PredictionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Rules => "rules",
            Self::Lexicon => "lexicon",
        }
    }
}

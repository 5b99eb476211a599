//! BullyGuard Classifiers
//!
//! Cyberbullying detection for short user-generated messages.
//!
//! The pipeline has two independent branches over the same raw text:
//! - Lexical model: normalize, TF-IDF weight over a fitted vocabulary, then
//!   a seeded random forest (or a keyword-ratio rule when no model is loaded)
//! - Lexicon scan: per-theme phrase hits for the dominant theme and the
//!   matched keywords
//!
//! [`CyberbullyDetector`] fuses both into a [`ClassificationResult`].

pub mod classifier;
pub mod config;
pub mod detector;
pub mod features;
pub mod forest;
pub mod lexicon;
pub mod model;
pub mod normalizer;
pub mod registry;
pub mod rules;
pub mod theme;
pub mod training;
pub mod vectorizer;

pub use bullyguard_core::{ClassificationResult, Label, Theme};
pub use classifier::{Classifier, Prediction, PredictionSource};
pub use config::DetectorConfig;
pub use detector::CyberbullyDetector;
pub use features::{extract_features, FeatureVector};
pub use forest::{ForestParams, RandomForest};
pub use lexicon::{Lexicon, LexiconMatches};
pub use model::Model;
pub use normalizer::Normalizer;
pub use registry::ModelHandle;
pub use rules::RuleClassifier;
pub use theme::detect_theme;
pub use training::{train_model, TrainingCorpus, TrainingParams, TrainingReport};
pub use vectorizer::{SparseVector, TfidfVectorizer, VectorizerParams};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, Prediction};
    pub use crate::config::DetectorConfig;
    pub use crate::detector::CyberbullyDetector;
    pub use crate::lexicon::Lexicon;
    pub use crate::training::TrainingCorpus;
    pub use bullyguard_core::{ClassificationResult, Label, Theme};
}

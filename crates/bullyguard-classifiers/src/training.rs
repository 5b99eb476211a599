//! Model training
//!
//! The vectorizer is fitted on every normalized text. The corpus is then
//! shuffled with the forest seed and split; the forest is fitted on the
//! training share only, and the held-out share is used solely to report
//! accuracy.

use crate::forest::{ForestParams, RandomForest};
use crate::model::Model;
use crate::normalizer::Normalizer;
use crate::vectorizer::{TfidfVectorizer, VectorizerParams};
use bullyguard_core::{Error, Label, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const SAFE_EXAMPLES: &[&str] = &[
    "Hello, how are you today?",
    "I love this weather, it's so nice outside.",
    "Thank you for your help with the project.",
    "Have a great day!",
    "The movie was really good, I enjoyed it.",
    "Let's meet for coffee tomorrow.",
    "Happy birthday! Hope you have a wonderful day.",
    "The food at that restaurant was delicious.",
    "I'm looking forward to the weekend.",
    "Great job on the presentation!",
];

const CYBERBULLYING_EXAMPLES: &[&str] = &[
    "You're so ugly and stupid, nobody likes you.",
    "Go kill yourself, you worthless piece of trash.",
    "You're such a fat loser, why don't you just die?",
    "I hate you, you're the worst person ever.",
    "You should just disappear, nobody would miss you.",
    "You're so pathetic, I can't believe anyone talks to you.",
    "Why don't you just end it all? The world would be better off.",
    "You're such an idiot, I can't stand you.",
    "Nobody cares about you, you're worthless.",
    "You should just give up, you'll never amount to anything.",
];

/// Training hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Held-out fraction used for the accuracy report
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    #[serde(default)]
    pub vectorizer: VectorizerParams,

    #[serde(default)]
    pub forest: ForestParams,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            test_size: default_test_size(),
            vectorizer: VectorizerParams::default(),
            forest: ForestParams::default(),
        }
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.test_size) {
            return Err(Error::config(format!(
                "test_size must be in [0, 1), got {}",
                self.test_size
            )));
        }
        self.vectorizer.validate()?;
        self.forest.validate()
    }
}

fn default_test_size() -> f64 {
    0.2
}

/// Labeled messages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingCorpus {
    texts: Vec<String>,
    labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
struct CorpusRecord {
    text: String,
    label: usize,
}

impl TrainingCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in synthetic corpus: ten safe and ten abusive messages
    pub fn builtin() -> Self {
        let mut corpus = Self::new();
        for text in SAFE_EXAMPLES {
            corpus.push(*text, Label::Safe);
        }
        for text in CYBERBULLYING_EXAMPLES {
            corpus.push(*text, Label::Cyberbullying);
        }
        corpus
    }

    /// Parse a JSON array of `{"text": ..., "label": 0|1}` records
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<CorpusRecord> = serde_json::from_str(json)?;
        let mut corpus = Self::new();
        for (position, record) in records.into_iter().enumerate() {
            let label = Label::from_index(record.label).ok_or_else(|| {
                Error::training(format!(
                    "record {position} has label {}, expected 0 or 1",
                    record.label
                ))
            })?;
            corpus.push(record.text, label);
        }
        Ok(corpus)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn push(&mut self, text: impl Into<String>, label: Label) {
        self.texts.push(text.into());
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Reject corpora that cannot produce a meaningful binary model
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::training("training corpus is empty"));
        }
        if self.texts.len() != self.labels.len() {
            return Err(Error::training("texts and labels differ in length"));
        }
        for label in [Label::Safe, Label::Cyberbullying] {
            if !self.labels.contains(&label) {
                return Err(Error::training(format!(
                    "training corpus has no '{label}' examples"
                )));
            }
        }
        Ok(())
    }
}

/// Summary of one training run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub train_size: usize,
    pub test_size: usize,
    pub vocabulary_size: usize,

    /// Held-out accuracy, `None` when nothing was held out
    pub accuracy: Option<f64>,
}

/// Train a fresh model on `corpus`
pub fn train_model(
    normalizer: &Normalizer,
    params: &TrainingParams,
    corpus: &TrainingCorpus,
) -> Result<(Model, TrainingReport)> {
    params.validate()?;
    corpus.validate()?;

    info!("Training cyberbullying model on {} examples", corpus.len());

    let normalized: Vec<String> = corpus
        .texts()
        .iter()
        .map(|text| normalizer.normalize(text))
        .collect();
    let vectorizer = TfidfVectorizer::fit(params.vectorizer.clone(), &normalized)?;
    let width = vectorizer.vocabulary_size();

    let n = corpus.len();
    let n_test = (params.test_size * n as f64).ceil() as usize;
    if n_test >= n {
        return Err(Error::training(format!(
            "test split of {n_test} leaves no training examples out of {n}"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(params.forest.seed));
    let (test_idx, train_idx) = order.split_at(n_test);

    let rows: Vec<Vec<f64>> = train_idx
        .iter()
        .map(|&i| vectorizer.transform(&normalized[i]).to_dense(width))
        .collect();
    let labels: Vec<Label> = train_idx.iter().map(|&i| corpus.labels()[i]).collect();

    let forest = RandomForest::fit(params.forest.clone(), &rows, &labels)?;
    let model = Model::new(vectorizer, forest)?;

    let accuracy = if test_idx.is_empty() {
        None
    } else {
        let mut correct = 0;
        for &i in test_idx {
            if model.predict(&normalized[i])?.label == corpus.labels()[i] {
                correct += 1;
            }
        }
        Some(correct as f64 / test_idx.len() as f64)
    };

    let report = TrainingReport {
        train_size: train_idx.len(),
        test_size: test_idx.len(),
        vocabulary_size: width,
        accuracy,
    };

    match report.accuracy {
        Some(accuracy) => info!(
            "Model training completed. Accuracy: {:.3} ({} train / {} test, {} terms)",
            accuracy, report.train_size, report.test_size, report.vocabulary_size
        ),
        None => info!(
            "Model training completed on {} examples ({} terms)",
            report.train_size, report.vocabulary_size
        ),
    }

    Ok((model, report))
}

//! Cyberbullying detector
//!
//! Fuses the trained model (or the rule fallback when no model is loaded)
//! with lexicon theme scoring into one [`ClassificationResult`]. With a
//! model loaded, lexicon hits above the rule threshold still mark a message
//! as cyberbullying when the model calls it safe.

use crate::classifier::{Classifier, Prediction, PredictionSource};
use crate::config::DetectorConfig;
use crate::features::{extract_features, FeatureVector};
use crate::lexicon::{Lexicon, LexiconMatches};
use crate::model::{self, Model};
use crate::normalizer::Normalizer;
use crate::registry::ModelHandle;
use crate::rules::RuleClassifier;
use crate::theme::theme_from_matches;
use crate::training::{train_model, TrainingCorpus, TrainingParams, TrainingReport};
use bullyguard_core::{ClassificationResult, Error, Label, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct CyberbullyDetector {
    name: String,
    lexicon: Arc<Lexicon>,
    normalizer: Normalizer,
    rules: RuleClassifier,
    training: TrainingParams,
    lexicon_escalation: bool,
    model: ModelHandle,
}

impl CyberbullyDetector {
    /// Detector without a model, classifying with the rule fallback
    pub fn new(lexicon: Lexicon) -> Result<Self> {
        Ok(Self {
            name: "cyberbullying".to_string(),
            lexicon: Arc::new(lexicon),
            normalizer: Normalizer::new()?,
            rules: RuleClassifier::default(),
            training: TrainingParams::default(),
            lexicon_escalation: true,
            model: ModelHandle::new(),
        })
    }

    /// Detector built from configuration, without touching the filesystem
    pub fn with_config(config: &DetectorConfig) -> Result<Self> {
        config.validate()?;
        let mut detector = Self::new(config.build_lexicon()?)?;
        detector.rules = RuleClassifier::new(config.rule_threshold);
        detector.training = config.training.clone();
        detector.lexicon_escalation = config.lexicon_escalation;
        Ok(detector)
    }

    /// Startup procedure.
    ///
    /// Loads `model_path` when it exists; a file that fails to decode is a
    /// fatal error. When the file is missing and `train_if_missing` is set,
    /// trains on the built-in corpus and saves the result there. Otherwise
    /// the detector runs on the rule fallback.
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let detector = Self::with_config(config)?;

        match &config.model_path {
            Some(path) if path.exists() => {
                detector.set_model(model::load_from_file(path)?);
            }
            Some(path) if config.train_if_missing => {
                info!("No model at {}, training a new one", path.display());
                detector.retrain(&TrainingCorpus::builtin())?;
                if let Some(model) = detector.model() {
                    model::save_to_file(&model, path)?;
                }
            }
            None if config.train_if_missing => {
                detector.retrain(&TrainingCorpus::builtin())?;
            }
            _ => {
                info!("No trained model configured, using rule-based classification");
            }
        }

        Ok(detector)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_model(self, model: Model) -> Self {
        self.set_model(model);
        self
    }

    /// Let lexicon hits above the rule threshold overturn a `Safe` model
    /// prediction (on by default)
    pub fn with_lexicon_escalation(mut self, enabled: bool) -> Self {
        self.lexicon_escalation = enabled;
        self
    }

    /// Classify one message.
    ///
    /// Empty or whitespace-only text is `Safe` with confidence 1.0 and never
    /// reaches a model.
    pub fn classify(&self, text: &str) -> Result<ClassificationResult> {
        if text.trim().is_empty() {
            return Ok(ClassificationResult::safe());
        }

        let start = Instant::now();
        let matches = self.lexicon.scan(text);

        let (prediction, source) = self.decide(text, &matches)?;

        let (theme, theme_confidence) = theme_from_matches(&matches);
        let confidence = (prediction.confidence + theme_confidence) / 2.0;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::classifier(format!(
                "fused confidence {confidence} outside [0, 1]"
            )));
        }

        let result = ClassificationResult {
            classification: prediction.label,
            confidence,
            theme,
            keywords: matches.into_phrases(),
        };

        let latency_us = start.elapsed().as_micros() as u64;
        metrics::counter!(
            "bullyguard_classifications_total",
            "classification" => result.classification.as_str(),
            "source" => source.as_str()
        )
        .increment(1);
        metrics::histogram!("bullyguard_classify_latency_us").record(latency_us as f64);
        debug!(
            "Classified as {} (theme {}, confidence {:.3}) via {} in {}us",
            result.classification,
            result.theme,
            result.confidence,
            source.as_str(),
            latency_us
        );

        Ok(result)
    }

    /// Label and confidence without theme fusion
    pub fn predict(&self, text: &str) -> Result<(Prediction, PredictionSource)> {
        self.decide(text, &self.lexicon.scan(text))
    }

    /// Model prediction, escalated by the lexicon when enabled, or the rule
    /// fallback when no model is loaded.
    ///
    /// An escalated prediction carries the model's cyberbullying probability
    /// as its confidence.
    fn decide(
        &self,
        text: &str,
        matches: &LexiconMatches,
    ) -> Result<(Prediction, PredictionSource)> {
        let Some(model) = self.model.current() else {
            debug!("No model loaded, falling back to rules");
            return Ok((
                self.rules.classify_matches(&self.lexicon, matches),
                PredictionSource::Rules,
            ));
        };

        let prediction = model.predict(&self.normalizer.normalize(text))?;
        if self.lexicon_escalation && prediction.label == Label::Safe {
            let rule = self.rules.classify_matches(&self.lexicon, matches);
            if rule.label == Label::Cyberbullying {
                debug!(
                    "Lexicon ratio {:.3} overrides Safe model prediction",
                    rule.confidence
                );
                return Ok((
                    Prediction::new(Label::Cyberbullying, 1.0 - prediction.confidence),
                    PredictionSource::Lexicon,
                ));
            }
        }

        Ok((prediction, PredictionSource::Model))
    }

    /// Train a new model and swap it in.
    ///
    /// The current model stays in place when training fails.
    pub fn retrain(&self, corpus: &TrainingCorpus) -> Result<TrainingReport> {
        match train_model(&self.normalizer, &self.training, corpus) {
            Ok((model, report)) => {
                self.set_model(model);
                Ok(report)
            }
            Err(e) => {
                warn!("Training failed, keeping current model: {}", e);
                Err(e)
            }
        }
    }

    /// Reload the model from `path`; a failed load keeps the current model
    pub fn reload(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        match model::load_from_file(path) {
            Ok(model) => {
                self.set_model(model);
                Ok(())
            }
            Err(e) => {
                warn!("Model reload failed, keeping current model: {}", e);
                Err(e)
            }
        }
    }

    pub fn set_model(&self, model: Model) {
        self.model.replace(model);
    }

    /// Revert to rule-based classification
    pub fn clear_model(&self) {
        self.model.clear();
    }

    pub fn model(&self) -> Option<Arc<Model>> {
        self.model.current()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_loaded()
    }

    /// Shared handle to the model slot
    pub fn model_handle(&self) -> &ModelHandle {
        &self.model
    }

    pub fn extract_features(&self, text: &str) -> FeatureVector {
        extract_features(&self.lexicon, text)
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn is_cyberbullying(&self, text: &str) -> Result<bool> {
        Ok(self.classify(text)?.classification == Label::Cyberbullying)
    }
}

impl Default for CyberbullyDetector {
    fn default() -> Self {
        Self::new(Lexicon::default()).expect("Failed to create cyberbullying detector")
    }
}

#[async_trait::async_trait]
impl Classifier for CyberbullyDetector {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        CyberbullyDetector::classify(self, text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{ForestParams, RandomForest};
    use crate::vectorizer::{TfidfVectorizer, VectorizerParams};
    use bullyguard_core::Theme;

    /// Forest fitted on safe rows only, so every prediction is Safe at 1.0
    fn always_safe_model() -> Model {
        let docs = ["nice day", "lovely weather"];
        let vectorizer = TfidfVectorizer::fit(VectorizerParams::default(), &docs).unwrap();
        let width = vectorizer.vocabulary_size();
        let rows: Vec<Vec<f64>> = docs
            .iter()
            .map(|d| vectorizer.transform(d).to_dense(width))
            .collect();
        let params = ForestParams {
            n_estimators: 3,
            ..Default::default()
        };
        let forest = RandomForest::fit(params, &rows, &[Label::Safe, Label::Safe]).unwrap();
        Model::new(vectorizer, forest).unwrap()
    }

    #[test]
    fn test_empty_text_short_circuits() {
        let detector = CyberbullyDetector::default();
        for text in ["", "   ", "\n\t "] {
            assert_eq!(detector.classify(text).unwrap(), ClassificationResult::safe());
        }
    }

    #[test]
    fn test_fallback_scenarios() {
        let detector = CyberbullyDetector::default();
        assert!(!detector.has_model());

        let result = detector.classify("Hello, how are you today?").unwrap();
        assert_eq!(result.classification, Label::Safe);
        assert_eq!(result.theme, Theme::Safe);
        assert!(result.keywords.is_empty());
        assert_eq!(result.confidence, 1.0);

        let result = detector
            .classify("You're so ugly and stupid, nobody likes you.")
            .unwrap();
        assert_eq!(result.classification, Label::Cyberbullying);
        assert_eq!(result.theme, Theme::GeneralBullying);
        assert!(result.keywords.contains(&"ugly".to_string()));
        assert!(result.keywords.contains(&"stupid".to_string()));

        let result = detector.classify("I want to kill myself").unwrap();
        assert_eq!(result.classification, Label::Cyberbullying);
        assert_eq!(result.theme, Theme::SuicidalIdeation);
        assert_eq!(result.keywords, ["kill myself"]);
    }

    #[test]
    fn test_fused_confidence_is_mean() {
        let detector = CyberbullyDetector::default();
        let result = detector.classify("I want to kill myself").unwrap();
        let expected = (1.0 / 57.0 + 1.0) / 2.0;
        assert!((result.confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn test_lexicon_hits_escalate_safe_model_prediction() {
        let detector = CyberbullyDetector::default().with_model(always_safe_model());

        let (prediction, source) = detector.predict("I want to kill myself").unwrap();
        assert_eq!(source, PredictionSource::Lexicon);
        assert_eq!(prediction.label, Label::Cyberbullying);
        assert_eq!(prediction.confidence, 0.0);

        let result = detector.classify("I want to kill myself").unwrap();
        assert_eq!(result.classification, Label::Cyberbullying);
        assert_eq!(result.theme, Theme::SuicidalIdeation);
        assert_eq!(result.keywords, ["kill myself"]);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_no_escalation_without_lexicon_hits() {
        let detector = CyberbullyDetector::default().with_model(always_safe_model());

        let (prediction, source) = detector.predict("what a nice day").unwrap();
        assert_eq!(source, PredictionSource::Model);
        assert_eq!(prediction.label, Label::Safe);
        assert_eq!(detector.classify("what a nice day").unwrap().confidence, 1.0);
    }

    #[test]
    fn test_escalation_can_be_disabled() {
        let detector = CyberbullyDetector::default()
            .with_model(always_safe_model())
            .with_lexicon_escalation(false);
        let result = detector.classify("I want to kill myself").unwrap();
        assert_eq!(result.classification, Label::Safe);
        assert_eq!(result.confidence, 1.0);

        let config = DetectorConfig {
            model_path: None,
            lexicon_escalation: false,
            ..DetectorConfig::default()
        };
        let detector = CyberbullyDetector::with_config(&config)
            .unwrap()
            .with_model(always_safe_model());
        let (_, source) = detector.predict("you are a loser").unwrap();
        assert_eq!(source, PredictionSource::Model);
    }

    #[test]
    fn test_retrain_swaps_model() {
        let detector = CyberbullyDetector::default();
        let report = detector.retrain(&TrainingCorpus::builtin()).unwrap();
        assert!(detector.has_model());
        assert_eq!(report.train_size + report.test_size, 20);

        detector.clear_model();
        assert!(!detector.has_model());
    }

    #[test]
    fn test_failed_retrain_keeps_model() {
        let detector = CyberbullyDetector::default();
        detector.retrain(&TrainingCorpus::builtin()).unwrap();
        let before = detector.model().unwrap();

        let mut corpus = TrainingCorpus::new();
        corpus.push("only safe text here", Label::Safe);
        assert!(detector.retrain(&corpus).is_err());

        let after = detector.model().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_classifier_trait() {
        let detector = CyberbullyDetector::default().with_name("bully");
        let classifier: &dyn Classifier = &detector;

        assert_eq!(classifier.name(), "bully");
        let result = classifier.classify("you are a loser").await.unwrap();
        assert_eq!(result.classification, Label::Cyberbullying);
    }
}

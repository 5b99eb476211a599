//! Detector configuration

use crate::lexicon::Lexicon;
use crate::rules::DEFAULT_RULE_THRESHOLD;
use crate::training::TrainingParams;
use bullyguard_core::{Error, Result, Theme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration for [`CyberbullyDetector`](crate::CyberbullyDetector)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Persisted model artifact
    #[serde(default = "default_model_path")]
    pub model_path: Option<PathBuf>,

    /// Train on the built-in corpus when `model_path` does not exist
    #[serde(default = "default_true")]
    pub train_if_missing: bool,

    /// Offensive-ratio threshold of the rule fallback
    #[serde(default = "default_rule_threshold")]
    pub rule_threshold: f64,

    /// Lexicon hits above `rule_threshold` overturn a `Safe` model prediction
    #[serde(default = "default_true")]
    pub lexicon_escalation: bool,

    #[serde(default)]
    pub training: TrainingParams,

    /// Replacement phrase lists; the built-in lexicon when absent
    #[serde(default)]
    pub lexicon: Option<BTreeMap<Theme, Vec<String>>>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            train_if_missing: true,
            rule_threshold: default_rule_threshold(),
            lexicon_escalation: true,
            training: TrainingParams::default(),
            lexicon: None,
        }
    }
}

impl DetectorConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid detector config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.rule_threshold) {
            return Err(Error::config(format!(
                "rule_threshold must be in [0, 1], got {}",
                self.rule_threshold
            )));
        }
        if let Some(lexicon) = &self.lexicon {
            if lexicon.contains_key(&Theme::Safe) {
                return Err(Error::config("the 'safe' theme cannot carry lexicon phrases"));
            }
        }
        self.training.validate()
    }

    /// Build the configured lexicon
    pub fn build_lexicon(&self) -> Result<Lexicon> {
        match &self.lexicon {
            Some(entries) => Lexicon::new(entries.clone()),
            None => Ok(Lexicon::default()),
        }
    }
}

fn default_model_path() -> Option<PathBuf> {
    Some(PathBuf::from("models/cyberbully_model.json"))
}

fn default_rule_threshold() -> f64 {
    DEFAULT_RULE_THRESHOLD
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = DetectorConfig::from_yaml("{}").unwrap();
        assert_eq!(config, DetectorConfig::default());
        assert!(config.lexicon_escalation);
        assert_eq!(config.training.vectorizer.max_features, 1000);
        assert_eq!(config.training.vectorizer.ngram_range, (1, 2));
        assert_eq!(config.training.forest.n_estimators, 100);
        assert_eq!(config.training.forest.max_depth, 10);
        assert_eq!(config.training.forest.seed, 42);
    }

    #[test]
    fn test_detector_config_yaml() {
        let yaml = r#"
model_path: ./var/model.json
train_if_missing: false
rule_threshold: 0.05
lexicon_escalation: false
training:
  test_size: 0.25
  vectorizer:
    max_features: 500
    max_df: 0.8
  forest:
    n_estimators: 20
    seed: 7
lexicon:
  general_bullying: [loser, creep]
  suicidal_ideation: [kill myself]
"#;

        let config = DetectorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.model_path, Some(PathBuf::from("./var/model.json")));
        assert!(!config.train_if_missing);
        assert!(!config.lexicon_escalation);
        assert_eq!(config.training.vectorizer.max_features, 500);
        assert_eq!(config.training.vectorizer.min_df, 1);
        assert_eq!(config.training.forest.n_estimators, 20);
        assert_eq!(config.training.forest.max_depth, 10);

        let lexicon = config.build_lexicon().unwrap();
        assert_eq!(lexicon.total_phrases(), 3);
        assert!(lexicon.keywords_for_theme(Theme::RacialSlurs).is_empty());
    }

    #[test]
    fn test_null_model_path() {
        let config = DetectorConfig::from_yaml("model_path: null").unwrap();
        assert_eq!(config.model_path, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(DetectorConfig::from_yaml("rule_threshold: 1.5").is_err());
        assert!(DetectorConfig::from_yaml("training: {test_size: 1.0}").is_err());
        assert!(DetectorConfig::from_yaml("training: {forest: {n_estimators: 0}}").is_err());
        assert!(DetectorConfig::from_yaml("lexicon: {safe: [hello]}").is_err());
        assert!(DetectorConfig::from_yaml("lexicon: {hate_speech: [x]}").is_err());
    }
}

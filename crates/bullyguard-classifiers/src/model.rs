//! Trained model and its persisted form
//!
//! A [`Model`] pairs the fitted vectorizer with the random forest trained on
//! its columns. It is immutable once built; retraining produces a new value.
//! The artifact is a JSON blob, written with exact float round-tripping, so
//! `load(save(m))` reproduces `m` field for field.

use crate::classifier::Prediction;
use crate::forest::RandomForest;
use crate::vectorizer::TfidfVectorizer;
use bullyguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    vectorizer: TfidfVectorizer,
    forest: RandomForest,
}

impl Model {
    /// Pair a vectorizer with a forest, checking they agree on width
    pub fn new(vectorizer: TfidfVectorizer, forest: RandomForest) -> Result<Self> {
        let model = Self { vectorizer, forest };
        model.validate()?;
        Ok(model)
    }

    /// Predict from normalized text
    pub fn predict(&self, normalized: &str) -> Result<Prediction> {
        let vector = self.vectorizer.transform(normalized);
        let prediction = self.forest.predict(&vector)?;

        if !(0.0..=1.0).contains(&prediction.confidence) {
            return Err(Error::classifier(format!(
                "model produced confidence {} outside [0, 1]",
                prediction.confidence
            )));
        }
        Ok(prediction)
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.forest.validate()?;
        if self.forest.n_features() != self.vectorizer.vocabulary_size() {
            return Err(Error::model_corrupt(format!(
                "forest expects {} features but vocabulary has {}",
                self.forest.n_features(),
                self.vectorizer.vocabulary_size()
            )));
        }
        Ok(())
    }
}

/// Serialize a model into an opaque blob
pub fn save(model: &Model) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(model)?)
}

/// Decode and validate a blob produced by [`save`]
pub fn load(blob: &[u8]) -> Result<Model> {
    let model: Model = serde_json::from_slice(blob)
        .map_err(|e| Error::model_corrupt(format!("failed to decode model: {e}")))?;
    model.validate()?;
    Ok(model)
}

/// Write a model atomically: the blob goes to a temp file in the target
/// directory which is then renamed over `path`
pub fn save_to_file(model: &Model, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer(&mut writer, model)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| Error::Io(e.error))?;

    info!("Model saved to {}", path.display());
    Ok(())
}

/// Read and validate a model file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let model: Model = serde_json::from_reader(reader).map_err(|e| {
        Error::model_corrupt(format!("failed to decode {}: {e}", path.display()))
    })?;
    model.validate()?;

    info!(
        "Model loaded from {} ({} terms, {} trees)",
        path.display(),
        model.vectorizer.vocabulary_size(),
        model.forest.trees().len()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::ForestParams;
    use crate::vectorizer::VectorizerParams;
    use bullyguard_core::Label;

    fn tiny_model() -> Model {
        let docs = ["ugly loser", "nice day", "stupid loser", "lovely day"];
        let labels = [Label::Cyberbullying, Label::Safe, Label::Cyberbullying, Label::Safe];
        let vectorizer = TfidfVectorizer::fit(VectorizerParams::default(), &docs).unwrap();
        let rows: Vec<Vec<f64>> = docs
            .iter()
            .map(|d| vectorizer.transform(d).to_dense(vectorizer.vocabulary_size()))
            .collect();
        let params = ForestParams {
            n_estimators: 5,
            ..Default::default()
        };
        let forest = RandomForest::fit(params, &rows, &labels).unwrap();
        Model::new(vectorizer, forest).unwrap()
    }

    #[test]
    fn test_blob_round_trip() {
        let model = tiny_model();
        let restored = load(&save(&model).unwrap()).unwrap();
        assert_eq!(restored, model);
    }

    #[test]
    fn test_garbage_blob_is_corrupt() {
        assert!(matches!(load(b"not a model"), Err(Error::ModelCorrupt(_))));
        assert!(matches!(load(b"{}"), Err(Error::ModelCorrupt(_))));
    }

    #[test]
    fn test_width_mismatch_is_corrupt() {
        let model = tiny_model();
        let other = TfidfVectorizer::fit(VectorizerParams::default(), &["alpha", "beta"]).unwrap();
        let result = Model::new(other, model.forest.clone());
        assert!(matches!(result, Err(Error::ModelCorrupt(_))));
    }

    #[test]
    fn test_predict_unknown_text() {
        let model = tiny_model();
        let prediction = model.predict("").unwrap();
        assert!((0.0..=1.0).contains(&prediction.confidence));
    }
}

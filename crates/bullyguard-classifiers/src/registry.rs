//! Shared, swappable model slot

use crate::model::Model;
use parking_lot::RwLock;
use std::sync::Arc;

/// Process-wide reference to the current model.
///
/// Readers take an `Arc<Model>` snapshot and drop the lock immediately, so a
/// concurrent `replace` never blocks an in-flight classification and never
/// changes the model it is using.
#[derive(Debug, Clone, Default)]
pub struct ModelHandle {
    slot: Arc<RwLock<Option<Arc<Model>>>>,
}

impl ModelHandle {
    /// An empty slot; classification falls back to rules
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: Model) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(Arc::new(model)))),
        }
    }

    /// Snapshot of the current model
    pub fn current(&self) -> Option<Arc<Model>> {
        self.slot.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Swap in a new model, returning the previous one
    pub fn replace(&self, model: Model) -> Option<Arc<Model>> {
        self.slot.write().replace(Arc::new(model))
    }

    /// Drop the current model
    pub fn clear(&self) -> Option<Arc<Model>> {
        self.slot.write().take()
    }
}

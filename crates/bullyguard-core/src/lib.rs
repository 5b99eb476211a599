//! BullyGuard Core
//!
//! Types shared across BullyGuard components.
//!
//! This crate provides:
//! - The error type and result alias used by every crate in the workspace
//! - The classification labels and offensive themes
//! - The serialized classification record returned to callers

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ClassificationResult, Label, Theme};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ClassificationResult, Label, Theme};
}

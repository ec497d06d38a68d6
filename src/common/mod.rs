//! Common types shared across the import pipeline.

pub mod detection;
pub mod error;
pub mod id;

// Re-exports for convenience
pub use detection::{Detected, Format, SourceKind, Version};
pub use error::{Error, Result};
pub use id::Id;

//! Core trait, error type and adapters for pull-based data sources
//!
//! This crate defines the [`Source`] trait that every producer implements,
//! whether it reads from memory, a file, a generator or a mix of other
//! sources. Concrete producers live in `datasource-readers`.

#![warn(missing_docs)]

pub mod default_source;
pub mod error;
pub mod source;

// Re-export key types for convenience
pub use default_source::DefaultSource;
pub use error::{Error, GeneratorError, Result};
pub use source::{Source, SourceIter};

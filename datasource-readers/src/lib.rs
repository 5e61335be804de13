//! Source implementations for pull-based data sources
//!
//! This crate provides the concrete producers behind the
//! [`Source`](datasource_core::Source) trait: in-memory arrays, text files,
//! generator callables and a round-robin composite that interleaves any
//! mix of them.

pub mod array;
pub mod composite;
pub mod file;
pub mod generator;

pub use array::ArraySource;
pub use composite::CompositeSource;
pub use file::{FileSource, FileSourceOptions};
pub use generator::GeneratorSource;

// Re-export core types
pub use datasource_core::{DefaultSource, Error, Result, Source, SourceIter};

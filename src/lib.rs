//! Citation graph for controlled documents.
//!
//! Documents are identified by their file names
//! (`PREFIX-{subsystem}-R{revision}-{name}`), connected by resolved citations,
//! walked breadth- or depth-first, and persisted in a compact two-pass binary
//! format. Citation strings are matched against document names by longest
//! shared prefix, with a bigram similarity available as an alternative.

pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod parsers;
pub mod resolution;
pub mod scanner;
pub mod traversal;
pub mod types;

pub use document::{Document, Reference};
pub use error::{Error, Result};
pub use graph::ReferenceGraph;
pub use types::{DocIndex, DocumentId, Subsystem};

/// Crate-level error types for docgraph.
use std::path::PathBuf;

/// Every error names the file, query, index, or stream position involved,
/// so callers can report it without re-deriving context.
#[allow(clippy::error_impl_error, reason = "crate-level error type re-exported as docgraph::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The encoded graph is malformed, truncated, or references a document
    /// that does not exist.
    #[error("corrupt stream: {reason}")]
    CorruptStream {
        /// Description of what was malformed and where.
        reason: String,
    },

    /// A file name does not follow the `PREFIX-{subsystem}-R{revision}-{name}` pattern.
    #[error("invalid name format: {}: {reason}", file.display())]
    InvalidNameFormat {
        /// File whose name could not be parsed.
        file: PathBuf,
        /// Which part of the pattern was violated.
        reason: String,
    },

    /// Underlying I/O error from the filesystem or byte stream.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The matcher was called with a query shorter than the minimum match length,
    /// or with a zero minimum.
    #[error("cannot match query `{query}` with minimum match length {min_match_length}")]
    Match {
        /// Minimum match length that was requested.
        min_match_length: usize,
        /// Query string that was rejected.
        query: String,
    },

    /// A document handle is beyond the end of the graph.
    #[error("document index {index} out of range (graph has {size} documents)")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of documents in the graph.
        size: usize,
    },

    /// TOML deserialization of `.docgraph.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The graph holds a value the wire format cannot represent.
    #[error("cannot encode graph: {reason}")]
    Unencodable {
        /// Which value could not be written.
        reason: String,
    },
}

/// Convenience alias for results using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

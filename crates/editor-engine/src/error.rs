//! Error types returned by the engine.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while building or querying a [`Document`](crate::Document).
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    /// The file could not be read.
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    /// The file was read but its bytes are not UTF-8.
    Decode {
        /// Path that was being decoded.
        path: PathBuf,
    },

    #[error("line {line} out of range (document has {line_count} lines)")]
    /// An explicit line query addressed a line past the end of the document.
    OutOfRange {
        /// Requested line.
        line: usize,
        /// Number of lines in the document.
        line_count: usize,
    },
}

#[derive(Debug, Error)]
/// Errors produced while loading or validating an [`EditorConfig`](crate::EditorConfig).
pub enum ConfigError {
    #[error("config JSON parse error: {0}")]
    /// The configuration text is not valid JSON for the schema.
    Json(#[from] serde_json::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    /// A field parsed but holds an unusable value.
    Invalid {
        /// Dotted field path.
        field: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
/// Errors produced by the fixed binary encodings in [`wire`](crate::wire).
pub enum WireError {
    #[error("truncated buffer: needed {needed} bytes, {available} available")]
    /// The buffer ended before the declared payload.
    Truncated {
        /// Bytes required to finish decoding.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },

    #[error("unknown gesture result tag {0}")]
    /// A result buffer carried a tag outside the known range.
    UnknownTag(u32),
}

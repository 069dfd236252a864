//! Typed errors for each stage of the answering pipeline.
//!
//! Startup errors ([`CorpusLoadError`], [`IndexBuildError`]) are fatal and
//! propagate out of [`AppContext::build`](crate::app::AppContext::build).
//! Per-request errors are gathered into [`CompositionError`], which the
//! webhook turns into a conversational reply instead of an HTTP failure.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to read or parse the FAQ corpus file.
#[derive(Debug, Error)]
pub enum CorpusLoadError {
    #[error("failed to read corpus file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse corpus file {path} as JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("corpus file {path} must contain a JSON array at the top level, found {found}")]
    NotAnArray { path: PathBuf, found: &'static str },

    #[error("failed to serialize element {position} of corpus file {path}: {source}")]
    Encode {
        path: PathBuf,
        position: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure talking to the embedding service.
#[derive(Debug, Error)]
pub enum EmbeddingServiceError {
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Failure talking to the chat-completion service.
#[derive(Debug, Error)]
pub enum ChatServiceError {
    #[error("chat completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat completion API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid chat completion response: {0}")]
    InvalidResponse(String),

    #[error("chat completion returned no content")]
    EmptyCompletion,
}

/// Failure while building the vector index at startup.
#[derive(Debug, Error)]
pub enum IndexBuildError {
    #[error("corpus is empty; nothing to index")]
    EmptyCorpus,

    #[error(transparent)]
    Embedding(#[from] EmbeddingServiceError),

    #[error("embedding service returned {got} vectors for {expected} documents")]
    CountMismatch { expected: usize, got: usize },

    #[error("document {position} embedded to {got} dimensions, expected {expected}")]
    Dimension {
        position: usize,
        expected: usize,
        got: usize,
    },
}

/// Failure querying a built index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("query vector has {got} dimensions but the index was built with {expected}")]
    Dimension { expected: usize, got: usize },
}

/// Any failure while composing an answer for a single query.
///
/// `Display` forwards the underlying error text; the webhook embeds it in
/// the reply sent back to the user.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingServiceError),

    #[error(transparent)]
    Retrieval(#[from] IndexError),

    #[error(transparent)]
    Completion(#[from] ChatServiceError),
}

impl CompositionError {
    /// Short machine-readable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CompositionError::Embedding(_) => "embedding",
            CompositionError::Retrieval(_) => "retrieval",
            CompositionError::Completion(_) => "completion",
        }
    }
}

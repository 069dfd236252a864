//! Core data models used throughout the responder.
//!
//! These types represent the FAQ documents, retrieval hits, and answers that
//! flow through the answering pipeline.

/// One FAQ entry loaded from the corpus file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The array element serialized back to JSON, verbatim.
    pub text: String,
    /// 0-based position in the corpus array.
    pub position: usize,
    /// 1-based record number, as shown in logs.
    pub seq_num: usize,
    /// Label of the file the document came from.
    pub source: String,
}

/// A document returned from an index query with its distance to the query.
#[derive(Debug, Clone, Copy)]
pub struct ScoredDocument<'a> {
    pub document: &'a Document,
    /// Squared L2 distance; lower is closer.
    pub distance: f32,
}

/// A composed reply for a single inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Post-processed reply text.
    pub text: String,
    /// Corpus positions of the documents placed in the prompt context.
    pub context_positions: Vec<usize>,
}

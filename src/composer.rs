//! Retrieval-augmented answer composition.
//!
//! One [`AnswerComposer::compose`] call runs the whole per-message pipeline:
//!
//! 1. Embed the query with the same provider that built the index.
//! 2. Retrieve the top-k nearest documents.
//! 3. Fill the support prompt with their texts and the raw query.
//! 4. Ask the chat model for a completion at a fixed low temperature.
//! 5. Strip a leading `answer:` label.
//!
//! Any failed step fails the whole call with a [`CompositionError`]; there
//! is no retry.

use std::sync::Arc;

use crate::chat::ChatModel;
use crate::embedding::EmbeddingProvider;
use crate::error::CompositionError;
use crate::index::{VectorIndex, DEFAULT_TOP_K};
use crate::models::Answer;
use crate::prompt::{build_prompt, strip_answer_prefix};

/// Tuning knobs for composition, decoupled from application config.
#[derive(Debug, Clone)]
pub struct ComposerSettings {
    /// Number of documents placed in the prompt context.
    pub top_k: usize,
    /// Sampling temperature for the chat model.
    pub temperature: f32,
    /// Business named in the system instruction.
    pub business_name: String,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            temperature: 0.3,
            business_name: "JustAnotherSampleBrew".to_string(),
        }
    }
}

/// Composes grounded answers from the shared index and model clients.
pub struct AnswerComposer {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatModel>,
    settings: ComposerSettings,
}

impl AnswerComposer {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatModel>,
        settings: ComposerSettings,
    ) -> Self {
        Self {
            index,
            embedder,
            chat,
            settings,
        }
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// Build the prompt for `query` without calling the chat model.
    pub async fn prepare_prompt(&self, query: &str) -> Result<(String, Vec<usize>), CompositionError> {
        let query_vec = self.embedder.embed_query(query).await?;
        let hits = self.index.query(&query_vec, self.settings.top_k)?;

        tracing::debug!(
            "Retrieved {} documents: {:?}",
            hits.len(),
            hits.iter()
                .map(|h| (h.document.seq_num, h.distance))
                .collect::<Vec<_>>()
        );

        let context: Vec<&str> = hits.iter().map(|h| h.document.text.as_str()).collect();
        let positions = hits.iter().map(|h| h.document.position).collect();
        let prompt = build_prompt(&self.settings.business_name, &context, query);
        Ok((prompt, positions))
    }

    /// Answer `query` from the indexed corpus.
    ///
    /// Empty queries are not rejected; they run through the same pipeline.
    pub async fn compose(&self, query: &str) -> Result<Answer, CompositionError> {
        let (prompt, context_positions) = self.prepare_prompt(query).await?;
        let completion = self
            .chat
            .complete(&prompt, self.settings.temperature)
            .await?;

        Ok(Answer {
            text: strip_answer_prefix(&completion),
            context_positions,
        })
    }
}

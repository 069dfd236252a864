//! Application startup.
//!
//! [`AppContext::build`] performs every one-time step before the listener
//! binds: read the API key, load the corpus, embed it into the index, and
//! wire up the composer. Any failure aborts startup; there is no
//! partially-available mode. The finished context is immutable and shared
//! with request handlers via `Arc`.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::chat::{ChatModel, OpenAIChat};
use crate::composer::{AnswerComposer, ComposerSettings};
use crate::config::{api_key_from_env, Config};
use crate::corpus::load_corpus;
use crate::embedding::{EmbeddingProvider, OpenAIEmbedder};
use crate::index::VectorIndex;

/// Everything a request handler needs, built once at startup.
pub struct AppContext {
    composer: AnswerComposer,
}

impl AppContext {
    /// Build the production context from configuration.
    ///
    /// Reads the API key from the environment and calls the embedding
    /// service once per corpus batch.
    pub async fn build(config: &Config) -> Result<Self> {
        let api_key = api_key_from_env()?;

        let documents = load_corpus(&config.corpus.path).context("Failed to load FAQ corpus")?;

        let embedder = OpenAIEmbedder::new(&config.embedding, api_key.clone())
            .context("Failed to create embedding client")?;
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);

        tracing::info!(
            "Embedding {} documents with {}",
            documents.len(),
            embedder.model_name()
        );
        let index = VectorIndex::build(documents, embedder.as_ref(), config.embedding.batch_size)
            .await
            .context("Failed to build vector index")?;

        let chat = OpenAIChat::new(&config.chat, api_key).context("Failed to create chat client")?;
        let chat: Arc<dyn ChatModel> = Arc::new(chat);

        let settings = ComposerSettings {
            top_k: config.retrieval.top_k,
            temperature: config.chat.temperature,
            business_name: config.assistant.business_name.clone(),
        };

        Ok(Self::from_parts(Arc::new(index), embedder, chat, settings))
    }

    /// Assemble a context from already-built components.
    pub fn from_parts(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatModel>,
        settings: ComposerSettings,
    ) -> Self {
        tracing::info!(
            "Answering with {} (top_k = {}, temperature = {})",
            chat.model_name(),
            settings.top_k,
            settings.temperature
        );
        Self {
            composer: AnswerComposer::new(index, embedder, chat, settings),
        }
    }

    pub fn composer(&self) -> &AnswerComposer {
        &self.composer
    }

    pub fn index(&self) -> &VectorIndex {
        self.composer.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::API_KEY_ENV;
    use crate::error::{CorpusLoadError, IndexBuildError};
    use tempfile::TempDir;

    // Tests below mutate the process environment.
    static ENV_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

    fn config_with_corpus(tmp: &TempDir, content: Option<&str>) -> Config {
        let mut config = Config::default();
        config.corpus.path = tmp.path().join("faq.json");
        if let Some(content) = content {
            std::fs::write(&config.corpus.path, content).unwrap();
        }
        config
    }

    #[tokio::test]
    async fn test_build_fails_fast_without_api_key() {
        let _env = ENV_LOCK.lock().await;
        std::env::remove_var(API_KEY_ENV);
        let tmp = TempDir::new().unwrap();
        let config = config_with_corpus(&tmp, Some(r#"[{"q":"a"}]"#));

        let err = AppContext::build(&config).await.err().unwrap();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[tokio::test]
    async fn test_build_fails_on_missing_corpus() {
        let _env = ENV_LOCK.lock().await;
        std::env::set_var(API_KEY_ENV, "sk-test");
        let tmp = TempDir::new().unwrap();
        let config = config_with_corpus(&tmp, None);

        let err = AppContext::build(&config).await.err().unwrap();
        std::env::remove_var(API_KEY_ENV);

        assert!(format!("{:#}", err).contains("Failed to load FAQ corpus"));
        assert!(err
            .chain()
            .any(|cause| cause.downcast_ref::<CorpusLoadError>().is_some()));
    }

    #[tokio::test]
    async fn test_build_fails_on_empty_corpus() {
        let _env = ENV_LOCK.lock().await;
        std::env::set_var(API_KEY_ENV, "sk-test");
        let tmp = TempDir::new().unwrap();
        let config = config_with_corpus(&tmp, Some("[]"));

        let err = AppContext::build(&config).await.err().unwrap();
        std::env::remove_var(API_KEY_ENV);

        assert!(format!("{:#}", err).contains("Failed to build vector index"));
        assert!(matches!(
            err.downcast_ref::<IndexBuildError>(),
            Some(IndexBuildError::EmptyCorpus)
        ));
    }
}

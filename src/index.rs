//! In-memory exact nearest-neighbour index over the FAQ corpus.
//!
//! [`VectorIndex::build`] embeds every document once at startup; afterwards
//! the index is read-only and can be shared across request handlers behind
//! an `Arc` without locking. Queries are brute-force squared-L2 over all
//! stored vectors, which is exact and cheap at FAQ scale.
//!
//! The index records the dimensionality it was built with and rejects query
//! vectors of any other length.

use crate::embedding::{squared_l2_distance, EmbeddingProvider};
use crate::error::{IndexBuildError, IndexError};
use crate::models::{Document, ScoredDocument};

/// Number of documents retrieved per query unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 4;

/// Immutable vector index holding one vector per corpus document.
#[derive(Debug)]
pub struct VectorIndex {
    documents: Vec<Document>,
    vectors: Vec<Vec<f32>>,
    dims: usize,
}

impl VectorIndex {
    /// Embed `documents` with `embedder` and build the index.
    ///
    /// Texts are sent in batches of at most `batch_size`. Any failed call,
    /// short response, or vector of the wrong length aborts the build.
    pub async fn build(
        documents: Vec<Document>,
        embedder: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> Result<Self, IndexBuildError> {
        if documents.is_empty() {
            return Err(IndexBuildError::EmptyCorpus);
        }

        let dims = embedder.dims();
        let batch_size = batch_size.max(1);
        let mut vectors = Vec::with_capacity(documents.len());

        for batch in documents.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
            let embedded = embedder.embed_texts(&texts).await?;

            if embedded.len() != batch.len() {
                return Err(IndexBuildError::CountMismatch {
                    expected: batch.len(),
                    got: embedded.len(),
                });
            }

            for (doc, vector) in batch.iter().zip(embedded) {
                if vector.len() != dims {
                    return Err(IndexBuildError::Dimension {
                        position: doc.position,
                        expected: dims,
                        got: vector.len(),
                    });
                }
                vectors.push(vector);
            }

            tracing::debug!("Embedded {}/{} documents", vectors.len(), documents.len());
        }

        tracing::info!(
            "Built index with {} vectors ({} dims, model {})",
            vectors.len(),
            dims,
            embedder.model_name()
        );

        Ok(Self {
            documents,
            vectors,
            dims,
        })
    }

    /// Build an index from precomputed vectors, with the same count and
    /// dimension checks as [`build`](Self::build).
    #[cfg(test)]
    pub(crate) fn from_vectors(
        documents: Vec<Document>,
        vectors: Vec<Vec<f32>>,
        dims: usize,
    ) -> Result<Self, IndexBuildError> {
        if documents.is_empty() {
            return Err(IndexBuildError::EmptyCorpus);
        }
        if vectors.len() != documents.len() {
            return Err(IndexBuildError::CountMismatch {
                expected: documents.len(),
                got: vectors.len(),
            });
        }
        if let Some((doc, v)) = documents
            .iter()
            .zip(vectors.iter())
            .find(|(_, v)| v.len() != dims)
        {
            return Err(IndexBuildError::Dimension {
                position: doc.position,
                expected: dims,
                got: v.len(),
            });
        }
        Ok(Self {
            documents,
            vectors,
            dims,
        })
    }

    /// Return up to `k` documents closest to `query`, nearest first.
    ///
    /// Ties keep corpus order. `k` larger than the corpus returns every
    /// document.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<ScoredDocument<'_>>, IndexError> {
        if query.len() != self.dims {
            return Err(IndexError::Dimension {
                expected: self.dims,
                got: query.len(),
            });
        }

        let mut scored: Vec<ScoredDocument<'_>> = self
            .documents
            .iter()
            .zip(self.vectors.iter())
            .map(|(document, vector)| ScoredDocument {
                document,
                distance: squared_l2_distance(query, vector),
            })
            .collect();

        // Stable sort keeps corpus order among equal distances.
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbeddingServiceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document {
                text: format!("doc {}", i),
                position: i,
                seq_num: i + 1,
                source: "test.json".to_string(),
            })
            .collect()
    }

    /// Declares 2 dims and embeds `"doc N"` as `[N, 0, ...]` padded to `output_len`.
    struct PositionEmbedder {
        output_len: usize,
        calls: AtomicUsize,
    }

    impl PositionEmbedder {
        fn new(output_len: usize) -> Self {
            Self {
                output_len,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for PositionEmbedder {
        fn model_name(&self) -> &str {
            "position"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed_texts(
            &self,
            texts: &[String],
        ) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let n: f32 = t.trim_start_matches("doc ").parse().unwrap_or(0.0);
                    let mut v = vec![0.0; self.output_len];
                    v[0] = n;
                    v
                })
                .collect())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        fn model_name(&self) -> &str {
            "failing"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed_texts(
            &self,
            _texts: &[String],
        ) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
            Err(EmbeddingServiceError::Api {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_build_one_vector_per_document() {
        let embedder = PositionEmbedder::new(2);
        let index = VectorIndex::build(docs(5), &embedder, 2).await.unwrap();
        assert_eq!(index.len(), 5);
        assert_eq!(index.dims(), 2);
        // 5 documents in batches of 2
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_build_rejects_wrong_dimension() {
        let embedder = PositionEmbedder::new(3);
        let err = VectorIndex::build(docs(2), &embedder, 8).await.unwrap_err();
        assert!(matches!(
            err,
            IndexBuildError::Dimension {
                position: 0,
                expected: 2,
                got: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_build_propagates_embedding_failure() {
        let err = VectorIndex::build(docs(2), &FailingEmbedder, 8)
            .await
            .unwrap_err();
        assert!(matches!(err, IndexBuildError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_build_empty_corpus() {
        let err = VectorIndex::build(Vec::new(), &PositionEmbedder::new(2), 8)
            .await
            .unwrap_err();
        assert!(matches!(err, IndexBuildError::EmptyCorpus));
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let index = VectorIndex::build(docs(6), &PositionEmbedder::new(2), 64)
            .await
            .unwrap();

        let results = index.query(&[3.0, 0.0], 4).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].document.position, 3);
        assert_eq!(results[0].distance, 0.0);
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        // 2 and 4 are equidistant from 3; corpus order wins
        assert_eq!(results[1].document.position, 2);
        assert_eq!(results[2].document.position, 4);
    }

    #[test]
    fn test_query_k_larger_than_corpus() {
        let index = VectorIndex::from_vectors(
            docs(3),
            vec![vec![0.0, 1.0], vec![0.0, 0.0], vec![5.0, 5.0]],
            2,
        )
        .unwrap();

        let results = index.query(&[0.0, 0.0], 10).unwrap();
        let positions: Vec<usize> = results.iter().map(|r| r.document.position).collect();
        assert_eq!(positions, vec![1, 0, 2]);
    }

    #[test]
    fn test_query_ties_keep_corpus_order() {
        let index =
            VectorIndex::from_vectors(docs(4), vec![vec![1.0, 1.0]; 4], 2).unwrap();
        let positions: Vec<usize> = index
            .query(&[0.0, 0.0], 4)
            .unwrap()
            .iter()
            .map(|r| r.document.position)
            .collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = VectorIndex::from_vectors(docs(1), vec![vec![1.0, 0.0]], 2).unwrap();
        let err = index.query(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            IndexError::Dimension {
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn test_from_vectors_count_mismatch() {
        let err = VectorIndex::from_vectors(docs(2), vec![vec![1.0, 0.0]], 2).unwrap_err();
        assert!(matches!(
            err,
            IndexBuildError::CountMismatch {
                expected: 2,
                got: 1
            }
        ));
    }
}

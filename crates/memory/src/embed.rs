//! Embedding functions.
//!
//! - [`HashEmbedder`]: offline, deterministic feature hashing
//! - [`ProviderEmbedder`]: delegates to the model backend's `/embeddings`

use async_trait::async_trait;
use openclaw_core::error::MemoryError;
use openclaw_core::memory::Embedder;
use openclaw_core::provider::{EmbeddingRequest, Provider};
use std::sync::Arc;

/// Feature-hashing embedder.
///
/// Each normalized word and each character trigram of a padded word is
/// hashed into one of `dimensions` buckets with a hash-derived sign. The
/// result is L2-normalized, so cosine similarity reduces to a dot product.
/// Texts sharing vocabulary land close together; nothing is learned.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub const DEFAULT_DIMENSIONS: usize = 256;

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for word in normalized_words(text) {
            self.add_feature(&mut vector, word.as_bytes(), 1.0);

            let padded: Vec<char> = format!(" {word} ").chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut vector, gram.as_bytes(), 0.5);
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let h = fnv1a(feature);
        let bucket = (h % self.dimensions as u64) as usize;
        let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        Ok(self.embed_sync(text))
    }
}

fn normalized_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

// 64-bit FNV-1a. Stable across builds, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Embedder backed by a [`Provider`] that supports embeddings.
pub struct ProviderEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
    name: String,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        let model = model.into();
        let name = format!("provider:{model}");
        Self {
            provider,
            model,
            name,
        }
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: vec![text.to_string()],
            })
            .await
            .map_err(|e| MemoryError::EmbeddingFailed(e.to_string()))?;

        response
            .embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| MemoryError::EmbeddingFailed("empty embedding response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::cosine_similarity;
    use openclaw_core::error::ProviderError;
    use openclaw_core::provider::{EmbeddingResponse, ProviderRequest, ProviderResponse};

    #[tokio::test]
    async fn hash_embedding_is_deterministic_and_normalized() {
        let e = HashEmbedder::default();
        let a = e.embed("I like green tea").await.unwrap();
        let b = e.embed("I like green tea").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 256);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn related_text_scores_higher_than_unrelated() {
        let e = HashEmbedder::default();
        let fact = e.embed("User preference: I like green tea").await.unwrap();
        let related = e.embed("what tea do I like?").await.unwrap();
        let unrelated = e.embed("schedule the rocket launch").await.unwrap();
        assert!(cosine_similarity(&fact, &related) > cosine_similarity(&fact, &unrelated));
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let e = HashEmbedder::new(16);
        let v = e.embed("  ... ").await.unwrap();
        assert_eq!(v.len(), 16);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    struct FixedEmbeddings(Vec<Vec<f32>>);

    #[async_trait]
    impl Provider for FixedEmbeddings {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("completion".into()))
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            Ok(EmbeddingResponse {
                embeddings: self.0.clone(),
                model: request.model,
            })
        }
    }

    #[tokio::test]
    async fn provider_embedder_returns_first_vector() {
        let e = ProviderEmbedder::new(Arc::new(FixedEmbeddings(vec![vec![0.1, 0.2]])), "all-minilm");
        assert_eq!(e.name(), "provider:all-minilm");
        assert_eq!(e.embed("hi").await.unwrap(), vec![0.1, 0.2]);
    }

    #[tokio::test]
    async fn provider_embedder_rejects_empty_response() {
        let e = ProviderEmbedder::new(Arc::new(FixedEmbeddings(vec![])), "all-minilm");
        assert!(matches!(
            e.embed("hi").await,
            Err(MemoryError::EmbeddingFailed(_))
        ));
    }
}

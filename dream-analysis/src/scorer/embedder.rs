//! Feature-hashing text embedder
//!
//! Deterministic bag of unigrams and (optionally) bigrams hashed into a fixed
//! number of signed buckets, then L2-normalized. Settings come from the
//! artifact's `tokenizer.json` so the classifier heads see exactly the vectors
//! they were exported against.

use super::Embedder;
use crate::error::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

/// Embedding backend selector in `tokenizer.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    Hashing,
}

/// Contents of `tokenizer.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedderConfig {
    pub kind: EmbedderKind,
    /// Output vector length
    pub dimension: usize,
    /// Tokens beyond this count are ignored (truncation)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_true")]
    pub bigrams: bool,
}

fn default_max_tokens() -> usize {
    512
}

fn default_true() -> bool {
    true
}

impl EmbedderConfig {
    pub fn hashing(dimension: usize) -> Self {
        Self {
            kind: EmbedderKind::Hashing,
            dimension,
            max_tokens: default_max_tokens(),
            lowercase: true,
            bigrams: true,
        }
    }
}

/// FNV-1a 64-bit; stable across platforms and releases
fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut h = OFFSET;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(PRIME);
    }
    h
}

/// Hashing embedder built from an [`EmbedderConfig`]
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    config: EmbedderConfig,
}

impl HashingEmbedder {
    pub fn new(config: EmbedderConfig) -> AnalysisResult<Self> {
        if config.dimension == 0 {
            return Err(AnalysisError::InvalidInput(
                "embedding dimension must be positive".to_string(),
            ));
        }
        Ok(Self { config })
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .take(self.config.max_tokens)
            .map(|t| {
                if self.config.lowercase {
                    t.to_lowercase()
                } else {
                    t.to_string()
                }
            })
            .collect()
    }

    fn accumulate(&self, vector: &mut [f32], feature: &str) {
        let h = fnv1a64(feature.as_bytes());
        let bucket = (h % self.config.dimension as u64) as usize;
        let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
        vector[bucket] += sign;
    }
}

impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn embed(&self, text: &str) -> AnalysisResult<Vec<f32>> {
        let mut vector = vec![0.0f32; self.config.dimension];
        let tokens = self.tokens(text);

        for token in &tokens {
            self.accumulate(&mut vector, token);
        }
        if self.config.bigrams {
            for pair in tokens.windows(2) {
                self.accumulate(&mut vector, &format!("{} {}", pair[0], pair[1]));
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }
}

//! Model Scorer
//!
//! Thin wrapper over the opaque scoring functions:
//! - `embed(text) -> vector`
//! - `classify_valence(vector) -> probability` (binary head, softmax `[neg, pos]`)
//! - `classify_facets(vector) -> probabilities` (multi-label head, sigmoid per label)
//!
//! Facets outside the head's active-label set default to 0.0. Finite
//! out-of-range head outputs are clamped; non-finite outputs fail the request.

pub mod artifacts;
pub mod embedder;
pub mod mlp;

pub use artifacts::{ArtifactSummary, ModelArtifacts};
pub use embedder::{EmbedderConfig, HashingEmbedder};

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{Facet, FacetScores, RawScores};
use std::sync::Arc;

/// Text → vector
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> AnalysisResult<Vec<f32>>;
}

/// Vector → probability that the text is positive
pub trait ValenceClassifier: Send + Sync {
    fn classify_valence(&self, embedding: &[f32]) -> AnalysisResult<f64>;
}

/// Vector → one probability per active label
pub trait FacetClassifier: Send + Sync {
    /// Facets this head was trained on, in output order
    fn active_labels(&self) -> &[Facet];

    fn classify_facets(&self, embedding: &[f32]) -> AnalysisResult<Vec<f64>>;
}

/// Produces [`RawScores`] for a text
pub struct ModelScorer {
    valence_embedder: Arc<dyn Embedder>,
    facet_embedder: Arc<dyn Embedder>,
    // Both heads consume the same vector, embed once
    shared_embedding: bool,
    valence_head: Box<dyn ValenceClassifier>,
    facet_head: Box<dyn FacetClassifier>,
}

impl ModelScorer {
    /// Scorer whose heads share a single embedder
    pub fn new(
        embedder: Arc<dyn Embedder>,
        valence_head: Box<dyn ValenceClassifier>,
        facet_head: Box<dyn FacetClassifier>,
    ) -> Self {
        Self {
            valence_embedder: embedder.clone(),
            facet_embedder: embedder,
            shared_embedding: true,
            valence_head,
            facet_head,
        }
    }

    /// Scorer whose heads were trained against different embedders
    pub fn with_embedders(
        valence_embedder: Arc<dyn Embedder>,
        facet_embedder: Arc<dyn Embedder>,
        valence_head: Box<dyn ValenceClassifier>,
        facet_head: Box<dyn FacetClassifier>,
    ) -> Self {
        Self {
            valence_embedder,
            facet_embedder,
            shared_embedding: false,
            valence_head,
            facet_head,
        }
    }

    pub fn active_labels(&self) -> &[Facet] {
        self.facet_head.active_labels()
    }

    /// Score one text
    ///
    /// # Errors
    /// `AnalysisError::Inference` if a backend fails or returns non-finite values.
    pub fn score(&self, text: &str) -> AnalysisResult<RawScores> {
        let valence_vec = self.valence_embedder.embed(text)?;
        let positive =
            checked_probability("valence", self.valence_head.classify_valence(&valence_vec)?)?;

        let facet_vec = if self.shared_embedding {
            valence_vec
        } else {
            self.facet_embedder.embed(text)?
        };
        let probabilities = self.facet_head.classify_facets(&facet_vec)?;
        let labels = self.facet_head.active_labels();
        if probabilities.len() != labels.len() {
            return Err(AnalysisError::Inference(format!(
                "facet head returned {} probabilities for {} labels",
                probabilities.len(),
                labels.len()
            )));
        }

        let mut facets = FacetScores::zeros();
        for (facet, p) in labels.iter().zip(probabilities) {
            facets.set(*facet, checked_probability(facet.as_str(), p)?);
        }

        Ok(RawScores::new(positive, facets))
    }
}

fn checked_probability(head: &str, p: f64) -> AnalysisResult<f64> {
    if !p.is_finite() {
        return Err(AnalysisError::Inference(format!(
            "{} head produced a non-finite probability",
            head
        )));
    }
    Ok(p.clamp(0.0, 1.0))
}

//! Dense classifier heads loaded from `weights.json`
//!
//! Layers are applied in order with ReLU between them (none after the last).
//! - Valence head: 2 logits, softmax, index order `[negative, positive]`
//! - Facet head: one logit per active label, independent sigmoid

use super::{FacetClassifier, ValenceClassifier};
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::Facet;
use serde::{Deserialize, Serialize};

/// One dense layer: `out[j] = bias[j] + Σ weight[j][k] · in[k]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Row-major `[out][in]`
    pub weight: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

/// Contents of `weights.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpWeights {
    pub layers: Vec<DenseLayer>,
}

/// Validated multi-layer perceptron
#[derive(Debug, Clone)]
pub struct Mlp {
    layers: Vec<DenseLayer>,
    input_dim: usize,
}

impl Mlp {
    /// Validate layer shapes against the expected input width
    ///
    /// # Errors
    /// Returns a human-readable reason when the shapes do not chain.
    pub fn from_weights(weights: MlpWeights, input_dim: usize) -> Result<Self, String> {
        if weights.layers.is_empty() {
            return Err("no layers".to_string());
        }

        let mut width = input_dim;
        for (i, layer) in weights.layers.iter().enumerate() {
            if layer.weight.is_empty() {
                return Err(format!("layer {} has no output units", i));
            }
            if layer.bias.len() != layer.weight.len() {
                return Err(format!(
                    "layer {}: bias length {} != output units {}",
                    i,
                    layer.bias.len(),
                    layer.weight.len()
                ));
            }
            if let Some(row) = layer.weight.iter().position(|r| r.len() != width) {
                return Err(format!(
                    "layer {} row {}: expected {} inputs, found {}",
                    i,
                    row,
                    width,
                    layer.weight[row].len()
                ));
            }
            width = layer.weight.len();
        }

        Ok(Self {
            layers: weights.layers,
            input_dim,
        })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.layers.last().map(|l| l.bias.len()).unwrap_or(0)
    }

    /// Forward pass producing raw logits
    pub fn forward(&self, input: &[f32]) -> AnalysisResult<Vec<f64>> {
        if input.len() != self.input_dim {
            return Err(AnalysisError::Inference(format!(
                "embedding width {} does not match head input {}",
                input.len(),
                self.input_dim
            )));
        }

        let mut activations: Vec<f64> = input.iter().map(|v| *v as f64).collect();
        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            activations = layer
                .weight
                .iter()
                .zip(&layer.bias)
                .map(|(row, bias)| {
                    let z = *bias as f64
                        + row
                            .iter()
                            .zip(&activations)
                            .map(|(w, a)| *w as f64 * a)
                            .sum::<f64>();
                    if i < last {
                        z.max(0.0)
                    } else {
                        z
                    }
                })
                .collect();
        }
        Ok(activations)
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Binary valence head
#[derive(Debug, Clone)]
pub struct MlpValenceHead {
    mlp: Mlp,
}

impl MlpValenceHead {
    pub fn new(mlp: Mlp) -> Result<Self, String> {
        if mlp.output_dim() != 2 {
            return Err(format!(
                "valence head must have 2 outputs, found {}",
                mlp.output_dim()
            ));
        }
        Ok(Self { mlp })
    }
}

impl ValenceClassifier for MlpValenceHead {
    fn classify_valence(&self, embedding: &[f32]) -> AnalysisResult<f64> {
        let logits = self.mlp.forward(embedding)?;
        // softmax([neg, pos])[1] == sigmoid(pos - neg)
        Ok(sigmoid(logits[1] - logits[0]))
    }
}

/// Multi-label facet head
#[derive(Debug, Clone)]
pub struct MlpFacetHead {
    mlp: Mlp,
    labels: Vec<Facet>,
}

impl MlpFacetHead {
    pub fn new(mlp: Mlp, labels: Vec<Facet>) -> Result<Self, String> {
        if mlp.output_dim() != labels.len() {
            return Err(format!(
                "facet head has {} outputs but {} active labels",
                mlp.output_dim(),
                labels.len()
            ));
        }
        Ok(Self { mlp, labels })
    }
}

impl FacetClassifier for MlpFacetHead {
    fn active_labels(&self) -> &[Facet] {
        &self.labels
    }

    fn classify_facets(&self, embedding: &[f32]) -> AnalysisResult<Vec<f64>> {
        Ok(self.mlp.forward(embedding)?.into_iter().map(sigmoid).collect())
    }
}

//! Synthetic model artifact bundles
//!
//! Heads are single zero-weight layers, so their output is fixed by the biases:
//! the valence head always yields `positive` and each facet head output yields
//! its configured probability, whatever the input text.

use dream_analysis::Facet;
use serde_json::json;
use std::fs;
use std::path::Path;

/// What to write into an artifacts folder
#[derive(Debug, Clone)]
pub struct ArtifactSpec {
    pub valence_dimension: usize,
    pub facets_dimension: usize,
    pub positive: f64,
    /// Facet head outputs, in output order
    pub facets: Vec<(Facet, f64)>,
    /// Write `labels.json` naming exactly the facets above
    pub write_labels: bool,
}

impl ArtifactSpec {
    /// All six facets at `facet_p`, shared 32-wide embedder
    pub fn uniform(positive: f64, facet_p: f64) -> Self {
        Self {
            valence_dimension: 32,
            facets_dimension: 32,
            positive,
            facets: Facet::ALL.iter().map(|f| (*f, facet_p)).collect(),
            write_labels: false,
        }
    }

    pub fn with_facets(mut self, facets: Vec<(Facet, f64)>) -> Self {
        self.facets = facets;
        self.write_labels = true;
        self
    }
}

fn logit(p: f64) -> f64 {
    let p = p.clamp(1e-6, 1.0 - 1e-6);
    (p / (1.0 - p)).ln()
}

fn tokenizer(dimension: usize) -> serde_json::Value {
    json!({ "kind": "hashing", "dimension": dimension, "max_tokens": 512 })
}

fn constant_head(dimension: usize, logits: &[f64]) -> serde_json::Value {
    let weight: Vec<Vec<f32>> = logits.iter().map(|_| vec![0.0; dimension]).collect();
    let bias: Vec<f32> = logits.iter().map(|l| *l as f32).collect();
    json!({ "layers": [ { "weight": weight, "bias": bias } ] })
}

fn write_json(path: &Path, value: &serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Write `valence/` and `facets/` bundles under `root`
pub fn write_artifacts(root: &Path, spec: &ArtifactSpec) {
    let valence = root.join("valence");
    fs::create_dir_all(&valence).unwrap();
    write_json(&valence.join("tokenizer.json"), &tokenizer(spec.valence_dimension));
    write_json(
        &valence.join("config.json"),
        &json!({
            "architecture": "mlp",
            "num_labels": 2,
            "problem_type": "single_label_classification"
        }),
    );
    write_json(
        &valence.join("weights.json"),
        &constant_head(spec.valence_dimension, &[0.0, logit(spec.positive)]),
    );

    let facets = root.join("facets");
    fs::create_dir_all(&facets).unwrap();
    write_json(&facets.join("tokenizer.json"), &tokenizer(spec.facets_dimension));
    write_json(
        &facets.join("config.json"),
        &json!({
            "architecture": "mlp",
            "num_labels": spec.facets.len(),
            "problem_type": "multi_label_classification"
        }),
    );
    let logits: Vec<f64> = spec.facets.iter().map(|(_, p)| logit(*p)).collect();
    write_json(
        &facets.join("weights.json"),
        &constant_head(spec.facets_dimension, &logits),
    );
    if spec.write_labels {
        let labels: Vec<&str> = spec.facets.iter().map(|(f, _)| f.as_str()).collect();
        write_json(&facets.join("labels.json"), &json!({ "labels": labels }));
    }
}

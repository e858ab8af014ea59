//! Model artifact loading
//!
//! Layout under the artifacts folder:
//!
//! ```text
//! ml_artifacts/
//! ├── valence/
//! │   ├── tokenizer.json   embedder settings
//! │   ├── config.json      head config (num_labels = 2)
//! │   └── weights.json     dense layers
//! └── facets/
//!     ├── tokenizer.json
//!     ├── config.json
//!     ├── weights.json
//!     └── labels.json      optional: active labels in output order
//! ```
//!
//! Every failure here is fatal for the process: a missing directory or file is
//! `ModelUnavailable`, anything unparsable or inconsistent is `ArtifactCorrupt`.

use super::embedder::{EmbedderConfig, HashingEmbedder};
use super::mlp::{Mlp, MlpFacetHead, MlpValenceHead, MlpWeights};
use super::{Embedder, ModelScorer};
use crate::error::{AnalysisError, AnalysisResult};
use crate::types::Facet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub const VALENCE_DIR: &str = "valence";
pub const FACETS_DIR: &str = "facets";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "weights.json";
pub const LABELS_FILE: &str = "labels.json";

/// Classification problem the head was trained for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    SingleLabelClassification,
    MultiLabelClassification,
}

/// Contents of `config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadConfig {
    pub architecture: String,
    pub num_labels: usize,
    #[serde(default)]
    pub problem_type: Option<ProblemType>,
}

/// Contents of `labels.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsFile {
    pub labels: Vec<String>,
}

/// One loaded head directory
#[derive(Debug, Clone)]
pub struct HeadBundle {
    pub dir: PathBuf,
    pub tokenizer: EmbedderConfig,
    pub config: HeadConfig,
    pub mlp: Mlp,
}

/// Both heads, validated and ready to build a scorer
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub valence: HeadBundle,
    pub facets: HeadBundle,
    pub facet_labels: Vec<Facet>,
}

/// What was loaded, for `check-artifacts` and startup logging
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub valence_dir: PathBuf,
    pub facets_dir: PathBuf,
    pub valence_dimension: usize,
    pub facets_dimension: usize,
    pub shared_embedding: bool,
    pub facet_labels: Vec<Facet>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AnalysisResult<T> {
    if !path.is_file() {
        return Err(AnalysisError::unavailable(path, "required artifact file missing"));
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| AnalysisError::corrupt(path, e.to_string()))
}

fn load_head(dir: &Path) -> AnalysisResult<HeadBundle> {
    if !dir.is_dir() {
        return Err(AnalysisError::unavailable(dir, "artifact directory not found"));
    }

    let tokenizer: EmbedderConfig = read_json(&dir.join(TOKENIZER_FILE))?;
    if tokenizer.dimension == 0 {
        return Err(AnalysisError::corrupt(
            dir.join(TOKENIZER_FILE),
            "embedding dimension must be positive",
        ));
    }

    let config: HeadConfig = read_json(&dir.join(CONFIG_FILE))?;
    if config.architecture != "mlp" {
        return Err(AnalysisError::corrupt(
            dir.join(CONFIG_FILE),
            format!("unsupported architecture '{}'", config.architecture),
        ));
    }

    let weights_path = dir.join(WEIGHTS_FILE);
    let weights: MlpWeights = read_json(&weights_path)?;
    let mlp = Mlp::from_weights(weights, tokenizer.dimension)
        .map_err(|reason| AnalysisError::corrupt(&weights_path, reason))?;
    if mlp.output_dim() != config.num_labels {
        return Err(AnalysisError::corrupt(
            &weights_path,
            format!(
                "{} outputs but config declares num_labels = {}",
                mlp.output_dim(),
                config.num_labels
            ),
        ));
    }

    Ok(HeadBundle {
        dir: dir.to_path_buf(),
        tokenizer,
        config,
        mlp,
    })
}

/// Active facet labels; all six in canonical order when `labels.json` is absent
fn read_active_labels(dir: &Path) -> AnalysisResult<Vec<Facet>> {
    let path = dir.join(LABELS_FILE);
    if !path.exists() {
        return Ok(Facet::ALL.to_vec());
    }

    let file: LabelsFile = read_json(&path)?;
    let mut labels = Vec::with_capacity(file.labels.len());
    for name in &file.labels {
        let facet: Facet = name
            .parse()
            .map_err(|e: String| AnalysisError::corrupt(&path, e))?;
        if labels.contains(&facet) {
            return Err(AnalysisError::corrupt(&path, format!("duplicate label '{}'", name)));
        }
        labels.push(facet);
    }
    if labels.is_empty() {
        return Err(AnalysisError::corrupt(&path, "no active labels"));
    }
    Ok(labels)
}

impl ModelArtifacts {
    /// Load and validate both head directories under `artifacts_dir`
    pub fn load(artifacts_dir: &Path) -> AnalysisResult<Self> {
        let valence = load_head(&artifacts_dir.join(VALENCE_DIR))?;
        if valence.config.num_labels != 2 {
            return Err(AnalysisError::corrupt(
                valence.dir.join(CONFIG_FILE),
                format!("valence head needs 2 labels, found {}", valence.config.num_labels),
            ));
        }
        if valence.config.problem_type == Some(ProblemType::MultiLabelClassification) {
            return Err(AnalysisError::corrupt(
                valence.dir.join(CONFIG_FILE),
                "valence head must be single-label",
            ));
        }

        let facets = load_head(&artifacts_dir.join(FACETS_DIR))?;
        let facet_labels = read_active_labels(&facets.dir)?;
        if facet_labels.len() != facets.config.num_labels {
            return Err(AnalysisError::corrupt(
                facets.dir.join(LABELS_FILE),
                format!(
                    "{} active labels but head has {} outputs",
                    facet_labels.len(),
                    facets.config.num_labels
                ),
            ));
        }

        info!(
            "Loaded model artifacts: valence={} facets={} labels={:?}",
            valence.dir.display(),
            facets.dir.display(),
            facet_labels
        );

        Ok(Self {
            valence,
            facets,
            facet_labels,
        })
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            valence_dir: self.valence.dir.clone(),
            facets_dir: self.facets.dir.clone(),
            valence_dimension: self.valence.tokenizer.dimension,
            facets_dimension: self.facets.tokenizer.dimension,
            shared_embedding: self.valence.tokenizer == self.facets.tokenizer,
            facet_labels: self.facet_labels.clone(),
        }
    }

    /// Build the scorer; heads with identical tokenizer settings share one embedder
    pub fn into_scorer(self) -> AnalysisResult<ModelScorer> {
        let valence_head = MlpValenceHead::new(self.valence.mlp)
            .map_err(|reason| AnalysisError::corrupt(self.valence.dir.join(WEIGHTS_FILE), reason))?;
        let facet_head = MlpFacetHead::new(self.facets.mlp, self.facet_labels)
            .map_err(|reason| AnalysisError::corrupt(self.facets.dir.join(WEIGHTS_FILE), reason))?;

        let valence_embedder: Arc<dyn Embedder> =
            Arc::new(HashingEmbedder::new(self.valence.tokenizer.clone())?);

        if self.valence.tokenizer == self.facets.tokenizer {
            return Ok(ModelScorer::new(
                valence_embedder,
                Box::new(valence_head),
                Box::new(facet_head),
            ));
        }

        let facet_embedder: Arc<dyn Embedder> =
            Arc::new(HashingEmbedder::new(self.facets.tokenizer)?);
        Ok(ModelScorer::with_embedders(
            valence_embedder,
            facet_embedder,
            Box::new(valence_head),
            Box::new(facet_head),
        ))
    }
}

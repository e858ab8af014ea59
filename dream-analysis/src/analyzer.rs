//! Analysis Orchestrator
//!
//! Sequences Model Scorer → Correction Layer → Evidence Extractor → Notes
//! Generator and assembles the profile.
//!
//! **Model lifecycle:** artifacts are loaded at most once per process through a
//! [`ModelCache`]. Concurrent first callers block on the same initialization;
//! after a successful load the analyzer is shared read-only and never replaced.

use crate::correction::{correct_with, CorrectionPolicy};
use crate::error::{AnalysisError, AnalysisResult};
use crate::evidence::{extract_with, EvidencePolicy};
use crate::notes::{notes_with, NotesPolicy};
use crate::scorer::{ModelArtifacts, ModelScorer};
use crate::types::{AnalysisProfile, CorrectedScores, RawScores};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// All tunable thresholds of the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPolicy {
    pub correction: CorrectionPolicy,
    pub evidence: EvidencePolicy,
    pub notes: NotesPolicy,
}

/// Profile together with the intermediate scores it was built from
#[derive(Debug, Clone)]
pub struct Analysis {
    pub raw: RawScores,
    pub corrected: CorrectedScores,
    pub profile: AnalysisProfile,
}

/// Loaded models plus policy; cheap to share behind an `Arc`
pub struct DreamAnalyzer {
    scorer: ModelScorer,
    policy: AnalysisPolicy,
}

impl DreamAnalyzer {
    pub fn new(scorer: ModelScorer, policy: AnalysisPolicy) -> Self {
        Self { scorer, policy }
    }

    /// Load both classifier heads from `artifacts_dir`
    ///
    /// # Errors
    /// `ModelUnavailable` / `ArtifactCorrupt` naming the offending path.
    pub fn from_artifacts(artifacts_dir: &Path, policy: AnalysisPolicy) -> AnalysisResult<Self> {
        let started = Instant::now();
        let scorer = ModelArtifacts::load(artifacts_dir)?.into_scorer()?;
        info!(
            "Dream analyzer ready in {} ms ({} active facet labels)",
            started.elapsed().as_millis(),
            scorer.active_labels().len()
        );
        Ok(Self::new(scorer, policy))
    }

    pub fn policy(&self) -> &AnalysisPolicy {
        &self.policy
    }

    /// Run the full pipeline, keeping intermediate scores
    pub fn run(&self, text: &str) -> AnalysisResult<Analysis> {
        let started = Instant::now();

        let raw = self.scorer.score(text)?;
        let corrected = correct_with(text, &raw, &self.policy.correction);
        let evidence = extract_with(text, &corrected, &self.policy.evidence);
        let notes = notes_with(&corrected, &self.policy.notes);

        let profile = AnalysisProfile {
            valence: corrected.valence,
            facets: corrected.facets.clone(),
            evidence,
            notes,
        };

        debug!(
            "Analyzed {} chars in {} us (raw positive {:.3} -> {:.3}, rules {:?})",
            text.chars().count(),
            started.elapsed().as_micros(),
            raw.valence.positive,
            corrected.valence.positive,
            corrected.trace.valence_rules
        );

        Ok(Analysis {
            raw,
            corrected,
            profile,
        })
    }

    /// Analyze one dream text
    ///
    /// Blocking (CPU-bound inference) and without an intrinsic timeout.
    ///
    /// # Errors
    /// `AnalysisError::Inference` if the scoring backend fails.
    pub fn analyze(&self, text: &str) -> AnalysisResult<AnalysisProfile> {
        Ok(self.run(text)?.profile)
    }

    /// [`run`](Self::run) on tokio's blocking pool
    pub async fn run_async(self: Arc<Self>, text: String) -> AnalysisResult<Analysis> {
        tokio::task::spawn_blocking(move || self.run(&text))
            .await
            .map_err(|e| AnalysisError::Inference(format!("analysis task failed: {}", e)))?
    }

    /// [`analyze`](Self::analyze) on tokio's blocking pool
    pub async fn analyze_async(self: Arc<Self>, text: String) -> AnalysisResult<AnalysisProfile> {
        Ok(self.run_async(text).await?.profile)
    }
}

/// Init-once holder for the process-wide analyzer
pub struct ModelCache {
    cell: OnceCell<Arc<DreamAnalyzer>>,
}

static GLOBAL_CACHE: ModelCache = ModelCache::new();

impl ModelCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Process-wide cache
    pub fn global() -> &'static ModelCache {
        &GLOBAL_CACHE
    }

    /// The analyzer, if a load has already succeeded
    pub fn get(&self) -> Option<Arc<DreamAnalyzer>> {
        self.cell.get().cloned()
    }

    /// Return the cached analyzer, running `load` only if none exists yet
    ///
    /// Concurrent callers wait for the one in-flight load. A failed load leaves
    /// the cache empty and its error is returned to the caller.
    pub fn get_or_load<F>(&self, load: F) -> AnalysisResult<Arc<DreamAnalyzer>>
    where
        F: FnOnce() -> AnalysisResult<DreamAnalyzer>,
    {
        self.cell
            .get_or_try_init(|| load().map(Arc::new))
            .map(Arc::clone)
    }

    /// Load from an artifacts folder on first use
    pub fn get_or_load_from(
        &self,
        artifacts_dir: &Path,
        policy: AnalysisPolicy,
    ) -> AnalysisResult<Arc<DreamAnalyzer>> {
        self.get_or_load(|| DreamAnalyzer::from_artifacts(artifacts_dir, policy))
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

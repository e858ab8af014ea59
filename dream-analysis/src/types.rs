//! Core data types for dream analysis
//!
//! Flow of values through the pipeline:
//! - **RawScores**: straight from the model heads, consumed by the correction layer
//! - **CorrectedScores**: after lexicon correction; ground truth for everything downstream
//! - **AnalysisProfile**: the assembled, immutable result handed to the caller

use crate::lexicon::LexiconSignal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Facets
// ============================================================================

/// One of the six fixed thematic dimensions
///
/// Declaration order is the canonical order used for iteration, head output
/// mapping and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Aggression,
    Conflict,
    Friendliness,
    Sexuality,
    Success,
    Misfortune,
}

impl Facet {
    /// All facets in canonical order
    pub const ALL: [Facet; 6] = [
        Facet::Aggression,
        Facet::Conflict,
        Facet::Friendliness,
        Facet::Sexuality,
        Facet::Success,
        Facet::Misfortune,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Aggression => "aggression",
            Facet::Conflict => "conflict",
            Facet::Friendliness => "friendliness",
            Facet::Sexuality => "sexuality",
            Facet::Success => "success",
            Facet::Misfortune => "misfortune",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Facet::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| format!("unknown facet: {}", s))
    }
}

/// Per-facet probabilities, always holding all six facets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetScores(BTreeMap<Facet, f64>);

impl FacetScores {
    /// Every facet at 0.0
    pub fn zeros() -> Self {
        Self(Facet::ALL.iter().map(|f| (*f, 0.0)).collect())
    }

    /// Build from (facet, probability) pairs; unlisted facets stay at 0.0
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Facet, f64)>) -> Self {
        let mut scores = Self::zeros();
        for (facet, value) in pairs {
            scores.set(facet, value);
        }
        scores
    }

    pub fn get(&self, facet: Facet) -> f64 {
        self.0.get(&facet).copied().unwrap_or(0.0)
    }

    /// Set a facet probability, clamped to [0, 1]
    pub fn set(&mut self, facet: Facet, value: f64) {
        self.0.insert(facet, value.clamp(0.0, 1.0));
    }

    /// Iterate in canonical facet order
    pub fn iter(&self) -> impl Iterator<Item = (Facet, f64)> + '_ {
        Facet::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}

impl Default for FacetScores {
    fn default() -> Self {
        Self::zeros()
    }
}

// ============================================================================
// Valence
// ============================================================================

/// Bipolar valence pair; `positive + negative == 1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valence {
    pub positive: f64,
    pub negative: f64,
}

impl Valence {
    /// Build from the positive probability, clamped to [0, 1]
    pub fn from_positive(positive: f64) -> Self {
        let positive = positive.clamp(0.0, 1.0);
        Self {
            positive,
            negative: 1.0 - positive,
        }
    }
}

// ============================================================================
// Scores
// ============================================================================

/// Model output before correction
#[derive(Debug, Clone, PartialEq)]
pub struct RawScores {
    pub valence: Valence,
    pub facets: FacetScores,
}

impl RawScores {
    pub fn new(valence_positive: f64, facets: FacetScores) -> Self {
        Self {
            valence: Valence::from_positive(valence_positive),
            facets,
        }
    }
}

/// Audit record of what the correction layer did and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionTrace {
    /// Cue counts the decisions were based on
    pub signal: LexiconSignal,
    /// Logit-space bias added to the model's valence
    pub bias: f64,
    /// Names of the valence rules that fired, in evaluation order
    pub valence_rules: Vec<&'static str>,
    /// Facets raised to a floor, with the floor applied
    pub facet_floors: Vec<(Facet, f64)>,
}

/// Scores after the correction layer
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedScores {
    pub valence: Valence,
    pub facets: FacetScores,
    pub trace: CorrectionTrace,
}

// ============================================================================
// Profile
// ============================================================================

/// Sentence supporting a facet; `start`/`end` are character offsets into the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSpan {
    pub sentence: String,
    pub start: usize,
    pub end: usize,
}

/// Facet → up to two supporting sentences; facets without support are absent
pub type Evidence = BTreeMap<Facet, Vec<EvidenceSpan>>;

/// Final analysis result for one dream text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisProfile {
    pub valence: Valence,
    pub facets: FacetScores,
    pub evidence: Evidence,
    #[serde(rename = "nlg_notes")]
    pub notes: Vec<String>,
}

//! dream-analysis library
//!
//! Turns a dream report into an explainable emotional profile:
//! - [`scorer`]: embedding + classifier heads → raw valence and facet probabilities
//! - [`correction`]: lexicon-driven calibration of the raw scores
//! - [`evidence`]: supporting sentences per facet
//! - [`notes`]: short templated observations
//! - [`analyzer`]: the orchestrator and the init-once model cache
//! - [`calendar`]: per-date reduction of stored analyses

pub mod analyzer;
pub mod calendar;
pub mod config;
pub mod correction;
pub mod counsel;
pub mod error;
pub mod evidence;
pub mod lexicon;
pub mod notes;
pub mod scorer;
pub mod types;

pub use crate::analyzer::{Analysis, AnalysisPolicy, DreamAnalyzer, ModelCache};
pub use crate::calendar::{
    aggregate, aggregate_month, AnalysisRecord, CalendarAggregator, CalendarDayEmotion, DayLabel,
    LabelThresholds,
};
pub use crate::error::{AnalysisError, AnalysisResult};
pub use crate::types::{
    AnalysisProfile, CorrectedScores, Evidence, EvidenceSpan, Facet, FacetScores, RawScores,
    Valence,
};

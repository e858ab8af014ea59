//! Notes Generator
//!
//! Short templated observations chosen from corrected scores by a fixed ladder.
//! Always yields at least one note and never more than `max_notes`.

use crate::types::{CorrectedScores, Facet};
use serde::{Deserialize, Serialize};

pub const AFFILIATIVE_NOTE: &str =
    "Warm, affiliative interactions stand out; support from others colors the dream.";
pub const CONFLICT_NOTE: &str =
    "Conflict or threat imagery is prominent (weapons, pursuit or confrontation).";
pub const INTIMACY_NOTE: &str =
    "Intimacy themes are present; they are best read in light of personal context.";
pub const NEUTRAL_NOTE: &str =
    "No single theme dominates; the overall tone reads as fairly neutral.";

/// Upper bound on notes regardless of configuration
pub const MAX_NOTES: usize = 3;

/// "High" thresholds for the notes ladder (TOML `[notes]`)
///
/// The comparison is inclusive (`>=`): a facet at exactly 0.6 fires its note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesPolicy {
    pub facet_high: f64,
    pub valence_high: f64,
    pub max_notes: usize,
}

impl Default for NotesPolicy {
    fn default() -> Self {
        Self {
            facet_high: 0.6,
            valence_high: 0.6,
            max_notes: MAX_NOTES,
        }
    }
}

/// Notes with the default policy
pub fn notes(corrected: &CorrectedScores) -> Vec<String> {
    notes_with(corrected, &NotesPolicy::default())
}

pub fn notes_with(corrected: &CorrectedScores, policy: &NotesPolicy) -> Vec<String> {
    let high = |facet: Facet| corrected.facets.get(facet) >= policy.facet_high;

    let ladder = [
        (
            high(Facet::Friendliness) && corrected.valence.positive >= policy.valence_high,
            AFFILIATIVE_NOTE,
        ),
        (high(Facet::Aggression) || high(Facet::Conflict), CONFLICT_NOTE),
        (high(Facet::Sexuality), INTIMACY_NOTE),
    ];

    let mut out: Vec<String> = Vec::new();
    for (fired, note) in ladder {
        if fired && !out.iter().any(|n| n == note) {
            out.push(note.to_string());
        }
    }
    if out.is_empty() {
        out.push(NEUTRAL_NOTE.to_string());
    }

    out.truncate(policy.max_notes.clamp(1, MAX_NOTES));
    out
}

//! Correction Layer
//!
//! Blends the model's raw valence with lexicon evidence and raises facet scores
//! when strong cues are present. The model under-detects acute threat language,
//! so every adjustment here is keyed to a cue count and recorded in the
//! [`CorrectionTrace`].
//!
//! Steps:
//! 1. Logit-space bias from NEG/POS/STRONG_THREAT hit counts
//! 2. Facet floors from the `(cue set, facet, floor)` table
//! 3. Valence rules from [`VALENCE_RULES`], evaluated in order

use crate::lexicon::{CueSet, LexiconSignal};
use crate::scorer::mlp::sigmoid;
use crate::types::{CorrectedScores, CorrectionTrace, Facet, FacetScores, RawScores, Valence};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Numeric constants of the correction layer (TOML `[correction]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionPolicy {
    /// Probability clamp before taking the logit
    pub epsilon: f64,

    // Bias when at least one strong-threat cue matched
    pub threat_weight: f64,
    pub threat_extra_neg_weight: f64,
    pub threat_pos_weight: f64,

    // Bias otherwise
    pub pos_weight: f64,
    pub neg_weight: f64,

    /// Threat floor: `p' > trigger` with threat cues and no positive cues → `value`
    pub threat_floor_trigger: f64,
    pub threat_floor_value: f64,

    /// Negative floor: `neg_hits >= min_hits`, no positive cues, `p' > trigger` → `value`
    pub neg_floor_min_hits: usize,
    pub neg_floor_trigger: f64,
    pub neg_floor_value: f64,

    // Facet floors
    pub threat_conflict_floor: f64,
    pub threat_aggression_floor: f64,
    pub threat_misfortune_floor: f64,
    pub friendliness_floor: f64,

    /// Cross-check: danger facet ≥ `facet`, positive > `positive`, no positive cues
    pub cross_check_facet: f64,
    pub cross_check_positive: f64,
    pub cross_check_value: f64,
}

impl Default for CorrectionPolicy {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            threat_weight: 0.85,
            threat_extra_neg_weight: 0.20,
            threat_pos_weight: 0.12,
            pos_weight: 0.15,
            neg_weight: 0.05,
            threat_floor_trigger: 0.40,
            threat_floor_value: 0.35,
            neg_floor_min_hits: 2,
            neg_floor_trigger: 0.45,
            neg_floor_value: 0.40,
            threat_conflict_floor: 0.70,
            threat_aggression_floor: 0.62,
            threat_misfortune_floor: 0.58,
            friendliness_floor: 0.50,
            cross_check_facet: 0.65,
            cross_check_positive: 0.45,
            cross_check_value: 0.35,
        }
    }
}

impl CorrectionPolicy {
    /// Facet floor table: a facet is raised to the floor when its cue set matched
    pub fn facet_floors(&self) -> [(CueSet, Facet, f64); 4] {
        [
            (CueSet::StrongThreat, Facet::Conflict, self.threat_conflict_floor),
            (CueSet::StrongThreat, Facet::Aggression, self.threat_aggression_floor),
            (CueSet::StrongThreat, Facet::Misfortune, self.threat_misfortune_floor),
            (CueSet::FriendlinessCues, Facet::Friendliness, self.friendliness_floor),
        ]
    }
}

/// `ln(p / (1 - p))` with `p` clamped to `[ε, 1 − ε]`
pub fn logit(p: f64, epsilon: f64) -> f64 {
    let p = p.clamp(epsilon, 1.0 - epsilon);
    (p / (1.0 - p)).ln()
}

/// Logit-space valence bias for a lexicon signal
pub fn valence_bias(signal: &LexiconSignal, policy: &CorrectionPolicy) -> f64 {
    let neg = signal.neg_hits as f64;
    let pos = signal.pos_hits as f64;
    if signal.threat_hits >= 1 {
        let threat = signal.threat_hits.min(1) as f64;
        let extra_neg = signal.neg_hits.saturating_sub(signal.threat_hits) as f64;
        -policy.threat_weight * threat - policy.threat_extra_neg_weight * extra_neg
            + policy.threat_pos_weight * pos
    } else {
        policy.pos_weight * pos - policy.neg_weight * neg
    }
}

/// State visible to a valence rule
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub signal: &'a LexiconSignal,
    pub positive: f64,
    pub facets: &'a FacetScores,
}

/// One entry of the valence ladder
pub struct ValenceRule {
    pub name: &'static str,
    pub guard: fn(&RuleContext<'_>, &CorrectionPolicy) -> bool,
    /// New positive probability when the guard holds
    pub effect: fn(&CorrectionPolicy) -> f64,
}

/// Valence ladder, evaluated top to bottom; each rule sees the previous rule's result
pub const VALENCE_RULES: &[ValenceRule] = &[
    ValenceRule {
        name: "threat_floor",
        guard: |ctx, policy| {
            ctx.signal.threat_hits >= 1
                && ctx.positive > policy.threat_floor_trigger
                && ctx.signal.pos_hits == 0
        },
        effect: |policy| policy.threat_floor_value,
    },
    ValenceRule {
        name: "negative_floor",
        guard: |ctx, policy| {
            ctx.signal.neg_hits >= policy.neg_floor_min_hits
                && ctx.signal.pos_hits == 0
                && ctx.positive > policy.neg_floor_trigger
        },
        effect: |policy| policy.neg_floor_value,
    },
    ValenceRule {
        name: "danger_cross_check",
        guard: |ctx, policy| {
            let danger = ctx
                .facets
                .get(Facet::Conflict)
                .max(ctx.facets.get(Facet::Aggression))
                .max(ctx.facets.get(Facet::Misfortune));
            danger >= policy.cross_check_facet
                && ctx.positive > policy.cross_check_positive
                && ctx.signal.pos_hits == 0
        },
        effect: |policy| policy.cross_check_value,
    },
];

/// Correct raw scores using the default policy
pub fn correct(text: &str, raw: &RawScores) -> CorrectedScores {
    correct_with(text, raw, &CorrectionPolicy::default())
}

/// Correct raw scores against the lexicon signal of `text`
///
/// # Arguments
/// * `text` - Original dream text (scanned for cues)
/// * `raw` - Model output for the same text
/// * `policy` - Weights, floors and thresholds
///
/// # Returns
/// Corrected valence and facets plus a trace of every adjustment made.
pub fn correct_with(text: &str, raw: &RawScores, policy: &CorrectionPolicy) -> CorrectedScores {
    let signal = LexiconSignal::scan(text);
    let bias = valence_bias(&signal, policy);

    let mut positive = if bias == 0.0 {
        raw.valence.positive
    } else {
        sigmoid(logit(raw.valence.positive, policy.epsilon) + bias)
    };

    let mut facets = raw.facets.clone();
    let mut facet_floors = Vec::new();
    for (set, facet, floor) in policy.facet_floors() {
        if signal.hits(set) >= 1 && facets.get(facet) < floor {
            debug!("Facet floor: {} raised to {} ({:?} cue)", facet, floor, set);
            facets.set(facet, floor);
            facet_floors.push((facet, floor));
        }
    }

    let mut valence_rules = Vec::new();
    for rule in VALENCE_RULES {
        let ctx = RuleContext {
            signal: &signal,
            positive,
            facets: &facets,
        };
        if (rule.guard)(&ctx, policy) {
            let next = (rule.effect)(policy);
            debug!("Valence rule {}: positive {:.4} -> {:.4}", rule.name, positive, next);
            positive = next;
            valence_rules.push(rule.name);
        }
    }

    CorrectedScores {
        valence: Valence::from_positive(positive),
        facets,
        trace: CorrectionTrace {
            signal,
            bias,
            valence_rules,
            facet_floors,
        },
    }
}

//! Rule-based reflective summary
//!
//! Longer companion to the notes: a tone line, one line per prominent theme,
//! a few small self-care suggestions and a closing reminder.

use crate::types::{CorrectedScores, Facet};

const HIGH: f64 = 0.6;
const TONE_MARGIN: f64 = 0.2;
const WEAK_RESOLUTION_SUCCESS: f64 = 0.4;

/// Build the multi-line counseling note for corrected scores
pub fn counseling_note(corrected: &CorrectedScores) -> String {
    let pos = corrected.valence.positive;
    let neg = corrected.valence.negative;
    let high = |facet: Facet| corrected.facets.get(facet) >= HIGH;
    let tension = high(Facet::Aggression) || high(Facet::Conflict);

    let mut lines: Vec<&str> = Vec::new();

    lines.push(if pos - neg >= TONE_MARGIN {
        "Overall this dream carries a sense of stability and ease."
    } else if neg - pos >= TONE_MARGIN {
        "Tension or pressure seems to sit in the background of this dream. Have you been carrying something on your own lately?"
    } else {
        "The emotional tone is fairly balanced; you seem to be observing rather than reacting."
    });

    if high(Facet::Friendliness) {
        lines.push("A wish for connection and cooperation comes through clearly. Relationships look like a real source of strength.");
    }
    if tension {
        lines.push("Some friction or conflict may still be unresolved. Practicing clear personal boundaries can help.");
    }
    if high(Facet::Sexuality) {
        lines.push("Interest in intimacy and private space is present. Let your own pace and sense of safety come first.");
    }
    if high(Facet::Success) {
        lines.push("There is a strong expectation of progress or achievement. Has a goal or role changed recently?");
    }
    if high(Facet::Misfortune) {
        lines.push("Small mishaps may feel heavier than usual. Try holding on only to what is within your control.");
    }
    if neg >= HIGH && corrected.facets.get(Facet::Success) < WEAK_RESOLUTION_SUCCESS {
        lines.push("Signs of resolution or recovery are weak, which keeps the overall reading negative.");
    }

    let mut tips: Vec<&str> = Vec::new();
    if tension {
        tips.push("Spend five minutes today writing one boundary sentence, such as \"Not now, let's talk tomorrow.\"");
    }
    if high(Facet::Friendliness) {
        tips.push("Send a short message to someone you feel grateful to.");
    }
    if high(Facet::Misfortune) || neg > pos {
        tips.push("Before sleep, breathe in a 4-4 rhythm for one minute to let your body unwind.");
    }
    if tips.is_empty() {
        tips.push("Write down the key scene of this dream in one line as a small signal to tomorrow's you.");
    }

    let mut out: Vec<String> = lines.into_iter().map(str::to_string).collect();
    out.push(String::new());
    out.push("Small steps to try:".to_string());
    out.extend(tips.into_iter().map(|t| format!("• {}", t)));
    out.push(String::new());
    out.push(
        "Dreams are a metaphorical mirror of where your mind is right now. No reading is the single right answer; what feels meaningful to you matters most."
            .to_string(),
    );
    out.join("\n")
}

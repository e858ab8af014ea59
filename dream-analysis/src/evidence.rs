//! Evidence Extractor
//!
//! For every facet whose corrected score clears the threshold, pick up to
//! `max_spans` sentences containing that facet's vocabulary. Offsets are
//! character (not byte) offsets into the original text.

use crate::lexicon::facet_vocabulary;
use crate::types::{CorrectedScores, Evidence, EvidenceSpan, Facet};
use serde::{Deserialize, Serialize};

const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Evidence thresholds (TOML `[evidence]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidencePolicy {
    /// Minimum corrected facet score (inclusive)
    pub threshold: f64,
    /// Maximum sentences kept per facet
    pub max_spans: usize,
}

impl Default for EvidencePolicy {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            max_spans: 2,
        }
    }
}

/// Lazy sentence splitter over `.`, `!` and `?`
///
/// Yields trimmed fragments without their terminator and skips blank ones.
/// Cloning restarts iteration from the clone point.
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a str,
}

impl<'a> Sentences<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let fragment = match self.rest.find(TERMINATORS) {
                Some(pos) => {
                    let fragment = &self.rest[..pos];
                    // Terminators are single-byte
                    self.rest = &self.rest[pos + 1..];
                    fragment
                }
                None => std::mem::take(&mut self.rest),
            };
            let trimmed = fragment.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
        None
    }
}

/// One-to-one lowercase so char offsets survive case folding
fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Character offset of the first case-insensitive occurrence of `needle`
fn find_folded(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Locate `sentence` in the text and build its span, terminator included
fn locate(chars: &[char], folded: &[char], sentence: &str) -> Option<EvidenceSpan> {
    let needle: Vec<char> = sentence.chars().map(fold).collect();
    let start = find_folded(folded, &needle)?;
    let mut end = start + needle.len();
    if chars.get(end).is_some_and(|c| TERMINATORS.contains(c)) {
        end += 1;
    }
    Some(EvidenceSpan {
        sentence: chars[start..end].iter().collect(),
        start,
        end,
    })
}

/// Extract evidence with the default policy
pub fn extract(text: &str, corrected: &CorrectedScores) -> Evidence {
    extract_with(text, corrected, &EvidencePolicy::default())
}

/// Extract supporting sentences for each sufficiently scored facet
///
/// Facets below the threshold, and facets with no sentence containing their
/// vocabulary, are absent from the result.
pub fn extract_with(text: &str, corrected: &CorrectedScores, policy: &EvidencePolicy) -> Evidence {
    let mut evidence = Evidence::new();
    if policy.max_spans == 0 {
        return evidence;
    }

    let chars: Vec<char> = text.chars().collect();
    let folded: Vec<char> = chars.iter().copied().map(fold).collect();
    let sentences = Sentences::new(text);

    for facet in Facet::ALL {
        if corrected.facets.get(facet) < policy.threshold {
            continue;
        }
        let vocabulary = facet_vocabulary(facet);

        let spans: Vec<EvidenceSpan> = sentences
            .clone()
            .filter(|s| {
                let lower = s.to_lowercase();
                vocabulary.iter().any(|w| lower.contains(w))
            })
            .filter_map(|s| locate(&chars, &folded, s))
            .take(policy.max_spans)
            .collect();

        if !spans.is_empty() {
            evidence.insert(facet, spans);
        }
    }
    evidence
}

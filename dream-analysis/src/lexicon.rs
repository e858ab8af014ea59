//! Lexicon Matcher
//!
//! Declarative cue tables scanned against raw dream text. Each entry is a
//! lower-case stem that matches as a prefix of any word ("chas" matches
//! "chased", "chasing"). Entries containing spaces are phrases: every word but
//! the last must match exactly and the last is prefix-matched.
//!
//! Korean stems are written with the particle or ending that disambiguates them
//! ("칼을", "칼로") since the bare syllable is a prefix of unrelated words.
//!
//! `count_hits` counts *distinct* stems, never repeated occurrences.

use crate::types::Facet;
use serde::Serialize;

/// Named cue sets used by the correction layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CueSet {
    /// Negative-affect cues; always includes every `StrongThreat` stem
    Neg,
    /// Positive-affect cues
    Pos,
    /// Acute danger (violence, pursuit, death)
    StrongThreat,
    /// Aggression/conflict cues (confrontation without acute danger)
    ///
    /// No correction rule reads this count; it is reported in the trace only.
    ConflictCues,
    /// Friendliness cues (help, comfort, company)
    FriendlinessCues,
}

const STRONG_THREAT_STEMS: &[&str] = &[
    "kill", "murder", "=stab", "=stabs", "stabb", "shoot", "=shot", "gun", "knife", "knive",
    "blood", "bleed", "chase", "chasing", "attack", "strangl", "kidnap", "drown", "corpse",
    "monster", "explod", "explosion", "hunted", "threat",
    "죽이", "죽였", "죽을", "살인", "칼을", "칼로", "칼에", "총을", "총에", "쫓기", "쫓아",
    "괴물", "피를", "피가",
];

// Negative cues beyond acute threat. NEG = these + STRONG_THREAT_STEMS.
const NEG_ONLY_STEMS: &[&str] = &[
    "afraid", "scared", "scary", "scarie", "fear", "terrif", "panic", "anxi", "nightmare",
    "cried", "crying", "tears", "=sad", "sadly", "sadness", "lonel", "alone", "=lost",
    "hurt", "=pain", "pains", "painful", "angr", "=trap", "trapped", "stuck", "=fell",
    "falling", "dark", "scream", "ghost", "injur", "=broke", "broken", "fail", "worr",
    "dread", "helpless", "nervous", "despair", "grief", "gloom", "ran away", "run away",
    "무서", "두려", "불안", "슬프", "슬펐", "외로", "울었", "아팠", "아프", "갇혔",
    "떨어졌", "어두", "비명",
];

const POS_STEMS: &[&str] = &[
    "happy", "happi", "=joy", "joyful", "joyous", "smil", "laugh", "love", "peace", "calm", "relax",
    "relief", "reliev", "beautif", "warm", "delight", "=glad", "cheer", "grateful",
    "thankful", "proud", "excit", "wonderful", "comfort", "celebrat", "enjoy", "safe",
    "행복", "기뻤", "기쁘", "기쁨", "웃었", "웃으", "웃고", "사랑", "편안", "평화", "즐거",
    "따뜻", "안심",
];

const CONFLICT_STEMS: &[&str] = &[
    "argu", "shout", "quarrel", "disput", "threaten", "fight", "fought", "=yell", "=yells",
    "yelled", "yelling", "punch", "=hit", "=hits", "hitting", "struggl", "confront",
    "betray", "enem",
    "싸우", "싸웠", "싸움", "다투", "다퉜", "소리쳤", "때렸",
];

const FRIENDLINESS_STEMS: &[&str] = &[
    "friend", "help", "=hug", "=hugs", "hugg", "comfort", "support", "reassur", "encourag",
    "kindly", "kindness", "together", "welcom", "cared for", "took care", "held my hand",
    "친구", "도와", "도움", "안아", "위로", "함께",
];

impl CueSet {
    pub const ALL: [CueSet; 5] = [
        CueSet::Neg,
        CueSet::Pos,
        CueSet::StrongThreat,
        CueSet::ConflictCues,
        CueSet::FriendlinessCues,
    ];

    /// Stems belonging to this set
    pub fn stems(self) -> impl Iterator<Item = &'static str> {
        let (own, inherited): (&'static [&'static str], &'static [&'static str]) = match self {
            CueSet::Neg => (NEG_ONLY_STEMS, STRONG_THREAT_STEMS),
            CueSet::Pos => (POS_STEMS, &[]),
            CueSet::StrongThreat => (STRONG_THREAT_STEMS, &[]),
            CueSet::ConflictCues => (CONFLICT_STEMS, &[]),
            CueSet::FriendlinessCues => (FRIENDLINESS_STEMS, &[]),
        };
        own.iter().chain(inherited.iter()).copied()
    }
}

/// Vocabulary used to pick evidence sentences for a facet
///
/// Matched as case-insensitive substrings of a sentence, not word prefixes.
pub fn facet_vocabulary(facet: Facet) -> &'static [&'static str] {
    match facet {
        Facet::Aggression => &[
            "knife", "gun", "chase", "attack", "hit", "stab", "fight", "blood", "kill",
            "칼", "총", "공격", "때리",
        ],
        Facet::Conflict => &[
            "argue", "shout", "quarrel", "dispute", "pursue", "threaten",
            "싸우", "다투", "소리",
        ],
        Facet::Friendliness => &[
            "help", "comfort", "hug", "support", "reassure", "encourage",
            "친구", "도와", "위로",
        ],
        Facet::Sexuality => &["kiss", "sex", "nude", "intimate", "touch", "키스"],
        Facet::Success => &[
            "escape", "solve", "found", "rescued", "safe", "relief", "overcome",
            "탈출", "해결", "구해",
        ],
        Facet::Misfortune => &[
            "lost", "fail", "broken", "injured", "fell", "stuck", "accident",
            "잃어", "사고", "다쳤",
        ],
    }
}

/// Lower-cased words of a text, split on anything that is not alphanumeric
#[derive(Debug, Clone)]
pub struct Words(Vec<String>);

impl Words {
    pub fn new(text: &str) -> Self {
        Self(
            text.split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(str::to_lowercase)
                .collect(),
        )
    }

    /// True if `stem` (word or phrase) matches anywhere
    fn matches(&self, stem: &str) -> bool {
        let (exact, stem) = match stem.strip_prefix('=') {
            Some(rest) => (true, rest),
            None => (false, stem),
        };
        let parts: Vec<&str> = stem.split_whitespace().collect();
        let Some((last, leading)) = parts.split_last() else {
            return false;
        };
        if self.0.len() < parts.len() {
            return false;
        }

        self.0.windows(parts.len()).any(|window| {
            window[..leading.len()]
                .iter()
                .zip(leading)
                .all(|(word, part)| word == part)
                && if exact {
                    window[leading.len()] == *last
                } else {
                    window[leading.len()].starts_with(last)
                }
        })
    }

    /// Number of distinct stems of `set` present in these words
    pub fn count(&self, set: CueSet) -> usize {
        set.stems().filter(|stem| self.matches(stem)).count()
    }
}

/// Count distinct stems of `set` matching anywhere in `text`
pub fn count_hits(set: CueSet, text: &str) -> usize {
    Words::new(text).count(set)
}

/// All cue counts for one text, computed from a single tokenization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LexiconSignal {
    pub neg_hits: usize,
    pub pos_hits: usize,
    pub threat_hits: usize,
    pub conflict_hits: usize,
    pub friendliness_hits: usize,
}

impl LexiconSignal {
    pub fn scan(text: &str) -> Self {
        let words = Words::new(text);
        Self {
            neg_hits: words.count(CueSet::Neg),
            pos_hits: words.count(CueSet::Pos),
            threat_hits: words.count(CueSet::StrongThreat),
            conflict_hits: words.count(CueSet::ConflictCues),
            friendliness_hits: words.count(CueSet::FriendlinessCues),
        }
    }

    /// Hit count for a named set
    pub fn hits(&self, set: CueSet) -> usize {
        match set {
            CueSet::Neg => self.neg_hits,
            CueSet::Pos => self.pos_hits,
            CueSet::StrongThreat => self.threat_hits,
            CueSet::ConflictCues => self.conflict_hits,
            CueSet::FriendlinessCues => self.friendliness_hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_strong_threat_is_subset_of_neg() {
        let neg: HashSet<_> = CueSet::Neg.stems().collect();
        for stem in CueSet::StrongThreat.stems() {
            assert!(neg.contains(stem), "threat stem '{}' missing from NEG", stem);
        }
    }

    #[test]
    fn test_stems_are_unique_within_each_set() {
        for set in CueSet::ALL {
            let stems: Vec<_> = set.stems().collect();
            let unique: HashSet<_> = stems.iter().collect();
            assert_eq!(stems.len(), unique.len(), "duplicate stem in {:?}", set);
        }
    }

    #[test]
    fn test_prefix_matching_tolerates_suffixes() {
        assert_eq!(count_hits(CueSet::StrongThreat, "I was being chased"), 1);
        assert_eq!(count_hits(CueSet::StrongThreat, "the CHASING never stopped"), 1);
        assert_eq!(count_hits(CueSet::Pos, "We laughed and smiled"), 2);
    }

    #[test]
    fn test_short_stems_ignore_unrelated_words() {
        let text = "The stable held a fellow in a scarf on a saddle near the chassis.";
        for set in CueSet::ALL {
            assert_eq!(count_hits(set, text), 0, "{:?}", set);
        }
        assert_eq!(count_hits(CueSet::Neg, "a yellow huge trapeze painting"), 0);
        assert_eq!(count_hits(CueSet::FriendlinessCues, "a huge hall"), 0);
    }

    #[test]
    fn test_exact_word_stems_still_match() {
        assert_eq!(count_hits(CueSet::StrongThreat, "he tried to stab me"), 1);
        assert_eq!(count_hits(CueSet::StrongThreat, "I was stabbed"), 1);
        assert_eq!(count_hits(CueSet::Neg, "I fell and felt sad"), 2);
        assert_eq!(count_hits(CueSet::FriendlinessCues, "she gave me a hug"), 1);
    }

    #[test]
    fn test_prefix_must_start_the_word() {
        // "purchase" contains "chase" but does not start with it
        assert_eq!(count_hits(CueSet::StrongThreat, "a purchase at the store"), 0);
    }

    #[test]
    fn test_distinct_stems_counted_once() {
        assert_eq!(count_hits(CueSet::StrongThreat, "knife. knife! another knife"), 1);
    }

    #[test]
    fn test_phrase_matching() {
        assert_eq!(count_hits(CueSet::Neg, "I ran away from the house"), 1);
        assert_eq!(count_hits(CueSet::Neg, "I ran quickly away"), 0);
        assert_eq!(count_hits(CueSet::FriendlinessCues, "she held my hands"), 1);
    }

    #[test]
    fn test_korean_stems() {
        assert_eq!(count_hits(CueSet::StrongThreat, "누군가 칼을 들고 쫓아왔다"), 2);
        assert_eq!(count_hits(CueSet::StrongThreat, "칼국수를 먹었다"), 0);
        assert_eq!(count_hits(CueSet::Pos, "정말 행복했다"), 1);
    }

    #[test]
    fn test_no_match_returns_zero() {
        assert_eq!(count_hits(CueSet::Neg, "The table was made of oak."), 0);
        assert_eq!(count_hits(CueSet::Neg, ""), 0);
    }

    #[test]
    fn test_signal_scan_matches_individual_counts() {
        let text = "A stranger with a gun chased me and I was terrified, but a friend helped.";
        let signal = LexiconSignal::scan(text);

        for set in CueSet::ALL {
            assert_eq!(signal.hits(set), count_hits(set, text), "{:?}", set);
        }
        assert_eq!(signal.threat_hits, 2);
        assert_eq!(signal.neg_hits, 3);
        assert_eq!(signal.friendliness_hits, 2);
    }

    #[test]
    fn test_every_facet_has_vocabulary() {
        for facet in Facet::ALL {
            assert!(!facet_vocabulary(facet).is_empty());
        }
    }
}

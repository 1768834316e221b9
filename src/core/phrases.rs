//! Key-phrase extraction: 4–6 word windows used as repetition fingerprints.

use indexmap::IndexSet;

/// Connector words ignored when judging whether a phrase carries meaning.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "like", "just",
    "when", "that",
];

/// Shortest window, in words.
pub const MIN_WINDOW: usize = 4;

/// Longest window, in words.
pub const MAX_WINDOW: usize = 6;

/// A phrase must be strictly longer than this many characters.
pub const MIN_PHRASE_CHARS: usize = 15;

/// Sentence delimiters; runs of them count as one boundary.
fn is_sentence_break(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Extract the distinct significant phrases of `text`.
///
/// Sentences are split on `.`, `!` and `?`, then every window of 4 to 6
/// consecutive words is considered. Phrases keep their original casing and
/// inner punctuation; the set iterates in first-seen order.
pub fn extract_phrases(text: &str) -> IndexSet<String> {
    let mut phrases = IndexSet::new();

    for sentence in text.split(is_sentence_break) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if words.len() < MIN_WINDOW {
            continue;
        }

        for start in 0..=words.len() - MIN_WINDOW {
            let longest = MAX_WINDOW.min(words.len() - start);
            for len in MIN_WINDOW..=longest {
                let phrase = words[start..start + len].join(" ");
                if phrase.chars().count() > MIN_PHRASE_CHARS && is_significant(&phrase) {
                    phrases.insert(phrase);
                }
            }
        }
    }

    phrases
}

/// True when at least two words survive the stoplist and are longer than
/// three characters.
pub fn is_significant(phrase: &str) -> bool {
    let lowered = phrase.to_lowercase();

    lowered
        .split_whitespace()
        .filter(|w| !STOPWORDS.contains(w) && w.chars().count() > 3)
        .take(2)
        .count()
        >= 2
}

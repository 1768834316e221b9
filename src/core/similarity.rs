//! Lexical overlap scoring.
//!
//! Jaccard index over the sets of "significant" tokens (longer than three
//! characters). No stemming, no embeddings: two texts are similar when they
//! reuse the same content words.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Runs of non-word characters separate tokens.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").unwrap());

/// Tokens must be strictly longer than this many characters to count.
pub const MIN_TOKEN_CHARS: usize = 3;

/// Lower-cased significant tokens of `text`.
pub fn significant_tokens(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();

    NON_WORD
        .split(&lowered)
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_owned)
        .collect()
}

/// Jaccard similarity of the significant tokens of `a` and `b`, in `[0, 1]`.
///
/// Symmetric; `0.0` when neither side has a significant token.
pub fn similarity(a: &str, b: &str) -> f64 {
    jaccard(&significant_tokens(a), &significant_tokens(b))
}

/// `|a ∩ b| / |a ∪ b|`, defined as `0.0` for an empty union.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

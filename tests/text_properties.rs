//! Property tests for the text primitives: normalization
//! is idempotent, similarity is symmetric and bounded.

use freshness::core::phrases::{MAX_WINDOW, MIN_PHRASE_CHARS, MIN_WINDOW, is_significant};
use freshness::{extract_phrases, normalize, similarity};
use proptest::prelude::*;

// Mixed-case words with punctuation and odd spacing
fn texty() -> impl Strategy<Value = String>
{
    "[A-Za-z0-9 ,.!?;:'\"()\\-\t\n]{0,80}"
}

proptest! {
    #[test]
    fn normalize_is_idempotent(s in texty())
    {
        let once = normalize(&s);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_output_is_canonical(s in texty())
    {
        let n = normalize(&s);
        prop_assert_eq!(n.trim(), n.as_str());
        prop_assert!(!n.contains("  "));
        prop_assert!(n.chars().all(|c| c == ' ' || (c.is_alphanumeric() && !c.is_uppercase())));
    }

    #[test]
    fn similarity_is_symmetric_and_bounded(a in texty(), b in texty())
    {
        let ab = similarity(&a, &b);
        prop_assert_eq!(ab, similarity(&b, &a));
        prop_assert!((0.0..=1.0).contains(&ab));
    }

    #[test]
    fn similarity_with_self_is_one(words in prop::collection::vec("[a-z]{4,9}", 1..6))
    {
        let text = words.join(" ");
        prop_assert_eq!(similarity(&text, &text), 1.0);
    }

    #[test]
    fn extracted_phrases_respect_shape(s in "([A-Za-z]{2,9}[ .!?]){0,20}")
    {
        for phrase in extract_phrases(&s)
        {
            let words = phrase.split_whitespace().count();
            prop_assert!((MIN_WINDOW..=MAX_WINDOW).contains(&words));
            prop_assert!(phrase.chars().count() > MIN_PHRASE_CHARS);
            prop_assert!(is_significant(&phrase));
            prop_assert!(!phrase.contains(['.', '!', '?']));
        }
    }
}

#[test]
fn similarity_of_blank_inputs_is_zero()
{
    assert_eq!(similarity("", ""), 0.0);
    assert_eq!(similarity("a an the", "of to in"), 0.0);
}

//! Text canonicalization used before every comparison.

/// Lower-case `text`, turn every character that is not a letter, digit or
/// whitespace into a space, collapse whitespace runs and trim.
///
/// Total and idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    // Lower-case first so multi-char lowercase expansions are filtered too
    let lowered = text.to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut space_pending = false;

    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            if space_pending && !out.is_empty() {
                out.push(' ');
            }
            space_pending = false;
            out.push(ch);
        } else {
            // Punctuation and whitespace both collapse into one separator
            space_pending = true;
        }
    }

    out
}

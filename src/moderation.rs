//! Post body word filter.

const REPLACEMENT: &str = "****";
const FILTERED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Replace filtered words with `****`, case-insensitively.
///
/// Matches whole whitespace-separated words only; a filtered word with
/// punctuation attached passes through. Runs of whitespace collapse to a
/// single space.
pub fn censor(body: &str) -> String {
    body.split_whitespace()
        .map(|word| {
            if FILTERED_WORDS.contains(&word.to_lowercase().as_str()) {
                REPLACEMENT
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

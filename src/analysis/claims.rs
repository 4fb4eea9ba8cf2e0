//! Lead-claim extraction
//!
//! Reduces an article to the clause most likely to carry its claim before
//! embedding, so near-duplicates collapse even when outlets pad the body.

/// Maximum claim length in characters
const CLAIM_CAP: usize = 300;

/// Minimum words for the first clause to stand on its own
const MIN_LEAD_WORDS: usize = 6;

/// First sentence-like clause of the text. A too-short lead (a ticker, a
/// byline) is skipped in favor of the second clause when one exists.
pub fn extract_claim(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let parts: Vec<&str> = trimmed.split(['.', '!', '?']).collect();
    let first = parts[0].trim();
    if first.split_whitespace().count() < MIN_LEAD_WORDS && parts.len() > 1 {
        return cap(parts[1].trim());
    }
    cap(first)
}

pub fn batch_extract_claims(texts: &[String]) -> Vec<String> {
    texts.iter().map(|t| extract_claim(t)).collect()
}

fn cap(clause: &str) -> String {
    clause.chars().take(CLAIM_CAP).collect()
}

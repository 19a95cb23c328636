use once_cell::sync::Lazy;
use regex::Regex;

static ANSWER_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)User has answered your questions?:\s*(.*?)(?:\.?\s*You can now continue with the user's answers? in mind|$)",
    )
    .unwrap()
});

static ANSWER_PAIR: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)"="([^"]*)""#).unwrap());

/// Returns the quoted pairs following the answer phrase, if `text` contains one.
pub fn capture_block(text: &str) -> Option<&str> {
    let block = ANSWER_BLOCK.captures(text)?.get(1)?.as_str().trim();
    (!block.is_empty()).then_some(block)
}

/// `(question, response)` pairs of a captured block, in order.
pub fn pairs(block: &str) -> impl Iterator<Item = (&str, &str)> {
    ANSWER_PAIR.captures_iter(block).filter_map(|captures| {
        Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
    })
}

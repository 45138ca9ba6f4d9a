pub const DEFAULT_MAX_QUERY_WORDS: usize = 8;

/// Legal-form and plan-type words that only add noise to a registry search.
const FILLER_WORDS: &[&str] = &[
    "INC",
    "INC.",
    "LLC",
    "L.L.C.",
    "CO",
    "CO.",
    "CORP",
    "CORPORATION",
    "LTD",
    "LIMITED",
    "TRUST",
    "PLAN",
    "PROFIT",
    "SHARING",
    "SAVINGS",
    "RETIREMENT",
    "EMPLOYEE",
    "BENEFIT",
];

/// Turns a free-text plan name into a compact search string.
///
/// Punctuation that the registry treats as operators is replaced by spaces,
/// filler words are dropped and at most `max_words` words are kept. When
/// every word is filler the cleaned name is returned as-is.
pub fn build_search_query(plan_name: &str, max_words: usize) -> String {
    let replaced: String = plan_name
        .chars()
        .map(|c| match c {
            '\u{a0}' | '&' | '(' | ')' | ',' => ' ',
            other => other,
        })
        .collect();
    let words: Vec<&str> = replaced.split_whitespace().collect();
    let kept: Vec<&str> = words
        .iter()
        .copied()
        .filter(|word| !is_filler(word))
        .take(max_words)
        .collect();

    if kept.is_empty() {
        words.join(" ")
    } else {
        kept.join(" ")
    }
}

fn is_filler(word: &str) -> bool {
    let upper = word.to_uppercase();
    FILLER_WORDS.iter().any(|filler| *filler == upper)
}

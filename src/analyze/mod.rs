//! Word-frequency analysis over transcript text.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Number of entries returned when no explicit limit is given
pub const DEFAULT_TOP_N: usize = 10;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// A ranked (word, count) entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Count word occurrences in `text` and return the `top_n` most frequent.
///
/// Matching is case-insensitive; tokens are `\w+` runs. Ties rank by first
/// appearance in the text, so repeated calls on the same input are stable.
pub fn word_frequency(text: &str, top_n: usize) -> Vec<WordCount> {
    let lowered = text.to_lowercase();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for m in WORD_RE.find_iter(&lowered) {
        let word = m.as_str();
        let entry = counts.entry(word).or_insert(0);
        if *entry == 0 {
            first_seen.push(word);
        }
        *entry += 1;
    }

    let mut ranked: Vec<WordCount> = first_seen
        .into_iter()
        .map(|word| WordCount {
            count: counts[word],
            word: word.to_string(),
        })
        .collect();

    // Stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top_n);
    ranked
}

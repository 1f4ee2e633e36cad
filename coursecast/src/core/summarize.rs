use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use crate::core::sanitize::sanitize;

pub const NO_CONTENT: &str = "No readable content found.";

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

/// Tokens of this many characters or fewer carry no weight when scoring.
const SHORT_WORD_LEN: usize = 3;

/// Sanitizes `text` and splits it after `.`, `!` or `?` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<String> {
    let cleaned = sanitize(text);
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev = None;

    for (idx, ch) in cleaned.char_indices() {
        if ch.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            push_sentence(&mut sentences, &cleaned[start..idx]);
            start = idx + ch.len_utf8();
        }
        prev = Some(ch);
    }
    push_sentence(&mut sentences, &cleaned[start..]);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD.find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Picks up to `max_sentences` sentences with the highest mean word salience
/// and returns them in document order.
pub fn summarize(text: &str, max_sentences: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return NO_CONTENT.to_string();
    }
    if sentences.len() <= max_sentences {
        return sentences.join(" ");
    }

    let mut frequency: HashMap<String, usize> = HashMap::new();
    for sentence in &sentences {
        for word in words(sentence).filter(|w| w.chars().count() > SHORT_WORD_LEN) {
            *frequency.entry(word).or_insert(0) += 1;
        }
    }

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .filter_map(|(idx, sentence)| {
            let tokens: Vec<String> = words(sentence).collect();
            if tokens.is_empty() {
                return None;
            }
            let total: usize = tokens
                .iter()
                .map(|t| frequency.get(t).copied().unwrap_or(0))
                .sum();
            Some((idx, total as f64 / tokens.len() as f64))
        })
        .collect();

    if scored.is_empty() {
        return sentences[..max_sentences].join(" ");
    }

    // Stable: equal scores keep document order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut selected: Vec<usize> = scored.iter().take(max_sentences).map(|(idx, _)| *idx).collect();
    selected.sort_unstable();

    selected
        .into_iter()
        .map(|idx| sentences[idx].as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

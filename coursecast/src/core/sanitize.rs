use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static STYLE_BRACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{\\?[a-z]+style[^}]*\}").expect("valid regex"));
static NESTED_BRACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{\\?[a-z]+\{[^}]*\}\}").expect("valid regex"));
static SHORT_BRACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]{0,3}\}").expect("valid regex"));
static GREEK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[α-ωΑ-Ω]").expect("valid regex"));
static MATH_SYMBOLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[∈∑∏∫∂∆∇≤≥≠≈∞⊂⊃∪∩∧∨¬∀∃×÷±≡⊕⊗→]").expect("valid regex")
});
static CITATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*\d+\s*\]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static UPPER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,}$").expect("valid regex"));

/// Strips math markup, symbols and citation markers, then collapses whitespace.
///
/// A removal can expose a new match (`{αβγδ}` becomes `{}` once the letters are
/// gone), so passes repeat until the text stops changing. The result is a
/// fixpoint, which makes the function idempotent.
pub fn sanitize(text: &str) -> String {
    let mut current = strip_pass(text);
    loop {
        let next = strip_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_pass(text: &str) -> String {
    let mut cleaned = STYLE_BRACES.replace_all(text, "").into_owned();
    for re in [&*NESTED_BRACES, &*SHORT_BRACES, &*GREEK, &*MATH_SYMBOLS, &*CITATIONS] {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Line-level noise rules applied when condensing blurbs.
#[derive(Debug, Clone, Copy)]
pub struct LineFilter<'a> {
    pub banned_phrases: &'a [String],
    pub min_line_length: usize,
}

impl LineFilter<'_> {
    fn rejects(&self, line: &str) -> bool {
        let lowered = line.to_lowercase();
        if self
            .banned_phrases
            .iter()
            .any(|phrase| lowered.contains(&phrase.to_lowercase()))
        {
            return true;
        }
        if line.chars().count() <= self.min_line_length && !line.ends_with('.') {
            return true;
        }
        UPPER_TOKEN.is_match(line)
    }
}

/// Sanitizes each line and keeps the first occurrence of every line that
/// survives the filter.
pub fn clean_lines(text: &str, filter: &LineFilter<'_>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();

    for raw_line in text.lines() {
        let line = sanitize(raw_line);
        if line.is_empty() || filter.rejects(&line) {
            continue;
        }
        if seen.insert(line.clone()) {
            cleaned.push(line);
        }
    }

    cleaned
}

pub fn condense(text: &str, limit: usize, filter: &LineFilter<'_>) -> String {
    let joined = clean_lines(text, filter).join(" ");
    let truncated: String = joined.chars().take(limit).collect();
    truncated.trim().to_string()
}

use anyhow::Result;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use crate::core::assembly::NO_ARTICLE_TEXT;
use crate::core::config::PipelineConfig;
use crate::core::records::{CONTENT_MARKER, SUMMARY_MARKER, URL_MARKER, WORD_COUNT_MARKER};
use crate::core::sanitize::sanitize;
use crate::core::summarize::summarize;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

pub fn estimate_audio_hours(word_count: usize, words_per_minute: f64) -> f64 {
    if word_count == 0 || words_per_minute <= 0.0 {
        return 0.0;
    }
    word_count as f64 / words_per_minute / 60.0
}

/// Renders one extracted article as a record chunk, summary included.
pub fn render_record(url: &str, article_text: &str, settings: &PipelineConfig) -> String {
    let text = sanitize(article_text);
    let word_count = WORD.find_iter(&text).count();
    let summary = summarize(&text, settings.summary_sentences);
    let hours = estimate_audio_hours(word_count, settings.words_per_minute);

    [
        format!("{}{}", URL_MARKER, url),
        format!("{}{}", WORD_COUNT_MARKER, word_count),
        format!(
            "Estimated audio hours (@{:.0} wpm): {:.2}",
            settings.words_per_minute, hours
        ),
        SUMMARY_MARKER.to_string(),
        summary,
        CONTENT_MARKER.to_string(),
        if text.is_empty() { NO_ARTICLE_TEXT.to_string() } else { text },
    ]
    .join("\n")
}

pub fn render_error_record(url: &str, error: &str) -> String {
    format!("{}{}\nError: {}", URL_MARKER, url, error)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub url: String,
    pub path: String,
}

/// Reads `URL <whitespace> path` lines; blank lines and `#` comments are skipped.
pub fn parse_manifest(manifest: &str) -> Vec<ManifestEntry> {
    manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut parts = line.splitn(2, char::is_whitespace);
            let url = parts.next()?.trim();
            let path = parts.next()?.trim();
            if path.is_empty() {
                log::warn!("Manifest line without a text file: {}", line);
                return None;
            }
            Some(ManifestEntry {
                url: url.to_string(),
                path: path.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct IngestSummary {
    pub blob: String,
    pub records: usize,
    pub errors: usize,
    pub total_hours: f64,
}

/// Builds a record blob from extracted article texts. Relative paths resolve
/// against `base_dir`; unreadable files become error records.
pub fn ingest_manifest(manifest: &str, base_dir: &Path, settings: &PipelineConfig) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();
    let mut chunks = Vec::new();

    for entry in parse_manifest(manifest) {
        let path = base_dir.join(&entry.path);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let words = WORD.find_iter(&sanitize(&text)).count();
                summary.total_hours += estimate_audio_hours(words, settings.words_per_minute);
                chunks.push(render_record(&entry.url, &text, settings));
            }
            Err(e) => {
                log::warn!("Failed to read {} for {}: {}", path.display(), entry.url, e);
                summary.errors += 1;
                chunks.push(render_error_record(&entry.url, &e.to_string()));
            }
        }
        summary.records += 1;
    }

    if summary.records == 0 {
        anyhow::bail!("manifest lists no sources");
    }
    summary.blob = chunks.join("\n\n");
    Ok(summary)
}

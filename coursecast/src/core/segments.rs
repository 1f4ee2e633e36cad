use serde::{Deserialize, Serialize};
use crate::core::config::PipelineConfig;
use crate::core::records::SourceRecord;
use crate::core::sanitize::{condense, sanitize, word_count, LineFilter};
use crate::core::summarize::{summarize, NO_CONTENT};

/// A cleaned, duration-estimated unit of source content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// 1-based position of the source record in the original blob.
    pub source_index: usize,
    pub url: String,
    pub word_count: u64,
    pub estimated_minutes: f64,
    pub condensed_summary: String,
    pub cleaned_content: String,
}

#[derive(Debug, Clone, Default)]
pub struct CollectedSegments {
    pub segments: Vec<Segment>,
    pub total_minutes: f64,
}

pub fn estimate_minutes(word_count: u64, words_per_minute: f64) -> f64 {
    if word_count == 0 || words_per_minute <= 0.0 {
        return 0.0;
    }
    word_count as f64 / words_per_minute
}

/// Blurb for a record: the declared summary when present, else the body.
pub fn condensed_summary(record: &SourceRecord, settings: &PipelineConfig) -> String {
    let filter = LineFilter {
        banned_phrases: &settings.banned_phrases,
        min_line_length: settings.min_line_length,
    };
    let mut summary = String::new();
    if !record.summary.trim().is_empty() {
        let shortened = summarize(&record.summary, settings.summary_sentences);
        if shortened != NO_CONTENT {
            summary = condense(&shortened, settings.max_snippet_chars, &filter);
        }
    }
    if summary.is_empty() {
        summary = condense(&record.content, settings.max_snippet_chars, &filter);
    }
    summary
}

pub fn collect_segments(records: &[SourceRecord], settings: &PipelineConfig) -> CollectedSegments {
    let mut collected = CollectedSegments::default();

    for (offset, record) in records.iter().enumerate() {
        let index = offset + 1;
        if record.is_error() {
            log::debug!("Skipping source {}: fetch error record", index);
            continue;
        }

        let content = sanitize(&record.content);
        let words = word_count(&content);
        if words < settings.min_content_words {
            log::debug!("Skipping source {}: {} words of content", index, words);
            continue;
        }

        let word_count = record.declared_word_count().unwrap_or(words as u64);
        let minutes = estimate_minutes(word_count, settings.words_per_minute);
        collected.total_minutes += minutes;

        collected.segments.push(Segment {
            source_index: index,
            url: record
                .url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| format!("Source {}", index)),
            word_count,
            estimated_minutes: minutes,
            condensed_summary: condensed_summary(record, settings),
            cleaned_content: content,
        });
    }

    log::info!(
        "Collected {} of {} sources ({:.2} minutes)",
        collected.segments.len(),
        records.len(),
        collected.total_minutes
    );
    collected
}

use serde::{Deserialize, Serialize};

pub const URL_MARKER: &str = "URL: ";
pub const WORD_COUNT_MARKER: &str = "Word count: ";
pub const HOURS_MARKER: &str = "Estimated audio hours";
pub const SUMMARY_MARKER: &str = "Summary:";
pub const CONTENT_MARKER: &str = "Full content:";
pub const ERROR_MARKER: &str = "Error:";

/// One source's captured text, as parsed from a record blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub url: Option<String>,
    /// Free text after `Word count: `; see [`SourceRecord::declared_word_count`].
    pub word_count: Option<String>,
    pub estimated_hours: Option<String>,
    pub summary: String,
    pub content: String,
    /// The trimmed chunk this record was parsed from.
    pub raw: String,
}

impl SourceRecord {
    /// Positive declared word count, if the free text carries one.
    pub fn declared_word_count(&self) -> Option<u64> {
        self.word_count
            .as_deref()
            .map(parse_word_count)
            .filter(|count| *count > 0)
    }

    /// A fetch failure captured as a short `Error:` chunk.
    pub fn is_error(&self) -> bool {
        self.raw.contains(ERROR_MARKER) && self.raw.matches('\n').count() < 3
    }
}

/// Concatenates every digit run after dropping thousands separators.
/// Returns 0 when there are no digits or the value does not fit.
pub fn parse_word_count(value: &str) -> u64 {
    let digits: String = value
        .replace(',', "")
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Splits a blob into record chunks. Every line starting with `URL: ` opens a
/// new chunk once the current one holds any lines.
pub fn split_chunks(blob: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    for line in blob.lines() {
        if line.starts_with(URL_MARKER) && !buffer.is_empty() {
            chunks.push(buffer.join("\n").trim().to_string());
            buffer.clear();
        }
        buffer.push(line);
    }
    if !buffer.is_empty() {
        chunks.push(buffer.join("\n").trim().to_string());
    }

    chunks.into_iter().filter(|chunk| !chunk.is_empty()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Header,
    Summary,
    Content,
}

pub fn parse_record(chunk: &str) -> SourceRecord {
    let mut record = SourceRecord {
        raw: chunk.to_string(),
        ..Default::default()
    };
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut content_lines: Vec<&str> = Vec::new();
    let mut mode = Mode::Header;

    for line in chunk.lines() {
        if let Some(url) = line.strip_prefix(URL_MARKER) {
            record.url = Some(url.trim().to_string());
            continue;
        }
        if let Some(count) = line.strip_prefix(WORD_COUNT_MARKER) {
            record.word_count = Some(count.trim().to_string());
            continue;
        }
        if line.starts_with(HOURS_MARKER) {
            let hours = line.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or("");
            record.estimated_hours = Some(hours.to_string());
            continue;
        }
        match line.trim() {
            SUMMARY_MARKER => {
                mode = Mode::Summary;
                continue;
            }
            CONTENT_MARKER => {
                mode = Mode::Content;
                continue;
            }
            _ => {}
        }

        match mode {
            Mode::Summary => summary_lines.push(line),
            Mode::Content => content_lines.push(line),
            Mode::Header => {}
        }
    }

    record.summary = summary_lines.join("\n").trim().to_string();
    record.content = content_lines.join("\n").trim().to_string();
    record
}

pub fn parse_records(blob: &str) -> Vec<SourceRecord> {
    split_chunks(blob).iter().map(|chunk| parse_record(chunk)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOB: &str = "\
URL: https://example.com/a
Word count: 1,234
Estimated audio hours (@160 wpm): 0.13
Summary:
First summary line.
Second summary line.
Full content:
Body text one.

Body text two.
URL: https://example.com/b
Error: connection reset

URL: https://example.com/c
Summary:
Only a summary.
";

    #[test]
    fn splits_on_url_lines() {
        let chunks = split_chunks(BLOB);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[1].starts_with("URL: https://example.com/b"));
        assert!(chunks[1].ends_with("connection reset"));
    }

    #[test]
    fn leading_text_without_url_forms_its_own_chunk() {
        let chunks = split_chunks("preamble\nURL: x\nbody");
        assert_eq!(chunks, vec!["preamble".to_string(), "URL: x\nbody".to_string()]);
    }

    #[test]
    fn empty_blob_has_no_records() {
        assert!(parse_records("").is_empty());
        assert!(parse_records("\n   \n").is_empty());
    }

    #[test]
    fn parses_all_fields() {
        let records = parse_records(BLOB);
        let first = &records[0];
        assert_eq!(first.url.as_deref(), Some("https://example.com/a"));
        assert_eq!(first.word_count.as_deref(), Some("1,234"));
        assert_eq!(first.declared_word_count(), Some(1234));
        assert_eq!(first.estimated_hours.as_deref(), Some("0.13"));
        assert_eq!(first.summary, "First summary line.\nSecond summary line.");
        assert_eq!(first.content, "Body text one.\n\nBody text two.");
        assert!(!first.is_error());
    }

    #[test]
    fn detects_error_records() {
        let records = parse_records(BLOB);
        assert!(records[1].is_error());
        assert_eq!(records[1].content, "");
    }

    #[test]
    fn error_text_inside_a_full_record_is_content() {
        let chunk = "URL: https://a.example\nWord count: 900\nSummary:\nOn errors.\nFull content:\nError: values propagate with ?.";
        let record = parse_record(chunk);
        assert!(!record.is_error());
        assert_eq!(record.content, "Error: values propagate with ?.");

        let short = parse_record("URL: https://a.example\nSummary:\nError: 500");
        assert!(short.is_error());
    }

    #[test]
    fn missing_sections_yield_empty_strings() {
        let records = parse_records(BLOB);
        let last = &records[2];
        assert_eq!(last.summary, "Only a summary.");
        assert_eq!(last.content, "");
        assert_eq!(last.word_count, None);
        assert_eq!(last.declared_word_count(), None);
    }

    #[test]
    fn word_count_parsing() {
        assert_eq!(parse_word_count("2,500 words"), 2500);
        assert_eq!(parse_word_count("n/a"), 0);
        assert_eq!(parse_word_count("0"), 0);
    }
}

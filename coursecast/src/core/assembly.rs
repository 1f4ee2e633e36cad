use serde::{Deserialize, Serialize};
use crate::core::schedule::EpisodeGroup;
use crate::core::script::{pad_quiz, Difficulty, EpisodeScript, ScriptError, SourceBrief};
use crate::core::segments::Segment;

pub const NO_ARTICLE_TEXT: &str = "(No article text extracted.)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePayload {
    pub label: String,
    pub url: String,
    pub word_count: u64,
    pub estimated_minutes: f64,
    pub content: String,
}

/// One persisted episode of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodePayload {
    pub episode_number: usize,
    pub day_label: String,
    pub difficulty: Difficulty,
    pub title: String,
    pub duration_minutes: f64,
    pub script: String,
    pub quiz: Vec<String>,
    pub sources: Vec<SourcePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_reference: Option<String>,
}

/// Fixed facts about the episode being assembled.
#[derive(Debug, Clone)]
pub struct EpisodeContext<'a> {
    pub topic: &'a str,
    pub episode_number: usize,
    pub difficulty: Difficulty,
    pub content_days: u32,
    pub requested_days: u32,
    pub content_multiplier: f64,
    pub quiz_length: usize,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn source_label(position: usize) -> String {
    format!("Source {}", position)
}

pub fn source_briefs(segments: &[Segment]) -> Vec<SourceBrief> {
    segments
        .iter()
        .enumerate()
        .map(|(idx, segment)| SourceBrief {
            label: source_label(idx + 1),
            url: segment.url.clone(),
            summary: segment.condensed_summary.clone(),
        })
        .collect()
}

/// Maps a content-day episode back onto the requested release cadence.
pub fn suggested_release_day(episode_number: usize, content_multiplier: f64, requested_days: u32) -> u32 {
    let day = (episode_number as f64 / content_multiplier.max(1e-9)).ceil();
    let upper = requested_days.max(1);
    (day as u32).clamp(1, upper)
}

/// Deterministic stand-in script for an episode whose generation failed.
pub fn fallback_script(
    ctx: &EpisodeContext<'_>,
    segments: &[Segment],
    failure: Option<&ScriptError>,
) -> EpisodeScript {
    let summary_text = segments
        .iter()
        .map(|s| s.condensed_summary.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    let body = failure
        .and_then(ScriptError::raw_text)
        .map(str::to_string)
        .or_else(|| Some(summary_text).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "Content unavailable.".to_string());

    let script = format!(
        "Hey there, welcome to Day {} of our {} journey (out of {} days). \
         This lesson feels {} and builds on everything we've covered so far. {}",
        ctx.episode_number,
        ctx.topic,
        ctx.content_days.max(1),
        ctx.difficulty,
        body
    );

    let mut quiz: Vec<String> = segments
        .iter()
        .take(ctx.quiz_length)
        .map(|s| format!("What was the key takeaway from {}?", s.url))
        .collect();
    pad_quiz(&mut quiz, ctx.quiz_length, ctx.episode_number);

    EpisodeScript {
        title: default_title(ctx),
        script,
        quiz,
    }
}

fn default_title(ctx: &EpisodeContext<'_>) -> String {
    format!("{} Episode {}", ctx.topic, ctx.episode_number)
}

pub fn build_episode_payload(ctx: &EpisodeContext<'_>, group: &EpisodeGroup, script: EpisodeScript) -> EpisodePayload {
    let sources = group
        .segments
        .iter()
        .enumerate()
        .map(|(idx, segment)| SourcePayload {
            label: source_label(idx + 1),
            url: segment.url.clone(),
            word_count: segment.word_count,
            estimated_minutes: round2(segment.estimated_minutes),
            content: if segment.cleaned_content.is_empty() {
                NO_ARTICLE_TEXT.to_string()
            } else {
                segment.cleaned_content.clone()
            },
        })
        .collect();

    let release_day = suggested_release_day(ctx.episode_number, ctx.content_multiplier, ctx.requested_days);
    let title = if script.title.trim().is_empty() {
        default_title(ctx)
    } else {
        script.title.trim().to_string()
    };

    EpisodePayload {
        episode_number: ctx.episode_number,
        day_label: format!(
            "Content Day {} of {} (suggested release day {} of {})",
            ctx.episode_number,
            ctx.content_days.max(1),
            release_day,
            ctx.requested_days.max(1)
        ),
        difficulty: ctx.difficulty,
        title,
        duration_minutes: round2(group.duration_minutes),
        script: script.script.trim().to_string(),
        quiz: script.quiz,
        sources,
        audio_reference: None,
    }
}

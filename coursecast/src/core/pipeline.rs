use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;
use crate::core::assembly::{
    build_episode_payload, fallback_script, round2, source_briefs, EpisodeContext, EpisodePayload,
};
use crate::core::config::PipelineConfig;
use crate::core::records::{parse_records, parse_word_count};
use crate::core::schedule::{schedule_episodes, EpisodeGroup};
use crate::core::script::{
    Difficulty, EpisodeScript, ScriptError, ScriptGenerator, ScriptRequest, TokenUsage,
};
use crate::core::segments::collect_segments;

/// The persisted schedule for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub topic: String,
    pub requested_day_count: u32,
    pub content_day_count: u32,
    pub content_multiplier: f64,
    pub episode_count: usize,
    pub total_estimated_minutes: f64,
    pub episodes: Vec<EpisodePayload>,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub document: ScheduleDocument,
    pub usage: TokenUsage,
    /// Episodes whose script came from the deterministic fallback.
    pub fallback_episodes: usize,
}

impl PipelineReport {
    pub fn is_empty(&self) -> bool {
        self.document.episodes.is_empty()
    }
}

/// Digits of a free-form day count such as `"7 days"`; zero or no digits is `None`.
pub fn parse_day_count(value: &str) -> Option<u32> {
    u32::try_from(parse_word_count(value)).ok().filter(|days| *days > 0)
}

/// Returns `(requested_days, content_days)`. Non-positive requests use the
/// configured default; content days scale by the multiplier, at least one.
pub fn resolve_days(requested_days: u32, settings: &PipelineConfig) -> (u32, u32) {
    let requested = if requested_days > 0 {
        requested_days
    } else {
        settings.default_day_count.max(1)
    };
    let content = (requested as f64 * settings.content_multiplier).ceil().max(1.0) as u32;
    (requested, content)
}

pub struct Pipeline<'a, G: ScriptGenerator + ?Sized> {
    settings: &'a PipelineConfig,
    generator: &'a G,
}

impl<'a, G: ScriptGenerator + ?Sized> Pipeline<'a, G> {
    pub fn new(settings: &'a PipelineConfig, generator: &'a G) -> Self {
        Self { settings, generator }
    }

    /// Parses the blob, schedules its segments and assembles every episode.
    /// An input without usable content yields a report with no episodes.
    pub async fn run(&self, topic: &str, requested_days: u32, blob: &str) -> PipelineReport {
        let (requested_days, content_days) = resolve_days(requested_days, self.settings);
        log::info!(
            "Preparing '{}': {} requested day(s), {} content day(s)",
            topic,
            requested_days,
            content_days
        );

        let records = parse_records(blob);
        let collected = collect_segments(&records, self.settings);
        let groups = schedule_episodes(
            collected.segments,
            collected.total_minutes,
            content_days,
            self.settings,
        );
        if groups.is_empty() {
            log::warn!("No valid segments available to build episodes for '{}'", topic);
        }

        let total_minutes: f64 = groups.iter().map(|g| g.duration_minutes).sum();
        let mut usage = TokenUsage::default();
        let mut fallback_episodes = 0;
        let mut episodes = Vec::with_capacity(groups.len());

        for (idx, group) in groups.iter().enumerate() {
            let ctx = EpisodeContext {
                topic,
                episode_number: idx + 1,
                difficulty: Difficulty::for_episode(idx + 1, groups.len()),
                content_days,
                requested_days,
                content_multiplier: self.settings.content_multiplier,
                quiz_length: self.settings.quiz_length,
            };

            if idx > 0 {
                self.cooldown().await;
            }
            let (script, call_usage, fell_back) = self.script_for(&ctx, group).await;
            usage += call_usage;
            if fell_back {
                fallback_episodes += 1;
            }
            episodes.push(build_episode_payload(&ctx, group, script));
        }

        log::info!(
            "Assembled {} episode(s) for '{}' ({} from fallback); tokens: prompt {} | completion {} | total {}",
            episodes.len(),
            topic,
            fallback_episodes,
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );

        PipelineReport {
            document: ScheduleDocument {
                run_id: Uuid::new_v4(),
                generated_at: Utc::now(),
                topic: topic.to_string(),
                requested_day_count: requested_days,
                content_day_count: content_days,
                content_multiplier: self.settings.content_multiplier,
                episode_count: episodes.len(),
                total_estimated_minutes: round2(total_minutes),
                episodes,
            },
            usage,
            fallback_episodes,
        }
    }

    async fn cooldown(&self) {
        if self.settings.mock_mode || self.settings.cooldown_secs == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_secs(self.settings.cooldown_secs)).await;
    }

    /// One attempt at the generator; any failure resolves to the fallback.
    async fn script_for(&self, ctx: &EpisodeContext<'_>, group: &EpisodeGroup) -> (EpisodeScript, TokenUsage, bool) {
        if self.settings.mock_mode {
            return (fallback_script(ctx, &group.segments, None), TokenUsage::default(), true);
        }

        let request = ScriptRequest {
            topic: ctx.topic.to_string(),
            episode_number: ctx.episode_number,
            difficulty: ctx.difficulty,
            total_days: ctx.content_days,
            target_minutes: group.duration_minutes,
            quiz_length: ctx.quiz_length,
            sources: source_briefs(&group.segments),
        };

        match self.generator.generate(&request).await {
            Ok(outcome) => (outcome.script, outcome.usage, false),
            Err(e) => {
                if matches!(e, ScriptError::MissingCredential(_)) {
                    log::error!("Episode {} script generation failed: {}", ctx.episode_number, e);
                } else {
                    log::warn!("Episode {} script generation failed: {}", ctx.episode_number, e);
                }
                let usage = e.usage();
                (fallback_script(ctx, &group.segments, Some(&e)), usage, true)
            }
        }
    }
}

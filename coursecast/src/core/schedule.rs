use crate::core::config::PipelineConfig;
use crate::core::segments::Segment;

/// Duration bounds shared by every episode of one schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeBounds {
    pub target_minutes: f64,
    pub max_minutes: f64,
}

/// Contiguous run of segments narrated as one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeGroup {
    pub segments: Vec<Segment>,
    pub duration_minutes: f64,
}

/// Sizes episodes from the content volume spread over `content_days`.
///
/// The target is clamped into the configured min/max range. The cap gives short
/// targets an absolute +10 minutes of headroom and long ones 40%, but never
/// exceeds the configured maximum.
pub fn compute_episode_bounds(total_minutes: f64, content_days: u32, settings: &PipelineConfig) -> EpisodeBounds {
    let ceiling = settings.episode_max_minutes;
    if total_minutes <= 0.0 {
        return EpisodeBounds {
            target_minutes: settings.episode_target_minutes,
            max_minutes: ceiling,
        };
    }

    let raw_target = if content_days > 0 {
        total_minutes / content_days as f64
    } else {
        settings.episode_target_minutes
    };
    let target = settings.episode_min_minutes.max(ceiling.min(raw_target));
    let max_minutes = (target * 1.4).max(target + 10.0).min(ceiling);

    EpisodeBounds {
        target_minutes: target,
        max_minutes,
    }
}

/// Greedy packing in document order. Segments are never split or reordered;
/// zero-length segments are dropped. A group closes before a segment that would
/// push it past the cap, and as soon as it reaches the target.
pub fn pack_episodes(segments: Vec<Segment>, bounds: EpisodeBounds) -> Vec<EpisodeGroup> {
    let mut episodes = Vec::new();
    let mut current: Vec<Segment> = Vec::new();
    let mut current_minutes = 0.0;

    for segment in segments {
        let minutes = segment.estimated_minutes;
        if minutes <= 0.0 {
            continue;
        }

        if !current.is_empty() && current_minutes + minutes > bounds.max_minutes {
            episodes.push(EpisodeGroup {
                segments: std::mem::take(&mut current),
                duration_minutes: current_minutes,
            });
            current_minutes = 0.0;
        }

        current.push(segment);
        current_minutes += minutes;

        if current_minutes >= bounds.target_minutes {
            episodes.push(EpisodeGroup {
                segments: std::mem::take(&mut current),
                duration_minutes: current_minutes,
            });
            current_minutes = 0.0;
        }
    }

    if !current.is_empty() {
        episodes.push(EpisodeGroup {
            segments: current,
            duration_minutes: current_minutes,
        });
    }

    episodes
}

pub fn schedule_episodes(
    segments: Vec<Segment>,
    total_minutes: f64,
    content_days: u32,
    settings: &PipelineConfig,
) -> Vec<EpisodeGroup> {
    let bounds = compute_episode_bounds(total_minutes, content_days, settings);
    log::info!(
        "Scheduling {} segments: target {:.2} min, cap {:.2} min",
        segments.len(),
        bounds.target_minutes,
        bounds.max_minutes
    );
    pack_episodes(segments, bounds)
}

use anyhow::Result;
use async_trait::async_trait;
use crate::core::assembly::EpisodePayload;

/// Text-to-speech collaborator. Returns a reference (path or URL) to the
/// rendered audio, or `None` when nothing was produced.
#[async_trait]
pub trait AudioSynthesizer: Send + Sync {
    async fn synthesize(&self, topic: &str, episode_number: usize, script: &str) -> Result<Option<String>>;
}

/// Used when no speech engine is configured.
pub struct DisabledAudio;

#[async_trait]
impl AudioSynthesizer for DisabledAudio {
    async fn synthesize(&self, _topic: &str, _episode_number: usize, _script: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Sets `audio_reference` on every episode with a number and a script.
/// No other field is touched; a failed synthesis leaves the reference empty.
pub async fn attach_audio<S: AudioSynthesizer + ?Sized>(
    synthesizer: &S,
    topic: &str,
    episodes: &mut [EpisodePayload],
) -> usize {
    let mut attached = 0;
    for episode in episodes.iter_mut() {
        let script = episode.script.trim();
        if script.is_empty() || episode.episode_number == 0 {
            episode.audio_reference = None;
            continue;
        }

        episode.audio_reference = match synthesizer.synthesize(topic, episode.episode_number, script).await {
            Ok(reference) => reference,
            Err(e) => {
                log::warn!("Audio synthesis failed for episode {}: {}", episode.episode_number, e);
                None
            }
        };
        if episode.audio_reference.is_some() {
            attached += 1;
        }
    }
    attached
}

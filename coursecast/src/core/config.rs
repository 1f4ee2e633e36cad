use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};

pub const DEFAULT_BANNED_PHRASES: [&str; 4] = [
    "advertisement",
    "copyright",
    "all rights reserved",
    "for premium support please call",
];

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub api_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            api_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 2048,
            temperature: 0.4,
            timeout_secs: 120,
        }
    }
}

/// Tunables for segment collection, scheduling and assembly.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub words_per_minute: f64,
    pub content_multiplier: f64,
    pub episode_min_minutes: f64,
    pub episode_max_minutes: f64,
    pub episode_target_minutes: f64,
    pub quiz_length: usize,
    pub max_snippet_chars: usize,
    pub min_line_length: usize,
    pub min_content_words: usize,
    pub summary_sentences: usize,
    pub banned_phrases: Vec<String>,
    pub cooldown_secs: u64,
    pub mock_mode: bool,
    pub reuse_cached: bool,
    pub default_day_count: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 160.0,
            content_multiplier: 2.0,
            episode_min_minutes: 20.0,
            episode_max_minutes: 45.0,
            episode_target_minutes: 30.0,
            quiz_length: 3,
            max_snippet_chars: 600,
            min_line_length: 3,
            min_content_words: 50,
            summary_sentences: 6,
            banned_phrases: DEFAULT_BANNED_PHRASES.iter().map(|p| p.to_string()).collect(),
            cooldown_secs: 20,
            mock_mode: false,
            reuse_cached: true,
            default_day_count: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub topics_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            topics_root: PathBuf::from("topics"),
        }
    }
}

impl Config {
    /// Applies overrides from a key lookup (normally `std::env::var`).
    /// Values that fail to parse leave the current setting untouched.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let p = &mut self.pipeline;
        override_bool(&lookup, "MOCK_MODE", &mut p.mock_mode);
        override_bool(&lookup, "REUSE_CACHED", &mut p.reuse_cached);
        override_parse(&lookup, "CONTENT_MULTIPLIER", &mut p.content_multiplier);
        override_parse(&lookup, "COOLDOWN_SECONDS", &mut p.cooldown_secs);
        override_parse(&lookup, "WORDS_PER_MINUTE", &mut p.words_per_minute);
        override_parse(&lookup, "EPISODE_MIN_MINUTES", &mut p.episode_min_minutes);
        override_parse(&lookup, "EPISODE_MAX_MINUTES", &mut p.episode_max_minutes);
        override_parse(&lookup, "EPISODE_TARGET_MINUTES", &mut p.episode_target_minutes);
        override_parse(&lookup, "QUIZ_LENGTH", &mut p.quiz_length);

        if let Some(raw) = lookup("BANNED_PHRASES") {
            let phrases: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !phrases.is_empty() {
                p.banned_phrases = phrases;
            }
        }

        if let Some(model) = lookup("LLM_MODEL").filter(|v| !v.trim().is_empty()) {
            self.llm.model = model.trim().to_string();
        }
        if let Some(url) = lookup("LLM_API_URL").filter(|v| !v.trim().is_empty()) {
            self.llm.api_url = url.trim().to_string();
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }
}

fn override_bool<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, slot: &mut bool) {
    if let Some(value) = lookup(key) {
        *slot = matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on");
    }
}

fn override_parse<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(value) = lookup(key) {
        match value.trim().parse::<T>() {
            Ok(parsed) => *slot = parsed,
            Err(_) => log::warn!("Ignoring unparsable value for {}: {:?}", key, value),
        }
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("parsing config file {}", path))?;
    Ok(config)
}

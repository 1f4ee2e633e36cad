use anyhow::Result;

use coursecast::core::audio::{attach_audio, DisabledAudio};
use coursecast::core::config::load_config;
use coursecast::core::llm::LlmClient;
use coursecast::core::pipeline::{parse_day_count, Pipeline};
use coursecast::core::store::TopicStore;

const DEFAULT_TOPIC: &str = "Answer Engine Optimization";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::var("COURSECAST_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

    // Write a starter config on first run
    if !std::path::Path::new(&config_path).exists() {
        let starter_config = r#"
[llm]
model = "gpt-4o"
api_url = "https://api.openai.com/v1"
api_key_env = "OPENAI_API_KEY"

[pipeline]
content_multiplier = 2.0
cooldown_secs = 20
mock_mode = false

[storage]
topics_root = "topics"
"#;
        std::fs::write(&config_path, starter_config)?;
        log::info!("Wrote starter config to {}", config_path);
    }

    let mut config = load_config(&config_path)?;
    config.apply_env();

    // TOPIC / DAYS from the environment, else positional arguments
    let mut args = std::env::args().skip(1);
    let topic = std::env::var("TOPIC")
        .ok()
        .or_else(|| args.next())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
    let days = std::env::var("DAYS")
        .ok()
        .or_else(|| args.next())
        .and_then(|d| parse_day_count(&d))
        .unwrap_or(0);

    if config.pipeline.mock_mode {
        log::info!("MOCK_MODE is enabled; episode scripts use the offline fallback.");
    }

    let store = TopicStore::new(&config.storage.topics_root);
    if config.pipeline.reuse_cached {
        if let Some(existing) = store.load_schedule(&topic)? {
            log::info!(
                "Reusing {} ({} episode(s)); delete it or set REUSE_CACHED=false to regenerate.",
                store.schedule_path(&topic).display(),
                existing.episode_count
            );
            return Ok(());
        }
    }

    let blob = store.read_blob(&topic)?;
    let llm = LlmClient::new(config.llm.clone(), config.pipeline.words_per_minute);
    let pipeline = Pipeline::new(&config.pipeline, &llm);

    let mut report = pipeline.run(&topic, days, &blob).await;
    if report.is_empty() {
        log::warn!("No episodes were generated for '{}'.", topic);
        return Ok(());
    }

    attach_audio(&DisabledAudio, &topic, &mut report.document.episodes).await;
    let path = store.save_schedule(&report.document)?;

    log::info!("Prepared {} episode(s) at {}", report.document.episode_count, path.display());
    log::info!(
        "Token usage: prompt {} | completion {} | total {}",
        report.usage.prompt_tokens,
        report.usage.completion_tokens,
        report.usage.total_tokens
    );

    Ok(())
}

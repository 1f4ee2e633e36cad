//! End-to-end runs of the scheduling pipeline against stub script generators.

use async_trait::async_trait;
use coursecast::core::config::PipelineConfig;
use coursecast::core::pipeline::Pipeline;
use coursecast::core::script::{
    Difficulty, EpisodeScript, ScriptError, ScriptGenerator, ScriptOutcome, ScriptRequest,
    TokenUsage,
};
use coursecast::core::store::TopicStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

// ── Stub generators ───────────────────────────────────────────────────────

#[derive(Default)]
struct Unreachable {
    calls: AtomicUsize,
}

#[async_trait]
impl ScriptGenerator for Unreachable {
    async fn generate(&self, _request: &ScriptRequest) -> Result<ScriptOutcome, ScriptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ScriptError::Transport("connection refused".to_string()))
    }
}

#[derive(Default)]
struct Scripted {
    requests: Mutex<Vec<ScriptRequest>>,
}

#[async_trait]
impl ScriptGenerator for Scripted {
    async fn generate(&self, request: &ScriptRequest) -> Result<ScriptOutcome, ScriptError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(ScriptOutcome {
            script: EpisodeScript {
                title: format!("Lesson {}", request.episode_number),
                script: format!("Narration for {} sources.", request.sources.len()),
                quiz: vec!["Q1?".to_string(), "Q2?".to_string(), "Q3?".to_string()],
            },
            usage: TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            },
        })
    }
}

struct Rambling;

#[async_trait]
impl ScriptGenerator for Rambling {
    async fn generate(&self, _request: &ScriptRequest) -> Result<ScriptOutcome, ScriptError> {
        Err(ScriptError::Malformed {
            reason: "expected value at line 1 column 1".to_string(),
            raw_text: "Welcome back, listeners.".to_string(),
            usage: TokenUsage {
                prompt_tokens: 7,
                completion_tokens: 3,
                total_tokens: 10,
            },
        })
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────

fn settings() -> PipelineConfig {
    PipelineConfig {
        cooldown_secs: 0,
        content_multiplier: 1.0,
        ..PipelineConfig::default()
    }
}

fn body(words: usize) -> String {
    let mut text = (0..words).map(|i| format!("token{}", i)).collect::<Vec<_>>().join(" ");
    text.push('.');
    text
}

fn record(url: &str, declared_words: u64) -> String {
    format!(
        "URL: {}\nWord count: {}\nEstimated audio hours (@160 wpm): 0.00\nSummary:\nA short take on {}.\nFull content:\n{}",
        url,
        declared_words,
        url,
        body(60)
    )
}

fn blob(declared: &[u64]) -> String {
    declared
        .iter()
        .enumerate()
        .map(|(i, words)| record(&format!("https://site{}.example/post", i + 1), *words))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ── Scenarios ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn three_sources_fit_one_content_day() {
    let settings = settings();
    let generator = Unreachable::default();
    let pipeline = Pipeline::new(&settings, &generator);

    let report = pipeline.run("Rust", 1, &blob(&[500, 500, 4000])).await;
    let doc = &report.document;

    assert_eq!(doc.requested_day_count, 1);
    assert_eq!(doc.content_day_count, 1);
    assert_eq!(doc.episode_count, 1);
    assert_eq!(doc.total_estimated_minutes, 31.25);

    let episode = &doc.episodes[0];
    assert_eq!(episode.episode_number, 1);
    assert_eq!(episode.difficulty, Difficulty::Advanced);
    assert_eq!(episode.duration_minutes, 31.25);
    assert_eq!(episode.day_label, "Content Day 1 of 1 (suggested release day 1 of 1)");
    let minutes: Vec<f64> = episode.sources.iter().map(|s| s.estimated_minutes).collect();
    assert_eq!(minutes, vec![3.13, 3.13, 25.0]);
    assert_eq!(episode.sources[2].word_count, 4000);

    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.fallback_episodes, 1);
    assert_eq!(report.usage, TokenUsage::default());
}

#[tokio::test]
async fn fallback_quiz_is_padded_to_fixed_length() {
    let settings = settings();
    let generator = Unreachable::default();
    let pipeline = Pipeline::new(&settings, &generator);

    let report = pipeline.run("Rust", 1, &blob(&[800])).await;
    let episode = &report.document.episodes[0];

    assert_eq!(episode.title, "Rust Episode 1");
    assert_eq!(
        episode.quiz,
        vec![
            "What was the key takeaway from https://site1.example/post?",
            "Summarize one insight from Episode 1.",
            "Summarize one insight from Episode 1.",
        ]
    );
    assert!(episode.script.contains("welcome to Day 1 of our Rust journey"));
    assert!(episode.script.ends_with("A short take on https://site1.example/post."));

    let again = pipeline.run("Rust", 1, &blob(&[800])).await;
    assert_eq!(again.document.episodes, report.document.episodes);
}

#[tokio::test]
async fn generated_scripts_accumulate_usage() {
    let settings = settings();
    let generator = Scripted::default();
    let pipeline = Pipeline::new(&settings, &generator);

    let report = pipeline.run("Rust", 3, &blob(&[4000; 6])).await;
    let doc = &report.document;

    assert_eq!(doc.episode_count, 6);
    assert_eq!(report.fallback_episodes, 0);
    assert_eq!(
        report.usage,
        TokenUsage {
            prompt_tokens: 600,
            completion_tokens: 300,
            total_tokens: 900
        }
    );

    let numbers: Vec<usize> = doc.episodes.iter().map(|e| e.episode_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(doc.episodes[0].title, "Lesson 1");
    assert_eq!(doc.episodes[0].difficulty, Difficulty::Introductory);
    assert_eq!(doc.episodes[5].difficulty, Difficulty::Advanced);
    assert_eq!(
        doc.episodes[5].day_label,
        "Content Day 6 of 3 (suggested release day 3 of 3)"
    );

    let requests = generator.requests.lock().unwrap();
    assert_eq!(requests.len(), 6);
    assert_eq!(requests[0].total_days, 3);
    assert_eq!(requests[0].quiz_length, 3);
    assert_eq!(requests[0].sources[0].label, "Source 1");
    assert_eq!(requests[0].sources[0].url, "https://site1.example/post");
    assert_eq!(requests[0].target_minutes, 25.0);
}

#[tokio::test]
async fn malformed_response_keeps_its_text_and_usage() {
    let settings = settings();
    let pipeline = Pipeline::new(&settings, &Rambling);

    let report = pipeline.run("Rust", 1, &blob(&[800])).await;

    assert_eq!(report.fallback_episodes, 1);
    assert_eq!(report.usage.total_tokens, 10);
    let episode = &report.document.episodes[0];
    assert!(episode.script.ends_with("Welcome back, listeners."));
    assert_eq!(episode.quiz.len(), 3);
}

#[tokio::test]
async fn mock_mode_never_calls_the_generator() {
    let settings = PipelineConfig {
        mock_mode: true,
        cooldown_secs: 60,
        ..PipelineConfig::default()
    };
    let generator = Unreachable::default();
    let pipeline = Pipeline::new(&settings, &generator);

    let report = pipeline.run("Rust", 2, &blob(&[4000; 3])).await;

    assert_eq!(report.document.episode_count, 3);
    assert_eq!(report.fallback_episodes, 3);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn cooldown_waits_only_between_calls() {
    let settings = PipelineConfig {
        cooldown_secs: 20,
        ..settings()
    };
    let generator = Scripted::default();
    let pipeline = Pipeline::new(&settings, &generator);

    let started = Instant::now();
    let report = pipeline.run("Rust", 3, &blob(&[4000; 6])).await;

    assert_eq!(report.document.episode_count, 6);
    assert_eq!(started.elapsed(), Duration::from_secs(5 * 20));
}

#[tokio::test(start_paused = true)]
async fn mock_mode_skips_the_cooldown() {
    let settings = PipelineConfig {
        mock_mode: true,
        cooldown_secs: 60,
        ..PipelineConfig::default()
    };
    let generator = Unreachable::default();
    let pipeline = Pipeline::new(&settings, &generator);

    let started = Instant::now();
    let report = pipeline.run("Rust", 2, &blob(&[4000; 3])).await;

    assert_eq!(report.document.episode_count, 3);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn unusable_input_yields_empty_schedule() {
    let settings = settings();
    let generator = Unreachable::default();
    let pipeline = Pipeline::new(&settings, &generator);

    let input = "URL: https://down.example\nError: 503\n\nURL: https://thin.example\nFull content:\nToo short to narrate.";
    let report = pipeline.run("Rust", 4, input).await;

    assert!(report.is_empty());
    assert_eq!(report.document.episode_count, 0);
    assert_eq!(report.document.total_estimated_minutes, 0.0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn schedule_round_trips_through_the_store() {
    let settings = settings();
    let generator = Unreachable::default();
    let pipeline = Pipeline::new(&settings, &generator);
    let report = pipeline.run("Rust Basics", 2, &blob(&[1000, 2000, 3000])).await;

    let dir = tempfile::tempdir().unwrap();
    let store = TopicStore::new(dir.path());
    let path = store.save_schedule(&report.document).unwrap();
    assert!(path.ends_with("rust-basics/tts_ready.json"));

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["requested_day_count"], 2);
    assert_eq!(json["content_multiplier"], 1.0);
    assert_eq!(json["episode_count"], 2);
    assert_eq!(json["episodes"][0]["difficulty"], "intermediate");
    assert!(json["episodes"][0].get("audio_reference").is_none());

    let loaded = store.load_schedule("Rust Basics").unwrap().unwrap();
    assert_eq!(loaded, report.document);
}

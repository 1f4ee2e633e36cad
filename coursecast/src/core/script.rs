use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Introductory,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Tier from position in the schedule: first third, second third, rest.
    pub fn for_episode(episode_number: usize, total_episodes: usize) -> Self {
        let progress = episode_number as f64 / total_episodes.max(1) as f64;
        if progress <= 0.33 {
            Difficulty::Introductory
        } else if progress <= 0.66 {
            Difficulty::Intermediate
        } else {
            Difficulty::Advanced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Introductory => "introductory",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceBrief {
    pub label: String,
    pub url: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptRequest {
    pub topic: String,
    pub episode_number: usize,
    pub difficulty: Difficulty,
    pub total_days: u32,
    pub target_minutes: f64,
    pub quiz_length: usize,
    pub sources: Vec<SourceBrief>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeScript {
    #[serde(default)]
    pub title: String,
    pub script: String,
    #[serde(default)]
    pub quiz: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOutcome {
    pub script: EpisodeScript,
    pub usage: TokenUsage,
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("missing credential: set {0}")]
    MissingCredential(String),
    #[error("script generation request failed: {0}")]
    Transport(String),
    #[error("script generation API error {status}: {body}")]
    Api { status: u16, body: String },
    /// The call completed but its text was not a usable script.
    #[error("malformed script response: {reason}")]
    Malformed {
        reason: String,
        raw_text: String,
        usage: TokenUsage,
    },
}

impl ScriptError {
    /// Completion text worth narrating even though it did not parse.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            ScriptError::Malformed { raw_text, .. } if !raw_text.trim().is_empty() => Some(raw_text.as_str()),
            _ => None,
        }
    }

    pub fn usage(&self) -> TokenUsage {
        match self {
            ScriptError::Malformed { usage, .. } => *usage,
            _ => TokenUsage::default(),
        }
    }
}

/// The external collaborator that writes an episode's narration and quiz.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate(&self, request: &ScriptRequest) -> Result<ScriptOutcome, ScriptError>;
}

pub fn render_sources(sources: &[SourceBrief]) -> String {
    sources
        .iter()
        .map(|source| {
            let insights = if source.summary.is_empty() {
                "Content available in full text."
            } else {
                source.summary.as_str()
            };
            format!("[{}] URL: {}\nKey insights: {}", source.label, source.url, insights)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(request: &ScriptRequest, words_per_minute: f64) -> String {
    let target_words = ((request.target_minutes * words_per_minute) as u64).max(400);
    let n = request.quiz_length;
    let quiz_example = (1..=n)
        .map(|i| format!("\"Question {}\"", i))
        .collect::<Vec<_>>()
        .join(", ");

    [
        format!(
            "You are crafting Episode {} of a {}-day audio-first course on '{}'. \
             This session should feel {} and introduce slightly more challenge than prior days.",
            request.episode_number,
            request.total_days.max(1),
            request.topic,
            request.difficulty
        ),
        format!(
            "Write in a warm, conversational, single-speaker tone at normal speaking speed \
             (~{:.0} wpm). Sound like a friendly lecturer talking directly to the listener.",
            words_per_minute
        ),
        format!(
            "Target length: about {:.1} minutes (~{} words).",
            request.target_minutes, target_words
        ),
        "Structure:".to_string(),
        "1. A compelling title.".to_string(),
        "2. A narration script that weaves the provided sources into progressively deeper insights.".to_string(),
        "3. Show how today's content builds on previous episodes and sets up the next.".to_string(),
        "4. Close with a quick recap and transition to the quiz.".to_string(),
        format!(
            "5. Ask exactly {} reflective quiz questions; the listener self-reflects (no dialogue).",
            n
        ),
        "Reference sources inline as [Source n] using the numbers provided.".to_string(),
        String::new(),
        "## SOURCES".to_string(),
        render_sources(&request.sources),
        String::new(),
        "## OUTPUT FORMAT".to_string(),
        format!(
            "{{\"title\": \"...\", \"script\": \"Long-form narration text...\", \"quiz\": [{}]}}",
            quiz_example
        ),
        "Return JSON only.".to_string(),
    ]
    .join("\n")
}

/// Extracts the JSON object from a completion and normalizes the quiz to
/// `quiz_length` entries.
pub fn parse_script_response(
    raw: &str,
    quiz_length: usize,
    episode_number: usize,
) -> Result<EpisodeScript, String> {
    let mut text = raw.trim();
    if let Some(idx) = text.find("</think>") {
        text = text[idx + "</think>".len()..].trim();
    }
    let start = text.find('{').ok_or("no JSON object in response")?;
    let end = text.rfind('}').ok_or("unterminated JSON object")?;
    if end < start {
        return Err("unterminated JSON object".to_string());
    }

    let mut script: EpisodeScript =
        serde_json::from_str(&text[start..=end]).map_err(|e| e.to_string())?;
    if script.script.trim().is_empty() {
        return Err("empty script".to_string());
    }

    script.quiz.retain(|q| !q.trim().is_empty());
    script.quiz.truncate(quiz_length);
    pad_quiz(&mut script.quiz, quiz_length, episode_number);
    Ok(script)
}

pub fn pad_quiz(quiz: &mut Vec<String>, quiz_length: usize, episode_number: usize) {
    while quiz.len() < quiz_length {
        quiz.push(format!("Summarize one insight from Episode {}.", episode_number));
    }
}

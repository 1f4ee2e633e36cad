use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use crate::core::config::LlmConfig;
use crate::core::script::{
    build_prompt, parse_script_response, ScriptError, ScriptGenerator, ScriptOutcome,
    ScriptRequest, TokenUsage,
};

/// OpenAI-compatible chat-completions client used as the script generator.
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
    words_per_minute: f64,
}

/// Text and accounting of one completion.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

impl LlmClient {
    pub fn new(config: LlmConfig, words_per_minute: f64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
            words_per_minute,
        }
    }

    fn api_key(&self) -> Result<String, ScriptError> {
        std::env::var(&self.config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ScriptError::MissingCredential(self.config.api_key_env.clone()))
    }

    pub async fn chat_json(&self, prompt: &str) -> Result<Completion, ScriptError> {
        let api_key = self.api_key()?;
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "stream": false
        });

        // api_url is the base, e.g. "https://api.openai.com/v1"
        let url = format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'));
        log::debug!("Sending LLM request to {} ({} prompt chars)", url, prompt.len());

        let res = match self.client.post(&url).bearer_auth(api_key).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Failed to reach LLM at {}: {}", url, e);
                return Err(ScriptError::Transport(e.to_string()));
            }
        };

        if !res.status().is_success() {
            let status = res.status();
            let error_text = res.text().await.unwrap_or_default();
            log::error!("LLM Error {}: {}", status, error_text);
            return Err(ScriptError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| ScriptError::Transport(e.to_string()))?;

        let usage = serde_json::from_value::<TokenUsage>(response_json["usage"].clone())
            .unwrap_or_default();

        // OpenAI format: choices[0].message.content
        match response_json["choices"][0]["message"]["content"].as_str() {
            Some(content) => Ok(Completion {
                content: content.trim().to_string(),
                usage,
            }),
            None => {
                log::warn!("Unexpected LLM response format: {}", response_json);
                Err(ScriptError::Malformed {
                    reason: "response has no message content".to_string(),
                    raw_text: String::new(),
                    usage,
                })
            }
        }
    }
}

#[async_trait]
impl ScriptGenerator for LlmClient {
    async fn generate(&self, request: &ScriptRequest) -> Result<ScriptOutcome, ScriptError> {
        log::info!("Generating script for episode {}", request.episode_number);
        let prompt = build_prompt(request, self.words_per_minute);
        let completion = self.chat_json(&prompt).await?;

        match parse_script_response(&completion.content, request.quiz_length, request.episode_number) {
            Ok(script) => Ok(ScriptOutcome {
                script,
                usage: completion.usage,
            }),
            Err(reason) => Err(ScriptError::Malformed {
                reason,
                raw_text: completion.content,
                usage: completion.usage,
            }),
        }
    }
}

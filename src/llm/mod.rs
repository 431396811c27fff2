// src/llm/mod.rs
//! Gemini client and the `LanguageModel` seam every service talks through.
//!
//! Services never call the model API directly: they hold an
//! `Option<Arc<dyn LanguageModel>>`, and `None` means the deterministic
//! fallback path is the only path available.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model response contained no JSON object")]
    MissingJson,

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier reported in logs.
    fn model_id(&self) -> &str;

    /// Sends the prompt parts as a single user turn and returns the text reply.
    async fn generate(&self, parts: &[String]) -> Result<String, LlmError>;
}

/// Calls the model and decodes the JSON object embedded in its reply.
pub async fn generate_json<T: DeserializeOwned>(
    model: &dyn LanguageModel,
    parts: &[String],
) -> Result<T, LlmError> {
    let text = model.generate(parts).await?;
    let json = extract_json_object(&text).ok_or(LlmError::MissingJson)?;
    serde_json::from_str(json).map_err(LlmError::Parse)
}

/// Returns the slice from the first `{` to the last `}`, which tolerates code
/// fences and chatter around the payload.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, timeout: Duration) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        info!("Gemini available: using model {}", config.model);

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, parts: &[String]) -> Result<String, LlmError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: parts
                    .iter()
                    .map(|text| RequestPart { text: text.as_str() })
                    .collect(),
            }],
        };

        debug!("Calling Gemini model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Gemini API returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;
        let text = payload.text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted model used by service tests.

    use super::*;
    use std::sync::Mutex;

    pub struct ScriptedModel {
        replies: Mutex<Vec<Result<String, String>>>,
        pub prompts: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedModel {
        pub fn replying(reply: &str) -> Self {
            Self::with_replies(vec![Ok(reply.to_string())])
        }

        pub fn failing(message: &str) -> Self {
            Self::with_replies(vec![Err(message.to_string())])
        }

        pub fn with_replies(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn model_id(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, parts: &[String]) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(parts.to_vec());
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.len() > 1 {
                replies.remove(0)
            } else {
                replies
                    .first()
                    .cloned()
                    .unwrap_or_else(|| Err("no scripted reply".to_string()))
            };
            reply.map_err(|message| LlmError::Api {
                status: 503,
                message,
            })
        }
    }
}

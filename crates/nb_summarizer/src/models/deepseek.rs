use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nb_core::config::SummarizerConfig;
use nb_core::{Enrichment, Error, Result, Summarizer};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use super::truncate_chars;

const SYSTEM_PROMPT: &str = "你是一名专业的科技新闻编辑，负责把英文 AI 新闻翻译并总结成简体中文。输出必须是 JSON，格式为 {\"zh_title\": \"...\", \"summary\": \"...\"}。zh_title 是标题的中文翻译；summary 是不超过100个汉字的中文总结。不得添加多余文字。";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

/// Chat-completions client speaking the DeepSeek (OpenAI compatible) API.
pub struct DeepSeekModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_input_chars: usize,
}

impl DeepSeekModel {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("DeepSeek API key is required".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_input_chars: config.max_input_chars.max(1),
        })
    }

    fn build_input(&self, title: &str, content: Option<&str>) -> String {
        match content {
            Some(body) => format!(
                "Title: {}\n\nContent: {}",
                title,
                truncate_chars(body, self.max_input_chars)
            ),
            None => format!("Title: {}\n\nContent: (none, summarize from the title)", title),
        }
    }
}

impl fmt::Debug for DeepSeekModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSeekModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl Summarizer for DeepSeekModel {
    fn name(&self) -> &str {
        "DeepSeek"
    }

    async fn summarize(&self, title: &str, content: Option<&str>) -> Result<Enrichment> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: self.build_input(title, content),
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Vendor(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Vendor(format!(
                "non-success status {}: {}",
                status, text
            )));
        }

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Vendor(format!("failed to decode response: {}", e)))?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Vendor("response missing message content".to_string()))?;

        tracing::debug!(title, "received enrichment");
        parse_enrichment(&content)
    }
}

pub(crate) fn parse_enrichment(content: &str) -> Result<Enrichment> {
    #[derive(Deserialize)]
    struct EnrichmentPayload {
        zh_title: String,
        summary: String,
    }

    let cleaned = content.trim();
    let json_str = cleaned
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let payload: EnrichmentPayload = serde_json::from_str(json_str)
        .or_else(|_| serde_json::from_str(cleaned))
        .map_err(|e| Error::Vendor(format!("malformed enrichment {:?}: {}", content, e)))?;

    let zh_title = payload.zh_title.trim();
    let summary = payload.summary.trim();
    if zh_title.is_empty() || summary.is_empty() {
        return Err(Error::Vendor("enrichment has an empty field".to_string()));
    }

    Ok(Enrichment {
        zh_title: zh_title.to_string(),
        summary: summary.to_string(),
    })
}

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use nb_core::config::{PushConfig, WebhookConfig};
use nb_core::{Digest, Error, PushSink, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use crate::card::render_card;

type HmacSha256 = Hmac<Sha256>;

/// Feishu custom-bot signature: HMAC-SHA256 keyed by `"{timestamp}\n{secret}"` over an
/// empty message, base64 encoded.
pub fn gen_sign(timestamp: i64, secret: &str) -> Result<String> {
    let string_to_sign = format!("{}\n{}", timestamp, secret);
    let mac = HmacSha256::new_from_slice(string_to_sign.as_bytes())
        .map_err(|e| Error::Push(format!("failed to init signer: {}", e)))?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Deserialize)]
struct WebhookReply {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default, rename = "StatusCode")]
    status_code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
}

fn check_reply(body: &str) -> std::result::Result<(), String> {
    let reply: WebhookReply = match serde_json::from_str(body) {
        Ok(reply) => reply,
        // Some gateways answer 200 with an empty body.
        Err(_) if body.trim().is_empty() => return Ok(()),
        Err(e) => return Err(format!("unreadable reply {:?}: {}", body, e)),
    };
    match reply.code.or(reply.status_code) {
        Some(0) | None => Ok(()),
        Some(code) => Err(format!(
            "code {}: {}",
            code,
            reply.msg.unwrap_or_default()
        )),
    }
}

pub struct FeishuSink {
    client: Client,
    webhooks: Vec<WebhookConfig>,
}

impl fmt::Debug for FeishuSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeishuSink")
            .field("webhooks", &self.webhooks)
            .finish()
    }
}

impl FeishuSink {
    pub fn new(config: &PushConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.unwrap_or(10).max(1)))
            .build()?;
        Ok(Self {
            client,
            webhooks: config.webhooks.clone(),
        })
    }

    fn payload(card: &Value, secret: Option<&str>, timestamp: i64) -> Result<Value> {
        let mut body = card.clone();
        if let (Some(secret), Some(map)) = (secret, body.as_object_mut()) {
            map.insert("timestamp".to_string(), Value::String(timestamp.to_string()));
            map.insert("sign".to_string(), Value::String(gen_sign(timestamp, secret)?));
        }
        Ok(body)
    }

    async fn send_to(&self, hook: &WebhookConfig, card: &Value) -> std::result::Result<(), String> {
        let timestamp = chrono::Utc::now().timestamp();
        let secret = hook.secret.as_deref().filter(|s| !s.is_empty());
        let body = Self::payload(card, secret, timestamp).map_err(|e| e.to_string())?;

        let response = self
            .client
            .post(&hook.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(format!("status {}: {}", status, text));
        }
        check_reply(&text)
    }
}

#[async_trait]
impl PushSink for FeishuSink {
    fn name(&self) -> &str {
        "feishu"
    }

    async fn push(&self, digest: &Digest) -> Result<()> {
        let card = render_card(digest);
        let mut failed = Vec::new();

        for hook in &self.webhooks {
            match self.send_to(hook, &card).await {
                Ok(()) => tracing::info!(group = %hook.name, items = digest.total(), "card delivered"),
                Err(reason) => {
                    tracing::error!(group = %hook.name, %reason, "card delivery failed");
                    failed.push(format!("{} ({})", hook.name, reason));
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::Push(format!(
                "{}/{} webhook groups failed: {}",
                failed.len(),
                self.webhooks.len(),
                failed.join(", ")
            )))
        }
    }
}

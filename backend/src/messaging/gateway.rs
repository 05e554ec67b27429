//! Outbound message delivery.
//!
//! The WhatsApp session itself (device pairing, browser automation) runs in a
//! separate bridge process. This side only needs to push text and request a
//! logout; the bridge reports state changes back as events.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::WhatsAppConfig;

#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Deliver `text` to a chat address such as `919876543210@c.us`
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()>;

    /// End the linked-device session on the bridge
    async fn logout(&self) -> Result<()>;
}

#[derive(Serialize)]
struct SendTextBody<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Gateway speaking JSON over HTTP to the WhatsApp bridge
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &WhatsAppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MessageGateway for HttpGateway {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/messages", self.base_url);
        debug!("POST {} chat_id={}", url, chat_id);

        let response = self
            .client
            .post(&url)
            .json(&SendTextBody { chat_id, text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("WhatsApp bridge timed out sending to {}", chat_id);
                } else if e.is_connect() {
                    error!("Failed to connect to WhatsApp bridge at {}: {}", self.base_url, e);
                }
                anyhow::Error::new(e).context("Failed to reach WhatsApp bridge")
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("WhatsApp bridge rejected message ({}): {}", status, body);
        }
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let url = format!("{}/logout", self.base_url);
        debug!("POST {}", url);

        self.client
            .post(&url)
            .send()
            .await
            .context("Failed to reach WhatsApp bridge")?
            .error_for_status()
            .context("WhatsApp bridge refused logout")?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every message instead of sending it. Chats containing
    /// `fail_on` are rejected.
    #[derive(Default)]
    pub struct RecordingGateway {
        pub sent: Mutex<Vec<(String, String)>>,
        pub logouts: Mutex<u32>,
        pub fail_on: Option<String>,
        pub fail_logout: bool,
    }

    impl RecordingGateway {
        pub fn failing_for(fragment: &str) -> Self {
            Self {
                fail_on: Some(fragment.to_string()),
                ..Default::default()
            }
        }

        pub fn messages(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageGateway for RecordingGateway {
        async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
            if let Some(fragment) = &self.fail_on {
                if chat_id.contains(fragment.as_str()) {
                    anyhow::bail!("delivery to {} failed", chat_id);
                }
            }
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn logout(&self) -> Result<()> {
            *self.logouts.lock().unwrap() += 1;
            if self.fail_logout {
                anyhow::bail!("bridge unavailable");
            }
            Ok(())
        }
    }
}

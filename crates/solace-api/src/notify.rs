// Outbound processing-event notification
//
// Best-effort webhook delivery of pipeline events to an external
// analytics/automation endpoint. The pipeline fires these without waiting;
// failures are logged there and never abort message processing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use solace_core::{ChatError, EventNotifier, MessageProcessedEvent, Result};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts events as JSON to a configured webhook URL
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    fn payload(event: &MessageProcessedEvent) -> serde_json::Value {
        serde_json::json!({
            "name": MessageProcessedEvent::NAME,
            "data": event.to_json(),
        })
    }
}

#[async_trait]
impl EventNotifier for WebhookNotifier {
    async fn notify(&self, event: MessageProcessedEvent) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .timeout(WEBHOOK_TIMEOUT)
            .json(&Self::payload(&event))
            .send()
            .await
            .map_err(|e| ChatError::notify(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::notify(format!("webhook returned {status}")));
        }

        Ok(())
    }
}

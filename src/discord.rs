use webhook::{client::WebhookClient, models::Message};

use crate::consent_event::ConsentEvent;

struct ConsentNotification<'a> {
    event: &'a ConsentEvent,
}

impl ConsentNotification<'_> {
    fn content(&self) -> String {
        let event = self.event;
        format!(
            "New consent recorded\nIP: {}\nForwarded: {}\nUA: {}\nTime: {}",
            non_empty_or_na(event.stored_ip.as_deref()),
            non_empty_or_na(event.forwarded_chain.as_deref()),
            event.user_agent,
            event.timestamp,
        )
    }
}

fn non_empty_or_na(value: Option<&str>) -> &str {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => "N/A",
    }
}

impl From<ConsentNotification<'_>> for Message {
    fn from(val: ConsentNotification<'_>) -> Self {
        Message {
            content: Some(val.content()),
            username: None,
            avatar_url: None,
            tts: false,
            embeds: vec![],
            allow_mentions: None,
            action_rows: vec![],
        }
    }
}

/// Posts the consent to the Discord webhook if one is configured. Failures are only logged.
pub async fn send_consent_webhook(webhook_url: Option<&str>, event: &ConsentEvent) {
    let webhook_url = match webhook_url {
        Some(url) => url,
        None => {
            tracing::debug!("No Discord webhook URL found, skipping");
            return;
        }
    };

    let client: WebhookClient = WebhookClient::new(webhook_url);
    let message: Message = ConsentNotification { event }.into();
    match client.send_message(&message).await {
        Ok(_) => {
            tracing::debug!("Successfully sent Discord webhook");
        }
        Err(e) => {
            tracing::error!("Discord webhook error: {}", e);
        }
    }
}

use async_trait::async_trait;
use serde::Deserialize;

use super::{DeliveryReceipt, NotifyError, PhoneNumber, SmsGateway};
use crate::config::TwilioConfig;

/// Sends SMS through the Twilio Programmable Messaging REST API.
#[derive(Clone)]
pub struct TwilioGateway {
    client: reqwest::Client,
    config: TwilioConfig,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResource {
    code: Option<i64>,
    message: Option<String>,
    more_info: Option<String>,
}

impl TwilioGateway {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsGateway for TwilioGateway {
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<DeliveryReceipt, NotifyError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to.as_str()),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorResource>(&text) {
                Ok(err) => format!(
                    "code {} - {} ({})",
                    err.code.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string()),
                    err.message.unwrap_or_default(),
                    err.more_info.unwrap_or_default()
                ),
                Err(_) => text,
            };
            tracing::warn!(to = %to, status = status.as_u16(), %detail, "twilio rejected sms");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let message: MessageResource = response.json().await?;
        Ok(DeliveryReceipt {
            sid: message.sid,
            status: message.status,
        })
    }
}

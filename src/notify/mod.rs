//! Outbound SMS.
//!
//! [`Notifier`] is what callers hold: it normalizes the destination number and
//! hands the message to an [`SmsGateway`]. Its result may be discarded; the
//! agreement paths only log it.

pub mod twilio;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use twilio::TwilioGateway;

/// Calling code prefixed to bare ten-digit numbers.
const COUNTRY_CODE: &str = "91";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid phone number {0:?}")]
    InvalidNumber(String),

    #[error("sms transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("sms provider rejected the message (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },
}

/// A phone number in `+<country><subscriber>` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Strip everything but digits; accept ten digits (country code added)
    /// or twelve digits already starting with the country code.
    pub fn normalize(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        match digits.len() {
            10 => Some(Self(format!("+{COUNTRY_CODE}{digits}"))),
            12 if digits.starts_with(COUNTRY_CODE) => Some(Self(format!("+{digits}"))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the provider reports for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub sid: String,
    pub status: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<DeliveryReceipt, NotifyError>;
}

/// Gateway used when no provider is configured: the message is only logged.
#[derive(Debug, Clone, Default)]
pub struct LogGateway;

#[async_trait]
impl SmsGateway for LogGateway {
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<DeliveryReceipt, NotifyError> {
        tracing::info!(to = %to, body, "sms gateway not configured; message logged only");
        Ok(DeliveryReceipt {
            sid: format!("logged-{}", uuid::Uuid::new_v4()),
            status: Some("logged".to_string()),
        })
    }
}

#[derive(Clone)]
pub struct Notifier {
    gateway: Arc<dyn SmsGateway>,
}

impl Notifier {
    pub fn new(gateway: Arc<dyn SmsGateway>) -> Self {
        Self { gateway }
    }

    /// Send `body` to `raw_number`. Malformed numbers fail without contacting
    /// the gateway.
    pub async fn notify(&self, raw_number: &str, body: &str) -> Result<DeliveryReceipt, NotifyError> {
        let to = PhoneNumber::normalize(raw_number)
            .ok_or_else(|| NotifyError::InvalidNumber(raw_number.to_string()))?;

        let receipt = self.gateway.send(&to, body).await?;
        tracing::debug!(to = %to, sid = %receipt.sid, "sms accepted by gateway");
        Ok(receipt)
    }
}

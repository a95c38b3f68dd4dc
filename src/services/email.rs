//! Client for the email sending service.

use async_trait::async_trait;
use serde::Deserialize;

use super::common::{ensure_success, with_api_key};
use super::{EmailReceipt, EmailSender, SendEmailRequest, ServiceError};

const SERVICE: &str = "email service";

#[derive(Debug, Deserialize)]
struct EmailApiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "messageId")]
    message_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "hasAttachment")]
    has_attachment: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpEmailSender {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpEmailSender {
    pub fn new(client: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, request: &SendEmailRequest) -> Result<EmailReceipt, ServiceError> {
        log::info!(
            "Sending '{}' to {} with attachment {}",
            request.subject,
            request.to,
            request.pdf_filename
        );

        let response = with_api_key(self.client.post(&self.url), self.api_key.as_deref())
            .json(request)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                service: SERVICE,
                source,
            })?;
        let response = ensure_success(SERVICE, response).await?;

        let text = response
            .text()
            .await
            .map_err(|source| ServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        let receipt = parse_receipt(&text)?;
        if !receipt.has_attachment {
            log::warn!("Email to {} was sent without the PDF attachment", request.to);
        }
        Ok(receipt)
    }
}

fn parse_receipt(text: &str) -> Result<EmailReceipt, ServiceError> {
    if text.trim().is_empty() {
        return Err(ServiceError::EmptyBody { service: SERVICE });
    }

    let parsed: EmailApiResponse =
        serde_json::from_str(text).map_err(|e| ServiceError::InvalidResponse {
            service: SERVICE,
            reason: e.to_string(),
        })?;

    if !parsed.success {
        return Err(ServiceError::Rejected {
            service: SERVICE,
            message: parsed
                .error
                .unwrap_or_else(|| "success flag was not set".to_string()),
        });
    }

    Ok(EmailReceipt {
        message_id: parsed.message_id,
        message: parsed.message,
        has_attachment: parsed.has_attachment,
    })
}

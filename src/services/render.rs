//! Client for the PDF rendering service.

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::Deserialize;

use super::common::{
    decode_pdf, ensure_success, fallback_pdf_filename, filename_from_content_disposition,
    with_api_key,
};
use super::{InvoiceRenderer, RenderInvoiceRequest, RenderedInvoice, ServiceError};

const SERVICE: &str = "render service";

/// API Gateway proxy envelope, returned when the function is called through
/// a pass-through integration instead of a binary-aware one.
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    #[serde(default, rename = "isBase64Encoded")]
    is_base64_encoded: bool,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    headers: std::collections::HashMap<String, String>,
}

pub struct HttpInvoiceRenderer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpInvoiceRenderer {
    pub fn new(client: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl InvoiceRenderer for HttpInvoiceRenderer {
    async fn render(&self, request: &RenderInvoiceRequest) -> Result<RenderedInvoice, ServiceError> {
        log::info!(
            "Rendering invoice {} due {} ({} items)",
            request.invoice_number,
            request.due_date,
            request.items.len()
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

        let header_filename = header_value(&response, CONTENT_DISPOSITION)
            .and_then(|value| filename_from_content_disposition(&value));
        let is_json = header_value(&response, CONTENT_TYPE)
            .map(|value| value.starts_with("application/json"))
            .unwrap_or(false);

        let text = response
            .text()
            .await
            .map_err(|source| ServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        let (encoded, envelope_filename) = if is_json {
            unwrap_envelope(&text)?
        } else {
            (text, None)
        };

        let (pdf_base64, pdf) = decode_pdf(SERVICE, &encoded)?;
        let filename = header_filename
            .or(envelope_filename)
            .unwrap_or_else(|| fallback_pdf_filename(&request.due_date));

        log::info!("Rendered {} ({} bytes)", filename, pdf.len());

        Ok(RenderedInvoice {
            filename,
            pdf_base64,
            pdf,
        })
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn unwrap_envelope(text: &str) -> Result<(String, Option<String>), ServiceError> {
    let envelope: ProxyEnvelope =
        serde_json::from_str(text).map_err(|e| ServiceError::InvalidResponse {
            service: SERVICE,
            reason: e.to_string(),
        })?;

    if !envelope.is_base64_encoded {
        return Err(ServiceError::InvalidResponse {
            service: SERVICE,
            reason: "response body is not base64 encoded".to_string(),
        });
    }

    let filename = envelope
        .headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-disposition"))
        .and_then(|(_, value)| filename_from_content_disposition(value));

    match envelope.body {
        Some(body) if !body.trim().is_empty() => Ok((body, filename)),
        _ => Err(ServiceError::EmptyBody { service: SERVICE }),
    }
}

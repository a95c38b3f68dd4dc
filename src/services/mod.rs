//! Remote services the form talks to.
//!
//! - `render` - turns invoice data into a PDF (returned base64-encoded)
//! - `email` - mails a subject, body and PDF attachment to a recipient
//!
//! Both sit behind object-safe async traits so handlers can be exercised
//! against in-memory doubles.

pub mod common;
pub mod email;
pub mod render;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::invoice::model::LineItem;

pub use email::HttpEmailSender;
pub use render::HttpInvoiceRenderer;

/// Errors from calling the render or email service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} responded with status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service} returned an empty body")]
    EmptyBody { service: &'static str },
    #[error("{service} returned a PDF that is not valid base64: {source}")]
    InvalidPdf {
        service: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error("{service} returned an unreadable response: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },
    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },
}

/// Payload for the PDF rendering service. Dates are in long form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct RenderInvoiceRequest {
    pub date: String,
    pub due_date: String,
    pub invoice_number: String,
    pub items: Vec<LineItem>,
    pub gst_amount: f64,
    pub property_line1: String,
    pub property_line2: String,
}

/// A rendered invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedInvoice {
    pub filename: String,
    /// Base64 text exactly as the email service expects it.
    pub pdf_base64: String,
    pub pdf: Vec<u8>,
}

/// Payload for the email service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub email_body: String,
    pub pdf_data: String,
    pub pdf_filename: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct EmailReceipt {
    pub message_id: Option<String>,
    pub message: Option<String>,
    pub has_attachment: bool,
}

#[async_trait]
pub trait InvoiceRenderer {
    async fn render(&self, request: &RenderInvoiceRequest) -> Result<RenderedInvoice, ServiceError>;
}

#[async_trait]
pub trait EmailSender {
    async fn send(&self, request: &SendEmailRequest) -> Result<EmailReceipt, ServiceError>;
}

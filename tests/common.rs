#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use rent_invoice_server::config::InvoiceProfile;
use rent_invoice_server::services::{
    EmailReceipt, EmailSender, InvoiceRenderer, RenderInvoiceRequest, RenderedInvoice,
    SendEmailRequest, ServiceError,
};
use rent_invoice_server::AppState;

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Renderer double that records every request it receives.
#[derive(Default)]
pub struct MockRenderer {
    pub requests: Mutex<Vec<RenderInvoiceRequest>>,
    pub fail_with_status: Option<u16>,
}

impl MockRenderer {
    pub fn failing(status: u16) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_with_status: Some(status),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait::async_trait]
impl InvoiceRenderer for MockRenderer {
    async fn render(&self, request: &RenderInvoiceRequest) -> Result<RenderedInvoice, ServiceError> {
        self.requests.lock().push(request.clone());
        if let Some(status) = self.fail_with_status {
            return Err(ServiceError::Status {
                service: "render service",
                status,
                body: "render failed".to_string(),
            });
        }
        Ok(RenderedInvoice {
            filename: "Rental_Invoice_February2026.pdf".to_string(),
            pdf_base64: "JVBERi0xLjQ=".to_string(),
            pdf: b"%PDF-1.4".to_vec(),
        })
    }
}

/// Email double that records every request it receives.
#[derive(Default)]
pub struct MockMailer {
    pub requests: Mutex<Vec<SendEmailRequest>>,
    pub reject_with: Option<String>,
}

impl MockMailer {
    pub fn rejecting(message: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reject_with: Some(message.to_string()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait::async_trait]
impl EmailSender for MockMailer {
    async fn send(&self, request: &SendEmailRequest) -> Result<EmailReceipt, ServiceError> {
        self.requests.lock().push(request.clone());
        if let Some(message) = &self.reject_with {
            return Err(ServiceError::Rejected {
                service: "email service",
                message: message.clone(),
            });
        }
        Ok(EmailReceipt {
            message_id: Some("msg-1".to_string()),
            message: Some("Email sent successfully".to_string()),
            has_attachment: true,
        })
    }
}

pub fn test_state(
    renderer: Arc<MockRenderer>,
    mailer: Arc<MockMailer>,
    default_recipient: Option<&str>,
) -> AppState {
    AppState::with_services(
        InvoiceProfile::default(),
        default_recipient.map(str::to_string),
        renderer,
        mailer,
        ymd(2026, 1, 5),
    )
}

//! Payloads sent to the render and email services, built from a draft.

use super::calendar::format_long;
use super::cascade::DraftError;
use super::content::parse_amount;
use super::model::InvoiceDraft;
use crate::config::InvoiceProfile;
use crate::services::{RenderInvoiceRequest, RenderedInvoice, SendEmailRequest};

/// The render payload. Both dates must be set; blank rows are left out.
pub fn render_request(
    draft: &InvoiceDraft,
    profile: &InvoiceProfile,
) -> Result<RenderInvoiceRequest, DraftError> {
    let context = &draft.context;
    let date = context.date.ok_or(DraftError::MissingField { field: "date" })?;
    let due_date = context
        .due_date
        .ok_or(DraftError::MissingField { field: "due_date" })?;

    Ok(RenderInvoiceRequest {
        date: format_long(date),
        due_date: format_long(due_date),
        invoice_number: context.invoice_number.clone(),
        items: context
            .line_items
            .iter()
            .filter(|item| !item.is_blank())
            .cloned()
            .collect(),
        gst_amount: parse_amount(&context.gst_amount),
        property_line1: profile.property_line1.clone(),
        property_line2: profile.property_line2.clone(),
    })
}

/// Recipient, subject and body must all be present before anything is sent.
pub fn check_email_fields(draft: &InvoiceDraft, recipient: &str) -> Result<(), DraftError> {
    if recipient.trim().is_empty() {
        return Err(DraftError::MissingField { field: "to" });
    }
    if draft.email_subject.trim().is_empty() {
        return Err(DraftError::MissingField {
            field: "email_subject",
        });
    }
    if draft.email_body.trim().is_empty() {
        return Err(DraftError::MissingField { field: "email_body" });
    }
    Ok(())
}

/// The email payload carrying the rendered PDF.
pub fn email_request(
    draft: &InvoiceDraft,
    recipient: &str,
    rendered: &RenderedInvoice,
) -> Result<SendEmailRequest, DraftError> {
    check_email_fields(draft, recipient)?;

    Ok(SendEmailRequest {
        to: recipient.trim().to_string(),
        subject: draft.email_subject.clone(),
        email_body: draft.email_body.clone(),
        pdf_data: rendered.pdf_base64.clone(),
        pdf_filename: rendered.filename.clone(),
    })
}

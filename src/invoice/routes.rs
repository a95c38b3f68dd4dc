use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::invoice::calendar::format_long;
use crate::invoice::content::{derive, format_money, InvoiceTotals};
use crate::invoice::model::{DerivedContent, FieldChange, InvoiceContext, InvoiceDraft};
use crate::invoice::outbound::{check_email_fields, email_request, render_request};
use crate::invoice::DraftError;
use crate::services::ServiceError;
use crate::state::{today, AppState};
use crate::ErrorResponse;

/// The draft together with values the form displays but never edits.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct DraftResponse {
    pub draft: InvoiceDraft,
    pub date_long: Option<String>,
    pub due_date_long: Option<String>,
    pub subtotal: String,
    pub gst: String,
    pub total: String,
}

impl From<InvoiceDraft> for DraftResponse {
    fn from(draft: InvoiceDraft) -> Self {
        let totals = InvoiceTotals::compute(&draft.context.line_items, &draft.context.gst_amount);
        Self {
            date_long: draft.context.date.map(format_long),
            due_date_long: draft.context.due_date.map(format_long),
            subtotal: format_money(totals.subtotal),
            gst: format_money(totals.gst),
            total: format_money(totals.total),
            draft,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, ToSchema)]
pub struct SendInvoiceRequest {
    /// Falls back to the configured default recipient.
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SendInvoiceResponse {
    pub to: String,
    pub pdf_filename: String,
    pub message_id: Option<String>,
    pub message: Option<String>,
    pub has_attachment: bool,
}

/// An empty body means "use the default recipient"; anything else must parse.
fn parse_send_request(body: &[u8]) -> Result<SendInvoiceRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SendInvoiceRequest::default());
    }
    serde_json::from_slice(body)
}

fn draft_error(err: DraftError) -> HttpResponse {
    log::warn!("Rejected invoice request: {}", err);
    HttpResponse::BadRequest().json(ErrorResponse::bad_request(&err.to_string()))
}

fn service_error(err: ServiceError) -> HttpResponse {
    log::error!("Invoice service call failed: {}", err);
    HttpResponse::BadGateway().json(ErrorResponse::bad_gateway(&err.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/invoice",
    tag = "Invoice",
    responses(
        (status = 200, description = "Current form state", body = DraftResponse)
    )
)]
pub async fn get_draft(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(DraftResponse::from(state.snapshot()))
}

#[utoipa::path(
    post,
    path = "/api/invoice/changes",
    tag = "Invoice",
    request_body = FieldChange,
    responses(
        (status = 200, description = "Edit applied and dependent fields recomputed", body = DraftResponse),
        (status = 400, description = "Edit refers to a row that does not exist", body = ErrorResponse)
    )
)]
pub async fn apply_change(
    state: web::Data<AppState>,
    change: web::Json<FieldChange>,
) -> impl Responder {
    let change = change.into_inner();
    log::debug!("Applying {:?}", change.field());

    match state.apply_change(change) {
        Ok(draft) => HttpResponse::Ok().json(DraftResponse::from(draft)),
        Err(e) => draft_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/invoice/reset",
    tag = "Invoice",
    responses(
        (status = 200, description = "Form reset to a fresh invoice dated today", body = DraftResponse)
    )
)]
pub async fn reset_draft(state: web::Data<AppState>) -> impl Responder {
    let draft = state.reset(today());
    log::info!(
        "Invoice form reset, due {}",
        draft
            .context
            .due_date
            .map(format_long)
            .unwrap_or_else(|| "unset".to_string())
    );
    HttpResponse::Ok().json(DraftResponse::from(draft))
}

#[utoipa::path(
    post,
    path = "/api/invoice/preview",
    tag = "Invoice",
    request_body = InvoiceContext,
    responses(
        (status = 200, description = "Derived text for the given inputs", body = DerivedContent)
    )
)]
pub async fn preview(
    state: web::Data<AppState>,
    context: web::Json<InvoiceContext>,
) -> impl Responder {
    HttpResponse::Ok().json(derive(&context, &state.profile))
}

#[utoipa::path(
    post,
    path = "/api/invoice/pdf",
    tag = "Invoice",
    responses(
        (status = 200, description = "Rendered invoice PDF", content_type = "application/pdf"),
        (status = 400, description = "Date or due date missing", body = ErrorResponse),
        (status = 502, description = "Render service failed", body = ErrorResponse)
    )
)]
pub async fn download_pdf(state: web::Data<AppState>) -> impl Responder {
    let draft = state.snapshot();
    let request = match render_request(&draft, &state.profile) {
        Ok(request) => request,
        Err(e) => return draft_error(e),
    };

    match state.renderer.render(&request).await {
        Ok(rendered) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", rendered.filename),
            ))
            .body(rendered.pdf),
        Err(e) => service_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/invoice/send",
    tag = "Invoice",
    request_body = SendInvoiceRequest,
    responses(
        (status = 200, description = "Invoice rendered and emailed", body = SendInvoiceResponse),
        (status = 400, description = "Malformed body, or missing recipient, date or email text", body = ErrorResponse),
        (status = 502, description = "Render or email service failed", body = ErrorResponse)
    )
)]
pub async fn send_invoice(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let requested = match parse_send_request(&body) {
        Ok(requested) => requested,
        Err(e) => {
            log::warn!("Rejected send request body: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
                "invalid send request: {}",
                e
            )));
        }
    };
    let recipient = requested
        .to
        .filter(|to| !to.trim().is_empty())
        .or_else(|| state.default_recipient.clone())
        .unwrap_or_default();

    let draft = state.snapshot();
    let render = match render_request(&draft, &state.profile) {
        Ok(request) => request,
        Err(e) => return draft_error(e),
    };
    if let Err(e) = check_email_fields(&draft, &recipient) {
        return draft_error(e);
    }

    let rendered = match state.renderer.render(&render).await {
        Ok(rendered) => rendered,
        Err(e) => return service_error(e),
    };

    let email = match email_request(&draft, &recipient, &rendered) {
        Ok(email) => email,
        Err(e) => return draft_error(e),
    };

    match state.mailer.send(&email).await {
        Ok(receipt) => {
            log::info!(
                "Invoice {} emailed to {} ({:?})",
                draft.context.invoice_number,
                email.to,
                receipt.message_id
            );
            HttpResponse::Ok().json(SendInvoiceResponse {
                to: email.to,
                pdf_filename: email.pdf_filename,
                message_id: receipt.message_id,
                message: receipt.message,
                has_attachment: receipt.has_attachment,
            })
        }
        Err(e) => service_error(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/invoice").route(web::get().to(get_draft)))
        .service(web::resource("/invoice/changes").route(web::post().to(apply_change)))
        .service(web::resource("/invoice/reset").route(web::post().to(reset_draft)))
        .service(web::resource("/invoice/preview").route(web::post().to(preview)))
        .service(web::resource("/invoice/pdf").route(web::post().to(download_pdf)))
        .service(web::resource("/invoice/send").route(web::post().to(send_invoice)));
}

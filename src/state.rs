use std::sync::Arc;

use chrono::{Local, NaiveDate};
use parking_lot::RwLock;

use crate::config::{AppConfig, InvoiceProfile};
use crate::invoice::{apply, initial_draft, DraftError, FieldChange, InvoiceDraft};
use crate::services::common::build_http_client;
use crate::services::{EmailSender, HttpEmailSender, HttpInvoiceRenderer, InvoiceRenderer};

/// State shared by every worker: the single form draft and the service
/// clients.
pub struct AppState {
    draft: RwLock<InvoiceDraft>,
    pub profile: InvoiceProfile,
    pub default_recipient: Option<String>,
    pub renderer: Arc<dyn InvoiceRenderer + Send + Sync>,
    pub mailer: Arc<dyn EmailSender + Send + Sync>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http_client = build_http_client(config.request_timeout)?;

        let renderer = Arc::new(HttpInvoiceRenderer::new(
            http_client.clone(),
            config.render_api_url.clone(),
            config.api_key.clone(),
        ));
        let mailer = Arc::new(HttpEmailSender::new(
            http_client,
            config.email_api_url.clone(),
            config.api_key.clone(),
        ));

        Ok(Self::with_services(
            config.profile.clone(),
            config.default_recipient.clone(),
            renderer,
            mailer,
            today(),
        ))
    }

    pub fn with_services(
        profile: InvoiceProfile,
        default_recipient: Option<String>,
        renderer: Arc<dyn InvoiceRenderer + Send + Sync>,
        mailer: Arc<dyn EmailSender + Send + Sync>,
        today: NaiveDate,
    ) -> Self {
        let draft = initial_draft(today, &profile);
        Self {
            draft: RwLock::new(draft),
            profile,
            default_recipient,
            renderer,
            mailer,
        }
    }

    /// Copy of the current draft.
    pub fn snapshot(&self) -> InvoiceDraft {
        self.draft.read().clone()
    }

    /// Apply one edit under the write lock. Readers see either the previous
    /// draft or the fully recomputed next one.
    pub fn apply_change(&self, change: FieldChange) -> Result<InvoiceDraft, DraftError> {
        let mut draft = self.draft.write();
        let next = apply(&draft, change, &self.profile)?;
        *draft = next.clone();
        Ok(next)
    }

    pub fn reset(&self, today: NaiveDate) -> InvoiceDraft {
        let fresh = initial_draft(today, &self.profile);
        *self.draft.write() = fresh.clone();
        fresh
    }
}

/// Today's date in the server's local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

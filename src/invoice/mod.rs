//! Invoice form: content derivation, field cascade and HTTP routes.
//!
//! - `calendar` - month arithmetic and date formats
//! - `content` - derived description, invoice number, subject and body
//! - `cascade` - which derived fields each edit recomputes
//! - `outbound` - payloads for the render and email services
//! - `routes` - HTTP handlers for the form

pub mod calendar;
pub mod cascade;
pub mod content;
pub mod model;
pub mod outbound;
pub mod routes;


pub use cascade::{apply, apply_all, initial_draft, DraftError, Field};
pub use content::derive;
pub use model::{DerivedContent, FieldChange, InvoiceContext, InvoiceDraft, LineItem};

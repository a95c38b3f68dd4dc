//! Form field dependencies.
//!
//! Each edit is one transition from a full [`InvoiceDraft`] to the next. The
//! fields an edit recomputes are listed in [`Field::dependents`]; nothing is
//! recomputed implicitly. Edits to the date cascade widely, edits to the first
//! row's amount or to GST only refresh the email body, and the rest of the
//! form is left alone.

use chrono::NaiveDate;
use thiserror::Error;

use super::calendar::first_of_next_month;
use super::content::{
    email_body, email_subject, invoice_number_from_due_date, line_item_description,
    placeholder_year,
};
use super::model::{FieldChange, InvoiceContext, InvoiceDraft, LineItem};
use crate::config::InvoiceProfile;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("line item {index} does not exist (the table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },
    #[error("{field} is required")]
    MissingField { field: &'static str },
}

/// An input field of the form, as identified by a [`FieldChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    DueDate,
    InvoiceNumber,
    GstAmount,
    LineItemDescription { index: usize },
    LineItemAmount { index: usize },
    Rows,
    EmailSubject,
    EmailBody,
}

/// A field the form fills in by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derived {
    DueDate,
    InvoiceNumber,
    Description,
    EmailSubject,
    EmailBody,
}

const DATE_DEPENDENTS: &[Derived] = &[
    Derived::DueDate,
    Derived::InvoiceNumber,
    Derived::Description,
    Derived::EmailSubject,
    Derived::EmailBody,
];

const DUE_DATE_DEPENDENTS: &[Derived] = &[
    Derived::InvoiceNumber,
    Derived::Description,
    Derived::EmailSubject,
    Derived::EmailBody,
];

const BODY_ONLY: &[Derived] = &[Derived::EmailBody];

impl Field {
    /// Derived fields to recompute after this field changes, in order.
    pub fn dependents(self) -> &'static [Derived] {
        match self {
            Field::Date => DATE_DEPENDENTS,
            Field::DueDate => DUE_DATE_DEPENDENTS,
            Field::GstAmount => BODY_ONLY,
            Field::LineItemAmount { index: 0 } => BODY_ONLY,
            Field::LineItemAmount { .. }
            | Field::LineItemDescription { .. }
            | Field::InvoiceNumber
            | Field::Rows
            | Field::EmailSubject
            | Field::EmailBody => &[],
        }
    }
}

impl FieldChange {
    pub fn field(&self) -> Field {
        match self {
            FieldChange::Date { .. } => Field::Date,
            FieldChange::DueDate { .. } => Field::DueDate,
            FieldChange::InvoiceNumber { .. } => Field::InvoiceNumber,
            FieldChange::GstAmount { .. } => Field::GstAmount,
            FieldChange::LineItemDescription { index, .. } => {
                Field::LineItemDescription { index: *index }
            }
            FieldChange::LineItemAmount { index, .. } => Field::LineItemAmount { index: *index },
            FieldChange::AddRow | FieldChange::RemoveRow { .. } => Field::Rows,
            FieldChange::EmailSubject { .. } => Field::EmailSubject,
            FieldChange::EmailBody { .. } => Field::EmailBody,
        }
    }
}

/// Apply one edit and recompute its dependents, returning the next draft.
///
/// The input draft is untouched, so a rejected edit leaves no partial state.
pub fn apply(
    draft: &InvoiceDraft,
    change: FieldChange,
    profile: &InvoiceProfile,
) -> Result<InvoiceDraft, DraftError> {
    let field = change.field();
    let mut next = draft.clone();
    write_input(&mut next, change)?;

    for derived in field.dependents() {
        recompute(&mut next, *derived, profile);
    }

    Ok(next)
}

/// Apply several edits in order, stopping at the first rejected one.
pub fn apply_all<I>(
    draft: &InvoiceDraft,
    changes: I,
    profile: &InvoiceProfile,
) -> Result<InvoiceDraft, DraftError>
where
    I: IntoIterator<Item = FieldChange>,
{
    changes
        .into_iter()
        .try_fold(draft.clone(), |current, change| apply(&current, change, profile))
}

/// The form as first shown for an invoice dated `today`.
pub fn initial_draft(today: NaiveDate, profile: &InvoiceProfile) -> InvoiceDraft {
    let mut draft = InvoiceDraft {
        context: InvoiceContext {
            date: Some(today),
            due_date: None,
            invoice_number: String::new(),
            gst_amount: profile.default_gst_amount.clone(),
            line_items: vec![
                LineItem::new("", profile.default_rent_amount),
                LineItem::blank(),
                LineItem::blank(),
            ],
        },
        email_subject: String::new(),
        email_body: String::new(),
    };

    for derived in Field::Date.dependents() {
        recompute(&mut draft, *derived, profile);
    }
    draft
}

fn row_mut(draft: &mut InvoiceDraft, index: usize) -> Result<&mut LineItem, DraftError> {
    let len = draft.context.line_items.len();
    draft
        .context
        .line_items
        .get_mut(index)
        .ok_or(DraftError::RowOutOfRange { index, len })
}

fn write_input(draft: &mut InvoiceDraft, change: FieldChange) -> Result<(), DraftError> {
    match change {
        FieldChange::Date { value } => draft.context.date = value,
        FieldChange::DueDate { value } => draft.context.due_date = value,
        FieldChange::InvoiceNumber { value } => draft.context.invoice_number = value,
        FieldChange::GstAmount { value } => draft.context.gst_amount = value,
        FieldChange::LineItemDescription { index, value } => {
            row_mut(draft, index)?.description = value;
        }
        FieldChange::LineItemAmount { index, value } => {
            row_mut(draft, index)?.amount = value;
        }
        FieldChange::AddRow => draft.context.line_items.push(LineItem::blank()),
        FieldChange::RemoveRow { index } => {
            let len = draft.context.line_items.len();
            if index >= len {
                return Err(DraftError::RowOutOfRange { index, len });
            }
            draft.context.line_items.remove(index);
        }
        FieldChange::EmailSubject { value } => draft.email_subject = value,
        FieldChange::EmailBody { value } => draft.email_body = value,
    }
    Ok(())
}

fn recompute(draft: &mut InvoiceDraft, derived: Derived, profile: &InvoiceProfile) {
    let context = &mut draft.context;
    match derived {
        Derived::DueDate => {
            context.due_date = context.date.map(first_of_next_month);
        }
        Derived::InvoiceNumber => {
            // A cleared due date keeps whatever number is already shown.
            if let Some(due) = context.due_date {
                context.invoice_number = invoice_number_from_due_date(due, profile);
            }
        }
        Derived::Description => {
            let description = line_item_description(
                context.due_date,
                placeholder_year(context.date, profile),
                profile,
            );
            if let Some(first) = context.line_items.first_mut() {
                first.description = description;
            }
        }
        Derived::EmailSubject => {
            draft.email_subject = email_subject(context.due_date, profile);
        }
        Derived::EmailBody => {
            draft.email_body = email_body(
                context.due_date,
                &context.line_items,
                &context.gst_amount,
                profile,
            );
        }
    }
}

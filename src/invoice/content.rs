//! Invoice content derivation.
//!
//! Pure functions from the form's inputs to the text the user sends out: the
//! first row's description, the invoice number, the email subject and body.
//! Every function is total; unset dates and unparseable numbers produce a
//! placeholder or zero instead of an error.

use chrono::{Datelike, NaiveDate};

use super::calendar::{day_suffix, last_day_of_month, month_name};
use super::model::{DerivedContent, InvoiceContext, LineItem};
use crate::config::InvoiceProfile;

/// Parse a user-typed amount. Blank, malformed and non-finite input is `0`.
pub fn parse_amount(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Two decimals, no thousands separators, no `-0.00`.
pub fn format_money(value: f64) -> String {
    let rendered = format!("{:.2}", value);
    if rendered == "-0.00" {
        "0.00".to_string()
    } else {
        rendered
    }
}

/// `February 01 - February 28 2026`, or `XX 01 - XX DD <hint_year>` when the
/// due date is unset.
pub fn rent_period_label(due_date: Option<NaiveDate>, hint_year: i32) -> String {
    match due_date {
        Some(due) => {
            let month = month_name(due);
            format!(
                "{} 01 - {} {} {}",
                month,
                month,
                last_day_of_month(due),
                due.year()
            )
        }
        None => format!("XX 01 - XX DD {}", hint_year),
    }
}

/// Description for the rent row: the profile prefix followed by the period.
pub fn line_item_description(
    due_date: Option<NaiveDate>,
    hint_year: i32,
    profile: &InvoiceProfile,
) -> String {
    format!(
        "{} {}",
        profile.description_prefix,
        rent_period_label(due_date, hint_year)
    )
}

/// Signed count of months from the profile's base month to the due date.
pub fn months_since_base(due_date: NaiveDate, profile: &InvoiceProfile) -> i64 {
    let years = i64::from(due_date.year()) - i64::from(profile.base_year);
    let months = i64::from(due_date.month0()) - i64::from(profile.base_month0);
    years * 12 + months
}

/// Invoice number as five zero-padded digits, advancing one per month.
///
/// Months before the base that would push the number below zero render as
/// a minus sign followed by the padded magnitude (`-00003`).
pub fn invoice_number_from_due_date(due_date: NaiveDate, profile: &InvoiceProfile) -> String {
    let number = profile.invoice_number_base + months_since_base(due_date, profile);
    if number < 0 {
        format!("-{:05}", number.unsigned_abs())
    } else {
        format!("{:05}", number)
    }
}

pub fn email_subject(due_date: Option<NaiveDate>, profile: &InvoiceProfile) -> String {
    match due_date {
        Some(due) => format!(
            "Invoice for {} {} - {}",
            month_name(due),
            due.year(),
            profile.location_label
        ),
        None => format!("Rent Invoice - {}", profile.location_label),
    }
}

/// Totals used by the email body.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub gst: f64,
    pub total: f64,
}

impl InvoiceTotals {
    pub fn compute(line_items: &[LineItem], gst_amount: &str) -> Self {
        let subtotal: f64 = non_zero_items(line_items).map(|item| item.amount).sum();
        let gst = parse_amount(gst_amount);
        Self {
            subtotal,
            gst,
            total: subtotal + gst,
        }
    }
}

/// Rows with an amount other than exactly zero, in table order.
pub fn non_zero_items(line_items: &[LineItem]) -> impl Iterator<Item = &LineItem> {
    line_items.iter().filter(|item| item.amount != 0.0)
}

/// The email text. Empty when the due date is unset.
pub fn email_body(
    due_date: Option<NaiveDate>,
    line_items: &[LineItem],
    gst_amount: &str,
    profile: &InvoiceProfile,
) -> String {
    let Some(due) = due_date else {
        return String::new();
    };

    let month = month_name(due);
    let year = due.year();
    let day = due.day();
    let totals = InvoiceTotals::compute(line_items, gst_amount);

    let mut lines = vec![
        format!("Hi {},", profile.greeting_name),
        String::new(),
        format!(
            "Please find attached the rent invoice for {} {}. Please pay by the {}{} of {}.",
            month,
            year,
            day,
            day_suffix(day),
            month
        ),
        String::new(),
        format!("* Total amount payable = ${}", format_money(totals.total)),
        String::new(),
        "Breakdown:".to_string(),
        String::new(),
    ];

    lines.extend(
        non_zero_items(line_items)
            .map(|item| format!("* {} = ${}", item.description, format_money(item.amount))),
    );
    lines.push(format!("* GST 10% = ${}", format_money(totals.gst)));

    lines.extend([
        String::new(),
        "Please pay to the following account:".to_string(),
        String::new(),
        format!("    {}", profile.account_name),
        format!("    BSB: {}", profile.bsb),
        format!("    ACC: {}", profile.account_number),
        String::new(),
        "Thanks,".to_string(),
        profile.signature.clone(),
    ]);

    lines.join("\n")
}

/// Year shown in the placeholder label: the year after the invoice date.
pub fn placeholder_year(date: Option<NaiveDate>, profile: &InvoiceProfile) -> i32 {
    date.map(|d| d.year() + 1).unwrap_or(profile.base_year)
}

/// Every derived field recomputed from scratch.
pub fn derive(context: &InvoiceContext, profile: &InvoiceProfile) -> DerivedContent {
    let due = context.due_date;
    DerivedContent {
        description: line_item_description(
            due,
            placeholder_year(context.date, profile),
            profile,
        ),
        invoice_number: due
            .map(|d| invoice_number_from_due_date(d, profile))
            .unwrap_or_else(|| context.invoice_number.clone()),
        email_subject: email_subject(due, profile),
        email_body: email_body(due, &context.line_items, &context.gst_amount, profile),
    }
}

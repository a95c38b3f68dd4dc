use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::calendar::{deserialize_optional_date, serialize_optional_date};
use super::content::parse_amount;

/// One row of the invoice table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    /// Zero means "not filled in yet" and is left out of the email breakdown.
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub amount: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }

    pub fn blank() -> Self {
        Self::new("", 0.0)
    }

    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty() && self.amount == 0.0
    }
}

/// Everything the derived text is computed from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, ToSchema)]
pub struct InvoiceContext {
    #[serde(
        default,
        serialize_with = "serialize_optional_date",
        deserialize_with = "deserialize_optional_date"
    )]
    pub date: Option<NaiveDate>,
    #[serde(
        default,
        serialize_with = "serialize_optional_date",
        deserialize_with = "deserialize_optional_date"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub invoice_number: String,
    /// Raw GST input; unparseable text counts as zero.
    #[serde(default, deserialize_with = "deserialize_gst")]
    pub gst_amount: String,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// Text computed from an [`InvoiceContext`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct DerivedContent {
    pub description: String,
    pub invoice_number: String,
    pub email_subject: String,
    pub email_body: String,
}

/// The form as the user currently sees it.
///
/// Subject and body are stored rather than recomputed on read: a manual edit
/// survives until one of their inputs changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct InvoiceDraft {
    pub context: InvoiceContext,
    pub email_subject: String,
    pub email_body: String,
}

/// A single edit made on the form.
#[derive(Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldChange {
    Date {
        #[serde(default, deserialize_with = "deserialize_optional_date")]
        value: Option<NaiveDate>,
    },
    DueDate {
        #[serde(default, deserialize_with = "deserialize_optional_date")]
        value: Option<NaiveDate>,
    },
    InvoiceNumber {
        value: String,
    },
    GstAmount {
        #[serde(deserialize_with = "deserialize_gst")]
        value: String,
    },
    LineItemDescription {
        index: usize,
        value: String,
    },
    LineItemAmount {
        index: usize,
        #[serde(deserialize_with = "deserialize_lenient_amount")]
        value: f64,
    },
    AddRow,
    RemoveRow {
        index: usize,
    },
    EmailSubject {
        value: String,
    },
    EmailBody {
        value: String,
    },
}

/// Accepts a JSON number or numeric text; anything else becomes `0`.
fn deserialize_lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_amount(&s),
        _ => 0.0,
    })
}

/// GST is kept as the text the user typed, numbers are accepted too.
fn deserialize_gst<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

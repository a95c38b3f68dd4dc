//! Shared helpers for the outbound service clients.

use std::sync::OnceLock;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;

use super::ServiceError;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const DEFAULT_PDF_FILENAME: &str = "invoice.pdf";
const ERROR_BODY_LIMIT: usize = 512;

/// Build the reqwest client shared by both services.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(900))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Attach the API key header when one is configured.
pub fn with_api_key(builder: reqwest::RequestBuilder, api_key: Option<&str>) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) => builder.header(API_KEY_HEADER, key),
        None => builder,
    }
}

/// Turn a non-2xx response into [`ServiceError::Status`], keeping a bounded
/// slice of the body for the log.
pub async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        service,
        status: status.as_u16(),
        body: truncate(&body, ERROR_BODY_LIMIT),
    })
}

fn truncate(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_string(),
    }
}

fn filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"filename=([^;]+)").expect("static regex is valid"))
}

/// Filename from a `Content-Disposition` value such as
/// `inline; filename=Rental_Invoice_January2026.pdf`.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let captured = filename_pattern().captures(header)?.get(1)?.as_str();
    let cleaned = clean_filename(captured.trim().trim_matches('"'), "");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Strip path separators and reserved characters, then keep a plain ASCII
/// name with runs of whitespace collapsed to `_`.
pub fn clean_filename(name: &str, fallback: &str) -> String {
    let sanitized = sanitize_filename::sanitize(name.trim());
    let joined: String = sanitized
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let trimmed = joined.trim_matches(|c| c == '_' || c == '.');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `Rental_Invoice_February2026.pdf` from a long due date such as
/// `February 1, 2026`.
pub fn fallback_pdf_filename(due_date_long: &str) -> String {
    let words: Vec<&str> = due_date_long
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .collect();

    match (words.first(), words.last()) {
        (Some(month), Some(year)) if words.len() >= 2 => clean_filename(
            &format!("Rental_Invoice_{}{}.pdf", month, year),
            DEFAULT_PDF_FILENAME,
        ),
        _ => DEFAULT_PDF_FILENAME.to_string(),
    }
}

/// Decode a base64 PDF, ignoring surrounding whitespace and line breaks.
pub fn decode_pdf(service: &'static str, encoded: &str) -> Result<(String, Vec<u8>), ServiceError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ServiceError::EmptyBody { service });
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|source| ServiceError::InvalidPdf { service, source })?;
    if bytes.is_empty() {
        return Err(ServiceError::EmptyBody { service });
    }

    Ok((compact, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_content_disposition() {
        assert_eq!(
            filename_from_content_disposition("inline; filename=Rental_Invoice_January2026.pdf"),
            Some("Rental_Invoice_January2026.pdf".to_string())
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=\"a b.pdf\"; size=10"),
            Some("a_b.pdf".to_string())
        );
        assert_eq!(filename_from_content_disposition("inline"), None);
        assert_eq!(filename_from_content_disposition("inline; filename=\"\""), None);
    }

    #[test]
    fn test_clean_filename() {
        assert_eq!(clean_filename("../../etc/passwd", "x"), "etcpasswd");
        assert_eq!(clean_filename("  Invoice  Feb.pdf ", "x"), "Invoice_Feb.pdf");
        assert_eq!(clean_filename("///", "fallback"), "fallback");
    }

    #[test]
    fn test_fallback_pdf_filename() {
        assert_eq!(
            fallback_pdf_filename("February 1, 2026"),
            "Rental_Invoice_February2026.pdf"
        );
        assert_eq!(fallback_pdf_filename(""), "invoice.pdf");
    }

    #[test]
    fn test_decode_pdf() {
        let encoded = STANDARD.encode(b"%PDF-1.4 test");
        let (compact, bytes) = decode_pdf("render", &format!("{}\n", encoded)).unwrap();
        assert_eq!(compact, encoded);
        assert_eq!(bytes, b"%PDF-1.4 test");

        assert!(matches!(
            decode_pdf("render", "  "),
            Err(ServiceError::EmptyBody { .. })
        ));
        assert!(matches!(
            decode_pdf("render", "not base64!"),
            Err(ServiceError::InvalidPdf { .. })
        ));
    }
}

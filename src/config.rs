//! Service configuration.
//!
//! Values come from the process environment (after `.env` is loaded with
//! dotenvy). Parsing goes through a lookup function so tests never touch the
//! real environment.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_RENDER_API_URL: &str = "https://api.invoiceagent.com.au/subway-invoice";
pub const DEFAULT_EMAIL_API_URL: &str = "https://api.invoiceagent.com.au/send-email";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Fixed text and numbers baked into every generated invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceProfile {
    pub description_prefix: String,
    pub location_label: String,
    pub property_line1: String,
    pub property_line2: String,
    pub greeting_name: String,
    pub account_name: String,
    pub bsb: String,
    pub account_number: String,
    pub signature: String,
    pub default_rent_amount: f64,
    pub default_gst_amount: String,
    pub invoice_number_base: i64,
    pub base_year: i32,
    /// Zero-indexed (February = 1).
    pub base_month0: u32,
}

impl Default for InvoiceProfile {
    fn default() -> Self {
        Self {
            description_prefix: "Rent for shop 7/477 Burwood Highway".to_string(),
            location_label: "Vermont South".to_string(),
            property_line1: "Shop 7/477 Burwood".to_string(),
            property_line2: "Highway Vermont South".to_string(),
            greeting_name: "Hardik".to_string(),
            account_name: "Michael Sutanto".to_string(),
            bsb: "083-028".to_string(),
            account_number: "17-800-9379".to_string(),
            signature: "Michael".to_string(),
            default_rent_amount: 4862.45,
            default_gst_amount: "486.25".to_string(),
            invoice_number_base: 220,
            base_year: 2026,
            base_month0: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub render_api_url: String,
    pub email_api_url: String,
    pub api_key: Option<String>,
    pub default_recipient: Option<String>,
    pub request_timeout: Duration,
    pub allowed_origins: Vec<String>,
    pub profile: InvoiceProfile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            render_api_url: DEFAULT_RENDER_API_URL.to_string(),
            email_api_url: DEFAULT_EMAIL_API_URL.to_string(),
            api_key: None,
            default_recipient: None,
            request_timeout: Duration::from_secs(30),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            profile: InvoiceProfile::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(v) = get("BIND_ADDRESS") {
            config.bind_address = v;
        }
        if let Some(v) = get("PORT") {
            config.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = get("RENDER_API_URL") {
            config.render_api_url = v;
        }
        if let Some(v) = get("EMAIL_API_URL") {
            config.email_api_url = v;
        }
        config.api_key = get("API_KEY");
        config.default_recipient = get("DEFAULT_RECIPIENT");
        if let Some(v) = get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("ALLOWED_ORIGINS") {
            config.allowed_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        let profile = &mut config.profile;
        let text_overrides: [(&str, &mut String); 9] = [
            ("INVOICE_DESCRIPTION_PREFIX", &mut profile.description_prefix),
            ("INVOICE_LOCATION_LABEL", &mut profile.location_label),
            ("INVOICE_PROPERTY_LINE1", &mut profile.property_line1),
            ("INVOICE_PROPERTY_LINE2", &mut profile.property_line2),
            ("INVOICE_GREETING_NAME", &mut profile.greeting_name),
            ("INVOICE_ACCOUNT_NAME", &mut profile.account_name),
            ("INVOICE_BSB", &mut profile.bsb),
            ("INVOICE_ACCOUNT_NUMBER", &mut profile.account_number),
            ("INVOICE_SIGNATURE", &mut profile.signature),
        ];
        for (key, slot) in text_overrides {
            if let Some(v) = get(key) {
                *slot = v;
            }
        }

        if let Some(v) = get("INVOICE_DEFAULT_RENT") {
            profile.default_rent_amount = parse_var("INVOICE_DEFAULT_RENT", &v)?;
        }
        if let Some(v) = get("INVOICE_DEFAULT_GST") {
            profile.default_gst_amount = v;
        }
        if let Some(v) = get("INVOICE_NUMBER_BASE") {
            profile.invoice_number_base = parse_var("INVOICE_NUMBER_BASE", &v)?;
        }
        if let Some(v) = get("INVOICE_BASE_YEAR") {
            profile.base_year = parse_var("INVOICE_BASE_YEAR", &v)?;
        }
        if let Some(v) = get("INVOICE_BASE_MONTH") {
            // Human month number in the environment, zero-indexed internally.
            let month: u32 = parse_var("INVOICE_BASE_MONTH", &v)?;
            if !(1..=12).contains(&month) {
                return Err(ConfigError::Invalid {
                    var: "INVOICE_BASE_MONTH",
                    value: v,
                    reason: "expected a month number between 1 and 12".to_string(),
                });
            }
            profile.base_month0 = month - 1;
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.bind_address.clone(), self.port)
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

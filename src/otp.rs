// otp.rs
// Stateless helper against the third-party SMS-lookup API: walk two pages of
// recent messages, match the phone number, pull the 5-digit code out.

use std::env;

use anyhow::Result;
use chrono::{Duration, Utc};
use regex::Regex;
use serde::Deserialize;

const PAGES: u32 = 2;
const PAGE_SIZE: u32 = 12;
const LOOKBACK_DAYS: i64 = 8;

#[derive(Debug, Clone, Deserialize)]
struct SmsRecord {
    #[serde(default)]
    to: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SmsPage {
    #[serde(default)]
    data: Vec<SmsRecord>,
}

#[derive(Clone)]
pub struct OtpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    code_pattern: Regex,
}

/// Phone numbers are compared on digits only.
fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

impl OtpClient {
    pub fn from_env() -> Self {
        OtpClient {
            client: reqwest::Client::new(),
            base_url: env::var("OTP_API_BASE").unwrap_or_default(),
            api_key: env::var("OTP_API_KEY").unwrap_or_default(),
            code_pattern: Regex::new(r"n/(\d{5})").expect("otp pattern is valid"),
        }
    }

    /// The upstream messages carry codes as "n/12345"; anything else falls
    /// back to the raw trimmed text.
    fn extract_code(&self, message: &str) -> String {
        self.code_pattern
            .captures(message)
            .and_then(|captures| captures.get(1))
            .map(|code| code.as_str().to_string())
            .unwrap_or_else(|| message.trim().to_string())
    }

    /// Polls both pages of the rolling window and returns the first message
    /// matching the phone number, or None once the pages are exhausted. No
    /// retries.
    pub async fn fetch_otp(&self, phone: &str) -> Result<Option<String>> {
        let wanted = normalize_phone(phone);
        if wanted.is_empty() || self.base_url.is_empty() {
            return Ok(None);
        }

        let to = Utc::now();
        let from = to - Duration::days(LOOKBACK_DAYS);

        for page in 1..=PAGES {
            let response = self
                .client
                .get(format!("{}/sms", self.base_url))
                .query(&[
                    ("page", page.to_string()),
                    ("limit", PAGE_SIZE.to_string()),
                    ("start_date", from.format("%Y-%m-%d").to_string()),
                    ("end_date", to.format("%Y-%m-%d").to_string()),
                    ("api_key", self.api_key.clone()),
                ])
                .send()
                .await?
                .error_for_status()?;

            let body: SmsPage = response.json().await?;
            for record in body.data {
                let candidate = normalize_phone(&record.to);
                if !candidate.is_empty()
                    && (candidate.contains(&wanted) || wanted.contains(&candidate))
                {
                    return Ok(Some(self.extract_code(&record.message)));
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OtpClient {
        OtpClient {
            client: reqwest::Client::new(),
            base_url: String::new(),
            api_key: String::new(),
            code_pattern: Regex::new(r"n/(\d{5})").unwrap(),
        }
    }

    #[test]
    fn normalizes_to_digits() {
        assert_eq!(normalize_phone("+880 17-1234 5678"), "8801712345678");
        assert_eq!(normalize_phone("no digits"), "");
    }

    #[test]
    fn extracts_five_digit_code() {
        let c = client();
        assert_eq!(c.extract_code("Your PIN n/48213 expires soon"), "48213");
        assert_eq!(c.extract_code("  plain text message \n"), "plain text message");
        // Four digits do not match the pattern; raw text wins.
        assert_eq!(c.extract_code("n/1234"), "n/1234");
    }
}

//! Classification of scanned text
//!
//! Ordered checks, first match wins: vCard header, absolute URL with a host,
//! e-mail-like text, phone-number characters, anything else is plain text.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::constants::VCARD_BEGIN;
use crate::models::ResultCategory;

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("valid phone regex"))
}

/// Absolute URL with scheme and host
pub fn is_website_url(text: &str) -> bool {
    Url::parse(text)
        .map(|url| url.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

fn is_phone_number(text: &str) -> bool {
    phone_pattern().is_match(text) && text.chars().any(|c| c.is_ascii_digit())
}

pub fn classify(text: &str) -> ResultCategory {
    if text.starts_with(VCARD_BEGIN) {
        ResultCategory::ContactCard
    } else if is_website_url(text) {
        ResultCategory::WebsiteUrl
    } else if text.contains('@') && text.contains('.') {
        ResultCategory::EmailAddress
    } else if is_phone_number(text) {
        ResultCategory::PhoneNumber
    } else {
        ResultCategory::PlainText
    }
}

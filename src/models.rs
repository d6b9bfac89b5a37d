use serde::{Deserialize, Serialize};

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
        }
    }

    pub fn next(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::POST,
            HttpMethod::POST => HttpMethod::PUT,
            HttpMethod::PUT => HttpMethod::PATCH,
            HttpMethod::PATCH => HttpMethod::DELETE,
            HttpMethod::DELETE => HttpMethod::GET,
        }
    }

    /// Every method except GET may carry a body
    pub fn carries_body(&self) -> bool {
        !matches!(self, HttpMethod::GET)
    }
}

/// An ad-hoc request as typed by the user
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    /// Custom headers as a JSON object literal, may be empty
    pub headers: String,
    pub body: String,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        RequestSpec {
            method,
            url: url.into(),
            headers: String::new(),
            body: String::new(),
        }
    }

    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = headers.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// How a settled probe should be presented
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx
    Success,
    /// Response received with status >= 400; displayed, not a failure
    HttpError,
    /// Any other status (1xx/3xx)
    Other,
    /// No response received
    NetworkError,
}

impl ProbeOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => ProbeOutcome::Success,
            400..=u16::MAX => ProbeOutcome::HttpError,
            _ => ProbeOutcome::Other,
        }
    }
}

/// Response panel contents
#[derive(Clone, Debug, Default)]
pub struct ResponseView {
    /// Absent before the first request and while one is in flight
    pub status_code: Option<u16>,
    pub body: String,
    pub time_ms: u64,
    pub outcome: Option<ProbeOutcome>,
}

/// Raw text of a decoded QR code
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanResult {
    pub text: String,
    pub scanned_at: chrono::DateTime<chrono::Utc>,
}

impl ScanResult {
    pub fn new(text: impl Into<String>) -> Self {
        ScanResult {
            text: text.into(),
            scanned_at: chrono::Utc::now(),
        }
    }
}

/// Classification of a scan result, derived on demand
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultCategory {
    ContactCard,
    WebsiteUrl,
    EmailAddress,
    PhoneNumber,
    PlainText,
}

impl ResultCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ResultCategory::ContactCard => "Contact Card (vCard)",
            ResultCategory::WebsiteUrl => "Website URL",
            ResultCategory::EmailAddress => "Email Address",
            ResultCategory::PhoneNumber => "Phone Number",
            ResultCategory::PlainText => "Text Content",
        }
    }

    /// "Open as URL" is only offered for websites
    pub fn can_open(&self) -> bool {
        matches!(self, ResultCategory::WebsiteUrl)
    }

    /// "Copy" is always offered
    pub fn can_copy(&self) -> bool {
        true
    }
}

/// Fields pulled out of a scanned contact card; absent fields are empty
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub organization: String,
    pub phone: String,
    pub email: String,
}

/// Contact form on the Generate tab
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub organization: String,
    pub phone: String,
    pub email: String,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.organization.trim().is_empty()
            && self.phone.trim().is_empty()
            && self.email.trim().is_empty()
    }
}

/// Output raster sizes offered by the generator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum QrSize {
    Px200,
    #[default]
    Px300,
    Px400,
    Px600,
    Px800,
}

impl QrSize {
    pub const ALL: [QrSize; 5] = [
        QrSize::Px200,
        QrSize::Px300,
        QrSize::Px400,
        QrSize::Px600,
        QrSize::Px800,
    ];

    pub fn pixels(&self) -> u32 {
        match self {
            QrSize::Px200 => 200,
            QrSize::Px300 => 300,
            QrSize::Px400 => 400,
            QrSize::Px600 => 600,
            QrSize::Px800 => 800,
        }
    }

    pub fn next(&self) -> QrSize {
        match self {
            QrSize::Px200 => QrSize::Px300,
            QrSize::Px300 => QrSize::Px400,
            QrSize::Px400 => QrSize::Px600,
            QrSize::Px600 => QrSize::Px800,
            QrSize::Px800 => QrSize::Px200,
        }
    }
}

impl TryFrom<u32> for QrSize {
    type Error = String;

    fn try_from(px: u32) -> Result<Self, Self::Error> {
        QrSize::ALL
            .into_iter()
            .find(|s| s.pixels() == px)
            .ok_or_else(|| format!("unsupported QR size {}px (use 200, 300, 400, 600 or 800)", px))
    }
}

impl From<QrSize> for u32 {
    fn from(size: QrSize) -> Self {
        size.pixels()
    }
}

/// Input mode of the generator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GenerateMode {
    #[default]
    Text,
    Url,
    Contact,
}

impl GenerateMode {
    pub fn next(&self) -> GenerateMode {
        match self {
            GenerateMode::Text => GenerateMode::Url,
            GenerateMode::Url => GenerateMode::Contact,
            GenerateMode::Contact => GenerateMode::Text,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            GenerateMode::Text => 0,
            GenerateMode::Url => 1,
            GenerateMode::Contact => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_body_gating() {
        assert!(!HttpMethod::GET.carries_body());
        assert!(HttpMethod::DELETE.carries_body());
        assert_eq!(HttpMethod::DELETE.next(), HttpMethod::GET);
    }

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(ProbeOutcome::from_status(204), ProbeOutcome::Success);
        assert_eq!(ProbeOutcome::from_status(404), ProbeOutcome::HttpError);
        assert_eq!(ProbeOutcome::from_status(503), ProbeOutcome::HttpError);
        assert_eq!(ProbeOutcome::from_status(304), ProbeOutcome::Other);
    }

    #[test]
    fn test_qr_size_parsing() {
        assert_eq!(QrSize::try_from(600), Ok(QrSize::Px600));
        assert!(QrSize::try_from(500).is_err());
        let size: QrSize = serde_yaml::from_str("800").unwrap();
        assert_eq!(size, QrSize::Px800);
    }

    #[test]
    fn test_contact_info_empty_ignores_whitespace() {
        let mut contact = ContactInfo {
            name: "  ".into(),
            ..Default::default()
        };
        assert!(contact.is_empty());
        contact.organization = "Acme".into();
        assert!(!contact.is_empty());
    }
}

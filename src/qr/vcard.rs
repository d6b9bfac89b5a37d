//! Contact-card text: the one wire format this application writes itself

use crate::constants::{VCARD_BEGIN, VCARD_END, VCARD_VERSION};
use crate::models::{ContactFields, ContactInfo};

/// Serialize a contact form into a vCard block
pub fn to_vcard(contact: &ContactInfo) -> String {
    [
        VCARD_BEGIN.to_string(),
        VCARD_VERSION.to_string(),
        format!("FN:{}", contact.name),
        format!("ORG:{}", contact.organization),
        format!("TEL:{}", contact.phone),
        format!("EMAIL:{}", contact.email),
        VCARD_END.to_string(),
    ]
    .join("\n")
}

/// Pull the recognised fields out of a vCard; other lines are ignored
pub fn extract_fields(text: &str) -> ContactFields {
    let mut fields = ContactFields::default();

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(v) = line.strip_prefix("FN:") {
            fields.name = v.to_string();
        } else if let Some(v) = line.strip_prefix("ORG:") {
            fields.organization = v.to_string();
        } else if let Some(v) = line.strip_prefix("TEL:") {
            fields.phone = v.to_string();
        } else if let Some(v) = line.strip_prefix("EMAIL:") {
            fields.email = v.to_string();
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_contact() {
        let contact = ContactInfo {
            name: "Jane Doe".into(),
            organization: "Acme".into(),
            phone: "+1 555 0100".into(),
            email: "jane@x.com".into(),
        };
        assert_eq!(
            to_vcard(&contact),
            "BEGIN:VCARD\nVERSION:3.0\nFN:Jane Doe\nORG:Acme\nTEL:+1 555 0100\nEMAIL:jane@x.com\nEND:VCARD"
        );
    }

    #[test]
    fn test_extract_with_missing_org() {
        let text = "BEGIN:VCARD\nFN:Jane Doe\nTEL:+1 555 0100\nEMAIL:jane@x.com\nEND:VCARD";
        let fields = extract_fields(text);
        assert_eq!(fields.name, "Jane Doe");
        assert_eq!(fields.phone, "+1 555 0100");
        assert_eq!(fields.email, "jane@x.com");
        assert_eq!(fields.organization, "");
    }

    #[test]
    fn test_extract_ignores_unknown_lines_and_crlf() {
        let text = "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Doe;Jane\r\nTEL;TYPE=CELL:123\r\nFN:Jane\r\nEND:VCARD\r\n";
        let fields = extract_fields(text);
        assert_eq!(fields.name, "Jane");
        assert_eq!(fields.phone, "");
    }

    #[test]
    fn test_written_card_reads_back() {
        let contact = ContactInfo {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            ..Default::default()
        };
        let fields = extract_fields(&to_vcard(&contact));
        assert_eq!(fields.name, "Ada");
        assert_eq!(fields.email, "ada@example.org");
        assert_eq!(fields.organization, "");
    }
}

use lazy_static::lazy_static;
use regex::Regex;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Optional leading `+`, 9 to 15 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?1?\d{9,15}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_emails() {
        assert!(is_valid_email("player@example.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.org"));
    }

    #[test]
    fn rejects_bad_emails() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn accepts_phone_formats() {
        assert!(is_valid_phone("+15551234567"));
        assert!(is_valid_phone("5551234567"));
        assert!(is_valid_phone("123456789"));
    }

    #[test]
    fn rejects_bad_phones() {
        assert!(!is_valid_phone("12345678")); // too short
        assert!(!is_valid_phone("+1555123456789012")); // too long
        assert!(!is_valid_phone("555-123-4567"));
        assert!(!is_valid_phone("call me"));
    }
}

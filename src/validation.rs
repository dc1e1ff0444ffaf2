use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .unwrap();
}

/// Accumulates per-field validation failures for a request body. The first
/// message recorded for a field wins.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<&'static str, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: &'static str, message: &str) {
        self.errors.entry(field).or_insert_with(|| message.to_string());
    }

    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn into_errors(self) -> BTreeMap<&'static str, String> {
        self.errors
    }
}

pub fn matches_email(email: &str) -> bool {
    EMAIL_RX.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_regex() {
        assert!(matches_email("admin@ejemplo.com"));
        assert!(matches_email("first.last+tag@sub.ejemplo.com"));
        assert!(!matches_email("not-an-email"));
        assert!(!matches_email("missing@tld@twice"));
        assert!(!matches_email(""));
    }

    #[test]
    fn test_validator_accumulates_fields() {
        let mut v = Validator::new();
        v.check(false, "name", "must be provided");
        v.check(false, "description", "must be provided");
        v.check(true, "email", "must be valid");

        assert!(!v.valid());
        let errors = v.into_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["name"], "must be provided");
    }

    #[test]
    fn test_first_error_for_a_field_wins() {
        let mut v = Validator::new();
        v.add_error("email", "must be provided");
        v.add_error("email", "must be a valid email address");

        assert_eq!(v.into_errors()["email"], "must be provided");
    }
}

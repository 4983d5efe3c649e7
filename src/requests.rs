//! Validation implementations for API request types
//!
//! Statically-typed request bodies used by the member and event routes,
//! wired into [`ValidatedJson`](crate::extractors::ValidatedJson) through
//! the [`Validatable`] trait.

use serde::Deserialize;

use crate::extractors::{FieldError, Validatable, ValidationBuilder};
use crate::sanitizers::{sanitize_string, trim, trim_optional, SanitizeOptions};
use crate::validators::{
    validate_date, validate_email, validate_password, validate_phone, validate_username,
};

/// Maximum length for an event title
const MAX_TITLE_LENGTH: usize = 200;
/// Largest room capacity an event may request
const MAX_EVENT_CAPACITY: i64 = 500;

/// New member registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterMemberRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Validatable for RegisterMemberRequest {
    fn sanitize(&mut self) {
        self.email = self.email.trim().to_lowercase();
        self.username = trim(&self.username);
        trim_optional(&mut self.phone);
        // The password is checked, never rewritten
    }

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut builder = ValidationBuilder::new();

        builder.check("email", || validate_email(&self.email));
        builder.check("username", || validate_username(&self.username));
        builder.check("password", || validate_password(&self.password));
        builder.check("phone", || validate_phone(self.phone.as_deref()));

        builder.build()
    }
}

/// New library event (reading group, author talk, study-room booking).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub event_date: String,
    pub capacity: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validatable for CreateEventRequest {
    fn sanitize(&mut self) {
        self.title = sanitize_string(
            &self.title,
            &SanitizeOptions {
                max_length: Some(MAX_TITLE_LENGTH),
                ..Default::default()
            },
        );
        self.event_date = trim(&self.event_date);

        trim_optional(&mut self.description);
        if let Some(ref mut desc) = self.description {
            *desc = sanitize_string(
                desc,
                &SanitizeOptions {
                    allow_newlines: true,
                    ..Default::default()
                },
            );
        }
    }

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut builder = ValidationBuilder::new();

        builder.check_condition(self.title.is_empty(), "title", "Title is required");
        builder.check("event_date", || validate_date(&self.event_date));
        builder.check_condition(self.capacity < 1, "capacity", "Must be at least 1");
        builder.check_condition(
            self.capacity > MAX_EVENT_CAPACITY,
            "capacity",
            format!("Must be at most {MAX_EVENT_CAPACITY}"),
        );

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> RegisterMemberRequest {
        RegisterMemberRequest {
            email: "reader@example.com".to_string(),
            username: "bookworm42".to_string(),
            password: "Tr0ub4dor&3xyz".to_string(),
            phone: Some("(555) 123-4567".to_string()),
        }
    }

    #[test]
    fn test_register_member_valid() {
        assert!(member().validate().is_ok());
    }

    #[test]
    fn test_register_member_sanitizes_email() {
        let mut req = member();
        req.email = "  READER@Example.COM  ".to_string();
        req.sanitize();
        assert_eq!(req.email, "reader@example.com");
    }

    #[test]
    fn test_register_member_collects_all_errors() {
        let req = RegisterMemberRequest {
            email: "bad".to_string(),
            username: "_x".to_string(),
            password: "short".to_string(),
            phone: Some("12".to_string()),
        };

        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        for field in ["email", "username", "password", "phone"] {
            assert!(errors.iter().any(|e| e.field == field), "missing {field}");
        }
    }

    #[test]
    fn test_register_member_phone_optional() {
        let mut req = member();
        req.phone = None;
        assert!(req.validate().is_ok());

        req.phone = Some("   ".to_string());
        req.sanitize();
        assert_eq!(req.phone, None);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_event_valid() {
        let req = CreateEventRequest {
            title: "Summer Reading Kickoff".to_string(),
            event_date: "2026-06-01".to_string(),
            capacity: 40,
            description: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_event_sanitizes_title() {
        let mut req = CreateEventRequest {
            title: "  <b>Poetry Night</b>  ".to_string(),
            event_date: " 2026-03-10 ".to_string(),
            capacity: 25,
            description: Some("  Bring your own <verse>  ".to_string()),
        };
        req.sanitize();

        assert_eq!(req.title, "&lt;b&gt;Poetry Night&lt;&#x2F;b&gt;");
        assert_eq!(req.event_date, "2026-03-10");
        assert_eq!(
            req.description,
            Some("Bring your own &lt;verse&gt;".to_string())
        );
    }

    #[test]
    fn test_create_event_bad_date_and_capacity() {
        let req = CreateEventRequest {
            title: "Overbooked".to_string(),
            event_date: "2026-02-30".to_string(),
            capacity: 9000,
            description: None,
        };

        let errors = req.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "event_date"));
        assert!(errors
            .iter()
            .any(|e| e.field == "capacity" && e.message == "Must be at most 500"));
    }
}

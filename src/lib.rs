//! Input Validation & Sanitization
//!
//! This crate provides input validation and sanitization for the
//! Bibliotheca library-management API.
//!
//! # Overview
//!
//! The validation system consists of four components:
//!
//! 1. **Sanitizers** - pure functions that clean a raw string (strip control
//!    characters, escape HTML, enforce length)
//! 2. **Validators** - total per-type functions (email, username, password,
//!    phone, integer, decimal, date, enum, JSON, file path) returning the
//!    normalized value or a field failure
//! 3. **Rule sets** - declarative field-name-to-rule maps checked against a
//!    JSON body in a single pass, accumulating every violation
//! 4. **Extractors** - Axum integration: `ValidatedJson<T>` for typed
//!    bodies and `RuleValidated` for rule-set-driven routes
//!
//! Everything is synchronous and free of shared mutable state: validators
//! are referentially transparent, and a `RuleSet` behind an `Arc` can serve
//! any number of request handlers concurrently.
//!
//! # Usage
//!
//! ## Typed bodies
//!
//! ```ignore
//! use bibliotheca_validation::{ValidatedJson, RegisterMemberRequest};
//!
//! pub async fn register_member(
//!     ValidatedJson(req): ValidatedJson<RegisterMemberRequest>,
//! ) -> impl IntoResponse {
//!     // req is sanitized and validated
//! }
//! ```
//!
//! ## Declarative rule sets
//!
//! ```ignore
//! use bibliotheca_validation::{Rule, RuleSet, RuleValidated};
//!
//! let rules = Arc::new(
//!     RuleSet::new()
//!         .rule("email", Rule::Email)
//!         .rule("age", Rule::Integer { options: IntegerOptions { min: Some(0), max: Some(120) } }),
//! );
//!
//! let app = Router::new()
//!     .route("/members", post(create_member))
//!     .layer(Extension(rules));
//!
//! pub async fn create_member(RuleValidated(body): RuleValidated) -> impl IntoResponse {
//!     // body is a freshly-built, sanitized copy of the request body
//! }
//! ```
//!
//! ## Validation error response
//!
//! When validation fails, a 400 Bad Request is returned listing every
//! violated field:
//!
//! ```json
//! {
//!   "error": "ValidationError",
//!   "message": "Validation failed",
//!   "errors": [
//!     {"field": "email", "message": "Must be a valid email address"},
//!     {"field": "password", "message": "Password is too weak",
//!      "suggestions": ["Add uppercase letters", "Add digits"]}
//!   ],
//!   "code": 400,
//!   "timestamp": "2026-08-31T10:30:00Z",
//!   "correlation_id": "uuid-here"
//! }
//! ```

pub mod extractors;
pub mod requests;
pub mod rules;
pub mod sanitizers;
pub mod validators;

// Re-export commonly used items
pub use extractors::{
    FieldError, RuleValidated, Validatable, ValidatedJson, ValidationBuilder, ValidationError,
    ValidationErrorResponse,
};
pub use requests::{CreateEventRequest, RegisterMemberRequest};
pub use rules::{DecimalOptions, IntegerOptions, Rule, RuleConfigError, RuleSet};
pub use sanitizers::{sanitize_sql, sanitize_string, SanitizeOptions};
pub use validators::{
    validate_date, validate_decimal, validate_email, validate_enum, validate_file_path,
    validate_integer, validate_json, validate_password, validate_phone, validate_username,
    FieldFailure,
};

//! Axum extractors for validated input
//!
//! Two ways in: `ValidatedJson<T>` for statically-typed request bodies that
//! implement [`Validatable`], and [`RuleValidated`] for bodies checked
//! against a declarative [`RuleSet`](crate::rules::RuleSet) attached to the
//! route as an `Extension<Arc<RuleSet>>`.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::rules::RuleSet;
use crate::validators::FieldFailure;

/// A field-level validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestions: vec![],
        }
    }

    pub fn from_failure(field: impl Into<String>, failure: FieldFailure) -> Self {
        Self {
            field: field.into(),
            message: failure.message,
            suggestions: failure.suggestions,
        }
    }
}

/// Validation error response body
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub message: String,
    pub errors: Vec<FieldError>,
    pub code: u16,
    pub timestamp: String,
    pub correlation_id: String,
}

impl ValidationErrorResponse {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self {
            error: "ValidationError".to_string(),
            message: "Validation failed".to_string(),
            errors,
            code: 400,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            correlation_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Accumulated validation failures, convertible to a 400 response.
#[derive(Debug)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }
}

impl axum::response::IntoResponse for ValidationError {
    fn into_response(self) -> axum::response::Response {
        let response = ValidationErrorResponse::new(self.errors);
        (StatusCode::BAD_REQUEST, Json(response)).into_response()
    }
}

/// Trait for request types that can be sanitized and validated
pub trait Validatable: Sized {
    /// Sanitize the data in-place (trim, normalize, escape)
    fn sanitize(&mut self);

    /// Validate the data and return any field errors
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// JSON extractor that sanitizes and validates the deserialized body.
///
/// Drop-in replacement for `Json<T>`: parses, calls
/// [`Validatable::sanitize`], then [`Validatable::validate`], and rejects
/// with a structured 400 listing every failed field.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validatable + Send,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut data) = Json::<T>::from_request(req, state)
            .await
            .map_err(describe_json_rejection)?;

        data.sanitize();
        data.validate().map_err(ValidationError::new)?;

        Ok(ValidatedJson(data))
    }
}

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::DerefMut for ValidatedJson<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Body extractor driven by a declarative [`RuleSet`].
///
/// The rule set is read from the request extensions, so attach it to the
/// route with `.layer(Extension(Arc::new(rules)))`. On success the handler
/// receives a freshly-built sanitized body; the raw body is never mutated.
pub struct RuleValidated(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for RuleValidated
where
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let rules = req
            .extensions()
            .get::<Arc<RuleSet>>()
            .cloned()
            .ok_or_else(|| {
                ValidationError::single("body", "Validation rules are not configured for this route")
            })?;

        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(describe_json_rejection)?;

        let sanitized = rules.check(&body)?;
        Ok(RuleValidated(sanitized))
    }
}

fn describe_json_rejection(err: JsonRejection) -> ValidationError {
    let message = match err {
        JsonRejection::JsonDataError(e) => format!("Invalid JSON data: {}", e.body_text()),
        JsonRejection::JsonSyntaxError(e) => format!("JSON syntax error: {}", e.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            "Content-Type must be application/json".to_string()
        }
        _ => "Failed to read request body".to_string(),
    };
    ValidationError::single("body", message)
}

/// Builder for accumulating validation errors across fields
#[derive(Debug, Default)]
pub struct ValidationBuilder {
    errors: Vec<FieldError>,
}

impl ValidationBuilder {
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    /// Run a validator and record its failure, discarding the parsed value.
    pub fn check<T, F>(&mut self, field: &str, validator: F) -> &mut Self
    where
        F: FnOnce() -> Result<T, FieldFailure>,
    {
        if let Err(failure) = validator() {
            self.errors.push(FieldError::from_failure(field, failure));
        }
        self
    }

    /// Add an error directly
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    /// Add an error if the condition holds
    pub fn check_condition(
        &mut self,
        condition: bool,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        if condition {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// Finish building and return the accumulated result
    pub fn build(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

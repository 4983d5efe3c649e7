//! Declarative rule sets
//!
//! A [`RuleSet`] maps body field names to [`Rule`]s and checks a JSON body
//! against them in a single stateless pass, accumulating every failure
//! instead of stopping at the first. On success it returns a *new* sanitized
//! body; the caller's input is never mutated.
//!
//! Rule sets deserialize from JSON configuration, e.g.:
//!
//! ```json
//! {
//!   "email": { "type": "email" },
//!   "age": { "type": "integer", "options": { "min": 0, "max": 120 } },
//!   "category": { "type": "enum", "allowed_values": ["book", "cd", "movie"] }
//! }
//! ```
//!
//! A rule whose `type` is not recognized fails deserialization outright, so
//! a typo in configuration is a startup error rather than a field that is
//! silently never validated.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::extractors::{FieldError, ValidationError};
use crate::sanitizers::{sanitize_string, SanitizeOptions};
use crate::validators::{
    check_decimal_bounds, check_integer_bounds, validate_date, validate_decimal, validate_email,
    validate_enum, validate_file_path, validate_integer, validate_json, validate_password,
    validate_phone, validate_username, FieldFailure,
};

/// Bounds for an `integer` rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IntegerOptions {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// Bounds and rounding for a `decimal` rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DecimalOptions {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub decimals: Option<u32>,
}

/// How a single named field must be validated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Free-text field, cleaned with [`sanitize_string`].
    String {
        #[serde(default)]
        options: SanitizeOptions,
    },
    Email,
    Username,
    Password,
    Phone,
    Integer {
        #[serde(default)]
        options: IntegerOptions,
    },
    Decimal {
        #[serde(default)]
        options: DecimalOptions,
    },
    Date,
    Enum {
        allowed_values: Vec<String>,
    },
    Json,
    FilePath,
}

/// Rule-set configuration error. Raised when loading, never per-request.
#[derive(Debug, Error)]
pub enum RuleConfigError {
    #[error("invalid rule set: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rule for field `{field}`: enum rule requires a non-empty allowed_values list")]
    EmptyEnum { field: String },
}

/// A mapping from field name to [`Rule`].
///
/// Immutable once built and free of interior mutability, so a single
/// `Arc<RuleSet>` can serve every request handler concurrently.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<String, Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for a field, replacing any existing rule for it.
    pub fn rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Load a rule set from JSON configuration and verify it.
    pub fn from_json(raw: &str) -> Result<Self, RuleConfigError> {
        let set: RuleSet = serde_json::from_str(raw)?;
        set.verify()?;
        Ok(set)
    }

    /// Verify rules that are well-typed but misconfigured. Call this at
    /// startup when building rule sets in code; [`RuleSet::from_json`] calls
    /// it for you.
    pub fn verify(&self) -> Result<(), RuleConfigError> {
        for (field, rule) in &self.rules {
            if let Rule::Enum { allowed_values } = rule {
                if allowed_values.is_empty() {
                    return Err(RuleConfigError::EmptyEnum {
                        field: field.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check a JSON body against the rule set.
    ///
    /// Every rule is applied even after a failure, so the returned error
    /// lists the full set of violations. On success the result is a new map:
    /// normalizing rules replace their field value with the cleaned one, and
    /// body fields without a rule pass through untouched.
    pub fn check(&self, body: &Value) -> Result<Map<String, Value>, ValidationError> {
        let Some(object) = body.as_object() else {
            return Err(ValidationError::single(
                "body",
                "Request body must be a JSON object",
            ));
        };

        let mut sanitized = object.clone();
        let mut errors = Vec::new();

        for (field, rule) in &self.rules {
            match apply_rule(rule, object.get(field)) {
                Ok(Some(clean)) => {
                    sanitized.insert(field.clone(), clean);
                }
                Ok(None) => {}
                Err(failure) => {
                    tracing::debug!(field = %field, message = %failure.message, "field failed validation");
                    errors.push(FieldError::from_failure(field.as_str(), failure));
                }
            }
        }

        if errors.is_empty() {
            Ok(sanitized)
        } else {
            tracing::warn!(error_count = errors.len(), "request body failed validation");
            Err(ValidationError::new(errors))
        }
    }
}

/// Apply one rule to one (possibly absent) body value.
///
/// `Ok(Some(v))` replaces the field in the sanitized body, `Ok(None)` keeps
/// the original value. Only the normalizing rule kinds (string, email,
/// username, phone, integer, decimal, date) replace; password, enum, JSON
/// and file-path rules check without rewriting.
fn apply_rule(rule: &Rule, value: Option<&Value>) -> Result<Option<Value>, FieldFailure> {
    match rule {
        // Fails closed: a present but non-string value sanitizes to "".
        Rule::String { options } => {
            let Some(value) = value else {
                return Err(FieldFailure::new("This field is required"));
            };
            let raw = value.as_str().unwrap_or("");
            Ok(Some(Value::String(sanitize_string(raw, options))))
        }
        Rule::Email => {
            let raw = require_str(value)?;
            validate_email(raw).map(|email| Some(Value::String(email)))
        }
        Rule::Username => {
            let raw = require_str(value)?;
            validate_username(raw).map(|name| Some(Value::String(name)))
        }
        Rule::Password => {
            let raw = require_str(value)?;
            validate_password(raw).map(|_| None)
        }
        Rule::Phone => match value {
            None | Some(Value::Null) => Ok(Some(Value::Null)),
            Some(Value::String(raw)) => validate_phone(Some(raw.as_str())).map(|normalized| {
                Some(normalized.map_or(Value::Null, Value::String))
            }),
            Some(_) => Err(FieldFailure::new("Must be a string")),
        },
        Rule::Integer { options } => {
            let value = match value {
                None => return Err(FieldFailure::new("This field is required")),
                Some(Value::String(raw)) => validate_integer(raw, options.min, options.max)?,
                Some(Value::Number(n)) => {
                    let n = n
                        .as_i64()
                        .ok_or_else(|| FieldFailure::new("Must be a whole number"))?;
                    check_integer_bounds(n, options.min, options.max)?
                }
                Some(_) => return Err(FieldFailure::new("Must be a whole number")),
            };
            Ok(Some(Value::Number(Number::from(value))))
        }
        Rule::Decimal { options } => {
            let value = match value {
                None => return Err(FieldFailure::new("This field is required")),
                Some(Value::String(raw)) => {
                    validate_decimal(raw, options.min, options.max, options.decimals)?
                }
                Some(Value::Number(n)) => {
                    let n = n
                        .as_f64()
                        .ok_or_else(|| FieldFailure::new("Must be a number"))?;
                    check_decimal_bounds(n, options.min, options.max, options.decimals)?
                }
                Some(_) => return Err(FieldFailure::new("Must be a number")),
            };
            let number = Number::from_f64(value)
                .ok_or_else(|| FieldFailure::new("Must be a finite number"))?;
            Ok(Some(Value::Number(number)))
        }
        Rule::Date => {
            let raw = require_str(value)?;
            validate_date(raw).map(|date| Some(Value::String(date.to_string())))
        }
        Rule::Enum { allowed_values } => {
            let raw = require_str(value)?;
            validate_enum(raw, allowed_values).map(|_| None)
        }
        Rule::Json => {
            let raw = require_str(value)?;
            validate_json(raw).map(|_| None)
        }
        Rule::FilePath => {
            let raw = require_str(value)?;
            validate_file_path(raw).map(|_| None)
        }
    }
}

fn require_str(value: Option<&Value>) -> Result<&str, FieldFailure> {
    match value {
        None | Some(Value::Null) => Err(FieldFailure::new("This field is required")),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(FieldFailure::new("Must be a string")),
    }
}

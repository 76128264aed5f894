//! Shared validation helpers for inbound HTTP adapters.

use actix_web::web;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{CourseId, Error, IdentifierValidationError, TransactionId, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidIdentifier,
    InvalidNumber,
    InvalidJson,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidIdentifier => "invalid_identifier",
            ErrorCode::InvalidNumber => "invalid_number",
            ErrorCode::InvalidJson => "invalid_json",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

fn invalid_identifier(field: FieldName, value: &str, err: &IdentifierValidationError) -> Error {
    field_error(
        field,
        format!("{}: {err}", field.as_str()),
        ErrorCode::InvalidIdentifier,
        value,
    )
}

macro_rules! identifier_parser {
    ($fn_name:ident, $ty:ty) => {
        pub(crate) fn $fn_name(value: &str, field: FieldName) -> Result<$ty, Error> {
            <$ty>::new(value).map_err(|err| invalid_identifier(field, value, &err))
        }
    };
}

identifier_parser!(parse_user_id, UserId);
identifier_parser!(parse_course_id, CourseId);
identifier_parser!(parse_transaction_id, TransactionId);

pub(crate) fn parse_decimal(value: &str, field: FieldName) -> Result<f64, Error> {
    value.trim().parse::<f64>().map_err(|_| {
        field_error(
            field,
            format!("{} must be a number", field.as_str()),
            ErrorCode::InvalidNumber,
            value,
        )
    })
}

/// Major-unit amount supplied either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    pub(crate) fn into_major_units(self, field: FieldName) -> Result<f64, Error> {
        match self {
            Self::Number(value) => Ok(value),
            Self::Text(raw) => parse_decimal(&raw, field),
        }
    }
}

pub(crate) fn invalid_json_error(field: FieldName, value: &str, reason: &str) -> Error {
    field_error(
        field,
        format!("{} must be valid JSON: {reason}", field.as_str()),
        ErrorCode::InvalidJson,
        value,
    )
}

/// JSON extractor configuration that reports malformed bodies as
/// `invalid_request` instead of the framework's plain-text 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed JSON body: {err}"))
            .with_details(json!({ "code": ErrorCode::InvalidJson.as_str() }))
            .into()
    })
}

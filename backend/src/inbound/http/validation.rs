//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection is an `invalid_request` error whose `details` name the
//! offending `field`, a machine-readable `code` and, where useful, the
//! rejected `value`.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    DisplayName, Error, ExternalId, OrderValidationError, UnknownVariantError, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    UnknownVariant,
    InvalidAmount,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::UnknownVariant => "unknown_variant",
            ErrorCode::InvalidAmount => "invalid_amount",
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

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

/// Unwrap an optional payload field, failing with `missing_field`.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

fn invalid_value_error(field: FieldName, message: impl Into<String>, value: &str) -> Error {
    ValidationError::new(field.as_str(), message).with_value(ErrorCode::InvalidValue, value)
}

fn user_field_error(field: FieldName, err: &UserValidationError, value: &str) -> Error {
    invalid_value_error(field, err.to_string(), value)
}

pub(crate) fn parse_external_id(value: String, field: FieldName) -> Result<ExternalId, Error> {
    ExternalId::new(value.as_str()).map_err(|err| user_field_error(field, &err, &value))
}

pub(crate) fn parse_display_name(value: String, field: FieldName) -> Result<DisplayName, Error> {
    DisplayName::new(value.as_str()).map_err(|err| user_field_error(field, &err, &value))
}

/// Parse a closed enum label, reporting the accepted kind on failure.
pub(crate) fn parse_variant<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = UnknownVariantError>,
{
    T::from_str(value).map_err(|err| {
        ValidationError::new(field.as_str(), err.to_string())
            .with_value(ErrorCode::UnknownVariant, err.value())
    })
}

/// Convert a JSON number into a fixed-point amount.
pub(crate) fn parse_amount(value: f64, field: FieldName) -> Result<Decimal, Error> {
    Decimal::from_f64(value)
        .map(|amount| amount.normalize())
        .ok_or_else(|| {
            ValidationError::new(field.as_str(), format!("{} must be a finite number", field.0))
                .with_value(ErrorCode::InvalidAmount, value.to_string())
        })
}

/// Map listing validation failures onto the request field they concern.
pub(crate) fn order_validation_error(err: OrderValidationError) -> Error {
    let (field, code) = match err {
        OrderValidationError::NonPositiveAmount
        | OrderValidationError::AmountTooLarge { .. }
        | OrderValidationError::AmountTooPrecise { .. } => ("amount", ErrorCode::InvalidAmount),
        OrderValidationError::EmptyDescription => ("description", ErrorCode::MissingField),
        OrderValidationError::EmptyRequisites => ("seller_requisites", ErrorCode::MissingField),
        OrderValidationError::BuyerIsSeller => ("buyer_id", ErrorCode::InvalidValue),
    };
    ValidationError::new(field, err.to_string()).with_code(code)
}

/// Reject bodies Actix could not deserialise with the standard envelope.
pub(crate) fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {err}"))
        .with_details(json!({ "code": "invalid_json" }))
        .into()
}

/// Reject query strings Actix could not deserialise with the standard
/// envelope.
pub(crate) fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}"))
        .with_details(json!({ "code": "invalid_query" }))
        .into()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::{Currency, ErrorCode as DomainErrorCode};

    fn details(err: &Error) -> &Value {
        err.details().expect("validation errors carry details")
    }

    #[rstest]
    fn missing_fields_name_the_field() {
        let err = require::<String>(None, FieldName::new("buyer_external_id"))
            .expect_err("missing field");
        assert_eq!(err.code(), DomainErrorCode::InvalidRequest);
        assert_eq!(details(&err)["field"], "buyer_external_id");
        assert_eq!(details(&err)["code"], "missing_field");
    }

    #[rstest]
    #[case("", "external id must not be empty")]
    #[case("   ", "external id must not be empty")]
    fn blank_external_ids_are_rejected(#[case] raw: &str, #[case] message: &str) {
        let err = parse_external_id(raw.to_owned(), FieldName::new("external_id"))
            .expect_err("blank id");
        assert_eq!(err.message(), message);
        assert_eq!(details(&err)["code"], "invalid_value");
    }

    #[rstest]
    fn unknown_variants_echo_the_value() {
        let err = parse_variant::<Currency>("DOGE", FieldName::new("currency"))
            .expect_err("unknown currency");
        assert_eq!(err.message(), "unknown currency `DOGE`");
        assert_eq!(details(&err)["code"], "unknown_variant");
        assert_eq!(details(&err)["value"], "DOGE");
    }

    #[rstest]
    fn variants_parse_case_insensitively() {
        let currency: Currency =
            parse_variant("ton", FieldName::new("currency")).expect("known currency");
        assert_eq!(currency, Currency::Ton);
    }

    #[rstest]
    #[case(10.0, Decimal::TEN)]
    #[case(0.5, Decimal::new(5, 1))]
    fn amounts_convert_to_decimals(#[case] raw: f64, #[case] expected: Decimal) {
        assert_eq!(
            parse_amount(raw, FieldName::new("amount")).expect("finite"),
            expected
        );
    }

    #[rstest]
    fn non_finite_amounts_are_rejected() {
        let err = parse_amount(f64::NAN, FieldName::new("amount")).expect_err("NaN");
        assert_eq!(details(&err)["code"], "invalid_amount");
    }

    #[rstest]
    fn invalid_uuids_echo_the_value() {
        let err = parse_uuid("not-a-uuid", FieldName::new("id")).expect_err("bad uuid");
        assert_eq!(details(&err)["code"], "invalid_uuid");
        assert_eq!(details(&err)["value"], "not-a-uuid");
    }

    #[rstest]
    fn listing_errors_point_at_their_field() {
        let err = order_validation_error(OrderValidationError::NonPositiveAmount);
        assert_eq!(details(&err)["field"], "amount");
        assert_eq!(details(&err)["code"], "invalid_amount");
    }
}

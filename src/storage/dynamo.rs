//! Helpers for reading and writing DynamoDB attribute maps.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::errors::ReportError;

pub type Item = HashMap<String, AttributeValue>;

#[must_use]
pub fn num<T: ToString>(value: T) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

#[must_use]
pub fn string(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

#[must_use]
pub fn optional_string(value: Option<&str>) -> AttributeValue {
    match value {
        Some(v) => AttributeValue::S(v.to_string()),
        None => AttributeValue::Null(true),
    }
}

fn missing(name: &str) -> ReportError {
    ReportError::ParseError(format!("missing attribute `{name}`"))
}

/// # Errors
///
/// Returns an error if the attribute is absent or not a string.
pub fn get_string(item: &Item, name: &str) -> Result<String, ReportError> {
    item.get(name)
        .ok_or_else(|| missing(name))?
        .as_s()
        .cloned()
        .map_err(|_| ReportError::ParseError(format!("attribute `{name}` is not a string")))
}

/// Absent and NULL attributes both read as `None`.
#[must_use]
pub fn get_optional_string(item: &Item, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

/// # Errors
///
/// Returns an error if the attribute is absent or not a number of type `T`.
pub fn get_number<T>(item: &Item, name: &str) -> Result<T, ReportError>
where
    T: std::str::FromStr,
{
    let raw = item
        .get(name)
        .ok_or_else(|| missing(name))?
        .as_n()
        .map_err(|_| ReportError::ParseError(format!("attribute `{name}` is not a number")))?;
    parse_number(raw, name)
}

/// # Errors
///
/// Returns an error if `raw` does not parse as `T`.
pub fn parse_number<T>(raw: &str, name: &str) -> Result<T, ReportError>
where
    T: std::str::FromStr,
{
    raw.parse::<T>()
        .map_err(|_| ReportError::ParseError(format!("attribute `{name}` has bad number {raw:?}")))
}

#[must_use]
pub fn get_bool(item: &Item, name: &str) -> Option<bool> {
    item.get(name).and_then(|v| v.as_bool().ok()).copied()
}

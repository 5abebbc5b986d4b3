//! Request body validation.
//!
//! Every create/update body arrives as a raw JSON object ([`Payload`]) and is
//! turned into a validated model input by one function per request kind.
//! All field problems are collected into [`FieldErrors`] before failing, so a
//! client sees every bad field at once. Nothing here touches the database;
//! handlers call these before any write.
//!
//! Field rules:
//!
//! | entity  | field         | rule                                          |
//! |---------|---------------|-----------------------------------------------|
//! | user    | `name`        | required string, 1-120 chars                  |
//! | user    | `email`       | required, [`Email`] shape                     |
//! | user    | `address`     | optional string, up to 255 chars              |
//! | product | `name`        | required string, 1-200 chars (or `product_name`) |
//! | product | `price`       | required number, [`Price`] rules             |
//! | product | `description` | optional string, up to 2000 chars             |
//! | order   | `user_id`     | required positive integer                     |
//! | order   | `order_date`  | optional ISO 8601 datetime                    |
//! | order   | `product_ids` | optional list of positive integers (create)   |

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use orders_api_core::{Email, Price, ProductId, UserId};

use crate::models::{
    NewOrder, NewProduct, NewUser, OrderChanges, Patch, ProductChanges, UserChanges,
};

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const UNKNOWN: &str = "Unknown field.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_AN_INTEGER: &str = "Not a valid integer.";
const NOT_A_NUMBER: &str = "Not a valid number.";
const NOT_A_LIST: &str = "Not a valid list.";
const NOT_A_DATETIME: &str = "Not a valid datetime; use ISO 8601 like 2025-08-15T14:30:00.";

/// Older clients send the product name under this key.
const PRODUCT_NAME_ALIAS: &str = "product_name";

/// Keys clients may echo back that are ignored rather than rejected.
const READ_ONLY: &[&str] = &["id"];

const USER_NAME_MAX: usize = 120;
const ADDRESS_MAX: usize = 255;
const PRODUCT_NAME_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 2000;

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A raw JSON object request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One field pulled out of a [`Payload`].
enum Field {
    Absent,
    Null,
    Present(Value),
}

impl Payload {
    fn take(&mut self, key: &str) -> Field {
        match self.0.remove(key) {
            None => Field::Absent,
            Some(Value::Null) => Field::Null,
            Some(value) => Field::Present(value),
        }
    }

    /// Take `key`, or `alias` when `key` is absent. Sending both leaves the
    /// alias behind to be reported as unknown.
    fn take_aliased(&mut self, key: &str, alias: &str) -> Field {
        match self.take(key) {
            Field::Absent => self.take(alias),
            field => field,
        }
    }

    /// Flag every key that no validator consumed.
    fn reject_unknown(self, errors: &mut FieldErrors) {
        for (key, _) in self.0 {
            if !READ_ONLY.contains(&key.as_str()) {
                errors.add(key, UNKNOWN);
            }
        }
    }
}

// =============================================================================
// Entity validators
// =============================================================================

/// Validate a user create body.
///
/// # Errors
///
/// Returns every field problem found.
pub fn new_user(mut body: Payload) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = required(&mut errors, "name", body.take("name"), |v| {
        text(v, 1, USER_NAME_MAX)
    });
    let email = required(&mut errors, "email", body.take("email"), email);
    let address = optional(&mut errors, "address", body.take("address"), |v| {
        text(v, 0, ADDRESS_MAX)
    });
    body.reject_unknown(&mut errors);

    match (name, email, address) {
        (Some(name), Some(email), Some(address)) if errors.is_empty() => Ok(NewUser {
            name,
            email,
            address: address.filter(|a| !a.is_empty()),
        }),
        _ => Err(errors),
    }
}

/// Validate a user update body. Absent fields are kept.
///
/// # Errors
///
/// Returns every field problem found.
pub fn user_changes(mut body: Payload) -> Result<UserChanges, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = patch_required(&mut errors, "name", body.take("name"), |v| {
        text(v, 1, USER_NAME_MAX)
    });
    let email = patch_required(&mut errors, "email", body.take("email"), email);
    let address = patch_nullable(&mut errors, "address", body.take("address"), |v| {
        text(v, 0, ADDRESS_MAX)
    });
    body.reject_unknown(&mut errors);

    match (name, email, address) {
        (Some(name), Some(email), Some(address)) if errors.is_empty() => Ok(UserChanges {
            name,
            email,
            address: blank_to_none(address),
        }),
        _ => Err(errors),
    }
}

/// Validate a product create body.
///
/// # Errors
///
/// Returns every field problem found.
pub fn new_product(mut body: Payload) -> Result<NewProduct, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name_field = body.take_aliased("name", PRODUCT_NAME_ALIAS);
    let name = required(&mut errors, "name", name_field, |v| text(v, 1, PRODUCT_NAME_MAX));
    let price = required(&mut errors, "price", body.take("price"), price);
    let description = optional(&mut errors, "description", body.take("description"), |v| {
        text(v, 0, DESCRIPTION_MAX)
    });
    body.reject_unknown(&mut errors);

    match (name, price, description) {
        (Some(name), Some(price), Some(description)) if errors.is_empty() => Ok(NewProduct {
            name,
            price,
            description: description.filter(|d| !d.is_empty()),
        }),
        _ => Err(errors),
    }
}

/// Validate a product update body. Absent fields are kept.
///
/// # Errors
///
/// Returns every field problem found.
pub fn product_changes(mut body: Payload) -> Result<ProductChanges, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name_field = body.take_aliased("name", PRODUCT_NAME_ALIAS);
    let name = patch_required(&mut errors, "name", name_field, |v| text(v, 1, PRODUCT_NAME_MAX));
    let price = patch_required(&mut errors, "price", body.take("price"), price);
    let description = patch_nullable(&mut errors, "description", body.take("description"), |v| {
        text(v, 0, DESCRIPTION_MAX)
    });
    body.reject_unknown(&mut errors);

    match (name, price, description) {
        (Some(name), Some(price), Some(description)) if errors.is_empty() => {
            Ok(ProductChanges {
                name,
                price,
                description: blank_to_none(description),
            })
        }
        _ => Err(errors),
    }
}

/// Validate an order create body.
///
/// Repeated entries in `product_ids` collapse to one, keeping first-seen order.
///
/// # Errors
///
/// Returns every field problem found.
pub fn new_order(mut body: Payload) -> Result<NewOrder, FieldErrors> {
    let mut errors = FieldErrors::default();

    let user_id = required(&mut errors, "user_id", body.take("user_id"), id::<UserId>);
    let order_date = optional(&mut errors, "order_date", body.take("order_date"), datetime);
    let product_ids = optional(&mut errors, "product_ids", body.take("product_ids"), id_list);
    body.reject_unknown(&mut errors);

    match (user_id, order_date, product_ids) {
        (Some(user_id), Some(order_date), Some(product_ids)) if errors.is_empty() => {
            Ok(NewOrder {
                user_id,
                order_date,
                product_ids: product_ids.unwrap_or_default(),
            })
        }
        _ => Err(errors),
    }
}

/// Validate an order update body. Absent fields are kept.
///
/// # Errors
///
/// Returns every field problem found.
pub fn order_changes(mut body: Payload) -> Result<OrderChanges, FieldErrors> {
    let mut errors = FieldErrors::default();

    let user_id = patch_required(&mut errors, "user_id", body.take("user_id"), id::<UserId>);
    let order_date = patch_required(&mut errors, "order_date", body.take("order_date"), datetime);
    body.reject_unknown(&mut errors);

    match (user_id, order_date) {
        (Some(user_id), Some(order_date)) if errors.is_empty() => Ok(OrderChanges {
            user_id,
            order_date,
        }),
        _ => Err(errors),
    }
}

// =============================================================================
// Presence rules
//
// Each returns `None` after recording an error, so callers can tell a failed
// field from a legitimately empty one.
// =============================================================================

fn required<T>(
    errors: &mut FieldErrors,
    name: &str,
    field: Field,
    parse: impl FnOnce(Value) -> Result<T, String>,
) -> Option<T> {
    match field {
        Field::Absent => {
            errors.add(name, MISSING);
            None
        }
        Field::Null => {
            errors.add(name, NULL);
            None
        }
        Field::Present(value) => record(errors, name, parse(value)),
    }
}

fn optional<T>(
    errors: &mut FieldErrors,
    name: &str,
    field: Field,
    parse: impl FnOnce(Value) -> Result<T, String>,
) -> Option<Option<T>> {
    match field {
        Field::Absent | Field::Null => Some(None),
        Field::Present(value) => record(errors, name, parse(value)).map(Some),
    }
}

fn patch_required<T>(
    errors: &mut FieldErrors,
    name: &str,
    field: Field,
    parse: impl FnOnce(Value) -> Result<T, String>,
) -> Option<Patch<T>> {
    match field {
        Field::Absent => Some(Patch::Keep),
        Field::Null => {
            errors.add(name, NULL);
            None
        }
        Field::Present(value) => record(errors, name, parse(value)).map(Patch::Set),
    }
}

fn patch_nullable<T>(
    errors: &mut FieldErrors,
    name: &str,
    field: Field,
    parse: impl FnOnce(Value) -> Result<T, String>,
) -> Option<Patch<Option<T>>> {
    match field {
        Field::Absent => Some(Patch::Keep),
        Field::Null => Some(Patch::Set(None)),
        Field::Present(value) => record(errors, name, parse(value)).map(|v| Patch::Set(Some(v))),
    }
}

fn record<T>(errors: &mut FieldErrors, name: &str, result: Result<T, String>) -> Option<T> {
    result.map_err(|message| errors.add(name, message)).ok()
}

fn blank_to_none(patch: Patch<Option<String>>) -> Patch<Option<String>> {
    match patch {
        Patch::Set(Some(value)) if value.is_empty() => Patch::Set(None),
        other => other,
    }
}

// =============================================================================
// Value parsers
// =============================================================================

/// A trimmed string whose length in characters lies within `min..=max`.
fn text(value: Value, min: usize, max: usize) -> Result<String, String> {
    let Value::String(raw) = value else {
        return Err(NOT_A_STRING.to_owned());
    };

    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(if min == 0 {
            format!("Longer than maximum length {max}.")
        } else {
            format!("Length must be between {min} and {max}.")
        });
    }
    Ok(trimmed.to_owned())
}

fn email(value: Value) -> Result<Email, String> {
    let Value::String(raw) = value else {
        return Err(NOT_A_STRING.to_owned());
    };
    Email::parse(raw.trim()).map_err(|e| format!("Not a valid email address: {e}."))
}

/// A JSON number, or a numeric string, checked against [`Price`] rules.
fn price(value: Value) -> Result<Price, String> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => return Err(NOT_A_NUMBER.to_owned()),
    };
    if !is_decimal_literal(&raw) {
        return Err(NOT_A_NUMBER.to_owned());
    }

    let amount = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| NOT_A_NUMBER.to_owned())?;

    Price::parse(amount).map_err(|e| format!("{}.", capitalize(&e.to_string())))
}

/// `[+-]digits[.digits][e[+-]digits]`, with digits on at least one side of
/// the point. `Decimal::from_str` alone also accepts `_` separators.
fn is_decimal_literal(raw: &str) -> bool {
    fn digits(s: &str) -> bool {
        s.bytes().all(|b| b.is_ascii_digit())
    }

    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mantissa_ok =
        digits(whole) && digits(fraction) && !(whole.is_empty() && fraction.is_empty());
    let exponent_ok = exponent.is_none_or(|e| {
        let e = e.strip_prefix(['+', '-']).unwrap_or(e);
        !e.is_empty() && digits(e)
    });
    mantissa_ok && exponent_ok
}

/// A positive `i32` id.
fn id<I: From<i32>>(value: Value) -> Result<I, String> {
    let Value::Number(n) = value else {
        return Err(NOT_AN_INTEGER.to_owned());
    };
    let raw = n.as_i64().ok_or_else(|| NOT_AN_INTEGER.to_owned())?;
    match i32::try_from(raw) {
        Ok(id) if id > 0 => Ok(I::from(id)),
        _ => Err("Must be a positive integer id.".to_owned()),
    }
}

fn id_list(value: Value) -> Result<Vec<ProductId>, String> {
    let Value::Array(items) = value else {
        return Err(NOT_A_LIST.to_owned());
    };

    let mut ids: Vec<ProductId> = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let id = id::<ProductId>(item).map_err(|e| format!("Item {index}: {e}"))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// RFC 3339, or a naive ISO 8601 date/datetime taken as UTC.
fn datetime(value: Value) -> Result<DateTime<Utc>, String> {
    let Value::String(raw) = value else {
        return Err(NOT_A_DATETIME.to_owned());
    };
    parse_datetime(raw.trim()).ok_or_else(|| NOT_A_DATETIME.to_owned())
}

pub(crate) fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

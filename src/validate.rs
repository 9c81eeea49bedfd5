//! Parsing of raw operator input into typed values

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{
    errors::{Error, Result},
    types::{rescaled, DECIMAL_SCALE},
};

/// Minimum number of digits in a non-blank phone number
pub const MIN_PHONE_DIGITS: usize = 10;

/// Parses a positive integer identifier.
///
/// # Errors
/// [`Error::NotNumeric`] for text that is not an integer,
/// [`Error::NonPositiveId`] for zero or negative values
pub fn parse_id<I: From<u32>>(field: &'static str, text: &str) -> Result<I> {
    let text = text.trim();
    let value: i64 = text.parse().map_err(|_| Error::NotNumeric {
        field,
        value: text.to_owned(),
    })?;
    if value <= 0 {
        return Err(Error::NonPositiveId(field));
    }
    let value = u32::try_from(value).map_err(|_| Error::NotNumeric {
        field,
        value: text.to_owned(),
    })?;
    Ok(I::from(value))
}

/// Parses an identifier that the operator may leave blank.
///
/// # Errors
/// See [`parse_id`]
pub fn parse_optional_id<I: From<u32>>(field: &'static str, text: &str) -> Result<Option<I>> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        parse_id(field, text).map(Some)
    }
}

/// Parses a decimal amount, rescaled to the ledger's precision.
///
/// Sign is not checked here; the ledger rejects negative amounts itself.
///
/// # Errors
/// [`Error::NotNumeric`] for text that is not a decimal number,
/// [`Error::TooManyDecimals`] for amounts finer than [`DECIMAL_SCALE`]
pub fn parse_amount(field: &'static str, text: &str) -> Result<Decimal> {
    let text = text.trim();
    let amount = Decimal::from_str(text).map_err(|_| Error::NotNumeric {
        field,
        value: text.to_owned(),
    })?;
    ledger_scale(field, amount)
}

/// Rescales an amount to [`DECIMAL_SCALE`] places without rounding.
///
/// Trailing zeros beyond the scale are fine (`1.500`); significant digits are not.
///
/// # Errors
/// [`Error::TooManyDecimals`] if rescaling would change the value
pub fn ledger_scale(field: &'static str, amount: Decimal) -> Result<Decimal> {
    if amount.normalize().scale() > DECIMAL_SCALE {
        return Err(Error::TooManyDecimals {
            field,
            amount,
            places: DECIMAL_SCALE,
        });
    }
    Ok(rescaled(amount))
}

/// Parses an amount that the operator may leave blank.
///
/// # Errors
/// See [`parse_amount`]
pub fn parse_optional_amount(field: &'static str, text: &str) -> Result<Option<Decimal>> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        parse_amount(field, text).map(Some)
    }
}

/// Trims a required text field.
///
/// # Errors
/// [`Error::Empty`] if nothing is left after trimming
pub fn require_text(field: &'static str, text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::Empty(field));
    }
    Ok(text.to_owned())
}

/// Checks a phone number: either blank, or digits with an optional leading `+`.
///
/// # Errors
/// [`Error::InvalidPhone`] when the number is malformed or too short
pub fn normalize_phone(phone: &str) -> Result<String> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Ok(String::new());
    }
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < MIN_PHONE_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidPhone(phone.to_owned()));
    }
    Ok(phone.to_owned())
}

/// Ensures an amount is zero or more.
///
/// # Errors
/// [`Error::NegativeAmount`] for amounts below zero, [`Error::TooManyDecimals`]
pub fn non_negative(field: &'static str, amount: Decimal) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::NegativeAmount { field, amount });
    }
    ledger_scale(field, amount)
}

//! Utility functions for banklink messages.
//!
//! Amount formatting and parsing, and the date formats the bank uses.

use crate::errors::{IpizzaError, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Format of `VK_T_DATE`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Format of `VK_DATETIME` and `VK_T_DATETIME`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Formats an amount with exactly two decimals, as `VK_AMOUNT` expects.
///
/// # Examples
///
/// ```
/// use ipizza_rs::utils::format_amount;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(format_amount(Decimal::from_str("10.5").unwrap()).unwrap(), "10.50");
/// assert_eq!(format_amount(Decimal::from(3)).unwrap(), "3.00");
/// ```
pub fn format_amount(sum: Decimal) -> Result<String> {
    if sum.is_sign_negative() && !sum.is_zero() {
        return Err(IpizzaError::InvalidAmount(format!("Negative amount: {}", sum)));
    }

    let mut rounded = sum.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    Ok(rounded.to_string())
}

/// Parses `VK_AMOUNT`.
///
/// Some banks send a decimal comma.
pub fn parse_amount(value: &str) -> Result<Decimal> {
    let normalized = value.trim().replace(',', ".");
    Decimal::from_str(&normalized)
        .map_err(|e| IpizzaError::InvalidAmount(format!("{}: {}", value, e)))
}

/// Parses `VK_T_DATE` (`dd.mm.yyyy`) as midnight of that day.
pub fn parse_transaction_date(value: &str) -> Result<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| IpizzaError::InvalidDate(value.to_string()))
}

/// Parses `VK_T_DATETIME` and keeps the wall-clock time it states.
pub fn parse_transaction_datetime(value: &str) -> Result<NaiveDateTime> {
    let datetime = DateTime::parse_from_str(value.trim(), DATETIME_FORMAT)?;
    Ok(datetime.naive_local())
}

/// Current local time in `VK_DATETIME` format.
pub fn current_datetime() -> String {
    Local::now().format(DATETIME_FORMAT).to_string()
}

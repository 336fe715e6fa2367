//! Payment Request Model
//!
//! A payment request lives for exactly one call: it is validated from the
//! client's JSON, turned into Stripe Checkout parameters and then dropped.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{PaymentError, Result};

/// Smallest chargeable amount, in cents ($1.00)
pub const MIN_AMOUNT_CENTS: i64 = 100;

/// Line item name shown on the hosted checkout page
pub const PRODUCT_NAME: &str = "Custom Design Payment";

/// Line item description shown on the hosted checkout page
pub const PRODUCT_DESCRIPTION: &str = "Customer-set price for design work.";

/// A validated amount in minor currency units.
///
/// The only way to obtain one is [`Amount::parse`] or [`Amount::from_cents`],
/// so holding an `Amount` means the minimum has been checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Validate a raw integer count of cents
    pub fn from_cents(cents: i64) -> Result<Self> {
        if cents < MIN_AMOUNT_CENTS {
            return Err(PaymentError::InvalidAmount(format!(
                "{cents} is below the minimum of {MIN_AMOUNT_CENTS}"
            )));
        }
        Ok(Self(cents))
    }

    /// Validate the `amount` field of a client request.
    ///
    /// Accepts a JSON integer or a string holding an integer. Fractions are
    /// rejected rather than truncated, so `"150.7"` and `150.7` both fail.
    pub fn parse(raw: Option<&Value>) -> Result<Self> {
        let cents = match raw {
            None | Some(Value::Null) => {
                return Err(PaymentError::InvalidAmount("amount is missing".into()));
            }
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                PaymentError::InvalidAmount(format!("{n} is not a whole number of cents"))
            })?,
            Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| {
                PaymentError::InvalidAmount(format!("{s:?} is not a whole number of cents"))
            })?,
            Some(other) => {
                return Err(PaymentError::InvalidAmount(format!(
                    "expected an integer, got {other}"
                )));
            }
        };

        Self::from_cents(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// One single-item payment to hand to the processor
#[derive(Clone, Debug)]
pub struct PaymentRequest {
    /// Unit amount of the single line item
    pub amount: Amount,

    /// Where Stripe sends the payer after paying
    pub success_url: String,

    /// Where Stripe sends the payer after backing out
    pub cancel_url: String,
}

impl PaymentRequest {
    pub fn new(amount: Amount, success_url: impl Into<String>, cancel_url: impl Into<String>) -> Self {
        Self {
            amount,
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
        }
    }

    /// Build both redirect URLs from this server's public origin
    pub fn for_origin(amount: Amount, origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self::new(amount, format!("{origin}/success"), format!("{origin}/cancel"))
    }
}

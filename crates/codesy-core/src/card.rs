//! Card input and tokenization result types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the four card fields at submission time.
///
/// Values are passed through unvalidated; the tokenization service is the
/// only validator.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInput {
    /// Card number as typed.
    pub number: String,
    /// Expiry month as typed.
    pub exp_month: String,
    /// Expiry year as typed.
    pub exp_year: String,
    /// Security code as typed.
    pub cvc: String,
}

impl CardInput {
    /// Create a card input from the raw field values.
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        exp_month: impl Into<String>,
        exp_year: impl Into<String>,
        cvc: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            exp_month: exp_month.into(),
            exp_year: exp_year.into(),
            cvc: cvc.into(),
        }
    }

    /// Last four digits of the number, for logs.
    #[must_use]
    pub fn last4(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(char::is_ascii_digit).collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

impl fmt::Debug for CardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardInput")
            .field("number", &format_args!("****{}", self.last4()))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &"***")
            .finish()
    }
}

/// Single-use token returned by the tokenization service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardToken {
    /// Opaque token identifier (`tok_...`).
    pub id: String,
    /// Creation time.
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub created: Option<DateTime<Utc>>,
    /// Whether the token was created with a live key.
    #[serde(default)]
    pub livemode: bool,
    /// Non-sensitive card details.
    #[serde(default)]
    pub card: Option<CardSummary>,
}

impl CardToken {
    /// Create a token with only an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created: None,
            livemode: false,
            card: None,
        }
    }
}

/// Card details the tokenization service echoes back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardSummary {
    /// Card brand (e.g. "Visa").
    #[serde(default)]
    pub brand: Option<String>,
    /// Last four digits.
    #[serde(default)]
    pub last4: Option<String>,
    /// Expiry month.
    #[serde(default)]
    pub exp_month: Option<u32>,
    /// Expiry year.
    #[serde(default)]
    pub exp_year: Option<u32>,
}

/// Message shown when the payment processor could not be reached.
pub const TRANSPORT_ERROR_MESSAGE: &str =
    "There was an error processing your card. Please try again.";

/// Tokenization failed; `message` is meant for the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct TokenizationError {
    /// Human-readable message.
    pub message: String,
    /// Stripe error type (e.g. `card_error`).
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    /// Stripe error code (e.g. `incorrect_number`).
    #[serde(default)]
    pub code: Option<String>,
    /// The parameter the error relates to.
    #[serde(default)]
    pub param: Option<String>,
    /// Transport failure behind the error, for logs only.
    #[serde(skip)]
    pub detail: Option<String>,
}

impl TokenizationError {
    /// Create an error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: None,
            code: None,
            param: None,
            detail: None,
        }
    }

    /// Error for a request that never produced a tokenization response.
    ///
    /// The user sees a generic message; `err` is kept in `detail`.
    #[must_use]
    pub fn transport(err: impl fmt::Display) -> Self {
        Self {
            message: TRANSPORT_ERROR_MESSAGE.to_string(),
            error_type: Some("api_connection_error".to_string()),
            code: None,
            param: None,
            detail: Some(err.to_string()),
        }
    }
}

//! Fee quotes for offers and payouts.
//!
//! Offers are charged to the bidder's card with the codesy fee and the Stripe
//! processing fee added on top. Payouts go to the claimant with the PayPal
//! and codesy fees taken out. Every fee is rounded up to the next cent.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// codesy fee in tenths of a percent (2.5%).
pub const CODESY_FEE_PER_MILLE: i64 = 25;

/// Stripe percentage fee in tenths of a percent (2.9%).
pub const STRIPE_FEE_PER_MILLE: i64 = 29;

/// Stripe fixed fee per transaction, in cents.
pub const STRIPE_TRANSACTION_FEE_CENTS: i64 = 30;

/// PayPal fixed fee per payout, in cents.
pub const PAYPAL_PAYOUT_FEE_CENTS: i64 = 25;

/// Largest amount a bid, offer or payout can carry ($9,999.99).
pub const MAX_AMOUNT_CENTS: i64 = 999_999;

fn div_ceil(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}

fn codesy_fee(amount_cents: i64) -> i64 {
    div_ceil(amount_cents * CODESY_FEE_PER_MILLE, 1000)
}

fn check_range(amount_cents: i64, what: &str) -> Result<(), CoreError> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&amount_cents) {
        return Err(CoreError::InvalidAmount(format!(
            "{what} must be between 0.00 and {}, got {}",
            format_usd(MAX_AMOUNT_CENTS),
            format_usd(amount_cents)
        )));
    }
    Ok(())
}

/// What a bidder's card is charged for an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCharge {
    /// The offer itself.
    pub offer_cents: i64,
    /// codesy's fee.
    pub codesy_fee_cents: i64,
    /// Stripe's processing fee, grossed up so the charge covers it.
    pub stripe_fee_cents: i64,
}

impl OfferCharge {
    /// Quote the charge for an offer.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] if the offer is not positive or is
    /// above [`MAX_AMOUNT_CENTS`].
    pub fn for_offer(offer_cents: i64) -> Result<Self, CoreError> {
        check_range(offer_cents, "offer")?;
        if offer_cents == 0 {
            return Err(CoreError::InvalidAmount("offer must be positive".into()));
        }

        let codesy_fee_cents = codesy_fee(offer_cents);
        let subtotal = offer_cents + codesy_fee_cents;
        // (subtotal + fixed) / (1 - pct) - subtotal, in tenths of a percent
        let stripe_fee_cents = div_ceil(
            subtotal * STRIPE_FEE_PER_MILLE + STRIPE_TRANSACTION_FEE_CENTS * 1000,
            1000 - STRIPE_FEE_PER_MILLE,
        );

        Ok(Self {
            offer_cents,
            codesy_fee_cents,
            stripe_fee_cents,
        })
    }

    /// Sum of all fees.
    #[must_use]
    pub const fn fees_cents(&self) -> i64 {
        self.codesy_fee_cents + self.stripe_fee_cents
    }

    /// Total charged to the card.
    #[must_use]
    pub const fn charge_cents(&self) -> i64 {
        self.offer_cents + self.fees_cents()
    }
}

/// Amount still to charge when a bidder raises their offer.
///
/// Returns `None` when nothing should be charged: the new total is zero or
/// does not exceed what was already charged successfully.
#[must_use]
pub fn incremental_offer(new_total_cents: i64, already_paid_cents: i64) -> Option<i64> {
    if new_total_cents <= 0 {
        return None;
    }
    if already_paid_cents > 0 {
        return (new_total_cents > already_paid_cents)
            .then(|| new_total_cents - already_paid_cents);
    }
    Some(new_total_cents)
}

/// What a claimant receives for a fixed issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutBreakdown {
    /// The claimant's ask.
    pub ask_cents: i64,
    /// Every offer the claimant has made, refunded with the payout.
    pub refund_cents: i64,
    /// PayPal's fixed fee.
    pub paypal_fee_cents: i64,
    /// codesy's fee on the gross payout.
    pub codesy_fee_cents: i64,
}

impl PayoutBreakdown {
    /// Quote a payout.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] if either amount is negative or
    /// above [`MAX_AMOUNT_CENTS`].
    pub fn for_claim(ask_cents: i64, refund_cents: i64) -> Result<Self, CoreError> {
        check_range(ask_cents, "ask")?;
        check_range(refund_cents, "refund")?;

        Ok(Self {
            ask_cents,
            refund_cents,
            paypal_fee_cents: PAYPAL_PAYOUT_FEE_CENTS,
            codesy_fee_cents: codesy_fee(ask_cents + refund_cents),
        })
    }

    /// Ask plus refund.
    #[must_use]
    pub const fn gross_cents(&self) -> i64 {
        self.ask_cents + self.refund_cents
    }

    /// Sum of all fees.
    #[must_use]
    pub const fn fees_cents(&self) -> i64 {
        self.paypal_fee_cents + self.codesy_fee_cents
    }

    /// Amount sent to the claimant. Negative when fees exceed the gross.
    #[must_use]
    pub const fn net_cents(&self) -> i64 {
        self.gross_cents() - self.fees_cents()
    }
}

/// Parse a dollar amount such as `"10"`, `"10.5"` or `"10.50"` into cents.
///
/// # Errors
///
/// Returns [`CoreError::InvalidAmount`] for negative values, more than two
/// decimal places, non-digit characters, or values above [`MAX_AMOUNT_CENTS`].
pub fn parse_usd_cents(input: &str) -> Result<i64, CoreError> {
    let invalid = || CoreError::InvalidAmount(format!("{input:?} is not a dollar amount"));

    let s = input.trim();
    let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
    if (whole.is_empty() && fraction.is_empty())
        || fraction.len() > 2
        || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(invalid)?;
    check_range(cents, "amount")?;
    Ok(cents)
}

/// Format cents as a dollar string, e.g. `1087` -> `"10.87"`.
#[must_use]
pub fn format_usd(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

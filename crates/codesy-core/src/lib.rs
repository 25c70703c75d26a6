//! Core types for the codesy checkout flow.
//!
//! This crate provides the foundational types shared by the HTTP clients and
//! the checkout handler:
//!
//! - **Identifiers**: `UserId`, `SubmissionId`
//! - **Session**: `SessionContext`, `CsrfToken`, `PublishableKey`
//! - **Card data**: `CardInput`, `CardToken`, `TokenizationError`
//! - **Flow**: `SubmitState`, `SubmissionPath`
//! - **Fees**: `OfferCharge`, `PayoutBreakdown`
//!
//! # Money
//!
//! All amounts are `i64` integer cents. Fees are always rounded up to the next
//! cent.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod card;
pub mod error;
pub mod fees;
pub mod ids;
pub mod session;
pub mod state;

pub use card::{
    CardInput, CardSummary, CardToken, TokenizationError, TRANSPORT_ERROR_MESSAGE,
};
pub use error::{CoreError, Result};
pub use fees::{
    incremental_offer, parse_usd_cents, format_usd, OfferCharge, PayoutBreakdown,
    CODESY_FEE_PER_MILLE, PAYPAL_PAYOUT_FEE_CENTS, STRIPE_FEE_PER_MILLE,
    STRIPE_TRANSACTION_FEE_CENTS,
};
pub use ids::{IdError, SubmissionId, UserId};
pub use session::{CsrfToken, PublishableKey, SessionContext};
pub use state::{SubmissionPath, SubmitState};

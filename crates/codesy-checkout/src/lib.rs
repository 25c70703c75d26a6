//! codesy checkout form handler.
//!
//! On submit, the handler reads the card fields from the page, exchanges them
//! for a Stripe token, stores the token on the signed-in user with an
//! authenticated `PATCH /users/{id}/`, and reloads the page:
//!
//! ```text
//! Idle -> Tokenizing -> TokenizeFailed -> Reloading
//!                    -> Tokenized -> Updating -> Reloading
//! ```
//!
//! Tokenization failures are written to `#payment-errors`; update failures
//! are only logged. Every path ends in exactly one reload.
//!
//! # Example
//!
//! ```no_run
//! use codesy_checkout::{CheckoutHandler, MemoryPage, PageElement};
//! use codesy_client::ClientOptions;
//!
//! # async fn example() -> Result<(), codesy_checkout::CheckoutError> {
//! let page = MemoryPage::new()
//!     .with(PageElement::StripeKey, "pk_test_123")
//!     .with(PageElement::UserId, "42")
//!     .with(PageElement::CsrfToken, "csrf-from-form")
//!     .with(PageElement::CardNumber, "4242424242424242")
//!     .with(PageElement::ExpMonth, "12")
//!     .with(PageElement::ExpYear, "2030")
//!     .with(PageElement::Cvc, "123");
//!
//! let handler = CheckoutHandler::load(&page, "https://codesy.io", &ClientOptions::default())?;
//! let outcome = handler.submit(&page).await;
//! println!("{:?}", outcome.result);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod handler;
pub mod page;
pub mod site;

pub use config::CheckoutConfig;
pub use error::CheckoutError;
pub use handler::{
    read_card, read_publishable_key, read_session, CheckoutHandler, SubmitOutcome, SubmitResult,
    AUTHORIZING_LABEL,
};
pub use page::{CheckoutPage, MemoryPage, PageElement, PageEvent};
pub use site::SitePage;

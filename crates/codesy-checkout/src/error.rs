//! Checkout error types.

use codesy_client::ClientError;
use codesy_core::CoreError;

/// Errors that prevent the checkout handler from being set up.
///
/// Failures during a submission are not errors: they end in a reload and are
/// reported through [`crate::SubmitOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The page carries no Stripe publishable key.
    #[error("page has no Stripe publishable key ({selector})")]
    MissingPublishableKey {
        /// Selector the key was read from.
        selector: &'static str,
    },

    /// Invalid publishable key.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ClientError),
}
